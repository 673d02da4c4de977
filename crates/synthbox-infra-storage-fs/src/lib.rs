use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use synthbox_ports::settings::{Preset, SettingsModel};
use synthbox_ports::storage::{AppConfigDto, StorageError, StoragePort};
use synthbox_ports::types::{Cc, CC_MAX};

/// On-disk settings file. Older files carry no `inputCCs`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFileDto {
    controller_rows: u32,
    controller_columns: u32,
    #[serde(rename = "inputCCs", default, skip_serializing_if = "Option::is_none")]
    input_ccs: Option<Vec<Cc>>,
    #[serde(default)]
    presets: Vec<Preset>,
}

impl SettingsFileDto {
    fn into_model(self) -> Result<SettingsModel, StorageError> {
        let input_ccs = match self.input_ccs {
            Some(ccs) => ccs,
            None => infer_input_ccs(self.controller_rows, self.controller_columns, &self.presets)?,
        };
        Ok(SettingsModel {
            controller_rows: self.controller_rows,
            controller_columns: self.controller_columns,
            input_ccs,
            presets: self.presets,
        })
    }
}

impl From<&SettingsModel> for SettingsFileDto {
    fn from(model: &SettingsModel) -> Self {
        Self {
            controller_rows: model.controller_rows,
            controller_columns: model.controller_columns,
            input_ccs: Some(model.input_ccs.clone()),
            presets: model.presets.clone(),
        }
    }
}

/// Input CCs for a file that omits them: the first preset's `in` values,
/// or 1..=rows*cols when there are no presets.
fn infer_input_ccs(rows: u32, columns: u32, presets: &[Preset]) -> Result<Vec<Cc>, StorageError> {
    if let Some(first) = presets.first() {
        return Ok(first.mappings.iter().map(|mapping| mapping.input).collect());
    }
    let count = rows as u64 * columns as u64;
    if count > CC_MAX as u64 {
        return Err(StorageError::Invalid(format!(
            "{}x{} grid needs more than 127 input CCs",
            rows, columns
        )));
    }
    Ok((1..=count as Cc).collect())
}

pub struct FsStorage {
    base_dir: PathBuf,
}

impl FsStorage {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_base_dir() -> Result<PathBuf, StorageError> {
        let base = dirs_next::config_dir()
            .ok_or_else(|| StorageError::Io("config dir not found".to_string()))?;
        Ok(base.join("SynthBox"))
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
        let data = fs::read(path).map_err(|e| StorageError::Io(format!("{}: {}", path.display(), e)))?;
        serde_json::from_slice(&data).map_err(|e| StorageError::Serde(e.to_string()))
    }

    fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        let data =
            serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serde(e.to_string()))?;
        fs::write(path, data).map_err(|e| StorageError::Io(format!("{}: {}", path.display(), e)))
    }
}

impl Default for FsStorage {
    fn default() -> Self {
        let base_dir = Self::default_base_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { base_dir }
    }
}

impl StoragePort for FsStorage {
    fn load_config(&self) -> Result<AppConfigDto, StorageError> {
        let path = self.config_path();
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(AppConfigDto::default());
        }
        Self::read_json(&path)
    }

    fn save_config(&self, config: &AppConfigDto) -> Result<(), StorageError> {
        Self::write_json(&self.config_path(), config)
    }

    fn import_settings_file(&self, path: &Path) -> Result<SettingsModel, StorageError> {
        let dto: SettingsFileDto = Self::read_json(path)?;
        dto.into_model()
    }

    fn export_settings_file(&self, path: &Path, model: &SettingsModel) -> Result<(), StorageError> {
        Self::write_json(path, &SettingsFileDto::from(model))
    }
}
