use crate::settings::SettingsModel;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_serial_manufacturer() -> String {
    "Teensyduino".to_string()
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_idle_gap_ms() -> u64 {
    500
}

fn default_request_timeout_ms() -> u64 {
    3000
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
    #[error("invalid settings file: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfigDto {
    /// USB manufacturer string used to discover the controller's serial port.
    #[serde(default = "default_serial_manufacturer")]
    pub serial_manufacturer: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Quiet period that ends a response frame.
    #[serde(default = "default_idle_gap_ms")]
    pub idle_gap_ms: u64,
    /// Upper bound on a whole request/response cycle.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    pub catalog_path: Option<String>,
    pub last_settings_file: Option<String>,
}

impl Default for AppConfigDto {
    fn default() -> Self {
        Self {
            serial_manufacturer: default_serial_manufacturer(),
            baud_rate: default_baud_rate(),
            idle_gap_ms: default_idle_gap_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            catalog_path: None,
            last_settings_file: None,
        }
    }
}

pub trait StoragePort: Send + Sync {
    fn load_config(&self) -> Result<AppConfigDto, StorageError>;
    fn save_config(&self, config: &AppConfigDto) -> Result<(), StorageError>;

    /// Reads a settings file. The returned model is not yet checked against
    /// the settings invariants.
    fn import_settings_file(&self, path: &Path) -> Result<SettingsModel, StorageError>;
    fn export_settings_file(&self, path: &Path, model: &SettingsModel) -> Result<(), StorageError>;
}
