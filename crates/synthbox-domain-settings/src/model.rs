use serde::{Deserialize, Serialize};
use synthbox_ports::settings::{Preset, SettingsModel};
use synthbox_ports::types::{is_valid_cc, is_valid_channel, Cc, Channel};

pub const INITIAL_ROW_COUNT: u32 = 2;
pub const INITIAL_COLUMN_COUNT: u32 = 4;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("grid dimensions must be at least 1x1, got {rows}x{columns}")]
    EmptyGrid { rows: u32, columns: u32 },
    #[error("grid has {slots} slots but {input_ccs} input ccs")]
    SlotCountMismatch { slots: usize, input_ccs: usize },
    #[error("input cc {cc} at slot {slot} outside 1..=127")]
    InputCcOutOfRange { slot: usize, cc: Cc },
    #[error("preset {preset_index} has {mappings} mappings, expected {expected}")]
    MappingCountMismatch {
        preset_index: usize,
        mappings: usize,
        expected: usize,
    },
    #[error("preset {preset_index} slot {slot} maps input cc {found}, slot is labelled {expected}")]
    InputMismatch {
        preset_index: usize,
        slot: usize,
        found: Cc,
        expected: Cc,
    },
    #[error("preset {preset_index} has channel {channel} outside 1..=16")]
    InvalidChannel { preset_index: usize, channel: Channel },
}

pub fn initial_model() -> SettingsModel {
    let slots = (INITIAL_ROW_COUNT * INITIAL_COLUMN_COUNT) as Cc;
    SettingsModel {
        controller_rows: INITIAL_ROW_COUNT,
        controller_columns: INITIAL_COLUMN_COUNT,
        input_ccs: (1..=slots).collect(),
        presets: Vec::new(),
    }
}

/// Checks the grid/slot/mapping invariants that every reachable state upholds.
pub fn validate_model(model: &SettingsModel) -> Result<(), ModelError> {
    if model.controller_rows == 0 || model.controller_columns == 0 {
        return Err(ModelError::EmptyGrid {
            rows: model.controller_rows,
            columns: model.controller_columns,
        });
    }

    let slots = model.slot_count();
    if model.input_ccs.len() != slots {
        return Err(ModelError::SlotCountMismatch {
            slots,
            input_ccs: model.input_ccs.len(),
        });
    }

    if let Some((slot, cc)) = model
        .input_ccs
        .iter()
        .enumerate()
        .find(|(_, cc)| !is_valid_cc(**cc as u32))
    {
        return Err(ModelError::InputCcOutOfRange { slot, cc: *cc });
    }

    for (preset_index, preset) in model.presets.iter().enumerate() {
        validate_preset(preset_index, preset, &model.input_ccs)?;
    }
    Ok(())
}

fn validate_preset(preset_index: usize, preset: &Preset, input_ccs: &[Cc]) -> Result<(), ModelError> {
    if !is_valid_channel(preset.channel) {
        return Err(ModelError::InvalidChannel {
            preset_index,
            channel: preset.channel,
        });
    }
    if preset.mappings.len() != input_ccs.len() {
        return Err(ModelError::MappingCountMismatch {
            preset_index,
            mappings: preset.mappings.len(),
            expected: input_ccs.len(),
        });
    }
    for (slot, (mapping, expected)) in preset.mappings.iter().zip(input_ccs).enumerate() {
        if mapping.input != *expected {
            return Err(ModelError::InputMismatch {
                preset_index,
                slot,
                found: mapping.input,
                expected: *expected,
            });
        }
    }
    Ok(())
}

/// Persisted settings plus the transient fields of an editing session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(flatten)]
    pub model: SettingsModel,
    pub current_preset_idx: Option<usize>,
    pub adding_preset: bool,
    pub exporting: bool,
    pub unsaved_edits: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(initial_model())
    }
}

impl SessionState {
    pub fn new(model: SettingsModel) -> Self {
        let current_preset_idx = if model.presets.is_empty() { None } else { Some(0) };
        Self {
            model,
            current_preset_idx,
            adding_preset: false,
            exporting: false,
            unsaved_edits: false,
        }
    }

    /// The persisted part of the session, as sent to the device or written to a file.
    pub fn export_view(&self) -> SettingsModel {
        self.model.clone()
    }

    pub fn current_preset(&self) -> Option<&Preset> {
        self.current_preset_idx
            .and_then(|idx| self.model.presets.get(idx))
    }
}
