use crate::allocation::{allocate_outputs, initial_mappings, next_input_ccs};
use crate::model::{validate_model, ModelError, SessionState};
use serde::{Deserialize, Serialize};
use std::fmt;
use synthbox_ports::catalog::{CatalogError, SynthCatalog};
use synthbox_ports::settings::{ControllerMapping, Preset, SettingsModel};
use synthbox_ports::types::{is_valid_cc, is_valid_channel, Cc, Channel, SynthId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum SettingsAction {
    ResizeGrid { rows: Option<u32>, columns: Option<u32> },
    RelabelInput { slot_index: usize, cc: Cc },
    BeginAddPreset,
    CancelAddPreset,
    SubmitNewPreset { synth_id: SynthId, channel: Channel },
    SelectPreset { index: usize },
    /// Only the output CC is taken from `mapping`; the input stays the slot's label.
    EditCurrentMapping { mapping_index: usize, mapping: ControllerMapping },
    EditCurrentChannel { channel: Channel },
    MovePresetUp,
    MovePresetDown,
    DeletePreset,
    ImportSettings { model: SettingsModel },
    MarkExported,
    ToggleExportPreview,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReorderDirection {
    Up,
    Down,
}

impl fmt::Display for ReorderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReorderDirection::Up => write!(f, "up"),
            ReorderDirection::Down => write!(f, "down"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(#[from] CatalogError),
    #[error("configuration error: synth {synth_id} has no parameter with cc {cc}")]
    UnknownOutput { synth_id: SynthId, cc: Cc },
    #[error("preset {preset_index} (synth {synth_id}) needs {needed} unused output ccs, only {available} left")]
    InsufficientOutputs {
        preset_index: usize,
        synth_id: SynthId,
        needed: usize,
        available: usize,
    },
    #[error("cannot move preset {direction} from {index:?} in a list of {len}")]
    InvalidReorder {
        direction: ReorderDirection,
        index: Option<usize>,
        len: usize,
    },
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
    #[error("input cc {0} outside 1..=127")]
    InputCcOutOfRange(u32),
    #[error("channel {0} outside 1..=16")]
    InvalidChannel(Channel),
    #[error("grid dimensions must be at least 1x1, got {rows}x{columns}")]
    InvalidGridSize { rows: u32, columns: u32 },
    #[error("invalid settings: {0}")]
    InvalidModel(#[from] ModelError),
}

/// Pure transition function over the session. Never performs I/O.
///
/// On error the input state is untouched; callers keep using it.
pub fn apply(
    state: &SessionState,
    action: SettingsAction,
    catalog: &dyn SynthCatalog,
) -> Result<SessionState, EngineError> {
    match action {
        SettingsAction::ResizeGrid { rows, columns } => resize_grid(state, rows, columns, catalog),
        SettingsAction::RelabelInput { slot_index, cc } => relabel_input(state, slot_index, cc),
        SettingsAction::BeginAddPreset => Ok(SessionState {
            adding_preset: true,
            ..state.clone()
        }),
        SettingsAction::CancelAddPreset => Ok(SessionState {
            adding_preset: false,
            ..state.clone()
        }),
        SettingsAction::SubmitNewPreset { synth_id, channel } => {
            submit_new_preset(state, synth_id, channel, catalog)
        }
        SettingsAction::SelectPreset { index } => {
            check_index("preset", index, state.model.presets.len())?;
            Ok(SessionState {
                current_preset_idx: Some(index),
                ..state.clone()
            })
        }
        SettingsAction::EditCurrentMapping {
            mapping_index,
            mapping,
        } => edit_current_mapping(state, mapping_index, mapping.output, catalog),
        SettingsAction::EditCurrentChannel { channel } => {
            if !is_valid_channel(channel) {
                return Err(EngineError::InvalidChannel(channel));
            }
            edit_current_preset(state, |preset| {
                preset.channel = channel;
                Ok(())
            })
        }
        SettingsAction::MovePresetUp => move_current_preset(state, ReorderDirection::Up),
        SettingsAction::MovePresetDown => move_current_preset(state, ReorderDirection::Down),
        SettingsAction::DeletePreset => delete_current_preset(state),
        SettingsAction::ImportSettings { model } => {
            validate_model(&model)?;
            Ok(SessionState::new(model))
        }
        SettingsAction::MarkExported => Ok(SessionState {
            unsaved_edits: false,
            ..state.clone()
        }),
        SettingsAction::ToggleExportPreview => Ok(SessionState {
            exporting: !state.exporting,
            ..state.clone()
        }),
    }
}

fn check_index(what: &'static str, index: usize, len: usize) -> Result<(), EngineError> {
    if index >= len {
        return Err(EngineError::IndexOutOfRange { what, index, len });
    }
    Ok(())
}

fn resize_grid(
    state: &SessionState,
    rows: Option<u32>,
    columns: Option<u32>,
    catalog: &dyn SynthCatalog,
) -> Result<SessionState, EngineError> {
    let rows = rows.unwrap_or(state.model.controller_rows);
    let columns = columns.unwrap_or(state.model.controller_columns);
    if rows == 0 || columns == 0 {
        return Err(EngineError::InvalidGridSize { rows, columns });
    }

    let new_slots = usize::try_from(rows as u64 * columns as u64).unwrap_or(usize::MAX);
    let old_slots = state.model.input_ccs.len();

    let (input_ccs, presets) = if new_slots > old_slots {
        let added = next_input_ccs(&state.model.input_ccs, new_slots - old_slots)
            .map_err(EngineError::InputCcOutOfRange)?;
        let presets = state
            .model
            .presets
            .iter()
            .enumerate()
            .map(|(preset_index, preset)| extend_preset(preset_index, preset, &added, catalog))
            .collect::<Result<Vec<_>, _>>()?;
        let mut input_ccs = state.model.input_ccs.clone();
        input_ccs.extend_from_slice(&added);
        (input_ccs, presets)
    } else {
        let presets = state
            .model
            .presets
            .iter()
            .map(|preset| Preset {
                mappings: preset.mappings[..new_slots.min(preset.mappings.len())].to_vec(),
                ..preset.clone()
            })
            .collect();
        (state.model.input_ccs[..new_slots].to_vec(), presets)
    };

    let mut next = state.clone();
    next.model.controller_rows = rows;
    next.model.controller_columns = columns;
    next.model.input_ccs = input_ccs;
    next.model.presets = presets;
    next.unsaved_edits = true;
    Ok(next)
}

fn extend_preset(
    preset_index: usize,
    preset: &Preset,
    added_inputs: &[Cc],
    catalog: &dyn SynthCatalog,
) -> Result<Preset, EngineError> {
    let synth = catalog.get_by_id(preset.synth_id)?;
    let outputs = allocate_outputs(preset, synth, added_inputs.len()).map_err(|shortfall| {
        EngineError::InsufficientOutputs {
            preset_index,
            synth_id: preset.synth_id,
            needed: shortfall.needed,
            available: shortfall.available,
        }
    })?;

    let mut extended = preset.clone();
    extended.mappings.extend(
        added_inputs
            .iter()
            .zip(outputs)
            .map(|(input, output)| ControllerMapping::new(*input, output)),
    );
    Ok(extended)
}

fn relabel_input(state: &SessionState, slot_index: usize, cc: Cc) -> Result<SessionState, EngineError> {
    check_index("slot", slot_index, state.model.input_ccs.len())?;
    if !is_valid_cc(cc as u32) {
        return Err(EngineError::InputCcOutOfRange(cc as u32));
    }

    let mut next = state.clone();
    next.model.input_ccs[slot_index] = cc;
    for preset in &mut next.model.presets {
        if let Some(mapping) = preset.mappings.get_mut(slot_index) {
            mapping.input = cc;
        }
    }
    next.unsaved_edits = true;
    Ok(next)
}

fn submit_new_preset(
    state: &SessionState,
    synth_id: SynthId,
    channel: Channel,
    catalog: &dyn SynthCatalog,
) -> Result<SessionState, EngineError> {
    if !is_valid_channel(channel) {
        return Err(EngineError::InvalidChannel(channel));
    }
    let synth = catalog.get_by_id(synth_id)?;
    let Some(mappings) = initial_mappings(synth, &state.model.input_ccs) else {
        return Err(EngineError::InsufficientOutputs {
            preset_index: state.model.presets.len(),
            synth_id,
            needed: state.model.input_ccs.len(),
            available: 0,
        });
    };

    let mut next = state.clone();
    next.model.presets.push(Preset {
        synth_id,
        channel,
        mappings,
    });
    next.current_preset_idx = Some(next.model.presets.len() - 1);
    next.adding_preset = false;
    next.unsaved_edits = true;
    Ok(next)
}

fn edit_current_mapping(
    state: &SessionState,
    mapping_index: usize,
    output: Cc,
    catalog: &dyn SynthCatalog,
) -> Result<SessionState, EngineError> {
    let input = state.model.input_ccs.get(mapping_index).copied();
    edit_current_preset(state, |preset| {
        check_index("mapping", mapping_index, preset.mappings.len())?;
        let synth = catalog.get_by_id(preset.synth_id)?;
        if synth.parameter_by_cc(output).is_none() {
            return Err(EngineError::UnknownOutput {
                synth_id: preset.synth_id,
                cc: output,
            });
        }
        let mapping = &mut preset.mappings[mapping_index];
        mapping.input = input.unwrap_or(mapping.input);
        mapping.output = output;
        Ok(())
    })
}

/// Runs `edit` on the selected preset. With nothing selected, or when the edit
/// leaves the preset unchanged, the state comes back as-is and stays clean.
fn edit_current_preset<F>(state: &SessionState, edit: F) -> Result<SessionState, EngineError>
where
    F: FnOnce(&mut Preset) -> Result<(), EngineError>,
{
    let Some(idx) = state.current_preset_idx else {
        return Ok(state.clone());
    };
    check_index("preset", idx, state.model.presets.len())?;

    let mut next = state.clone();
    edit(&mut next.model.presets[idx])?;
    if next.model.presets[idx] != state.model.presets[idx] {
        next.unsaved_edits = true;
    }
    Ok(next)
}

fn move_current_preset(
    state: &SessionState,
    direction: ReorderDirection,
) -> Result<SessionState, EngineError> {
    let len = state.model.presets.len();
    let invalid = EngineError::InvalidReorder {
        direction,
        index: state.current_preset_idx,
        len,
    };
    let Some(idx) = state.current_preset_idx else {
        return Err(invalid);
    };
    check_index("preset", idx, len)?;

    let target = match direction {
        ReorderDirection::Up if idx > 0 => idx - 1,
        ReorderDirection::Down if idx + 1 < len => idx + 1,
        _ => return Err(invalid),
    };

    let mut next = state.clone();
    next.model.presets.swap(idx, target);
    next.current_preset_idx = Some(target);
    next.unsaved_edits = true;
    Ok(next)
}

fn delete_current_preset(state: &SessionState) -> Result<SessionState, EngineError> {
    let Some(idx) = state.current_preset_idx else {
        return Ok(state.clone());
    };
    check_index("preset", idx, state.model.presets.len())?;

    let mut next = state.clone();
    next.model.presets.remove(idx);
    next.current_preset_idx = None;
    next.unsaved_edits = true;
    Ok(next)
}
