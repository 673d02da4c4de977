use crate::types::*;
use serde::{Deserialize, Serialize};

/// One physical knob routed to one synth parameter.
///
/// `input` is the CC currently assigned to the knob slot; `output` is the
/// destination parameter CC on the preset's synth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControllerMapping {
    #[serde(rename = "in")]
    pub input: Cc,
    #[serde(rename = "out")]
    pub output: Cc,
}

impl ControllerMapping {
    pub fn new(input: Cc, output: Cc) -> Self {
        Self { input, output }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub synth_id: SynthId,
    pub channel: Channel,
    pub mappings: Vec<ControllerMapping>,
}

/// The persisted settings shape, shared by the device protocol and settings files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsModel {
    pub controller_rows: u32,
    pub controller_columns: u32,
    #[serde(rename = "inputCCs")]
    pub input_ccs: Vec<Cc>,
    pub presets: Vec<Preset>,
}

impl SettingsModel {
    pub fn slot_count(&self) -> usize {
        self.controller_rows as usize * self.controller_columns as usize
    }
}
