use serde::{Deserialize, Serialize};
use synthbox_domain_settings::{SessionState, SettingsAction};
use synthbox_ports::catalog::SynthDefinition;
use synthbox_ports::serial::SerialPortInfo;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    Edit { action: SettingsAction },
    LoadFromDevice,
    PushToDevice,
    CommitToDevice,
    ImportFile { path: String },
    ExportFile { path: String },
    ListSynths,
    ListSerialPorts,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceOperation {
    Load,
    Push,
    Commit,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    SettingsUpdated { state: SessionState },
    SynthsListed { synths: Vec<SynthDefinition> },
    SerialPortsListed { ports: Vec<SerialPortInfo> },
    DeviceOperationSucceeded { operation: DeviceOperation },
    DeviceOperationFailed {
        operation: DeviceOperation,
        message: String,
        payload: Option<String>,
    },
}
