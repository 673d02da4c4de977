use serde::{Deserialize, Serialize};
use std::fmt;
use synthbox_ports::types::{Cc, Channel, SynthId};

/// Version of the settings layout the firmware keeps in EEPROM.
pub const PROTOCOL_VERSION: u8 = 0x01;

pub const MSG_REQUEST_LOAD_SETTINGS: u8 = 0x20;
pub const MSG_LOAD_SETTINGS: u8 = 0x21;
pub const MSG_SEND_SETTINGS: u8 = 0x30;
pub const MSG_SEND_SETTINGS_ACK: u8 = 0x31;
pub const MSG_COMMIT_SETTINGS: u8 = 0x40;
pub const MSG_COMMIT_SETTINGS_ACK: u8 = 0x41;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    RequestLoadSettings,
    LoadSettings,
    SendSettings,
    SendSettingsAck,
    CommitSettings,
    CommitSettingsAck,
}

impl MessageKind {
    pub fn id(self) -> u8 {
        match self {
            MessageKind::RequestLoadSettings => MSG_REQUEST_LOAD_SETTINGS,
            MessageKind::LoadSettings => MSG_LOAD_SETTINGS,
            MessageKind::SendSettings => MSG_SEND_SETTINGS,
            MessageKind::SendSettingsAck => MSG_SEND_SETTINGS_ACK,
            MessageKind::CommitSettings => MSG_COMMIT_SETTINGS,
            MessageKind::CommitSettingsAck => MSG_COMMIT_SETTINGS_ACK,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            MSG_REQUEST_LOAD_SETTINGS => Some(MessageKind::RequestLoadSettings),
            MSG_LOAD_SETTINGS => Some(MessageKind::LoadSettings),
            MSG_SEND_SETTINGS => Some(MessageKind::SendSettings),
            MSG_SEND_SETTINGS_ACK => Some(MessageKind::SendSettingsAck),
            MSG_COMMIT_SETTINGS => Some(MessageKind::CommitSettings),
            MSG_COMMIT_SETTINGS_ACK => Some(MessageKind::CommitSettingsAck),
            _ => None,
        }
    }

    pub fn response(self) -> Option<Self> {
        match self {
            MessageKind::RequestLoadSettings => Some(MessageKind::LoadSettings),
            MessageKind::SendSettings => Some(MessageKind::SendSettingsAck),
            MessageKind::CommitSettings => Some(MessageKind::CommitSettingsAck),
            _ => None,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}(0x{:02x})", self, self.id())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub msg: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerDto {
    pub rows: u32,
    pub cols: u32,
    pub ccs: Vec<Cc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputCcDto {
    pub num: Cc,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedOutputDto {
    pub pid: u32,
    pub sid: SynthId,
    pub chn: Channel,
    pub ccs: Vec<OutputCcDto>,
}

/// 0x21: settings as reported by the device. The firmware echoes back the
/// stored 0x30 document, so display fields may be present; they are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSettingsDto {
    pub msg: u8,
    pub ctrl: ControllerDto,
    pub outs: Vec<LoadedOutputDto>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCcDto {
    pub num: Cc,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentOutputDto {
    pub pid: u32,
    pub sid: SynthId,
    pub mfg: String,
    pub syn: String,
    pub chn: Channel,
    pub ccs: Vec<NamedCcDto>,
}

/// 0x30: full settings pushed to the device, with display names resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendSettingsDto {
    pub msg: u8,
    pub ctrl: ControllerDto,
    pub outs: Vec<SentOutputDto>,
}
