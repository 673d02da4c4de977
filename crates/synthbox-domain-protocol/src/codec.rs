use crate::messages::*;
use synthbox_ports::catalog::{CatalogError, SynthCatalog};
use synthbox_ports::settings::{ControllerMapping, Preset, SettingsModel};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("malformed message ({reason}): {payload}")]
    Malformed { reason: String, payload: String },
    #[error("expected {expected} but received msg {actual:?}: {payload}")]
    UnexpectedMessage {
        expected: MessageKind,
        actual: Option<u8>,
        payload: String,
    },
    #[error("configuration integrity error: {0}")]
    ConfigurationIntegrity(String),
    #[error("configuration error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("encode failed: {0}")]
    Encode(String),
}

impl ProtocolError {
    /// Raw payload attached for diagnostics, when the error came from a received message.
    pub fn payload(&self) -> Option<&str> {
        match self {
            ProtocolError::Malformed { payload, .. }
            | ProtocolError::UnexpectedMessage { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

fn payload_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn malformed(reason: impl Into<String>, bytes: &[u8]) -> ProtocolError {
    ProtocolError::Malformed {
        reason: reason.into(),
        payload: payload_text(bytes),
    }
}

fn to_bytes<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    serde_json::to_vec(value).map_err(|e| ProtocolError::Encode(e.to_string()))
}

fn encode_envelope(kind: MessageKind) -> Result<Vec<u8>, ProtocolError> {
    to_bytes(&Envelope { msg: kind.id() })
}

pub fn encode_request_load_settings() -> Result<Vec<u8>, ProtocolError> {
    encode_envelope(MessageKind::RequestLoadSettings)
}

pub fn encode_commit_settings() -> Result<Vec<u8>, ProtocolError> {
    encode_envelope(MessageKind::CommitSettings)
}

pub fn encode_ack(kind: MessageKind) -> Result<Vec<u8>, ProtocolError> {
    encode_envelope(kind)
}

pub fn encode_send_settings(
    model: &SettingsModel,
    catalog: &dyn SynthCatalog,
) -> Result<Vec<u8>, ProtocolError> {
    let dto = build_send_settings(model, catalog)?;
    to_bytes(&dto)
}

/// Resolves display names for every preset. A mapping whose output CC is not
/// one of its synth's parameters never leaves the process.
pub fn build_send_settings(
    model: &SettingsModel,
    catalog: &dyn SynthCatalog,
) -> Result<SendSettingsDto, ProtocolError> {
    let mut outs = Vec::with_capacity(model.presets.len());
    for (idx, preset) in model.presets.iter().enumerate() {
        let synth = catalog.get_by_id(preset.synth_id)?;
        let ccs = preset
            .mappings
            .iter()
            .map(|mapping| {
                synth
                    .parameter_by_cc(mapping.output)
                    .map(|parameter| NamedCcDto {
                        num: mapping.output,
                        name: parameter.title.clone(),
                    })
                    .ok_or_else(|| {
                        ProtocolError::ConfigurationIntegrity(format!(
                            "preset {} maps input cc {} to cc {}, which synth {} does not expose",
                            idx + 1,
                            mapping.input,
                            mapping.output,
                            synth.id
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        outs.push(SentOutputDto {
            pid: idx as u32 + 1,
            sid: preset.synth_id,
            mfg: synth.manufacturer.clone(),
            syn: synth.title.clone(),
            chn: preset.channel,
            ccs,
        });
    }

    Ok(SendSettingsDto {
        msg: MSG_SEND_SETTINGS,
        ctrl: ControllerDto {
            rows: model.controller_rows,
            cols: model.controller_columns,
            ccs: model.input_ccs.clone(),
        },
        outs,
    })
}

pub fn message_id(bytes: &[u8]) -> Result<u8, ProtocolError> {
    serde_json::from_slice::<Envelope>(bytes)
        .map(|envelope| envelope.msg)
        .map_err(|e| malformed(e.to_string(), bytes))
}

fn expect_kind(bytes: &[u8], expected: MessageKind) -> Result<(), ProtocolError> {
    let actual = message_id(bytes)?;
    if actual != expected.id() {
        return Err(ProtocolError::UnexpectedMessage {
            expected,
            actual: Some(actual),
            payload: payload_text(bytes),
        });
    }
    Ok(())
}

pub fn expect_ack(bytes: &[u8], expected: MessageKind) -> Result<(), ProtocolError> {
    expect_kind(bytes, expected)
}

pub fn decode_load_settings(bytes: &[u8]) -> Result<SettingsModel, ProtocolError> {
    decode_settings(bytes, MessageKind::LoadSettings)
}

/// Decodes a 0x30 send-settings request; display names are dropped.
pub fn decode_send_settings(bytes: &[u8]) -> Result<SettingsModel, ProtocolError> {
    decode_settings(bytes, MessageKind::SendSettings)
}

fn decode_settings(bytes: &[u8], expected: MessageKind) -> Result<SettingsModel, ProtocolError> {
    expect_kind(bytes, expected)?;
    let dto: LoadSettingsDto =
        serde_json::from_slice(bytes).map_err(|e| malformed(e.to_string(), bytes))?;

    let slots = dto.ctrl.rows as usize * dto.ctrl.cols as usize;
    if dto.ctrl.ccs.len() != slots {
        return Err(malformed(
            format!(
                "controller is {}x{} but lists {} input ccs",
                dto.ctrl.rows,
                dto.ctrl.cols,
                dto.ctrl.ccs.len()
            ),
            bytes,
        ));
    }

    let mut presets = Vec::with_capacity(dto.outs.len());
    for out in &dto.outs {
        if out.ccs.len() != dto.ctrl.ccs.len() {
            return Err(malformed(
                format!(
                    "preset {} has {} output ccs for {} inputs",
                    out.pid,
                    out.ccs.len(),
                    dto.ctrl.ccs.len()
                ),
                bytes,
            ));
        }
        presets.push(Preset {
            synth_id: out.sid,
            channel: out.chn,
            mappings: dto
                .ctrl
                .ccs
                .iter()
                .zip(&out.ccs)
                .map(|(input, output)| ControllerMapping::new(*input, output.num))
                .collect(),
        });
    }

    Ok(SettingsModel {
        controller_rows: dto.ctrl.rows,
        controller_columns: dto.ctrl.cols,
        input_ccs: dto.ctrl.ccs,
        presets,
    })
}
