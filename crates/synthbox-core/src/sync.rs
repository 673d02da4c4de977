use crate::serial_transport::{SerialTransport, TransportError};
use log::info;
use std::sync::Arc;
use synthbox_domain_protocol::{
    decode_load_settings, encode_commit_settings, encode_request_load_settings,
    encode_send_settings, expect_ack, MessageKind, ProtocolError,
};
use synthbox_domain_settings::{apply, EngineError, SessionState, SettingsAction};
use synthbox_ports::catalog::SynthCatalog;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("settings error: {0}")]
    Engine(#[from] EngineError),
}

impl SyncError {
    pub fn payload(&self) -> Option<&str> {
        match self {
            SyncError::Protocol(err) => err.payload(),
            _ => None,
        }
    }
}

/// Load, push and commit cycles against the device. Nothing is retried here.
pub struct SyncController {
    transport: Arc<SerialTransport>,
    catalog: Arc<dyn SynthCatalog>,
}

impl SyncController {
    pub fn new(transport: Arc<SerialTransport>, catalog: Arc<dyn SynthCatalog>) -> Self {
        Self { transport, catalog }
    }

    pub fn transport(&self) -> &Arc<SerialTransport> {
        &self.transport
    }

    pub fn load_from_device(&self, state: &SessionState) -> Result<SessionState, SyncError> {
        let request = encode_request_load_settings()?;
        let response = self.transport.send_and_await(&request)?;
        let model = decode_load_settings(&response)?;
        let presets = model.presets.len();
        let next = apply(state, SettingsAction::ImportSettings { model }, self.catalog.as_ref())?;
        info!("loaded {} presets from device", presets);
        Ok(next)
    }

    /// Sends the session's settings; the session is clean only after a 0x31 ack.
    pub fn push_to_device(&self, state: &SessionState) -> Result<SessionState, SyncError> {
        let request = encode_send_settings(&state.export_view(), self.catalog.as_ref())?;
        let response = self.transport.send_and_await(&request)?;
        expect_ack(&response, MessageKind::SendSettingsAck)?;
        let next = apply(state, SettingsAction::MarkExported, self.catalog.as_ref())?;
        info!("sent {} presets to device", state.model.presets.len());
        Ok(next)
    }

    pub fn commit(&self) -> Result<(), SyncError> {
        let request = encode_commit_settings()?;
        let response = self.transport.send_and_await(&request)?;
        expect_ack(&response, MessageKind::CommitSettingsAck)?;
        info!("device committed settings");
        Ok(())
    }
}
