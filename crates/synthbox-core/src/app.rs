use crate::ipc::{Command, DeviceOperation, Event};
use crate::serial_transport::{SerialTransport, TransportError};
use crate::sync::{SyncController, SyncError};
use log::error;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use synthbox_domain_settings::{apply, EngineError, SessionState, SettingsAction};
use synthbox_ports::catalog::SynthCatalog;
use synthbox_ports::storage::{StorageError, StoragePort};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("settings error: {0}")]
    Engine(#[from] EngineError),
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("no storage configured")]
    StorageUnavailable,
}

/// Command/event façade over one editing session and one device connection.
pub struct AppCore {
    catalog: Arc<dyn SynthCatalog>,
    sync: SyncController,
    storage: Option<Box<dyn StoragePort>>,
    session: SessionState,
    events: VecDeque<Event>,
}

impl AppCore {
    pub fn new(
        catalog: Arc<dyn SynthCatalog>,
        transport: Arc<SerialTransport>,
        storage: Option<Box<dyn StoragePort>>,
    ) -> Self {
        Self {
            sync: SyncController::new(transport, catalog.clone()),
            catalog,
            storage,
            session: SessionState::default(),
            events: VecDeque::new(),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn catalog(&self) -> &dyn SynthCatalog {
        self.catalog.as_ref()
    }

    pub fn handle_command(&mut self, cmd: Command) -> Result<(), AppError> {
        match cmd {
            Command::Edit { action } => {
                self.session = apply(&self.session, action, self.catalog.as_ref())?;
                self.emit_settings();
            }
            Command::LoadFromDevice => {
                let result = self.sync.load_from_device(&self.session);
                self.session = self.finish_device_operation(DeviceOperation::Load, result)?;
                self.emit_settings();
            }
            Command::PushToDevice => {
                let result = self.sync.push_to_device(&self.session);
                self.session = self.finish_device_operation(DeviceOperation::Push, result)?;
                self.emit_settings();
            }
            Command::CommitToDevice => {
                let result = self.sync.commit();
                self.finish_device_operation(DeviceOperation::Commit, result)?;
            }
            Command::ImportFile { path } => {
                let storage = self.storage.as_ref().ok_or(AppError::StorageUnavailable)?;
                let model = storage.import_settings_file(Path::new(&path))?;
                self.session = apply(
                    &self.session,
                    SettingsAction::ImportSettings { model },
                    self.catalog.as_ref(),
                )?;
                self.emit_settings();
            }
            Command::ExportFile { path } => {
                let storage = self.storage.as_ref().ok_or(AppError::StorageUnavailable)?;
                storage.export_settings_file(Path::new(&path), &self.session.export_view())?;
            }
            Command::ListSynths => {
                let synths = self.catalog.synths().to_vec();
                self.events.push_back(Event::SynthsListed { synths });
            }
            Command::ListSerialPorts => {
                let ports = self.sync.transport().list_ports()?;
                self.events.push_back(Event::SerialPortsListed { ports });
            }
        }
        Ok(())
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    pub fn export_preview(&self) -> Result<String, AppError> {
        serde_json::to_string_pretty(&self.session.export_view())
            .map_err(|e| AppError::Storage(StorageError::Serde(e.to_string())))
    }

    fn finish_device_operation<T>(
        &mut self,
        operation: DeviceOperation,
        result: Result<T, SyncError>,
    ) -> Result<T, AppError> {
        match result {
            Ok(value) => {
                self.events
                    .push_back(Event::DeviceOperationSucceeded { operation });
                Ok(value)
            }
            Err(err) => {
                error!("{:?} failed: {}", operation, err);
                self.events.push_back(Event::DeviceOperationFailed {
                    operation,
                    message: err.to_string(),
                    payload: err.payload().map(str::to_string),
                });
                Err(err.into())
            }
        }
    }

    fn emit_settings(&mut self) {
        self.events.push_back(Event::SettingsUpdated {
            state: self.session.clone(),
        });
    }
}
