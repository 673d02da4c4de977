use crate::framing::IdleGapFramer;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use synthbox_ports::serial::{SerialConnector, SerialError, SerialLink, SerialPortInfo};
use synthbox_ports::storage::AppConfigDto;

const READ_CHUNK_SIZE: usize = 1024;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("device not found: no serial port from manufacturer '{0}'")]
    DeviceNotFound(String),
    #[error("serial error: {0}")]
    Serial(#[from] SerialError),
    #[error("timed out after {waited_ms} ms ({received} bytes received)")]
    Timeout { waited_ms: u64, received: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportConfig {
    pub manufacturer: String,
    pub baud_rate: u32,
    pub idle_gap: Duration,
    pub request_timeout: Duration,
}

impl TransportConfig {
    pub fn from_app_config(config: &AppConfigDto) -> Self {
        Self {
            manufacturer: config.serial_manufacturer.clone(),
            baud_rate: config.baud_rate,
            idle_gap: Duration::from_millis(config.idle_gap_ms),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::from_app_config(&AppConfigDto::default())
    }
}

/// The connection is opened on first use and kept until an I/O error, after
/// which the next request runs discovery again. The lock around the link is
/// held for a whole transaction, so concurrent callers queue up and each one
/// reads only its own response.
pub struct SerialTransport {
    connector: Box<dyn SerialConnector>,
    config: TransportConfig,
    link: Mutex<Option<Box<dyn SerialLink>>>,
}

impl SerialTransport {
    pub fn new(connector: Box<dyn SerialConnector>, config: TransportConfig) -> Self {
        Self {
            connector,
            config,
            link: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.link.lock().is_some()
    }

    pub fn disconnect(&self) {
        if self.link.lock().take().is_some() {
            info!("serial connection closed");
        }
    }

    pub fn list_ports(&self) -> Result<Vec<SerialPortInfo>, TransportError> {
        Ok(self.connector.list_ports()?)
    }

    pub fn send_and_await(&self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        let mut slot = self.link.lock();
        let mut link = match slot.take() {
            Some(link) => link,
            None => self.connect()?,
        };

        match self.transact(&mut *link, request) {
            Ok(frame) => {
                *slot = Some(link);
                Ok(frame)
            }
            Err(err @ TransportError::Timeout { .. }) => {
                warn!("serial request {}", err);
                *slot = Some(link);
                Err(err)
            }
            Err(err) => {
                warn!("dropping serial connection: {}", err);
                Err(err)
            }
        }
    }

    fn connect(&self) -> Result<Box<dyn SerialLink>, TransportError> {
        let ports = self.connector.list_ports()?;
        debug!("discovered {} serial ports", ports.len());
        let port = ports
            .into_iter()
            .find(|port| port.manufacturer.as_deref() == Some(self.config.manufacturer.as_str()))
            .ok_or_else(|| TransportError::DeviceNotFound(self.config.manufacturer.clone()))?;

        info!("opening {} at {} baud", port.name, self.config.baud_rate);
        let link = self.connector.open(&port.name, self.config.baud_rate)?;
        Ok(link)
    }

    fn transact(&self, link: &mut dyn SerialLink, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        link.discard_input()?;
        link.write_all(request)?;
        debug!("sent {} bytes", request.len());

        let started = Instant::now();
        let deadline = started + self.config.request_timeout;
        let mut framer = IdleGapFramer::new(self.config.idle_gap);
        let mut buf = [0u8; READ_CHUNK_SIZE];

        loop {
            let now = Instant::now();
            if let Some(frame) = framer.poll(now) {
                debug!(
                    "received {} bytes in {} ms",
                    frame.len(),
                    now.duration_since(started).as_millis()
                );
                return Ok(frame);
            }
            if now >= deadline {
                return Err(TransportError::Timeout {
                    waited_ms: now.duration_since(started).as_millis() as u64,
                    received: framer.len(),
                });
            }

            let wake_at = framer
                .idle_deadline()
                .map_or(deadline, |idle| idle.min(deadline));
            let read = link.read_chunk(&mut buf, wake_at.saturating_duration_since(now))?;
            if read > 0 {
                framer.push(&buf[..read], Instant::now());
            }
        }
    }
}
