use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SerialError {
    #[error("port not found: {0}")]
    PortNotFound(String),
    #[error("open failed: {0}")]
    Open(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("backend error: {0}")]
    Backend(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialPortInfo {
    pub name: String,
    pub manufacturer: Option<String>,
}

pub trait SerialLink: Send {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError>;

    /// Reads whatever arrives within `timeout`. `Ok(0)` means nothing arrived.
    fn read_chunk(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, SerialError>;

    fn discard_input(&mut self) -> Result<(), SerialError>;
}

pub trait SerialConnector: Send + Sync {
    fn list_ports(&self) -> Result<Vec<SerialPortInfo>, SerialError>;

    fn open(&self, port_name: &str, baud_rate: u32) -> Result<Box<dyn SerialLink>, SerialError>;
}
