use log::debug;
use serialport::{ClearBuffer, SerialPort, SerialPortType};
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;
use synthbox_ports::serial::{SerialConnector, SerialError, SerialLink, SerialPortInfo};

const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);

#[derive(Default)]
pub struct SerialportConnector;

impl SerialportConnector {
    pub fn new() -> Self {
        Self
    }

    fn to_port_info(port: serialport::SerialPortInfo) -> SerialPortInfo {
        let manufacturer = match port.port_type {
            SerialPortType::UsbPort(usb) => usb.manufacturer,
            _ => None,
        };
        SerialPortInfo {
            name: port.port_name,
            manufacturer,
        }
    }
}

impl SerialConnector for SerialportConnector {
    fn list_ports(&self) -> Result<Vec<SerialPortInfo>, SerialError> {
        let ports = serialport::available_ports().map_err(|e| SerialError::Backend(e.to_string()))?;
        Ok(ports.into_iter().map(Self::to_port_info).collect())
    }

    fn open(&self, port_name: &str, baud_rate: u32) -> Result<Box<dyn SerialLink>, SerialError> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(MIN_READ_TIMEOUT)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => SerialError::PortNotFound(port_name.to_string()),
                _ => SerialError::Open(format!("{}: {}", port_name, e)),
            })?;
        debug!("opened {} at {} baud", port_name, baud_rate);
        Ok(Box::new(SerialportLink { port }))
    }
}

pub struct SerialportLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink for SerialportLink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        self.port
            .write_all(bytes)
            .and_then(|_| self.port.flush())
            .map_err(|e| SerialError::Io(e.to_string()))
    }

    fn read_chunk(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, SerialError> {
        self.port
            .set_timeout(timeout.max(MIN_READ_TIMEOUT))
            .map_err(|e| SerialError::Backend(e.to_string()))?;
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(SerialError::Io(e.to_string())),
        }
    }

    fn discard_input(&mut self) -> Result<(), SerialError> {
        self.port
            .clear(ClearBuffer::Input)
            .map_err(|e| SerialError::Io(e.to_string()))
    }
}
