#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use synthbox_core::{SerialTransport, TransportConfig};
use synthbox_ports::{
    InMemoryCatalog, Parameter, SerialConnector, SerialError, SerialLink, SerialPortInfo,
    SynthDefinition, SynthId,
};

pub const MANUFACTURER: &str = "Teensyduino";

/// One chunk the fake device writes, `after` the previous chunk (or the request).
#[derive(Clone, Debug)]
pub struct Chunk {
    pub after: Duration,
    pub bytes: Vec<u8>,
}

impl Chunk {
    pub fn now(bytes: &[u8]) -> Self {
        Self::after(0, bytes)
    }

    pub fn after(ms: u64, bytes: &[u8]) -> Self {
        Self {
            after: Duration::from_millis(ms),
            bytes: bytes.to_vec(),
        }
    }
}

pub type Responder = Box<dyn FnMut(&[u8]) -> Vec<Chunk> + Send>;

#[derive(Default)]
pub struct DeviceState {
    pub requests: Vec<Vec<u8>>,
    pub fail_next_write: bool,
}

/// Scripted stand-in for the controller: every write is answered by the responder.
#[derive(Clone)]
pub struct FakeDevice {
    pub state: Arc<Mutex<DeviceState>>,
    responder: Arc<Mutex<Responder>>,
}

impl FakeDevice {
    pub fn new(responder: impl FnMut(&[u8]) -> Vec<Chunk> + Send + 'static) -> Self {
        Self {
            state: Arc::new(Mutex::new(DeviceState::default())),
            responder: Arc::new(Mutex::new(Box::new(responder))),
        }
    }

    pub fn requests(&self) -> Vec<Vec<u8>> {
        self.state.lock().requests.clone()
    }
}

struct FakeLink {
    device: FakeDevice,
    pending: VecDeque<(Instant, Vec<u8>)>,
}

impl SerialLink for FakeLink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        {
            let mut state = self.device.state.lock();
            if state.fail_next_write {
                state.fail_next_write = false;
                return Err(SerialError::Io("device unplugged".to_string()));
            }
            state.requests.push(bytes.to_vec());
        }
        let chunks = {
            let mut responder = self.device.responder.lock();
            (*responder)(bytes)
        };
        let mut at = Instant::now();
        for chunk in chunks {
            at += chunk.after;
            self.pending.push_back((at, chunk.bytes));
        }
        Ok(())
    }

    fn read_chunk(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, SerialError> {
        let now = Instant::now();
        let limit = now + timeout;
        match self.pending.front() {
            Some((at, _)) if *at <= limit => {
                std::thread::sleep(at.saturating_duration_since(now));
                let Some((at, mut bytes)) = self.pending.pop_front() else {
                    return Ok(0);
                };
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    self.pending.push_front((at, bytes.split_off(n)));
                }
                Ok(n)
            }
            _ => {
                std::thread::sleep(timeout);
                Ok(0)
            }
        }
    }

    fn discard_input(&mut self) -> Result<(), SerialError> {
        self.pending.clear();
        Ok(())
    }
}

pub struct FakeConnector {
    pub ports: Arc<Mutex<Vec<SerialPortInfo>>>,
    pub opens: Arc<AtomicUsize>,
    pub failing_opens: Arc<AtomicUsize>,
    device: FakeDevice,
}

impl FakeConnector {
    pub fn new(device: FakeDevice) -> Self {
        Self {
            ports: Arc::new(Mutex::new(vec![
                port("/dev/ttyS0", None),
                port("/dev/ttyACM0", Some(MANUFACTURER)),
            ])),
            opens: Arc::new(AtomicUsize::new(0)),
            failing_opens: Arc::new(AtomicUsize::new(0)),
            device,
        }
    }
}

impl SerialConnector for FakeConnector {
    fn list_ports(&self) -> Result<Vec<SerialPortInfo>, SerialError> {
        Ok(self.ports.lock().clone())
    }

    fn open(&self, port_name: &str, _baud_rate: u32) -> Result<Box<dyn SerialLink>, SerialError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing_opens.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_opens.store(failing - 1, Ordering::SeqCst);
            return Err(SerialError::Open(format!("{} busy", port_name)));
        }
        Ok(Box::new(FakeLink {
            device: self.device.clone(),
            pending: VecDeque::new(),
        }))
    }
}

pub fn port(name: &str, manufacturer: Option<&str>) -> SerialPortInfo {
    SerialPortInfo {
        name: name.to_string(),
        manufacturer: manufacturer.map(str::to_string),
    }
}

pub fn fast_config() -> TransportConfig {
    TransportConfig {
        manufacturer: MANUFACTURER.to_string(),
        baud_rate: 9600,
        idle_gap: Duration::from_millis(30),
        request_timeout: Duration::from_millis(400),
    }
}

pub struct Rig {
    pub transport: Arc<SerialTransport>,
    pub device: FakeDevice,
    pub ports: Arc<Mutex<Vec<SerialPortInfo>>>,
    pub opens: Arc<AtomicUsize>,
    pub failing_opens: Arc<AtomicUsize>,
}

pub fn rig(config: TransportConfig, device: FakeDevice) -> Rig {
    let connector = FakeConnector::new(device.clone());
    let ports = connector.ports.clone();
    let opens = connector.opens.clone();
    let failing_opens = connector.failing_opens.clone();
    Rig {
        transport: Arc::new(SerialTransport::new(Box::new(connector), config)),
        device,
        ports,
        opens,
        failing_opens,
    }
}

pub fn catalog() -> InMemoryCatalog {
    let synth = |id: u32, manufacturer: &str, title: &str, params: &[(u8, &str)]| SynthDefinition {
        id: SynthId(id),
        slug: title.to_lowercase(),
        manufacturer: manufacturer.to_string(),
        title: title.to_string(),
        subtitle: None,
        parameters: params
            .iter()
            .map(|(cc, name)| Parameter {
                cc: *cc,
                title: name.to_string(),
            })
            .collect(),
    };
    InMemoryCatalog::new(vec![
        synth(
            4,
            "Akai",
            "AX80",
            &[
                (78, "VCF Cutoff"),
                (65, "VCF Resonance"),
                (66, "VCF Env"),
                (67, "VCA Level"),
                (68, "Attack"),
                (69, "Decay"),
                (70, "Sustain"),
                (71, "Release"),
            ],
        ),
        synth(
            5,
            "Roland",
            "JU-06",
            &[
                (74, "Cutoff"),
                (1, "LFO Rate"),
                (3, "LFO Delay"),
                (5, "DCO Range"),
                (9, "PWM"),
                (11, "Sub"),
                (12, "Noise"),
                (13, "HPF"),
            ],
        ),
    ])
    .expect("fixture catalog is valid")
}
