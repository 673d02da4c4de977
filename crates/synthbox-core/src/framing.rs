use std::time::{Duration, Instant};

pub const DEFAULT_IDLE_GAP: Duration = Duration::from_millis(500);

/// Assembles a response from a delimiter-less byte stream.
///
/// The firmware writes one JSON document per request with no length prefix, so
/// a message ends when no bytes have arrived for `idle_gap`. A device that
/// stalls longer than the gap mid-message yields two frames; two messages sent
/// within the gap come out as one.
#[derive(Debug)]
pub struct IdleGapFramer {
    idle_gap: Duration,
    buffer: Vec<u8>,
    last_chunk_at: Option<Instant>,
}

impl IdleGapFramer {
    pub fn new(idle_gap: Duration) -> Self {
        Self {
            idle_gap,
            buffer: Vec::new(),
            last_chunk_at: None,
        }
    }

    pub fn push(&mut self, chunk: &[u8], at: Instant) {
        if chunk.is_empty() {
            return;
        }
        self.buffer.extend_from_slice(chunk);
        self.last_chunk_at = Some(at);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// When the current frame completes if nothing else arrives. `None` until the first byte.
    pub fn idle_deadline(&self) -> Option<Instant> {
        self.last_chunk_at.map(|at| at + self.idle_gap)
    }

    pub fn poll(&mut self, now: Instant) -> Option<Vec<u8>> {
        let deadline = self.idle_deadline()?;
        if now < deadline {
            return None;
        }
        self.last_chunk_at = None;
        Some(std::mem::take(&mut self.buffer))
    }
}
