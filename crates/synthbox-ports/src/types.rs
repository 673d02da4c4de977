use serde::{Deserialize, Serialize};
use std::fmt;

/// MIDI Control Change number. Valid values are 1..=127.
pub type Cc = u8;

/// MIDI channel, 1-based. Valid values are 1..=16.
pub type Channel = u8;

pub const CC_MIN: Cc = 1;
pub const CC_MAX: Cc = 127;
pub const CHANNEL_MIN: Channel = 1;
pub const CHANNEL_MAX: Channel = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynthId(pub u32);

pub fn is_valid_cc(value: u32) -> bool {
    (CC_MIN as u32..=CC_MAX as u32).contains(&value)
}

pub fn is_valid_channel(value: Channel) -> bool {
    (CHANNEL_MIN..=CHANNEL_MAX).contains(&value)
}

impl fmt::Display for SynthId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SynthId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
