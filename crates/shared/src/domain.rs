use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! index_newtype {
    ($name:ident, $repr:ty) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub $repr);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// Output channels are numbered from 1, matching the labels on the desk.
index_newtype!(ChannelIndex, u16);
// Preset slots are numbered from 0.
index_newtype!(PresetIndex, u32);

impl ChannelIndex {
    /// Channel number for a zero-based position in a channel bank. Banks
    /// hold fewer than `u16::MAX` channels.
    pub fn from_position(position: usize) -> Self {
        Self(position as u16 + 1)
    }

    /// Zero-based position of this channel in a channel bank. Channel 0
    /// does not exist.
    pub fn position(self) -> Option<usize> {
        usize::from(self.0).checked_sub(1)
    }
}

impl PresetIndex {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Integer floor of `raw * scale / 255`, the value a dimmer actually receives.
pub fn scale_level(raw: u8, scale: u8) -> u8 {
    (u16::from(raw) * u16::from(scale) / 255) as u8
}

/// Whether a preset slot renders as empty or populated on the desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotDisplay {
    Empty,
    Populated,
}

impl SlotDisplay {
    pub fn for_levels(levels: &[u8]) -> Self {
        if levels.iter().all(|level| *level == 0) {
            Self::Empty
        } else {
            Self::Populated
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigateDirection {
    Left,
    Right,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
