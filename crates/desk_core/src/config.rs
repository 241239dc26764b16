use std::time::Duration;

use tracing::warn;

pub const DEFAULT_CHANNEL_COUNT: usize = 24;
pub const DEFAULT_PRESET_DIGITS: u32 = 5;
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(200);
pub const DEFAULT_RECONNECT_THRESHOLD: u32 = 10;

/// One DMX universe.
pub const MAX_CHANNELS: usize = 512;

/// Digit width of the channel and grand master entry fields.
pub const LEVEL_DIGITS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeskConfig {
    /// Number of output channels, addressed 1..=channel_count.
    pub channel_count: usize,
    /// Digit width of the preset index field; bounds the addressable slots.
    pub preset_digits: u32,
    pub tick_interval: Duration,
    /// The link is reopened on the tick after the counter exceeds this.
    pub reconnect_threshold: u32,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            channel_count: DEFAULT_CHANNEL_COUNT,
            preset_digits: DEFAULT_PRESET_DIGITS,
            tick_interval: DEFAULT_TICK_INTERVAL,
            reconnect_threshold: DEFAULT_RECONNECT_THRESHOLD,
        }
    }
}

impl DeskConfig {
    /// Highest preset index the index field can show: all nines.
    pub fn max_preset_index(&self) -> u32 {
        max_index_for_digits(self.preset_digits)
    }

    /// Caps `channel_count` at [`MAX_CHANNELS`].
    pub fn clamped(mut self) -> Self {
        if self.channel_count > MAX_CHANNELS {
            warn!(
                requested = self.channel_count,
                max = MAX_CHANNELS,
                "channel count capped"
            );
            self.channel_count = MAX_CHANNELS;
        }
        self
    }
}

pub fn max_index_for_digits(digits: u32) -> u32 {
    10u32.saturating_pow(digits.min(9)) - 1
}
