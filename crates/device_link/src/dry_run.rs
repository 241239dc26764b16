use shared::domain::ChannelIndex;
use tracing::{debug, trace};

use crate::{DeviceLink, LinkError};

/// Link that only logs what would have been sent. Used when no interface is
/// attached.
#[derive(Debug, Default)]
pub struct DryRunLink {
    open: bool,
    sends: u64,
    opens: u64,
}

impl DryRunLink {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn sends(&self) -> u64 {
        self.sends
    }

    pub fn opens(&self) -> u64 {
        self.opens
    }
}

impl DeviceLink for DryRunLink {
    fn open(&mut self) -> Result<(), LinkError> {
        self.open = true;
        self.opens += 1;
        debug!(opens = self.opens, "dry-run link opened");
        Ok(())
    }

    fn send(&mut self, channel: ChannelIndex, value: u8) -> Result<(), LinkError> {
        if !self.open {
            return Err(LinkError::NotOpen);
        }
        self.sends += 1;
        trace!(%channel, value, "dry-run send");
        Ok(())
    }

    fn close(&mut self) -> Result<(), LinkError> {
        self.open = false;
        Ok(())
    }
}
