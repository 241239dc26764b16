use shared::domain::ChannelIndex;

use crate::{config::LEVEL_DIGITS, mirror::NumericMirror};

/// One output channel: the fader level plus the numeric field mirroring it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelState {
    index: ChannelIndex,
    raw_level: u8,
    mirror: NumericMirror,
}

impl ChannelState {
    pub fn new(index: ChannelIndex) -> Self {
        Self {
            index,
            raw_level: 0,
            mirror: NumericMirror::new(LEVEL_DIGITS, 0),
        }
    }

    pub fn index(&self) -> ChannelIndex {
        self.index
    }

    pub fn raw_level(&self) -> u8 {
        self.raw_level
    }

    pub fn mirror_text(&self) -> &str {
        self.mirror.text()
    }

    /// Fader moved: the field follows immediately.
    pub fn set_level(&mut self, level: u8) {
        self.raw_level = level;
        self.mirror.show(u32::from(level));
    }

    /// Field edited: the fader follows, and the field is corrected to the
    /// clamped level. Returns false if the edit was rejected.
    pub fn edit_text(&mut self, input: &str) -> bool {
        match self.mirror.edit(input) {
            Some(value) => {
                self.set_level(clamp_level(value));
                true
            }
            None => false,
        }
    }

    pub fn backspace_text(&mut self) {
        let value = self.mirror.backspace();
        self.set_level(clamp_level(value));
    }

    /// Level changed without a field edit (preset recall). The field catches
    /// up on the next reconcile.
    pub fn restore_level(&mut self, level: u8) {
        self.raw_level = level;
    }

    /// Corrects the field to the live level. Returns true if it was stale.
    pub fn reconcile(&mut self) -> bool {
        self.mirror.show(u32::from(self.raw_level))
    }
}

pub(crate) fn clamp_level(value: u32) -> u8 {
    value.min(u32::from(u8::MAX)) as u8
}
