use shared::domain::scale_level;

use crate::{channel::clamp_level, config::LEVEL_DIGITS, mirror::NumericMirror};

/// Global scale applied to every channel. Defaults to full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrandMaster {
    level: u8,
    mirror: NumericMirror,
}

impl Default for GrandMaster {
    fn default() -> Self {
        Self {
            level: u8::MAX,
            mirror: NumericMirror::new(LEVEL_DIGITS, u32::from(u8::MAX)),
        }
    }
}

impl GrandMaster {
    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn mirror_text(&self) -> &str {
        self.mirror.text()
    }

    pub fn set_level(&mut self, level: u8) {
        self.level = level;
        self.mirror.show(u32::from(level));
    }

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

    pub fn reconcile(&mut self) -> bool {
        self.mirror.show(u32::from(self.level))
    }

    /// Effective output for a raw channel level.
    pub fn scale(&self, raw_level: u8) -> u8 {
        scale_level(raw_level, self.level)
    }
}
