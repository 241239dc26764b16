use std::collections::{BTreeMap, BTreeSet};

use shared::{
    domain::{NavigateDirection, PresetIndex, SlotDisplay},
    persistence::{PersistedSlot, PresetMap},
};
use thiserror::Error;
use tracing::warn;

use crate::config::max_index_for_digits;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PresetError {
    #[error("preset index {index} is beyond the addressable maximum {max}")]
    IndexOutOfRange { index: u32, max: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetSlot {
    pub name: String,
    pub levels: Vec<u8>,
}

impl PresetSlot {
    pub fn empty(channel_count: usize) -> Self {
        Self {
            name: String::new(),
            levels: vec![0; channel_count],
        }
    }

    pub fn display(&self) -> SlotDisplay {
        SlotDisplay::for_levels(&self.levels)
    }

    /// No name and every level at zero: indistinguishable from a back-filled
    /// slot.
    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.display() == SlotDisplay::Empty
    }
}

/// What a preset read returns. Reads past the end yield an empty view.
pub type PresetView = PresetSlot;

/// Indexed preset bank with its own cursor.
///
/// Slots are kept dense from 0 to the highest saved index: saving past the
/// end back-fills the gap with empty slots.
#[derive(Debug, Clone)]
pub struct PresetStore {
    slots: Vec<PresetSlot>,
    cursor: PresetIndex,
    channel_count: usize,
    max_index: u32,
}

impl PresetStore {
    pub fn new(channel_count: usize, digits: u32) -> Self {
        Self {
            slots: Vec::new(),
            cursor: PresetIndex(0),
            channel_count,
            max_index: max_index_for_digits(digits),
        }
    }

    /// Builds the bank from its persisted form. A name equal to the slot's
    /// own index marks an unnamed slot.
    pub fn from_persisted(presets: &PresetMap, channel_count: usize, digits: u32) -> Self {
        let mut store = Self::new(channel_count, digits);
        let mut by_index: BTreeMap<u32, PresetSlot> = BTreeMap::new();

        for (key, slot) in presets {
            let index = slot.index();
            if index > store.max_index {
                warn!(index, max = store.max_index, preset = %key, "dropping persisted preset beyond addressable range");
                continue;
            }
            if slot.levels().len() != channel_count {
                warn!(
                    index,
                    stored = slot.levels().len(),
                    expected = channel_count,
                    "persisted preset has a different channel count; padding or truncating"
                );
            }

            let name = if *key == index.to_string() {
                String::new()
            } else {
                key.clone()
            };
            let mut levels = slot.levels().to_vec();
            levels.resize(channel_count, 0);

            if by_index.insert(index, PresetSlot { name, levels }).is_some() {
                warn!(index, preset = %key, "duplicate persisted preset index; keeping the last one");
            }
        }

        for (index, slot) in by_index {
            store.write_slot(index as usize, slot);
        }
        store
    }

    /// Persisted form keyed by name. Unnamed slots and name clashes fall back
    /// to the stringified index. Unnamed all-zero slots are left out; loading
    /// back-fills them again.
    pub fn to_persisted(&self) -> PresetMap {
        let mut presets = PresetMap::new();
        let stored: Vec<(usize, &PresetSlot)> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.is_blank())
            .collect();
        let unnamed_keys: BTreeSet<String> = stored
            .iter()
            .filter(|(_, slot)| slot.name.is_empty())
            .map(|(index, _)| index.to_string())
            .collect();

        for (index, slot) in stored {
            let index_key = index.to_string();
            let key = if slot.name.is_empty() {
                index_key
            } else if !presets.contains_key(&slot.name) && !unnamed_keys.contains(&slot.name) {
                slot.name.clone()
            } else if !presets.contains_key(&index_key) {
                warn!(index, name = %slot.name, "preset name already taken; storing under its index");
                index_key
            } else {
                format!("{}#{}", slot.name, index)
            };
            presets.insert(key, PersistedSlot(index as u32, slot.levels.clone()));
        }
        presets
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn max_index(&self) -> PresetIndex {
        PresetIndex(self.max_index)
    }

    pub fn cursor(&self) -> PresetIndex {
        self.cursor
    }

    pub fn slot(&self, index: PresetIndex) -> Option<&PresetSlot> {
        self.slots.get(index.as_usize())
    }

    pub fn set_cursor(&mut self, index: PresetIndex) -> Result<(), PresetError> {
        self.check(index)?;
        self.cursor = index;
        Ok(())
    }

    /// Moves the cursor. Left from 0 wraps to the last existing slot; right
    /// past the all-nines index wraps to 0.
    pub fn navigate(&mut self, direction: NavigateDirection) -> PresetIndex {
        self.cursor = match direction {
            NavigateDirection::Left if self.cursor.0 == 0 => {
                PresetIndex(self.slots.len().saturating_sub(1) as u32)
            }
            NavigateDirection::Left => PresetIndex(self.cursor.0 - 1),
            NavigateDirection::Right if self.cursor.0 >= self.max_index => PresetIndex(0),
            NavigateDirection::Right => PresetIndex(self.cursor.0 + 1),
        };
        self.cursor
    }

    pub fn save(
        &mut self,
        index: PresetIndex,
        levels: &[u8],
        name: impl Into<String>,
    ) -> Result<(), PresetError> {
        self.check(index)?;
        let mut levels = levels.to_vec();
        levels.resize(self.channel_count, 0);
        self.write_slot(
            index.as_usize(),
            PresetSlot {
                name: name.into(),
                levels,
            },
        );
        Ok(())
    }

    pub fn load(&self, index: PresetIndex) -> PresetView {
        self.slot(index)
            .cloned()
            .unwrap_or_else(|| PresetSlot::empty(self.channel_count))
    }

    /// Resets a slot to zero levels and no name. Past the end is a no-op.
    pub fn clear(&mut self, index: PresetIndex) {
        if let Some(slot) = self.slots.get_mut(index.as_usize()) {
            *slot = PresetSlot::empty(self.channel_count);
        }
    }

    pub fn copy(&mut self, from: PresetIndex, to: PresetIndex) -> Result<(), PresetError> {
        let source = self.load(from);
        self.save(to, &source.levels, source.name)
    }

    pub fn display(&self, index: PresetIndex) -> SlotDisplay {
        self.slot(index)
            .map(PresetSlot::display)
            .unwrap_or(SlotDisplay::Empty)
    }

    fn check(&self, index: PresetIndex) -> Result<(), PresetError> {
        if index.0 > self.max_index {
            return Err(PresetError::IndexOutOfRange {
                index: index.0,
                max: self.max_index,
            });
        }
        Ok(())
    }

    fn write_slot(&mut self, position: usize, slot: PresetSlot) {
        if position >= self.slots.len() {
            self.slots
                .resize(position + 1, PresetSlot::empty(self.channel_count));
        }
        self.slots[position] = slot;
    }
}

#[cfg(test)]
#[path = "tests/preset_tests.rs"]
mod tests;
