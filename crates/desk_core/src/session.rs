use shared::{
    domain::{ChannelIndex, NavigateDirection, PresetIndex, SlotDisplay},
    error::PersistenceError,
    persistence::PresetPersistence,
};
use tracing::{debug, error, info, warn};

use crate::{
    blackout::BlackoutOverride,
    channel::ChannelState,
    config::DeskConfig,
    dispatch::DispatchSnapshot,
    grand_master::GrandMaster,
    mirror::NumericMirror,
    preset::{PresetError, PresetStore, PresetView},
};

/// The live editing state of the desk.
///
/// Input handlers mutate it between ticks; the dispatcher reads it on each
/// tick. Nothing here talks to the output link.
#[derive(Debug, Clone)]
pub struct DeskSession {
    config: DeskConfig,
    channels: Vec<ChannelState>,
    grand_master: GrandMaster,
    blackout: BlackoutOverride,
    presets: PresetStore,
    preset_entry: NumericMirror,
    preset_name: String,
}

impl DeskSession {
    pub fn new(config: DeskConfig) -> Self {
        let config = config.clamped();
        let presets = PresetStore::new(config.channel_count, config.preset_digits);
        Self::with_presets(config, presets)
    }

    /// `presets` should be built for the same channel count as `config`.
    pub fn with_presets(config: DeskConfig, presets: PresetStore) -> Self {
        let config = config.clamped();
        let channels = (0..config.channel_count)
            .map(|position| ChannelState::new(ChannelIndex::from_position(position)))
            .collect();
        let preset_entry = NumericMirror::new(config.preset_digits as usize, presets.cursor().0);
        let preset_name = presets.load(presets.cursor()).name;

        Self {
            config,
            channels,
            grand_master: GrandMaster::default(),
            blackout: BlackoutOverride::default(),
            presets,
            preset_entry,
            preset_name,
        }
    }

    /// Starts a session from persisted presets. A missing or unreadable
    /// preset file starts an empty bank instead of failing.
    pub fn restore(config: DeskConfig, persistence: &impl PresetPersistence) -> Self {
        let config = config.clamped();
        let presets = match persistence.load_all() {
            Ok(persisted) => {
                let store =
                    PresetStore::from_persisted(&persisted, config.channel_count, config.preset_digits);
                info!(slots = store.len(), "loaded presets");
                store
            }
            Err(error) => {
                if error.is_recoverable() {
                    warn!(%error, "starting with an empty preset bank");
                } else {
                    error!(%error, "cannot read presets; starting with an empty preset bank");
                }
                PresetStore::new(config.channel_count, config.preset_digits)
            }
        };
        Self::with_presets(config, presets)
    }

    /// Writes the preset bank through to persistence.
    pub fn commit_presets(
        &self,
        persistence: &impl PresetPersistence,
    ) -> Result<(), PersistenceError> {
        persistence.save_all(&self.presets.to_persisted())?;
        debug!(slots = self.presets.len(), "committed presets");
        Ok(())
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    pub fn channels(&self) -> &[ChannelState] {
        &self.channels
    }

    pub fn channel(&self, channel: ChannelIndex) -> Option<&ChannelState> {
        self.channels.get(channel.position()?)
    }

    fn channel_mut(&mut self, channel: ChannelIndex) -> Option<&mut ChannelState> {
        self.channels.get_mut(channel.position()?)
    }

    pub fn set_channel_level(&mut self, channel: ChannelIndex, level: u8) -> bool {
        match self.channel_mut(channel) {
            Some(state) => {
                state.set_level(level);
                true
            }
            None => false,
        }
    }

    pub fn edit_channel_text(&mut self, channel: ChannelIndex, input: &str) -> bool {
        self.channel_mut(channel)
            .is_some_and(|state| state.edit_text(input))
    }

    pub fn backspace_channel_text(&mut self, channel: ChannelIndex) -> bool {
        match self.channel_mut(channel) {
            Some(state) => {
                state.backspace_text();
                true
            }
            None => false,
        }
    }

    pub fn grand_master(&self) -> &GrandMaster {
        &self.grand_master
    }

    pub fn set_grand_master(&mut self, level: u8) {
        self.grand_master.set_level(level);
    }

    pub fn edit_grand_master_text(&mut self, input: &str) -> bool {
        self.grand_master.edit_text(input)
    }

    pub fn backspace_grand_master_text(&mut self) {
        self.grand_master.backspace_text();
    }

    pub fn blackout(&self) -> &BlackoutOverride {
        &self.blackout
    }

    pub(crate) fn blackout_mut(&mut self) -> &mut BlackoutOverride {
        &mut self.blackout
    }

    pub fn toggle_blackout(&mut self) -> bool {
        self.blackout.toggle()
    }

    pub fn set_blackout(&mut self, active: bool) {
        self.blackout.set_active(active);
    }

    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    pub fn preset_cursor(&self) -> PresetIndex {
        self.presets.cursor()
    }

    pub fn preset_entry_text(&self) -> &str {
        self.preset_entry.text()
    }

    pub fn preset_name(&self) -> &str {
        &self.preset_name
    }

    pub fn set_preset_name(&mut self, name: impl Into<String>) {
        self.preset_name = name.into();
    }

    pub fn navigate_presets(&mut self, direction: NavigateDirection) -> PresetIndex {
        let cursor = self.presets.navigate(direction);
        self.follow_cursor();
        cursor
    }

    /// Jumps to the index typed into the preset field.
    pub fn edit_preset_entry(&mut self, input: &str) -> Option<PresetIndex> {
        let value = self.preset_entry.edit(input)?;
        self.jump_to(value)
    }

    pub fn backspace_preset_entry(&mut self) -> Option<PresetIndex> {
        let value = self.preset_entry.backspace();
        self.jump_to(value)
    }

    fn jump_to(&mut self, value: u32) -> Option<PresetIndex> {
        if let Err(error) = self.presets.set_cursor(PresetIndex(value)) {
            warn!(%error, "ignoring preset index entry");
            self.preset_entry.show(self.presets.cursor().0);
            return None;
        }
        self.follow_cursor();
        Some(self.presets.cursor())
    }

    fn follow_cursor(&mut self) {
        let cursor = self.presets.cursor();
        self.preset_entry.show(cursor.0);
        self.preset_name = self.presets.load(cursor).name;
    }

    /// Stores the live raw levels and the name field under the cursor.
    pub fn save_preset(&mut self) -> Result<PresetIndex, PresetError> {
        let cursor = self.presets.cursor();
        let levels = self.raw_levels();
        self.presets
            .save(cursor, &levels, self.preset_name.clone())?;
        info!(index = %cursor, name = %self.preset_name, "saved preset");
        Ok(cursor)
    }

    /// Recalls the slot under the cursor into the live raw levels. The entry
    /// fields are brought in line by the next reconcile.
    pub fn load_preset(&mut self) -> PresetIndex {
        let cursor = self.presets.cursor();
        let view = self.presets.load(cursor);
        for (state, level) in self.channels.iter_mut().zip(view.levels.iter()) {
            state.restore_level(*level);
        }
        self.preset_name = view.name;
        info!(index = %cursor, "loaded preset");
        cursor
    }

    pub fn clear_preset(&mut self) -> PresetIndex {
        let cursor = self.presets.cursor();
        self.presets.clear(cursor);
        self.follow_cursor();
        cursor
    }

    pub fn copy_preset(&mut self, to: PresetIndex) -> Result<(), PresetError> {
        self.presets.copy(self.presets.cursor(), to)
    }

    /// The slot under the cursor, for the read-only preview bank.
    pub fn preset_preview(&self) -> PresetView {
        self.presets.load(self.presets.cursor())
    }

    pub fn preset_display(&self) -> SlotDisplay {
        self.presets.display(self.presets.cursor())
    }

    pub fn raw_levels(&self) -> Vec<u8> {
        self.channels.iter().map(ChannelState::raw_level).collect()
    }

    pub fn effective_levels(&self) -> Vec<u8> {
        self.channels
            .iter()
            .map(|state| self.grand_master.scale(state.raw_level()))
            .collect()
    }

    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot::new(self.effective_levels(), self.grand_master.level())
    }

    /// Corrects every numeric field to its live value. Returns how many were
    /// stale.
    pub fn reconcile_mirrors(&mut self) -> usize {
        let channels = self
            .channels
            .iter_mut()
            .map(ChannelState::reconcile)
            .filter(|corrected| *corrected)
            .count();
        channels + usize::from(self.grand_master.reconcile())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
