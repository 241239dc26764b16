use std::cell::RefCell;

use shared::persistence::{PersistedSlot, PresetMap};

use super::*;
use crate::config::MAX_CHANNELS;

fn session(channel_count: usize) -> DeskSession {
    DeskSession::new(DeskConfig {
        channel_count,
        ..DeskConfig::default()
    })
}

#[derive(Default)]
struct MemoryPersistence {
    stored: RefCell<Option<PresetMap>>,
    malformed: bool,
}

impl PresetPersistence for MemoryPersistence {
    fn load_all(&self) -> Result<PresetMap, PersistenceError> {
        if self.malformed {
            let source = serde_json_error();
            return Err(PersistenceError::Malformed {
                path: "memory".into(),
                source,
            });
        }
        self.stored
            .borrow()
            .clone()
            .ok_or_else(|| PersistenceError::Missing {
                path: "memory".into(),
            })
    }

    fn save_all(&self, presets: &PresetMap) -> Result<(), PersistenceError> {
        *self.stored.borrow_mut() = Some(presets.clone());
        Ok(())
    }
}

fn serde_json_error() -> serde_json::Error {
    serde_json::from_str::<PresetMap>("{").expect_err("truncated json")
}

#[test]
fn channels_are_numbered_from_one() {
    let session = session(24);
    assert_eq!(session.channels().len(), 24);
    assert_eq!(session.channels()[0].index(), ChannelIndex(1));
    assert!(session.channel(ChannelIndex(24)).is_some());
    assert!(session.channel(ChannelIndex(25)).is_none());
    assert!(session.channel(ChannelIndex(0)).is_none());
}

#[test]
fn fader_and_field_stay_in_step() {
    let mut session = session(2);

    session.set_channel_level(ChannelIndex(1), 140);
    assert_eq!(session.channel(ChannelIndex(1)).expect("ch").mirror_text(), "140");

    assert!(session.edit_channel_text(ChannelIndex(1), "075"));
    let channel = session.channel(ChannelIndex(1)).expect("ch");
    assert_eq!(channel.raw_level(), 75);
    assert_eq!(channel.mirror_text(), "75");
}

#[test]
fn field_entry_above_full_is_clamped() {
    let mut session = session(1);
    assert!(session.edit_channel_text(ChannelIndex(1), "999"));

    let channel = session.channel(ChannelIndex(1)).expect("ch");
    assert_eq!(channel.raw_level(), 255);
    assert_eq!(channel.mirror_text(), "255");
}

#[test]
fn rejected_field_entry_leaves_level_alone() {
    let mut session = session(1);
    session.set_channel_level(ChannelIndex(1), 12);
    assert!(!session.edit_channel_text(ChannelIndex(1), "1x"));
    assert!(!session.edit_channel_text(ChannelIndex(9), "1"));
    assert_eq!(session.raw_levels(), vec![12]);
}

#[test]
fn backspacing_last_digit_sets_zero() {
    let mut session = session(1);
    session.set_channel_level(ChannelIndex(1), 7);
    assert!(session.backspace_channel_text(ChannelIndex(1)));

    let channel = session.channel(ChannelIndex(1)).expect("ch");
    assert_eq!(channel.mirror_text(), "0");
    assert_eq!(channel.raw_level(), 0);
}

#[test]
fn channel_count_is_capped_at_one_universe() {
    let session = session(70_000);
    assert_eq!(session.channels().len(), MAX_CHANNELS);
    assert_eq!(session.config().channel_count, MAX_CHANNELS);
    assert_eq!(session.presets().channel_count(), MAX_CHANNELS);
    let last = session.channels().last().expect("last channel");
    assert_eq!(last.index(), ChannelIndex(512));
}

#[test]
fn grand_master_defaults_to_full_and_mirrors() {
    let mut session = session(1);
    assert_eq!(session.grand_master().level(), 255);
    assert_eq!(session.grand_master().mirror_text(), "255");

    assert!(session.edit_grand_master_text("0128"));
    assert_eq!(session.grand_master().level(), 128);
    assert_eq!(session.grand_master().mirror_text(), "128");

    session.backspace_grand_master_text();
    assert_eq!(session.grand_master().level(), 12);
}

#[test]
fn effective_levels_apply_grand_master() {
    let mut session = session(3);
    session.set_channel_level(ChannelIndex(1), 200);
    session.set_channel_level(ChannelIndex(2), 255);
    session.set_grand_master(128);

    assert_eq!(session.effective_levels(), vec![100, 128, 0]);
    assert_eq!(session.snapshot().grand_master(), 128);
}

#[test]
fn navigation_keeps_index_field_and_name_in_step() {
    let mut session = session(2);
    session.set_preset_name("intro");
    session.set_channel_level(ChannelIndex(1), 40);
    session.save_preset().expect("save");

    assert_eq!(session.navigate_presets(NavigateDirection::Right), PresetIndex(1));
    assert_eq!(session.preset_entry_text(), "1");
    assert_eq!(session.preset_name(), "");
    assert_eq!(session.preset_display(), SlotDisplay::Empty);

    assert_eq!(session.navigate_presets(NavigateDirection::Left), PresetIndex(0));
    assert_eq!(session.preset_name(), "intro");
    assert_eq!(session.preset_display(), SlotDisplay::Populated);
    assert_eq!(session.preset_preview().levels, vec![40, 0]);
}

#[test]
fn typing_an_index_jumps_the_cursor() {
    let mut session = session(2);
    assert_eq!(session.edit_preset_entry("00042"), Some(PresetIndex(42)));
    assert_eq!(session.preset_entry_text(), "42");

    assert_eq!(session.backspace_preset_entry(), Some(PresetIndex(4)));
    assert_eq!(session.backspace_preset_entry(), Some(PresetIndex(0)));
    assert_eq!(session.preset_entry_text(), "0");

    assert_eq!(session.edit_preset_entry("4a"), None);
    assert_eq!(session.preset_cursor(), PresetIndex(0));
}

#[test]
fn save_at_far_index_backfills() {
    let mut session = session(2);
    session.edit_preset_entry("7");
    session.set_channel_level(ChannelIndex(2), 9);

    assert_eq!(session.save_preset(), Ok(PresetIndex(7)));
    assert_eq!(session.presets().len(), 8);
}

#[test]
fn load_preset_restores_levels_and_name() {
    let mut session = session(2);
    session.set_channel_level(ChannelIndex(1), 11);
    session.set_channel_level(ChannelIndex(2), 22);
    session.set_preset_name("look");
    session.save_preset().expect("save");

    session.set_channel_level(ChannelIndex(1), 0);
    session.set_channel_level(ChannelIndex(2), 0);
    session.set_preset_name("scratch");

    session.load_preset();
    assert_eq!(session.raw_levels(), vec![11, 22]);
    assert_eq!(session.preset_name(), "look");
}

#[test]
fn loading_an_unsaved_slot_darkens_the_desk() {
    let mut session = session(2);
    session.set_channel_level(ChannelIndex(1), 90);
    session.edit_preset_entry("5");

    session.load_preset();

    assert_eq!(session.raw_levels(), vec![0, 0]);
    assert!(session.presets().is_empty());
}

#[test]
fn clear_preset_empties_the_slot() {
    let mut session = session(1);
    session.set_channel_level(ChannelIndex(1), 1);
    session.set_preset_name("x");
    session.save_preset().expect("save");

    session.clear_preset();

    assert_eq!(session.preset_display(), SlotDisplay::Empty);
    assert_eq!(session.preset_name(), "");
}

#[test]
fn copy_preset_duplicates_the_cursor_slot() {
    let mut session = session(1);
    session.set_channel_level(ChannelIndex(1), 30);
    session.save_preset().expect("save");

    session.copy_preset(PresetIndex(2)).expect("copy");

    assert_eq!(session.presets().load(PresetIndex(2)).levels, vec![30]);
    assert_eq!(session.preset_cursor(), PresetIndex(0));
}

#[test]
fn restore_recovers_from_missing_and_malformed_files() {
    let missing = MemoryPersistence::default();
    assert!(DeskSession::restore(DeskConfig::default(), &missing)
        .presets()
        .is_empty());

    let malformed = MemoryPersistence {
        malformed: true,
        ..MemoryPersistence::default()
    };
    assert!(DeskSession::restore(DeskConfig::default(), &malformed)
        .presets()
        .is_empty());
}

#[test]
fn commit_then_restore_round_trips() {
    let persistence = MemoryPersistence::default();
    let config = DeskConfig {
        channel_count: 2,
        ..DeskConfig::default()
    };
    let mut session = DeskSession::new(config.clone());
    session.set_channel_level(ChannelIndex(1), 200);
    session.set_preset_name("front");
    session.save_preset().expect("save");
    session.commit_presets(&persistence).expect("commit");

    let restored = DeskSession::restore(config, &persistence);
    assert_eq!(restored.presets().load(PresetIndex(0)).name, "front");
    assert_eq!(restored.preset_name(), "front");

    let first = persistence.stored.borrow().clone();
    restored.commit_presets(&persistence).expect("recommit");
    assert_eq!(*persistence.stored.borrow(), first);

    let expected: PresetMap =
        [("front".to_string(), PersistedSlot(0, vec![200, 0]))].into_iter().collect();
    assert_eq!(first, Some(expected));
}

#[test]
fn reconcile_counts_stale_fields() {
    let mut session = session(3);
    session.set_preset_name("p");
    session.set_channel_level(ChannelIndex(1), 5);
    session.set_channel_level(ChannelIndex(3), 6);
    session.save_preset().expect("save");
    session.set_channel_level(ChannelIndex(1), 0);
    session.set_channel_level(ChannelIndex(3), 0);

    session.load_preset();

    assert_eq!(session.reconcile_mirrors(), 2);
    assert_eq!(session.reconcile_mirrors(), 0);
}
