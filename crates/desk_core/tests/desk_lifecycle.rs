use std::{fs, time::Duration};

use desk_core::{shutdown, DeskConfig, DeskSession, DispatchLoop, IntervalTicks, TickSource};
use device_link::{DeviceLink, DryRunLink};
use shared::{
    domain::{ChannelIndex, PresetIndex},
    persistence::{PersistedSlot, PresetMap, PresetPersistence},
};
use storage::JsonPresetFile;

fn config() -> DeskConfig {
    DeskConfig {
        channel_count: 4,
        tick_interval: Duration::from_millis(50),
        ..DeskConfig::default()
    }
}

#[test]
fn shutdown_flushes_presets_and_releases_the_link() {
    let dir = tempfile::tempdir().expect("tempdir");
    let persistence = JsonPresetFile::new(dir.path().join("presets.json"));

    let mut session = DeskSession::restore(config(), &persistence);
    assert!(session.presets().is_empty());

    let mut link = DryRunLink::default();
    link.open().expect("open");
    let mut dispatch = DispatchLoop::new(link, session.config());

    session.set_channel_level(ChannelIndex(2), 180);
    session.edit_preset_entry("3");
    session.set_preset_name("stage left");
    session.save_preset().expect("save");
    dispatch.tick(&mut session);
    assert_eq!(dispatch.link().sends(), 4);

    shutdown(&session, dispatch, &persistence).expect("shutdown");

    let raw = fs::read_to_string(persistence.path()).expect("preset file");
    let document: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(
        document["presets"]["stage left"],
        serde_json::json!([3, [0, 180, 0, 0]])
    );
    assert!(document["presets"].get("0").is_none());

    let restored = DeskSession::restore(config(), &persistence);
    assert_eq!(restored.presets().len(), 4);
    assert_eq!(restored.presets().load(PresetIndex(3)).name, "stage left");
}

#[test]
fn restoring_and_committing_a_sparse_file_leaves_it_unchanged() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("presets.json");
    let persistence = JsonPresetFile::new(&path);

    let mut presets = PresetMap::new();
    presets.insert("look".into(), PersistedSlot(7, vec![1, 2, 0, 0]));
    persistence.save_all(&presets).expect("seed");
    let before = fs::read(&path).expect("read before");

    let session = DeskSession::restore(config(), &persistence);
    assert_eq!(session.presets().len(), 8);
    session.commit_presets(&persistence).expect("commit");

    assert_eq!(fs::read(&path).expect("read after"), before);
}

#[test]
fn corrupt_preset_file_starts_empty_and_is_replaced_on_commit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("presets.json");
    fs::write(&path, "not json at all").expect("write");
    let persistence = JsonPresetFile::new(&path);

    let mut session = DeskSession::restore(config(), &persistence);
    assert!(session.presets().is_empty());

    session.set_channel_level(ChannelIndex(1), 1);
    session.save_preset().expect("save");
    session.commit_presets(&persistence).expect("commit");

    let reloaded = DeskSession::restore(config(), &persistence);
    assert_eq!(reloaded.presets().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn interval_ticks_drive_dispatch() {
    let mut session = DeskSession::new(config());
    let mut link = DryRunLink::default();
    link.open().expect("open");
    let mut dispatch = DispatchLoop::new(link, session.config());
    let mut ticks = IntervalTicks::new(session.config().tick_interval);

    for step in 0..11u8 {
        ticks.next_tick().await;
        session.set_channel_level(ChannelIndex(1), step);
        dispatch.tick(&mut session);
    }

    // Eleven differing snapshots, four channels each.
    assert_eq!(dispatch.link().sends(), 44);
    // One reopen on top of the initial open.
    assert_eq!(dispatch.link().opens(), 2);
}
