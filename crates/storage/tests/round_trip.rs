use std::fs;

use shared::persistence::PresetPersistence;
use storage::JsonPresetFile;

#[test]
fn saving_immediately_after_loading_leaves_file_unchanged() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("presets.json");
    let store = JsonPresetFile::new(&path);

    let mut presets = shared::persistence::PresetMap::new();
    presets.insert(
        "".into(),
        shared::persistence::PersistedSlot(4, vec![1, 2, 3]),
    );
    presets.insert(
        "chase".into(),
        shared::persistence::PersistedSlot(1, vec![9, 9, 9]),
    );
    store.save_all(&presets).expect("initial save");
    let before = fs::read_to_string(&path).expect("read before");

    let loaded = store.load_all().expect("load");
    store.save_all(&loaded).expect("resave");
    let after = fs::read_to_string(&path).expect("read after");

    assert_eq!(before, after);
}

#[test]
fn prepare_preset_path_creates_parent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("deep").join("presets.json");

    let prepared =
        storage::prepare_preset_path(target.to_string_lossy().as_ref()).expect("prepare");

    assert_eq!(prepared, target);
    assert!(dir.path().join("deep").is_dir());
}
