use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// Top-level key under which presets are stored.
pub const PRESETS_KEY: &str = "presets";

/// One persisted preset: `[index, [level, level, ...]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSlot(pub u32, pub Vec<u8>);

impl PersistedSlot {
    pub fn index(&self) -> u32 {
        self.0
    }

    pub fn levels(&self) -> &[u8] {
        &self.1
    }
}

/// Presets keyed by name. Unnamed slots are keyed by their stringified index.
pub type PresetMap = BTreeMap<String, PersistedSlot>;

/// The whole persisted document. Variables stored by other parts of the
/// application sit next to `presets` and survive a round trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetDocument {
    #[serde(default)]
    pub presets: PresetMap,
    #[serde(flatten)]
    pub variables: serde_json::Map<String, serde_json::Value>,
}

pub trait PresetPersistence {
    fn load_all(&self) -> Result<PresetMap, PersistenceError>;
    fn save_all(&self, presets: &PresetMap) -> Result<(), PersistenceError>;
}

impl<T: PresetPersistence + ?Sized> PresetPersistence for &T {
    fn load_all(&self) -> Result<PresetMap, PersistenceError> {
        (**self).load_all()
    }

    fn save_all(&self, presets: &PresetMap) -> Result<(), PersistenceError> {
        (**self).save_all(presets)
    }
}

#[cfg(test)]
#[path = "tests/persistence_tests.rs"]
mod tests;
