use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde_json::{Map, Value};
use shared::{
    error::PersistenceError,
    persistence::{PresetDocument, PresetMap, PresetPersistence, PRESETS_KEY},
};
use tracing::{debug, warn};

/// Preset persistence backed by a single JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonPresetFile {
    path: PathBuf,
}

impl JsonPresetFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole document, including variables unrelated to presets.
    pub fn read_document(&self) -> Result<PresetDocument, PersistenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                return Err(PersistenceError::Missing {
                    path: self.path.clone(),
                })
            }
            Err(source) => {
                return Err(PersistenceError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&raw).map_err(|source| PersistenceError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Replaces the document on disk.
    pub fn write_document(&self, document: &PresetDocument) -> Result<(), PersistenceError> {
        let value = serde_json::to_value(document).map_err(|source| self.encode_error(source))?;
        self.write_json(&value)
    }

    /// Top-level object of the file as untyped JSON, so a save can replace
    /// `presets` without judging anything else in the file. A missing file,
    /// or one whose top level is not a JSON object, yields an empty map.
    fn read_root(&self) -> Result<Map<String, Value>, PersistenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(PersistenceError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(root)) => Ok(root),
            Ok(_) => {
                warn!(path = %self.path.display(), "preset file is not a JSON object; replacing it");
                Ok(Map::new())
            }
            Err(error) => {
                warn!(path = %self.path.display(), %error, "preset file is not valid JSON; replacing it");
                Ok(Map::new())
            }
        }
    }

    /// The new content is written next to the target first so a crash
    /// mid-write never leaves a truncated file.
    fn write_json(&self, value: &Value) -> Result<(), PersistenceError> {
        let encoded =
            serde_json::to_string_pretty(value).map_err(|source| self.encode_error(source))?;

        ensure_parent_dir_exists(&self.path).map_err(|source| PersistenceError::Io {
            path: self.path.clone(),
            source,
        })?;

        let staging = staging_path(&self.path);
        fs::write(&staging, encoded)
            .and_then(|_| fs::rename(&staging, &self.path))
            .map_err(|source| PersistenceError::Io {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), "wrote preset file");
        Ok(())
    }

    fn encode_error(&self, source: serde_json::Error) -> PersistenceError {
        PersistenceError::Encode {
            path: self.path.clone(),
            source,
        }
    }
}

impl PresetPersistence for JsonPresetFile {
    fn load_all(&self) -> Result<PresetMap, PersistenceError> {
        Ok(self.read_document()?.presets)
    }

    fn save_all(&self, presets: &PresetMap) -> Result<(), PersistenceError> {
        let mut root = self.read_root()?;
        let encoded = serde_json::to_value(presets).map_err(|source| self.encode_error(source))?;
        root.insert(PRESETS_KEY.to_string(), encoded);
        self.write_json(&Value::Object(root))
    }
}

/// Resolves a preset file path, creating its parent directory when needed.
pub fn prepare_preset_path(raw_path: &str) -> anyhow::Result<PathBuf> {
    let raw_path = raw_path.trim();
    let path = if raw_path.is_empty() {
        PathBuf::from(DEFAULT_PRESET_PATH)
    } else {
        PathBuf::from(raw_path)
    };

    ensure_parent_dir_exists(&path).with_context(|| {
        format!(
            "failed to create parent directory for preset file '{}'",
            path.display()
        )
    })?;
    Ok(path)
}

pub const DEFAULT_PRESET_PATH: &str = "./data/presets.json";

fn ensure_parent_dir_exists(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
