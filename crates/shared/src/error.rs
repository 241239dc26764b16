use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("preset file '{}' does not exist", path.display())]
    Missing { path: PathBuf },
    #[error("failed to access preset file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("preset file '{}' is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode presets for '{}': {source}", path.display())]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl PersistenceError {
    /// Missing and malformed files are recovered from by starting empty.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Missing { .. } | Self::Malformed { .. })
    }
}
