use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NofsError {
    #[error("Device unavailable: {path}: {source}")]
    DeviceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl NofsError {
    pub fn unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        NofsError::DeviceUnavailable {
            path: path.into(),
            source,
        }
    }
}
