use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File is not executable: {}", path.display())]
    FileNotExecutable { path: PathBuf },

    #[error("Unsupported architecture: {machine}")]
    UnsupportedArchitecture { machine: String },

    #[error("Invalid offsets for {kind}: {input:?}")]
    InvalidOffsetFormat { kind: String, input: String },

    #[error("Invalid data type: {0}")]
    UnknownDataType(String),

    #[error("Failed to open {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to inspect binary: {0}")]
    Inspect(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Plan file error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Io(e) | Error::FileOpen { source: e, .. } => {
                e.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }

    /// Errors that are recovered by asking for a different file path
    pub fn requires_new_path(&self) -> bool {
        matches!(
            self,
            Error::FileNotExecutable { .. } | Error::UnsupportedArchitecture { .. }
        ) || self.is_not_found()
    }
}
