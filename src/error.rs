use std::path::PathBuf;

use thiserror::Error;

/// Failure taxonomy for the persistence layer.
///
/// Callers that want the original "fall back on any failure" behavior can
/// still collapse these, but a missing file, a corrupt file and an I/O
/// fault are distinguishable.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("corrupt data in {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported session format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("no usable filename in URL: {0}")]
    InvalidUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected HTTP status: {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not determine the per-user {0} directory")]
    MissingUserDir(&'static str),
}

impl StoreError {
    /// True for the "nothing saved yet" case, which every caller in the
    /// app treats as a quiet fallback rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
