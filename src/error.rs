use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while normalizing a single document.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// An asset file referenced by the document could not be read for
    /// hashing. This fails the whole document run: no partial output is
    /// ever emitted for a document that hit a read failure.
    #[error("failed to read asset file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised by the batch driver around the per-document pipeline.
///
/// The driver catches these per site directory and moves on; only a failure
/// to scan the sites root itself ends the batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to scan sites root {path}: {source}")]
    ScanRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read document {path}: {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}
