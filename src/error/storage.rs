use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Local artifact does not exist: {path}")]
    MissingLocalFile { path: PathBuf },
    #[error("Upload transport error: {message}")]
    Transport { message: String },
    #[error("Upload cancelled by shutdown.")]
    Cancelled,
    #[error("Upload failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<StorageError>,
    },
}
