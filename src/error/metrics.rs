use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("I/O error during {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Sample log {path} line {line}: {message}")]
    ParseSample {
        path: PathBuf,
        line: usize,
        message: String,
    },
}
