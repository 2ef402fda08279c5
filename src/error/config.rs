use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read profile {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse profile: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },
    #[error("Unknown backend kind: {value:?}")]
    UnknownBackend { value: String },
    #[error("Profile declares no peers.")]
    NoPeers,
    #[error("Invalid {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}
