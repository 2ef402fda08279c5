use thiserror::Error;

use crate::backend::BackendKind;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("No template registered for backend {kind:?}.")]
    UnknownBackend { kind: String },
    #[error("Template already registered for backend {kind}.")]
    DuplicateTemplate { kind: BackendKind },
    #[error("Backend {kind} requires a non-empty peer list.")]
    NoPeers { kind: BackendKind },
    #[error("Member ordinal {ordinal} is out of range for {peers} peers.")]
    InvalidOrdinal { ordinal: u32, peers: usize },
    #[error("Backend {kind} requires the {field} field.")]
    MissingField {
        kind: BackendKind,
        field: &'static str,
    },
    #[error("Failed to render config for {kind}: {source}")]
    Render {
        kind: BackendKind,
        #[source]
        source: std::fmt::Error,
    },
}
