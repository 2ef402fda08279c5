use std::path::PathBuf;

use thiserror::Error;

use crate::agent::LifecycleState;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Required database binary does not exist: {path}")]
    MissingBinary { path: PathBuf },
    #[error("A database process is already supervised (state: {state}).")]
    AlreadyRunning { state: LifecycleState },
    #[error("Operation {operation} is not valid from state {from}.")]
    InvalidTransition {
        operation: &'static str,
        from: LifecycleState,
    },
    #[error("I/O error during {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to start database process {command}: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Database process {pid} exited unexpectedly (exit code: {code:?}).")]
    UnexpectedExit { pid: u32, code: Option<i32> },
    #[error("Process supervisor is gone before reporting an exit.")]
    SupervisorGone,
    #[error("No supervised process to wait for.")]
    NoProcess,
}
