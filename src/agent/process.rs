use std::path::PathBuf;

use tokio::process::Child;
use tokio::sync::{oneshot, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Preparing,
    Launching,
    Running,
    Stopping,
    Stopped,
    Failed,
}

impl LifecycleState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Preparing => "preparing",
            Self::Launching => "launching",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    /// Whether a new start attempt may begin from this state. `Preparing`
    /// accepts another prepare: the step is idempotent and redoing it only
    /// rewrites the same on-disk state. Anything with a live or launching
    /// process refuses.
    #[must_use]
    pub const fn accepts_prepare(self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Preparing | Self::Stopped | Self::Failed
        )
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the process exit was requested by [`stop`] or observed while
/// the controller still believed the process to be running.
///
/// [`stop`]: super::LifecycleController::stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    Requested,
    Unexpected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    pub kind: ExitKind,
    pub code: Option<i32>,
}

/// The one OS process an agent supervises. Created on launch, dropped once
/// the process exits or is force-stopped.
#[derive(Debug)]
pub struct AgentProcess {
    pub pid: u32,
    pub command_line: String,
    pub data_dir: PathBuf,
    pub work_dir: Option<PathBuf>,
    pub log_path: PathBuf,
    pub(super) kill_tx: Option<oneshot::Sender<()>>,
    pub(super) exit_rx: watch::Receiver<Option<ExitReport>>,
}

/// Owns the child until it exits. The exit outcome is published on the
/// watch channel; a message on `kill_rx` requests termination. A dropped
/// `kill_rx` sender also terminates the child so an abandoned controller
/// never leaks a database process.
pub(super) async fn supervise(
    mut child: Child,
    kill_rx: oneshot::Receiver<()>,
    exit_tx: watch::Sender<Option<ExitReport>>,
    pid: u32,
) {
    let mut kill_rx = kill_rx;
    let report = tokio::select! {
        status = child.wait() => ExitReport {
            kind: ExitKind::Unexpected,
            code: status.ok().and_then(|status| status.code()),
        },
        _ = &mut kill_rx => {
            if let Err(err) = child.start_kill() {
                tracing::warn!("Failed to signal database process {}: {}", pid, err);
            }
            let status = child.wait().await;
            ExitReport {
                kind: ExitKind::Requested,
                code: status.ok().and_then(|status| status.code()),
            }
        }
    };
    tracing::info!(
        "Database process {} exited ({}, code: {:?})",
        pid,
        match report.kind {
            ExitKind::Requested => "requested",
            ExitKind::Unexpected => "unexpected",
        },
        report.code
    );
    if exit_tx.send(Some(report)).is_err() {
        tracing::debug!("No listener for exit of database process {}", pid);
    }
}
