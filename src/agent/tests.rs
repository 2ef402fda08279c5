use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use crate::backend::{
    BackendKind, BackendSpec, BackendTemplate, IdentityFile, PeerDescriptor, RenderedLaunch,
    TemplateRegistry,
};
use crate::error::{AgentError, AppError, AppResult, TemplateError};

use super::{ExitKind, LifecycleController, LifecycleState};

/// Template that launches `/bin/sh` so lifecycle tests drive a real child
/// process without a database installed.
struct ShellTemplate {
    script: &'static str,
}

impl BackendTemplate for ShellTemplate {
    fn kind(&self) -> BackendKind {
        BackendKind::Zookeeper
    }

    fn render(&self, spec: &BackendSpec) -> Result<RenderedLaunch, TemplateError> {
        Ok(RenderedLaunch {
            config_text: format!("script={}\n", self.script),
            launch_args: vec!["-c".to_owned(), self.script.to_owned()],
            work_dir: spec.work_dir.clone(),
            identity_file: Some(IdentityFile {
                path: spec.data_dir.join("member-id"),
                contents: format!("{}", spec.ordinal),
            }),
        })
    }
}

fn shell_registry(script: &'static str) -> AppResult<Arc<TemplateRegistry>> {
    let mut registry = TemplateRegistry::empty();
    registry
        .register(ShellTemplate { script })
        .map_err(AppError::template)?;
    Ok(Arc::new(registry))
}

fn shell_spec(dir: &TempDir) -> BackendSpec {
    BackendSpec {
        kind: BackendKind::Zookeeper,
        ordinal: 1,
        binary: PathBuf::from("/bin/sh"),
        data_dir: dir.path().join("data"),
        config_path: dir.path().join("backend.conf"),
        work_dir: Some(dir.path().to_path_buf()),
        client_port: 2181,
        peer_port: 2888,
        peers: PeerDescriptor::from_hosts(&["localhost".to_owned()]),
        tick_time_ms: 2000,
        init_limit: 5,
        sync_limit: 5,
        snapshot_count: 10_000,
        max_client_connections: 60,
        election_timeout_ms: 1000,
        heartbeat_interval_ms: 100,
        cluster_token: "test".to_owned(),
    }
}

fn controller(dir: &TempDir, script: &'static str) -> AppResult<Arc<LifecycleController>> {
    Ok(Arc::new(LifecycleController::with_registry(
        shell_registry(script)?,
        dir.path().join("database.log"),
    )))
}

async fn wait_for_state(
    controller: &LifecycleController,
    expected: LifecycleState,
) -> AppResult<()> {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if controller.state().await == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .map_err(|_| {
        AppError::agent(AgentError::InvalidTransition {
            operation: "wait_for_state",
            from: LifecycleState::Idle,
        })
    })
}

#[tokio::test]
async fn prepare_fails_with_missing_binary() -> AppResult<()> {
    let dir = TempDir::new()?;
    let controller = controller(&dir, "sleep 30")?;
    let mut spec = shell_spec(&dir);
    spec.binary = PathBuf::from("/nonexistent/database-server");

    let result = controller.prepare(spec).await;
    assert!(matches!(
        result,
        Err(AppError::Agent(AgentError::MissingBinary { ref path }))
            if path == &PathBuf::from("/nonexistent/database-server")
    ));
    assert_eq!(controller.state().await, LifecycleState::Failed);
    Ok(())
}

#[tokio::test]
async fn prepare_is_idempotent() -> AppResult<()> {
    let dir = TempDir::new()?;
    let controller = controller(&dir, "sleep 30")?;
    let spec = shell_spec(&dir);

    controller.prepare(spec.clone()).await?;
    let first_config = tokio::fs::read_to_string(&spec.config_path).await?;

    // Stray state from a previous run must be discarded, not merged.
    tokio::fs::write(spec.data_dir.join("stale.db"), b"junk").await?;

    controller.prepare(spec.clone()).await?;
    let second_config = tokio::fs::read_to_string(&spec.config_path).await?;
    assert_eq!(first_config, second_config);
    assert!(!spec.data_dir.join("stale.db").exists());

    let identity = tokio::fs::read_to_string(spec.data_dir.join("member-id")).await?;
    assert_eq!(identity, "1");
    assert_eq!(controller.state().await, LifecycleState::Preparing);
    Ok(())
}

#[tokio::test]
async fn launch_then_stop_reports_requested_exit() -> AppResult<()> {
    let dir = TempDir::new()?;
    let controller = controller(&dir, "sleep 30")?;
    controller.prepare(shell_spec(&dir)).await?;

    let pid = controller.launch().await?;
    assert!(pid > 0);
    assert_eq!(controller.state().await, LifecycleState::Running);

    let report = controller.stop().await?;
    assert_eq!(report.kind, ExitKind::Requested);
    assert_eq!(controller.state().await, LifecycleState::Stopped);
    Ok(())
}

#[tokio::test]
async fn prepare_while_running_is_rejected_and_process_survives() -> AppResult<()> {
    let dir = TempDir::new()?;
    let controller = controller(&dir, "sleep 30")?;
    controller.prepare(shell_spec(&dir)).await?;
    controller.launch().await?;
    let before = controller.process_info().await;

    let result = controller.prepare(shell_spec(&dir)).await;
    assert!(matches!(
        result,
        Err(AppError::Agent(AgentError::AlreadyRunning {
            state: LifecycleState::Running
        }))
    ));
    assert_eq!(controller.state().await, LifecycleState::Running);
    assert_eq!(controller.process_info().await, before);

    controller.stop().await?;
    Ok(())
}

#[tokio::test]
async fn unexpected_exit_is_observed_as_anomaly() -> AppResult<()> {
    let dir = TempDir::new()?;
    let controller = controller(&dir, "exit 7")?;
    controller.prepare(shell_spec(&dir)).await?;
    controller.launch().await?;

    let report = controller.wait_exit().await?;
    assert_eq!(report.kind, ExitKind::Unexpected);
    assert_eq!(report.code, Some(7));

    wait_for_state(&controller, LifecycleState::Stopped).await?;
    assert_eq!(controller.last_exit().await, Some(report));
    Ok(())
}

#[tokio::test]
async fn restart_after_stop_is_allowed() -> AppResult<()> {
    let dir = TempDir::new()?;
    let controller = controller(&dir, "sleep 30")?;
    controller.prepare(shell_spec(&dir)).await?;
    controller.launch().await?;
    controller.stop().await?;

    controller.prepare(shell_spec(&dir)).await?;
    let pid = controller.launch().await?;
    assert!(pid > 0);
    controller.stop().await?;
    Ok(())
}

#[tokio::test]
async fn launch_without_prepare_is_invalid() -> AppResult<()> {
    let dir = TempDir::new()?;
    let controller = controller(&dir, "sleep 30")?;
    let result = controller.launch().await;
    assert!(matches!(
        result,
        Err(AppError::Agent(AgentError::InvalidTransition {
            operation: "launch",
            from: LifecycleState::Idle
        }))
    ));
    Ok(())
}

#[tokio::test]
async fn stop_without_process_is_invalid() -> AppResult<()> {
    let dir = TempDir::new()?;
    let controller = controller(&dir, "sleep 30")?;
    let result = controller.stop().await;
    assert!(matches!(
        result,
        Err(AppError::Agent(AgentError::InvalidTransition {
            operation: "stop",
            from: LifecycleState::Idle
        }))
    ));
    Ok(())
}

#[tokio::test]
async fn child_output_lands_in_log_sink() -> AppResult<()> {
    let dir = TempDir::new()?;
    let controller = controller(&dir, "echo ready; exit 0")?;
    controller.prepare(shell_spec(&dir)).await?;
    controller.launch().await?;
    controller.wait_exit().await?;

    let log = tokio::fs::read_to_string(dir.path().join("database.log")).await?;
    assert!(log.contains("ready"));
    Ok(())
}
