use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use tokio::sync::{Mutex, oneshot, watch};
use tracing::{info, warn};

use crate::backend::{BackendSpec, RenderedLaunch, TemplateRegistry, template_registry};
use crate::error::{AgentError, AppError, AppResult};

use super::process::{AgentProcess, ExitKind, ExitReport, LifecycleState, supervise};

/// Drives a single database process through
/// `Idle → Preparing → Launching → Running → Stopping → {Stopped, Failed}`.
///
/// All state lives behind one async mutex, so each controller is internally
/// sequential: two start commands racing before the first reaches `Running`
/// resolve to an `AlreadyRunning` rejection for the loser, and the live
/// process is never disturbed.
pub struct LifecycleController {
    registry: Arc<TemplateRegistry>,
    log_path: PathBuf,
    inner: Mutex<ControllerInner>,
}

struct ControllerInner {
    state: LifecycleState,
    spec: Option<BackendSpec>,
    rendered: Option<RenderedLaunch>,
    binary: Option<PathBuf>,
    process: Option<AgentProcess>,
    last_exit: Option<ExitReport>,
}

impl LifecycleController {
    /// Controller using the builtin backend templates, writing process
    /// output to `log_path`.
    #[must_use]
    pub fn new(log_path: PathBuf) -> Self {
        Self::with_registry(Arc::new(template_registry().clone()), log_path)
    }

    #[must_use]
    pub fn with_registry(registry: Arc<TemplateRegistry>, log_path: PathBuf) -> Self {
        Self {
            registry,
            log_path,
            inner: Mutex::new(ControllerInner {
                state: LifecycleState::Idle,
                spec: None,
                rendered: None,
                binary: None,
                process: None,
                last_exit: None,
            }),
        }
    }

    pub async fn state(&self) -> LifecycleState {
        self.inner.lock().await.state
    }

    pub async fn last_exit(&self) -> Option<ExitReport> {
        self.inner.lock().await.last_exit
    }

    /// Pid and exact command line of the supervised process, for postmortem.
    pub async fn process_info(&self) -> Option<(u32, String)> {
        self.inner
            .lock()
            .await
            .process
            .as_ref()
            .map(|process| (process.pid, process.command_line.clone()))
    }

    /// Validates the backend binary, clears and recreates the data
    /// directory, writes the identity file and renders the config.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyRunning` when a start attempt is in flight or a
    /// process is live; any template or I/O failure transitions the
    /// controller to `Failed` and is returned with its cause.
    pub async fn prepare(&self, spec: BackendSpec) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        if !inner.state.accepts_prepare() {
            return Err(AppError::agent(AgentError::AlreadyRunning {
                state: inner.state,
            }));
        }
        inner.state = LifecycleState::Preparing;
        match prepare_steps(&self.registry, spec).await {
            Ok((spec, rendered, binary)) => {
                inner.spec = Some(spec);
                inner.rendered = Some(rendered);
                inner.binary = Some(binary);
                Ok(())
            }
            Err(err) => {
                inner.state = LifecycleState::Failed;
                Err(err)
            }
        }
    }

    /// Launches the prepared backend process and transitions to `Running`.
    ///
    /// Only valid from `Preparing`. The working directory, when the backend
    /// requires one, is passed explicitly to process creation; the ambient
    /// working directory of this process is never touched.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyRunning` when a process is live, `InvalidTransition`
    /// from any other non-`Preparing` state, and `LaunchFailure` (state
    /// `Failed`) when the OS rejects process creation.
    pub async fn launch(self: &Arc<Self>) -> AppResult<u32> {
        let mut inner = self.inner.lock().await;
        match inner.state {
            LifecycleState::Preparing => {}
            LifecycleState::Running | LifecycleState::Launching => {
                return Err(AppError::agent(AgentError::AlreadyRunning {
                    state: inner.state,
                }));
            }
            from => {
                return Err(AppError::agent(AgentError::InvalidTransition {
                    operation: "launch",
                    from,
                }));
            }
        }
        inner.state = LifecycleState::Launching;

        let (binary, rendered, spec) = match (
            inner.binary.clone(),
            inner.rendered.clone(),
            inner.spec.clone(),
        ) {
            (Some(binary), Some(rendered), Some(spec)) => (binary, rendered, spec),
            _ => {
                inner.state = LifecycleState::Failed;
                return Err(AppError::agent(AgentError::InvalidTransition {
                    operation: "launch",
                    from: LifecycleState::Preparing,
                }));
            }
        };

        let command_line = format!(
            "{} {}",
            binary.display(),
            rendered.launch_args.join(" ")
        );

        let log_file = match open_log_sink(&self.log_path) {
            Ok(file) => file,
            Err(err) => {
                inner.state = LifecycleState::Failed;
                return Err(err);
            }
        };
        let log_stderr = match log_file.try_clone() {
            Ok(file) => file,
            Err(source) => {
                inner.state = LifecycleState::Failed;
                return Err(AppError::agent(AgentError::Io {
                    context: "cloning database log sink",
                    source,
                }));
            }
        };

        let mut command = tokio::process::Command::new(&binary);
        command
            .args(&rendered.launch_args)
            .stdout(Stdio::from(log_file))
            .stderr(Stdio::from(log_stderr));
        if let Some(work_dir) = rendered.work_dir.as_ref() {
            command.current_dir(work_dir);
        }

        info!("Starting database process: {}", command_line);
        let child = match command.spawn() {
            Ok(child) => child,
            Err(source) => {
                inner.state = LifecycleState::Failed;
                return Err(AppError::agent(AgentError::Launch {
                    command: command_line,
                    source,
                }));
            }
        };
        let pid = child.id().unwrap_or_default();

        let (kill_tx, kill_rx) = oneshot::channel();
        let (exit_tx, exit_rx) = watch::channel(None);
        tokio::spawn(supervise(child, kill_rx, exit_tx, pid));
        self.spawn_exit_observer(exit_rx.clone());

        inner.process = Some(AgentProcess {
            pid,
            command_line,
            data_dir: spec.data_dir,
            work_dir: rendered.work_dir,
            log_path: self.log_path.clone(),
            kill_tx: Some(kill_tx),
            exit_rx,
        });
        inner.last_exit = None;
        inner.state = LifecycleState::Running;
        info!("Started database process (pid: {})", pid);
        Ok(pid)
    }

    /// Signals the supervised process to terminate and waits for its exit.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` when nothing is running and
    /// `SupervisorGone` when the supervisor vanished without reporting.
    pub async fn stop(&self) -> AppResult<ExitReport> {
        let mut exit_rx = {
            let mut inner = self.inner.lock().await;
            match inner.state {
                LifecycleState::Running | LifecycleState::Launching | LifecycleState::Stopping => {
                }
                from => {
                    return Err(AppError::agent(AgentError::InvalidTransition {
                        operation: "stop",
                        from,
                    }));
                }
            }
            let Some(process) = inner.process.as_mut() else {
                return Err(AppError::agent(AgentError::NoProcess));
            };
            if let Some(kill_tx) = process.kill_tx.take() {
                // A send failure means the supervisor already published an
                // exit; the watch below observes it either way.
                let _ = kill_tx.send(());
            }
            let exit_rx = process.exit_rx.clone();
            inner.state = LifecycleState::Stopping;
            exit_rx
        };

        let report = wait_for_exit(&mut exit_rx).await?;
        let mut inner = self.inner.lock().await;
        inner.state = LifecycleState::Stopped;
        inner.last_exit = Some(report);
        inner.process = None;
        Ok(report)
    }

    /// Waits for the supervised process to exit without requesting it.
    ///
    /// # Errors
    ///
    /// Returns `NoProcess` when nothing is running and no prior exit was
    /// recorded.
    pub async fn wait_exit(&self) -> AppResult<ExitReport> {
        let exit_rx = {
            let inner = self.inner.lock().await;
            match (&inner.process, inner.last_exit) {
                (Some(process), _) => process.exit_rx.clone(),
                (None, Some(report)) => return Ok(report),
                (None, None) => return Err(AppError::agent(AgentError::NoProcess)),
            }
        };
        let mut exit_rx = exit_rx;
        wait_for_exit(&mut exit_rx).await
    }

    /// Observes unexpected exits: a process death while `Running` is an
    /// anomaly, reported and transitioned to `Stopped` distinct from a
    /// requested stop.
    fn spawn_exit_observer(self: &Arc<Self>, mut exit_rx: watch::Receiver<Option<ExitReport>>) {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let Ok(report) = wait_for_exit(&mut exit_rx).await else {
                return;
            };
            let mut inner = controller.inner.lock().await;
            if inner.state == LifecycleState::Running && report.kind == ExitKind::Unexpected {
                let pid = inner.process.as_ref().map_or(0, |process| process.pid);
                warn!(
                    "{}",
                    AgentError::UnexpectedExit {
                        pid,
                        code: report.code,
                    }
                );
                inner.state = LifecycleState::Stopped;
                inner.last_exit = Some(report);
                inner.process = None;
            }
        });
    }
}

async fn wait_for_exit(
    exit_rx: &mut watch::Receiver<Option<ExitReport>>,
) -> AppResult<ExitReport> {
    let report = exit_rx
        .wait_for(Option::is_some)
        .await
        .map_err(|_| AppError::agent(AgentError::SupervisorGone))?;
    report.ok_or_else(|| AppError::agent(AgentError::SupervisorGone))
}

async fn prepare_steps(
    registry: &TemplateRegistry,
    spec: BackendSpec,
) -> AppResult<(BackendSpec, RenderedLaunch, PathBuf)> {
    let binary = resolve_binary(&spec.binary).await?;
    let rendered = registry.render(&spec).map_err(AppError::template)?;

    // Idempotent: prior data directory contents are discarded, never merged.
    match tokio::fs::remove_dir_all(&spec.data_dir).await {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(AppError::agent(AgentError::Io {
                context: "clearing data directory",
                source,
            }));
        }
    }
    tokio::fs::create_dir_all(&spec.data_dir)
        .await
        .map_err(|source| {
            AppError::agent(AgentError::Io {
                context: "creating data directory",
                source,
            })
        })?;

    if let Some(identity) = rendered.identity_file.as_ref() {
        info!(
            "Writing membership identity {:?} to {}",
            identity.contents,
            identity.path.display()
        );
        tokio::fs::write(&identity.path, &identity.contents)
            .await
            .map_err(|source| {
                AppError::agent(AgentError::Io {
                    context: "writing identity file",
                    source,
                })
            })?;
    }

    if !rendered.config_text.is_empty() {
        info!("Writing backend config to {}", spec.config_path.display());
        tokio::fs::write(&spec.config_path, &rendered.config_text)
            .await
            .map_err(|source| {
                AppError::agent(AgentError::Io {
                    context: "writing backend config",
                    source,
                })
            })?;
    }

    Ok((spec, rendered, binary))
}

/// Resolves the backend binary: paths with directories are checked as-is,
/// bare names are searched on `PATH`.
async fn resolve_binary(binary: &Path) -> AppResult<PathBuf> {
    let missing = || {
        AppError::agent(AgentError::MissingBinary {
            path: binary.to_path_buf(),
        })
    };
    if binary.components().count() > 1 {
        return match tokio::fs::metadata(binary).await {
            Ok(_) => Ok(binary.to_path_buf()),
            Err(_) => Err(missing()),
        };
    }
    if let Some(paths) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&paths) {
            let candidate = dir.join(binary);
            if tokio::fs::metadata(&candidate).await.is_ok() {
                return Ok(candidate);
            }
        }
    }
    Err(missing())
}

fn open_log_sink(log_path: &Path) -> AppResult<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|source| {
            AppError::agent(AgentError::Io {
                context: "opening database log sink",
                source,
            })
        })
}
