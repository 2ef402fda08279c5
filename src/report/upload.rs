use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::StorageError;

pub const UPLOAD_ATTEMPTS: u32 = 30;
pub const UPLOAD_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Remote artifact persistence. Implementations carry no retry logic of
/// their own; [`upload_with_retry`] owns the retry contract.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Uploads `local_path` into `bucket` under `remote_path`.
    ///
    /// # Errors
    ///
    /// Returns a transport-level error for a single failed attempt.
    async fn upload(
        &self,
        bucket: &str,
        local_path: &Path,
        remote_path: &str,
    ) -> Result<(), StorageError>;
}

/// Uploads an artifact, retrying up to [`UPLOAD_ATTEMPTS`] times with a
/// fixed [`UPLOAD_RETRY_DELAY`] between attempts. The delay is cancellable
/// through `shutdown` so an aborted run never leaks a sleeping task.
///
/// # Errors
///
/// Returns `MissingLocalFile` without attempting, `Cancelled` when shutdown
/// fires mid-wait, or `RetriesExhausted` wrapping the last attempt's error.
pub async fn upload_with_retry(
    store: &dyn ArtifactStore,
    bucket: &str,
    local_path: &Path,
    remote_path: &str,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), StorageError> {
    if tokio::fs::metadata(local_path).await.is_err() {
        return Err(StorageError::MissingLocalFile {
            path: local_path.to_path_buf(),
        });
    }
    if *shutdown.borrow() {
        return Err(StorageError::Cancelled);
    }

    let mut last_err: Option<StorageError> = None;
    for attempt in 1..=UPLOAD_ATTEMPTS {
        match store.upload(bucket, local_path, remote_path).await {
            Ok(()) => {
                if attempt > 1 {
                    info!(
                        "Upload of {} succeeded on attempt {}",
                        local_path.display(),
                        attempt
                    );
                }
                return Ok(());
            }
            Err(err) => {
                warn!(
                    "Upload attempt {}/{} for {} failed: {}",
                    attempt,
                    UPLOAD_ATTEMPTS,
                    local_path.display(),
                    err
                );
                last_err = Some(err);
            }
        }
        if attempt < UPLOAD_ATTEMPTS {
            wait_retry_delay(&mut shutdown).await?;
        }
    }

    Err(StorageError::RetriesExhausted {
        attempts: UPLOAD_ATTEMPTS,
        source: Box::new(last_err.unwrap_or(StorageError::Transport {
            message: "upload failed with no recorded cause".to_owned(),
        })),
    })
}

async fn wait_retry_delay(shutdown: &mut watch::Receiver<bool>) -> Result<(), StorageError> {
    let sleep = tokio::time::sleep(UPLOAD_RETRY_DELAY);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            () = &mut sleep => return Ok(()),
            changed = shutdown.changed() => match changed {
                Ok(()) if *shutdown.borrow() => return Err(StorageError::Cancelled),
                Ok(()) => {}
                Err(_) => {
                    // Shutdown sender is gone; finish the plain delay.
                    sleep.as_mut().await;
                    return Ok(());
                }
            }
        }
    }
}
