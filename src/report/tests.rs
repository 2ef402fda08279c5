use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::{AppError, AppResult, StorageError};
use crate::metrics::{PercentilePoint, SummaryStats};

use super::*;

#[test]
fn summary_without_errors_renders_explicit_zero_row() -> AppResult<()> {
    let summary = SummaryStats::default();
    let table = summary_table(&summary)?;
    let csv = table.to_csv_horizontal();
    assert!(csv.contains("TOTAL-SECONDS,0.0000\n"));
    assert!(csv.contains("REQUESTS-PER-SECOND,0.0000\n"));
    assert!(csv.contains("ERROR,0\n"));
    Ok(())
}

#[test]
fn summary_renders_one_column_per_error_kind() -> AppResult<()> {
    let mut summary = SummaryStats::default();
    summary.error_counts.insert("timeout".to_owned(), 3);
    summary
        .error_counts
        .insert("connection refused".to_owned(), 1);
    let csv = summary_table(&summary)?.to_csv_horizontal();
    // Labels carry embedded quotes, so the CSV writer wraps and doubles them.
    assert!(csv.contains("\"ERROR: \"\"timeout\"\"\",3\n"));
    assert!(csv.contains("\"ERROR: \"\"connection refused\"\"\",1\n"));
    assert!(!csv.contains("ERROR,0"));
    Ok(())
}

#[test]
fn percentile_table_keeps_label_order() -> AppResult<()> {
    let curve = vec![
        PercentilePoint {
            label: "p50".to_owned(),
            latency_ms: 1.5,
        },
        PercentilePoint {
            label: "p99.9".to_owned(),
            latency_ms: 20.0,
        },
    ];
    let csv = percentile_table(&curve)?.to_csv();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("LATENCY-PERCENTILE,LATENCY-MS"));
    assert_eq!(lines.next(), Some("p50,1.500000"));
    assert_eq!(lines.next(), Some("p99.9,20.000000"));
    Ok(())
}

#[test]
fn table_rejects_duplicate_and_ragged_columns() {
    let mut table = DataTable::new();
    assert!(table.add_column("A", vec!["1".to_owned()]).is_ok());
    assert!(matches!(
        table.add_column("A", vec!["2".to_owned()]),
        Err(AppError::Sink(crate::error::SinkError::DuplicateColumn { .. }))
    ));
    assert!(matches!(
        table.add_column("B", vec!["1".to_owned(), "2".to_owned()]),
        Err(AppError::Sink(
            crate::error::SinkError::ColumnLengthMismatch { .. }
        ))
    ));
}

#[test]
fn csv_escapes_embedded_separators() -> AppResult<()> {
    let mut table = DataTable::new();
    table.add_column("NAME", vec!["a,b".to_owned()])?;
    assert_eq!(table.to_csv(), "NAME\n\"a,b\"\n");
    Ok(())
}

#[test]
fn datasize_table_reports_raw_and_humanized_sizes() -> AppResult<()> {
    let table = datasize_table(&["10.0.0.1:2379".to_owned()], &[1024])?;
    let csv = table.to_csv();
    assert!(csv.starts_with(
        "INDEX,DATABASE-ENDPOINT,TOTAL-DATA-SIZE,TOTAL-DATA-SIZE-BYTES-NUM\n"
    ));
    assert!(csv.contains("0,10.0.0.1:2379,"));
    assert!(csv.trim_end().ends_with(",1024"));
    Ok(())
}

struct FlakyStore {
    failures: AtomicU32,
    attempts: AtomicU32,
}

impl FlakyStore {
    fn failing(failures: u32) -> Self {
        Self {
            failures: AtomicU32::new(failures),
            attempts: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl ArtifactStore for FlakyStore {
    async fn upload(
        &self,
        _bucket: &str,
        _local_path: &Path,
        _remote_path: &str,
    ) -> Result<(), StorageError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failures.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
            left.checked_sub(1)
        })
        .is_ok()
        {
            return Err(StorageError::Transport {
                message: "bucket unavailable".to_owned(),
            });
        }
        Ok(())
    }
}

fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

#[tokio::test(start_paused = true)]
async fn upload_succeeding_on_final_attempt_is_a_success() -> AppResult<()> {
    let dir = tempfile::TempDir::new()?;
    let artifact = dir.path().join("report.csv");
    tokio::fs::write(&artifact, "data\n").await?;

    let store = FlakyStore::failing(UPLOAD_ATTEMPTS - 1);
    let (_tx, rx) = shutdown_channel();
    upload_with_retry(&store, "bench-bucket", &artifact, "run/report.csv", rx)
        .await
        .map_err(AppError::storage)?;
    assert_eq!(store.attempts.load(Ordering::SeqCst), UPLOAD_ATTEMPTS);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn upload_exhausting_every_attempt_surfaces_the_last_error() -> AppResult<()> {
    let dir = tempfile::TempDir::new()?;
    let artifact = dir.path().join("report.csv");
    tokio::fs::write(&artifact, "data\n").await?;

    let store = FlakyStore::failing(UPLOAD_ATTEMPTS);
    let (_tx, rx) = shutdown_channel();
    let result = upload_with_retry(&store, "bench-bucket", &artifact, "run/report.csv", rx).await;
    assert!(matches!(
        result,
        Err(StorageError::RetriesExhausted {
            attempts: UPLOAD_ATTEMPTS,
            ..
        })
    ));
    assert_eq!(store.attempts.load(Ordering::SeqCst), UPLOAD_ATTEMPTS);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn upload_is_cancellable_between_attempts() -> AppResult<()> {
    let dir = tempfile::TempDir::new()?;
    let artifact = dir.path().join("report.csv");
    tokio::fs::write(&artifact, "data\n").await?;

    let (tx, rx) = shutdown_channel();
    tx.send(true).map_err(|_| {
        AppError::storage(StorageError::Transport {
            message: "shutdown channel closed".to_owned(),
        })
    })?;
    let store = FlakyStore::failing(UPLOAD_ATTEMPTS);
    let result = upload_with_retry(&store, "bench-bucket", &artifact, "run/report.csv", rx).await;
    assert!(matches!(result, Err(StorageError::Cancelled)));
    assert_eq!(store.attempts.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn upload_of_missing_artifact_fails_without_attempting() -> AppResult<()> {
    let store = FlakyStore::failing(0);
    let (_tx, rx) = shutdown_channel();
    let result = upload_with_retry(
        &store,
        "bench-bucket",
        Path::new("/nonexistent/report.csv"),
        "run/report.csv",
        rx,
    )
    .await;
    assert!(matches!(result, Err(StorageError::MissingLocalFile { .. })));
    assert_eq!(store.attempts.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn client_report_writes_every_artifact() -> AppResult<()> {
    let dir = tempfile::TempDir::new()?;
    let summary = SummaryStats::default();
    let paths = write_client_report(dir.path(), &summary, &[], &[], &[], &[]).await?;
    for path in paths.all() {
        assert!(path.exists(), "missing artifact: {}", path.display());
    }
    let csv = tokio::fs::read_to_string(&paths.summary).await?;
    assert!(csv.contains("ERROR,0\n"));
    Ok(())
}
