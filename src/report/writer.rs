use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{AppResult, SinkError};
use crate::metrics::{
    HistogramBucket, KeyWindowPoint, PercentilePoint, SummaryStats, TimeSeriesPoint,
};

use super::frames;

/// File names of the client-side report artifacts within an output
/// directory.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub summary: PathBuf,
    pub summary_json: PathBuf,
    pub percentiles: PathBuf,
    pub histogram: PathBuf,
    pub time_series: PathBuf,
    pub key_windows: PathBuf,
}

impl ReportPaths {
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            summary: dir.join("client-latency-summary.csv"),
            summary_json: dir.join("client-latency-summary.json"),
            percentiles: dir.join("client-latency-percentile.csv"),
            histogram: dir.join("client-latency-histogram.csv"),
            time_series: dir.join("client-latency-throughput-timeseries.csv"),
            key_windows: dir.join("client-latency-by-keys.csv"),
        }
    }

    #[must_use]
    pub fn all(&self) -> [&Path; 6] {
        [
            &self.summary,
            &self.summary_json,
            &self.percentiles,
            &self.histogram,
            &self.time_series,
            &self.key_windows,
        ]
    }
}

/// Writes the full client report set into `dir`.
///
/// # Errors
///
/// Returns an error when a table cannot be assembled or written.
pub async fn write_client_report(
    dir: &Path,
    summary: &SummaryStats,
    curve: &[PercentilePoint],
    buckets: &[HistogramBucket],
    series: &[TimeSeriesPoint],
    windows: &[KeyWindowPoint],
) -> AppResult<ReportPaths> {
    tokio::fs::create_dir_all(dir).await.map_err(|source| {
        crate::error::AppError::sink(SinkError::Io {
            context: "creating report directory",
            source,
        })
    })?;
    let paths = ReportPaths::in_dir(dir);

    frames::summary_table(summary)?
        .write_csv_horizontal(&paths.summary)
        .await?;
    let summary_json = serde_json::to_string_pretty(summary)?;
    tokio::fs::write(&paths.summary_json, summary_json)
        .await
        .map_err(|source| {
            crate::error::AppError::sink(SinkError::Io {
                context: "writing summary json",
                source,
            })
        })?;
    frames::percentile_table(curve)?
        .write_csv(&paths.percentiles)
        .await?;
    frames::histogram_table(buckets)?
        .write_csv(&paths.histogram)
        .await?;
    frames::time_series_table(series)?
        .write_csv(&paths.time_series)
        .await?;
    frames::key_window_table(windows)?
        .write_csv(&paths.key_windows)
        .await?;

    info!("Wrote client report to {}", dir.display());
    Ok(paths)
}
