use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

/// One client-observed request, tagged with its completion second.
/// Immutable; the pipeline folds samples, never mutates them.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencySample {
    pub unix_second: i64,
    pub latency: Duration,
    pub error: Option<String>,
}

impl LatencySample {
    #[must_use]
    pub const fn ok(unix_second: i64, latency: Duration) -> Self {
        Self {
            unix_second,
            latency,
            error: None,
        }
    }

    #[must_use]
    pub const fn failed(unix_second: i64, latency: Duration, error: String) -> Self {
        Self {
            unix_second,
            latency,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SummaryStats {
    pub total_seconds: f64,
    pub requests: u64,
    pub requests_per_second: f64,
    pub slowest_ms: f64,
    pub fastest_ms: f64,
    pub average_ms: f64,
    pub stddev_ms: f64,
    /// Error kind to occurrence count. Empty when every request succeeded;
    /// the tabular export still renders an explicit zero row for it.
    pub error_counts: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentilePoint {
    /// Marker label, e.g. `p50` or `p99.9`; whole markers carry no `.0`.
    pub label: String,
    pub latency_ms: f64,
}

/// 10 ms-wide latency bucket. Emitted runs are contiguous: gaps between the
/// observed minimum and maximum floors are filled with zero counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistogramBucket {
    pub floor_ms: u64,
    pub count: u64,
}

/// Aggregate of one observed second. Seconds with no samples are not
/// synthesized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub unix_second: i64,
    pub client_count: u64,
    pub min_latency_ms: f64,
    pub avg_latency_ms: f64,
    pub max_latency_ms: f64,
    pub throughput: u64,
}

/// Aggregate over a full window of completed requests, labeled by the
/// cumulative request count at the window's end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyWindowPoint {
    pub cumulative_keys: u64,
    pub min_latency_ms: f64,
    pub avg_latency_ms: f64,
    pub max_latency_ms: f64,
}
