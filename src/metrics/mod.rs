//! Batch aggregation of client-observed latency samples.
//!
//! Every transform here is a pure fold over a finite, fully collected
//! sample set: aggregation never starts before all contributing agents'
//! streams are in. Failed requests contribute to the summary's error
//! mapping; the latency curves fold the successful samples.
mod samples;
mod stats;
mod types;


pub use samples::read_sample_log;
pub use stats::{
    DEFAULT_KEY_WINDOW, HISTOGRAM_STRIDE_MS, PERCENTILE_MARKERS, elapsed_from_samples, histogram,
    key_window_series, percentile_curve, summarize, time_series,
};
pub use types::{
    HistogramBucket, KeyWindowPoint, LatencySample, PercentilePoint, SummaryStats, TimeSeriesPoint,
};
