use std::collections::BTreeMap;
use std::time::Duration;

use super::types::{
    HistogramBucket, KeyWindowPoint, LatencySample, PercentilePoint, SummaryStats, TimeSeriesPoint,
};

/// Percentile markers reported on the latency curve.
pub const PERCENTILE_MARKERS: [f64; 8] = [10.0, 25.0, 50.0, 75.0, 90.0, 95.0, 99.0, 99.9];

/// Histogram bucket stride in milliseconds.
pub const HISTOGRAM_STRIDE_MS: u64 = 10;

/// Requests per key window unless the profile overrides it.
pub const DEFAULT_KEY_WINDOW: u64 = 1000;

fn to_ms(latency: Duration) -> f64 {
    latency.as_secs_f64() * 1000.0
}

/// Latencies of samples that completed without an error tag, in
/// milliseconds. Failed requests only contribute to the error mapping.
fn ok_latencies_ms(samples: &[LatencySample]) -> Vec<f64> {
    samples
        .iter()
        .filter(|sample| sample.error.is_none())
        .map(|sample| to_ms(sample.latency))
        .collect()
}

/// Wall time spanned by the sample set, to whole seconds.
#[must_use]
pub fn elapsed_from_samples(samples: &[LatencySample]) -> Duration {
    let Some(first) = samples.first() else {
        return Duration::ZERO;
    };
    let (min, max) = samples.iter().fold(
        (first.unix_second, first.unix_second),
        |(min, max), sample| (min.min(sample.unix_second), max.max(sample.unix_second)),
    );
    Duration::from_secs((max - min + 1).max(0) as u64)
}

/// Folds the sample set into a summary. Empty input is valid and yields
/// zeroed fields.
#[must_use]
pub fn summarize(samples: &[LatencySample], total: Duration) -> SummaryStats {
    let mut error_counts: BTreeMap<String, u64> = BTreeMap::new();
    for sample in samples {
        if let Some(kind) = sample.error.as_ref() {
            *error_counts.entry(kind.clone()).or_insert(0) += 1;
        }
    }

    let lats = ok_latencies_ms(samples);
    let (mut slowest, mut fastest, mut average, mut stddev) = (0.0_f64, 0.0_f64, 0.0_f64, 0.0_f64);
    if !lats.is_empty() {
        let count = lats.len() as f64;
        slowest = lats.iter().copied().fold(f64::MIN, f64::max);
        fastest = lats.iter().copied().fold(f64::MAX, f64::min);
        average = lats.iter().sum::<f64>() / count;
        let variance = lats
            .iter()
            .map(|lat| (lat - average) * (lat - average))
            .sum::<f64>()
            / count;
        stddev = variance.sqrt();
    }

    let total_seconds = total.as_secs_f64();
    let requests = samples.len() as u64;
    let requests_per_second = if total_seconds > 0.0 {
        requests as f64 / total_seconds
    } else {
        0.0
    };

    SummaryStats {
        total_seconds,
        requests,
        requests_per_second,
        slowest_ms: slowest,
        fastest_ms: fastest,
        average_ms: average,
        stddev_ms: stddev,
        error_counts,
    }
}

fn marker_label(marker: f64) -> String {
    let mut text = format!("{:.1}", marker);
    if let Some(stripped) = text.strip_suffix(".0") {
        text = stripped.to_owned();
    }
    format!("p{}", text)
}

/// Latency at each fixed percentile marker, nearest-rank over the
/// latency-ascending sort. Empty input yields an empty curve.
#[must_use]
pub fn percentile_curve(samples: &[LatencySample]) -> Vec<PercentilePoint> {
    let mut lats = ok_latencies_ms(samples);
    if lats.is_empty() {
        return Vec::new();
    }
    lats.sort_unstable_by(f64::total_cmp);
    let count = lats.len();

    PERCENTILE_MARKERS
        .iter()
        .map(|marker| {
            let rank = ((marker / 100.0) * count as f64).ceil() as usize;
            let index = rank.saturating_sub(1).min(count - 1);
            PercentilePoint {
                label: marker_label(*marker),
                latency_ms: lats[index],
            }
        })
        .collect()
}

/// Folds latencies into 10 ms buckets, truncating down to the bucket floor,
/// and emits every bucket from the observed minimum to maximum inclusive.
#[must_use]
pub fn histogram(samples: &[LatencySample]) -> Vec<HistogramBucket> {
    let mut counts: BTreeMap<u64, u64> = BTreeMap::new();
    for sample in samples.iter().filter(|sample| sample.error.is_none()) {
        let floor = (sample.latency.as_millis() as u64 / HISTOGRAM_STRIDE_MS) * HISTOGRAM_STRIDE_MS;
        *counts.entry(floor).or_insert(0) += 1;
    }
    let (Some(min), Some(max)) = (
        counts.keys().next().copied(),
        counts.keys().next_back().copied(),
    ) else {
        return Vec::new();
    };

    let mut buckets = Vec::new();
    let mut floor = min;
    loop {
        buckets.push(HistogramBucket {
            floor_ms: floor,
            count: counts.get(&floor).copied().unwrap_or(0),
        });
        if floor == max {
            break;
        }
        floor += HISTOGRAM_STRIDE_MS;
    }
    buckets
}

struct SecondAcc {
    count: u64,
    min: f64,
    max: f64,
    sum: f64,
}

/// Groups samples by completion second, ascending. `client_counts` maps a
/// second to the concurrent client count observed then; seconds absent from
/// the map fall back to `default_clients`.
#[must_use]
pub fn time_series(
    samples: &[LatencySample],
    client_counts: &BTreeMap<i64, u64>,
    default_clients: u64,
) -> Vec<TimeSeriesPoint> {
    let mut seconds: BTreeMap<i64, SecondAcc> = BTreeMap::new();
    for sample in samples.iter().filter(|sample| sample.error.is_none()) {
        let ms = to_ms(sample.latency);
        seconds
            .entry(sample.unix_second)
            .and_modify(|acc| {
                acc.count += 1;
                acc.min = acc.min.min(ms);
                acc.max = acc.max.max(ms);
                acc.sum += ms;
            })
            .or_insert(SecondAcc {
                count: 1,
                min: ms,
                max: ms,
                sum: ms,
            });
    }

    seconds
        .into_iter()
        .map(|(unix_second, acc)| TimeSeriesPoint {
            unix_second,
            client_count: client_counts
                .get(&unix_second)
                .copied()
                .unwrap_or(default_clients),
            min_latency_ms: acc.min,
            avg_latency_ms: acc.sum / acc.count as f64,
            max_latency_ms: acc.max,
            throughput: acc.count,
        })
        .collect()
}

#[derive(Default)]
struct WindowAcc {
    seconds: u64,
    min: f64,
    max: f64,
    avg_sum: f64,
}

impl WindowAcc {
    fn fold(&mut self, point: &TimeSeriesPoint) {
        if self.seconds == 0 {
            self.min = point.min_latency_ms;
            self.max = point.max_latency_ms;
        } else {
            self.min = self.min.min(point.min_latency_ms);
            self.max = self.max.max(point.max_latency_ms);
        }
        self.avg_sum += point.avg_latency_ms;
        self.seconds += 1;
    }

    fn close(&self, cumulative_keys: u64) -> KeyWindowPoint {
        KeyWindowPoint {
            cumulative_keys,
            min_latency_ms: self.min,
            avg_latency_ms: if self.seconds > 0 {
                self.avg_sum / self.seconds as f64
            } else {
                0.0
            },
            max_latency_ms: self.max,
        }
    }
}

/// Walks the per-second series in chronological order, closing a window at
/// each multiple of `window` completed requests. The trailing partial
/// window is discarded; only full windows count.
#[must_use]
pub fn key_window_series(series: &[TimeSeriesPoint], window: u64) -> Vec<KeyWindowPoint> {
    if window == 0 {
        return Vec::new();
    }
    // Input order is not trusted; sort by completion second first.
    let mut sorted: Vec<&TimeSeriesPoint> = series.iter().collect();
    sorted.sort_by_key(|point| point.unix_second);

    let mut out = Vec::new();
    let mut acc = WindowAcc::default();
    let mut cumulative = 0_u64;
    let mut boundary = window;
    for point in sorted {
        acc.fold(point);
        cumulative += point.throughput;
        while cumulative >= boundary {
            out.push(acc.close(boundary));
            boundary += window;
            acc = WindowAcc::default();
            if cumulative >= boundary {
                // A second spanning several boundaries is the only data
                // available for the windows it closes.
                acc.fold(point);
            }
        }
    }
    out
}
