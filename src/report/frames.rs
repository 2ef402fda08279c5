use human_repr::HumanCount as _;

use crate::error::AppResult;
use crate::metrics::{
    HistogramBucket, KeyWindowPoint, PercentilePoint, SummaryStats, TimeSeriesPoint,
};

use super::table::DataTable;

/// Builds the latency distribution summary. Serialized horizontally so each
/// label/value pair is one line. An empty error mapping still renders as an
/// explicit `ERROR,0` row.
pub fn summary_table(summary: &SummaryStats) -> AppResult<DataTable> {
    let mut table = DataTable::new();
    table.add_column("TOTAL-SECONDS", vec![format!("{:.4}", summary.total_seconds)])?;
    table.add_column(
        "REQUESTS-PER-SECOND",
        vec![format!("{:.4}", summary.requests_per_second)],
    )?;
    table.add_column("SLOWEST-LATENCY-MS", vec![format!("{:.4}", summary.slowest_ms)])?;
    table.add_column("FASTEST-LATENCY-MS", vec![format!("{:.4}", summary.fastest_ms)])?;
    table.add_column("AVERAGE-LATENCY-MS", vec![format!("{:.4}", summary.average_ms)])?;
    table.add_column("STDDEV-LATENCY-MS", vec![format!("{:.4}", summary.stddev_ms)])?;
    if summary.error_counts.is_empty() {
        table.add_column("ERROR", vec!["0".to_owned()])?;
    } else {
        for (kind, count) in &summary.error_counts {
            table.add_column(format!("ERROR: {:?}", kind), vec![count.to_string()])?;
        }
    }
    Ok(table)
}

pub fn percentile_table(curve: &[PercentilePoint]) -> AppResult<DataTable> {
    let mut table = DataTable::new();
    table.add_column(
        "LATENCY-PERCENTILE",
        curve
            .iter()
            .map(|point| point.label.clone())
            .collect::<Vec<String>>(),
    )?;
    table.add_column(
        "LATENCY-MS",
        curve
            .iter()
            .map(|point| format!("{:.6}", point.latency_ms))
            .collect::<Vec<String>>(),
    )?;
    Ok(table)
}

pub fn histogram_table(buckets: &[HistogramBucket]) -> AppResult<DataTable> {
    let mut table = DataTable::new();
    table.add_column(
        "LATENCY-MS",
        buckets
            .iter()
            .map(|bucket| bucket.floor_ms.to_string())
            .collect::<Vec<String>>(),
    )?;
    table.add_column(
        "COUNT",
        buckets
            .iter()
            .map(|bucket| bucket.count.to_string())
            .collect::<Vec<String>>(),
    )?;
    Ok(table)
}

pub fn time_series_table(series: &[TimeSeriesPoint]) -> AppResult<DataTable> {
    let mut table = DataTable::new();
    table.add_column(
        "UNIX-SECOND",
        series
            .iter()
            .map(|point| point.unix_second.to_string())
            .collect::<Vec<String>>(),
    )?;
    table.add_column(
        "CONTROL-CLIENT-NUM",
        series
            .iter()
            .map(|point| point.client_count.to_string())
            .collect::<Vec<String>>(),
    )?;
    table.add_column(
        "MIN-LATENCY-MS",
        series
            .iter()
            .map(|point| format!("{:.6}", point.min_latency_ms))
            .collect::<Vec<String>>(),
    )?;
    table.add_column(
        "AVG-LATENCY-MS",
        series
            .iter()
            .map(|point| format!("{:.6}", point.avg_latency_ms))
            .collect::<Vec<String>>(),
    )?;
    table.add_column(
        "MAX-LATENCY-MS",
        series
            .iter()
            .map(|point| format!("{:.6}", point.max_latency_ms))
            .collect::<Vec<String>>(),
    )?;
    table.add_column(
        "AVG-THROUGHPUT",
        series
            .iter()
            .map(|point| point.throughput.to_string())
            .collect::<Vec<String>>(),
    )?;
    Ok(table)
}

pub fn key_window_table(windows: &[KeyWindowPoint]) -> AppResult<DataTable> {
    let mut table = DataTable::new();
    table.add_column(
        "KEYS",
        windows
            .iter()
            .map(|window| window.cumulative_keys.to_string())
            .collect::<Vec<String>>(),
    )?;
    table.add_column(
        "MIN-LATENCY-MS",
        windows
            .iter()
            .map(|window| format!("{:.6}", window.min_latency_ms))
            .collect::<Vec<String>>(),
    )?;
    table.add_column(
        "AVG-LATENCY-MS",
        windows
            .iter()
            .map(|window| format!("{:.6}", window.avg_latency_ms))
            .collect::<Vec<String>>(),
    )?;
    table.add_column(
        "MAX-LATENCY-MS",
        windows
            .iter()
            .map(|window| format!("{:.6}", window.max_latency_ms))
            .collect::<Vec<String>>(),
    )?;
    Ok(table)
}

/// On-disk data size per database endpoint, humanized and raw.
pub fn datasize_table(endpoints: &[String], sizes_bytes: &[u64]) -> AppResult<DataTable> {
    let rows = endpoints.len().min(sizes_bytes.len());
    let mut table = DataTable::new();
    table.add_column(
        "INDEX",
        (0..rows).map(|index| index.to_string()).collect::<Vec<String>>(),
    )?;
    table.add_column("DATABASE-ENDPOINT", endpoints[..rows].to_vec())?;
    table.add_column(
        "TOTAL-DATA-SIZE",
        sizes_bytes[..rows]
            .iter()
            .map(|size| size.human_count_bytes().to_string())
            .collect::<Vec<String>>(),
    )?;
    table.add_column(
        "TOTAL-DATA-SIZE-BYTES-NUM",
        sizes_bytes[..rows]
            .iter()
            .map(|size| size.to_string())
            .collect::<Vec<String>>(),
    )?;
    Ok(table)
}
