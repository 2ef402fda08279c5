use std::path::Path;
use std::time::Duration;

use crate::error::{AppError, AppResult, MetricsError};

use super::types::LatencySample;

/// Reads a client sample log: one `unix_second,latency_ms[,error]` record
/// per line, an optional header line permitted.
///
/// # Errors
///
/// Returns an error when the file cannot be read or a record does not
/// parse.
pub async fn read_sample_log(path: &Path) -> AppResult<Vec<LatencySample>> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|source| {
        AppError::metrics(MetricsError::Io {
            context: "reading sample log",
            source,
        })
    })?;

    let mut samples = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if index == 0 && line.chars().next().is_some_and(|c| !c.is_ascii_digit()) {
            continue;
        }
        samples.push(parse_record(path, index + 1, line)?);
    }
    Ok(samples)
}

fn parse_record(path: &Path, line_number: usize, line: &str) -> AppResult<LatencySample> {
    let parse_err = |message: String| {
        AppError::metrics(MetricsError::ParseSample {
            path: path.to_path_buf(),
            line: line_number,
            message,
        })
    };

    let mut fields = line.splitn(3, ',');
    let unix_second: i64 = fields
        .next()
        .unwrap_or_default()
        .trim()
        .parse()
        .map_err(|err| parse_err(format!("invalid unix second: {}", err)))?;
    let latency_ms: f64 = fields
        .next()
        .ok_or_else(|| parse_err("missing latency field".to_owned()))?
        .trim()
        .parse()
        .map_err(|err| parse_err(format!("invalid latency: {}", err)))?;
    if !latency_ms.is_finite() || latency_ms < 0.0 {
        return Err(parse_err(format!("latency out of range: {}", latency_ms)));
    }
    let error = fields
        .next()
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_owned);

    Ok(LatencySample {
        unix_second,
        latency: Duration::from_secs_f64(latency_ms / 1000.0),
        error,
    })
}
