//! Report assembly: ordered column tables with the legacy export labels,
//! CSV serialization, and retried artifact upload.
mod frames;
mod table;
mod upload;
mod writer;

#[cfg(test)]
mod tests;

pub use frames::{
    datasize_table, histogram_table, key_window_table, percentile_table, summary_table,
    time_series_table,
};
pub use table::DataTable;
pub use upload::{ArtifactStore, UPLOAD_ATTEMPTS, UPLOAD_RETRY_DELAY, upload_with_retry};
pub use writer::{ReportPaths, write_client_report};
