use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Column already present in table: {label}")]
    DuplicateColumn { label: String },
    #[error("Column {label} has {actual} values, table rows have {expected}.")]
    ColumnLengthMismatch {
        label: String,
        expected: usize,
        actual: usize,
    },
    #[error("I/O error during {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}
