use std::path::Path;

use crate::error::{AppError, AppResult, SinkError};

/// Ordered label → values mapping. Column order is part of the export
/// contract; downstream tooling matches on exact labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTable {
    columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Column {
    label: String,
    values: Vec<String>,
}

fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

impl DataTable {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Appends a column.
    ///
    /// # Errors
    ///
    /// Returns an error on a duplicate label, or when the column's length
    /// disagrees with the rows already in the table.
    pub fn add_column<L, V>(&mut self, label: L, values: V) -> AppResult<()>
    where
        L: Into<String>,
        V: Into<Vec<String>>,
    {
        let label = label.into();
        let values = values.into();
        if self.columns.iter().any(|column| column.label == label) {
            return Err(AppError::sink(SinkError::DuplicateColumn { label }));
        }
        if let Some(first) = self.columns.first() {
            if first.values.len() != values.len() {
                return Err(AppError::sink(SinkError::ColumnLengthMismatch {
                    label,
                    expected: first.values.len(),
                    actual: values.len(),
                }));
            }
        }
        self.columns.push(Column { label, values });
        Ok(())
    }

    /// Rows-as-records CSV: one header line of labels, then one line per
    /// row.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        if self.columns.is_empty() {
            return out;
        }
        let header: Vec<String> = self
            .columns
            .iter()
            .map(|column| escape_csv(&column.label))
            .collect();
        out.push_str(&header.join(","));
        out.push('\n');

        let rows = self.columns.first().map_or(0, |column| column.values.len());
        for row in 0..rows {
            let record: Vec<String> = self
                .columns
                .iter()
                .map(|column| escape_csv(column.values.get(row).map_or("", String::as_str)))
                .collect();
            out.push_str(&record.join(","));
            out.push('\n');
        }
        out
    }

    /// Transposed CSV: one line per column, label first. Used by the
    /// single-row summary so it reads as label/value pairs.
    #[must_use]
    pub fn to_csv_horizontal(&self) -> String {
        let mut out = String::new();
        for column in &self.columns {
            let mut record = vec![escape_csv(&column.label)];
            record.extend(column.values.iter().map(|value| escape_csv(value)));
            out.push_str(&record.join(","));
            out.push('\n');
        }
        out
    }

    /// Writes the rows-as-records CSV to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub async fn write_csv(&self, path: &Path) -> AppResult<()> {
        write_sink(path, self.to_csv()).await
    }

    /// Writes the transposed CSV to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub async fn write_csv_horizontal(&self, path: &Path) -> AppResult<()> {
        write_sink(path, self.to_csv_horizontal()).await
    }
}

async fn write_sink(path: &Path, contents: String) -> AppResult<()> {
    tokio::fs::write(path, contents).await.map_err(|source| {
        AppError::sink(SinkError::Io {
            context: "writing report table",
            source,
        })
    })
}
