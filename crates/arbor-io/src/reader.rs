//! CSV reader producing raw rows for tree induction.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use arbor_tree::{RawDataset, RawRow, RawValue};
use tracing::{debug, info, instrument};

use crate::IoError;

/// Reads a headered CSV file into a [`RawDataset`].
///
/// Expected CSV format:
/// - Header row required; every field names a column
/// - One record per data row; empty lines are skipped
/// - Rows shorter than the header read the trailing columns as empty,
///   fields beyond the header are ignored
///
/// Fields are trimmed. Empty fields become [`RawValue::Empty`], everything
/// else is kept as [`RawValue::Text`] and typed later during normalization.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::NoColumns`] | Empty file or blank header |
/// | [`IoError::DuplicateColumn`] | Two header fields share a name |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
pub struct CsvReader {
    path: PathBuf,
}

impl CsvReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read the CSV file, returning its header and rows.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<RawDataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true): ragged rows are padded or truncated below instead
        // of failing inside the parser.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.parse_error(e))?;
        let columns: Vec<String> = header.iter().map(String::from).collect();
        if columns.iter().all(String::is_empty) {
            return Err(IoError::NoColumns {
                path: self.path.clone(),
            });
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(IoError::DuplicateColumn {
                    path: self.path.clone(),
                    column: column.clone(),
                });
            }
        }
        debug!(n_columns = columns.len(), "read CSV header");

        let mut rows = Vec::new();
        let mut n_short = 0usize;
        let mut n_long = 0usize;
        for result in rdr.records() {
            let record = result.map_err(|e| self.parse_error(e))?;
            if record.len() < columns.len() {
                n_short += 1;
            } else if record.len() > columns.len() {
                n_long += 1;
            }

            let mut row = RawRow::new();
            for (i, column) in columns.iter().enumerate() {
                let value = match record.get(i) {
                    Some(field) if !field.is_empty() => RawValue::Text(field.to_string()),
                    _ => RawValue::Empty,
                };
                row.insert(column.clone(), value);
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        if n_short > 0 || n_long > 0 {
            debug!(n_short, n_long, "ragged rows normalized to header width");
        }

        info!(
            n_rows = rows.len(),
            n_columns = columns.len(),
            "CSV dataset loaded"
        );

        Ok(RawDataset::new(columns, rows))
    }

    fn parse_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}
