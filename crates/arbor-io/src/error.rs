//! I/O error types for arbor-io.

use std::path::PathBuf;

/// Errors raised while loading a table or writing induction artifacts.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// The input table could not be opened.
    #[error("cannot open {path}")]
    FileNotFound {
        /// Input path as given.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A record could not be decoded as CSV.
    #[error("malformed CSV in {path} near byte {offset}")]
    CsvParse {
        /// Input path as given.
        path: PathBuf,
        /// Byte position reported by the parser, 0 if unknown.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// The file has no header row.
    #[error("no columns in {path}: a header row is required")]
    NoColumns {
        /// Input path as given.
        path: PathBuf,
    },

    /// Two header fields carry the same name.
    #[error("duplicate column \"{column}\" in {path}")]
    DuplicateColumn {
        /// Input path as given.
        path: PathBuf,
        /// The repeated column name.
        column: String,
    },

    /// The header is followed by no records.
    #[error("{path} has a header but no records")]
    EmptyDataset {
        /// Input path as given.
        path: PathBuf,
    },

    /// Experiment names become file prefixes and are restricted to `[a-zA-Z0-9_-]+`.
    #[error("experiment name \"{name}\" is not [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The rejected name.
        name: String,
    },

    /// The output directory could not be created.
    #[error("cannot create {path}")]
    OutputDirCreate {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An artifact could not be rendered as JSON.
    #[error("cannot serialize {path}")]
    Serialize {
        /// Artifact destination.
        path: PathBuf,
        /// Underlying serde_json error.
        source: serde_json::Error,
    },

    /// An artifact could not be written to disk.
    #[error("cannot write {path}")]
    WriteFile {
        /// Artifact destination.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
