//! File I/O for the arbor pipeline: CSV ingestion and JSON result artifacts.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::ExperimentName;
pub use error::IoError;
pub use reader::CsvReader;
pub use writer::ResultWriter;
