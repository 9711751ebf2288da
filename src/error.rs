//! Error types for the projection engine.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while loading records or preparing a projection.
///
/// Malformed records surface as [`EngineError::InvalidRecord`] but are
/// logged and skipped by the loader; only caller-level mistakes abort.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// A raw record could not be turned into a typed record
    #[error("Invalid record {id}: {message}")]
    InvalidRecord { id: String, message: String },

    /// Window start is not strictly before its end
    #[error("Invalid window: start {start} must be before end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    /// Date argument not in `YYYY-MM-DD` form
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Amount argument is not a number
    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),

    /// Unknown report name
    #[error("Unknown report '{0}', expected one of: monthly, balance, clusters")]
    UnknownReport(String),

    /// Missing positional arguments
    #[error(
        "Missing arguments. Usage: cashflow-projection <records.csv> <start> <end> [opening-balance] [monthly|balance|clusters]"
    )]
    MissingArgument,
}
