use polars::error::PolarsError;
use thiserror::Error;

/// Structural errors that abort a validation run before any table is produced.
///
/// Per-record geometric anomalies (unsupported geometry types, zero-area or
/// self-intersecting shapes) are never reported here; they surface in the
/// diagnostic tables instead.
#[derive(Debug, Error)]
pub enum ParcelError {
    /// A required column is absent from the input table.
    #[error("required column '{column}' is missing from the input")]
    MissingColumn { column: String },

    /// A required value is null.
    #[error("column '{column}' is null at row {row}")]
    NullValue { column: String, row: usize },

    /// Parallel per-record vectors do not line up with the attribute table.
    #[error("{what} has {found} entries, expected {expected}")]
    LengthMismatch { what: &'static str, expected: usize, found: usize },

    /// Building or slicing a table failed.
    #[error(transparent)]
    Frame(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, ParcelError>;
