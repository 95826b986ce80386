//! Error taxonomy for file opening, paging, filtering, and statistics.

use polars::prelude::PolarsError;
use std::path::PathBuf;

/// Errors surfaced by the library.
///
/// Open-time errors (`InvalidFile`, `UnsupportedCompression`) are fatal to the
/// open operation. The rest are recoverable: the caller clamps/drops the
/// offending request and keeps the session alive.
#[derive(Debug, thiserror::Error)]
pub enum ParqError {
    #[error("invalid Parquet file {path}: {reason}")]
    InvalidFile { path: PathBuf, reason: String },

    #[error("unsupported compression codec: {codec}")]
    UnsupportedCompression { codec: String },

    #[error("row range start {start} is past the end of the view ({total} rows)")]
    RangeOutOfBounds { start: usize, total: usize },

    #[error("filter operator {operator} cannot be applied to column '{column}' ({dtype})")]
    IncompatibleFilter {
        column: String,
        operator: String,
        dtype: String,
    },

    #[error("column '{column}' ({dtype}) is not numeric")]
    NotNumeric { column: String, dtype: String },

    #[error("cell bytes ({len} bytes) match no supported image format")]
    UnsupportedImageFormat { len: usize },

    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },

    #[error("uploaded data is {size} bytes, over the {limit} byte limit")]
    UploadTooLarge { size: u64, limit: u64 },

    #[error("no file is open")]
    NoFileOpen,

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ParqError>;
