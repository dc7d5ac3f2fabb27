//! Error types for data loading.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading or reshaping source tables.
#[derive(Debug, Error)]
pub enum DataError {
    /// A source row could not be converted to its declared types.
    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse {
        /// 1-based line number in the source, header included
        line: u64,
        /// Column that failed to convert
        column: String,
        /// What went wrong
        message: String,
    },

    /// The same (store, date) key appears twice in the daily records.
    #[error("Duplicate daily record for store {store} on {date}")]
    DuplicateKey {
        /// Store id of the duplicated key
        store: i64,
        /// Date of the duplicated key
        date: NaiveDate,
    },

    /// The same store id appears twice in the store metadata.
    #[error("Duplicate metadata row for store {0}")]
    DuplicateStore(i64),

    /// A frame is missing a column the operation needs.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A day count could not be mapped onto the calendar.
    #[error("Invalid date value: {0}")]
    InvalidDate(String),

    /// CSV reader error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

impl DataError {
    /// Build a [`DataError::Parse`] for the given line and column.
    pub fn parse(line: u64, column: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            column: column.to_string(),
            message: message.into(),
        }
    }
}
