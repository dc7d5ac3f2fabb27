//! Error types for event analysis.

use polars::prelude::PolarsError;
use storelens_data::DataError;
use storelens_metrics::MetricsError;
use thiserror::Error;

/// Result type for event analysis.
pub type Result<T> = std::result::Result<T, EventError>;

/// Errors that can occur while building event windows or impact tables.
#[derive(Debug, Error)]
pub enum EventError {
    /// The store has no metadata or no rows.
    #[error("Store not found: {0}")]
    StoreNotFound(i64),

    /// Unknown event kind
    #[error("Invalid event kind '{0}', expected competition or promo2")]
    InvalidKind(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Table operation error
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// Data layer error
    #[error(transparent)]
    Data(#[from] DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}
