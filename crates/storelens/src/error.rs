//! Top-level error type.

use storelens_data::DataError;
use storelens_events::EventError;
use storelens_metrics::MetricsError;
use storelens_output::{ExportError, ReportError};
use thiserror::Error;

/// Result type for the storelens facade.
pub type Result<T> = std::result::Result<T, Error>;

/// Any error raised while loading, analysing or presenting the data.
#[derive(Debug, Error)]
pub enum Error {
    /// Loading failed
    #[error(transparent)]
    Data(#[from] DataError),

    /// Table operation failed
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// Event analysis failed
    #[error(transparent)]
    Events(#[from] EventError),

    /// Export failed
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Report generation failed
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Configuration file could not be read
    #[error("Config error: {0}")]
    Config(String),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
