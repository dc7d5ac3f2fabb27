//! Error types for table operations.

use polars::prelude::PolarsError;
use storelens_data::DataError;
use thiserror::Error;

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors that can occur while joining, deriving or ranking.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Daily records reference stores that have no metadata row.
    #[error("{} store id(s) have no metadata: {}", stores.len(), preview(stores))]
    ReferentialIntegrity {
        /// The unknown store ids, ascending
        stores: Vec<i64>,
    },

    /// A store is outside the valid id range or absent from the table.
    #[error("Store {store} not found: {reason}")]
    NotFound {
        /// Requested store id
        store: i64,
        /// Why the lookup failed
        reason: String,
    },

    /// A frame is missing a column the operation needs.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Data layer error
    #[error(transparent)]
    Data(DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl From<DataError> for MetricsError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::MissingColumn(name) => Self::MissingColumn(name),
            other => Self::Data(other),
        }
    }
}

fn preview(stores: &[i64]) -> String {
    const SHOWN: usize = 10;
    let mut ids: Vec<String> = stores.iter().take(SHOWN).map(i64::to_string).collect();
    if stores.len() > SHOWN {
        ids.push("...".to_string());
    }
    ids.join(", ")
}
