//! Joining daily records with store metadata.

use crate::error::{MetricsError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use storelens_data::frame::require_columns;
use storelens_data::schema::{DATE, OPEN, STORE};
use storelens_data::{DailyTable, StoreMetaTable};

/// What to do with daily records whose store has no metadata row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinPolicy {
    /// Fail with [`MetricsError::ReferentialIntegrity`].
    #[default]
    FailFast,
    /// Drop the unmatched rows and log a warning.
    DropUnmatched,
}

/// Daily records joined with store metadata, sorted by store then date.
#[derive(Debug, Clone)]
pub struct CombinedTable {
    frame: DataFrame,
}

impl CombinedTable {
    /// Wrap an already joined frame.
    ///
    /// The frame is re-sorted by store then date.
    pub fn from_frame(frame: DataFrame) -> Result<Self> {
        require_columns(&frame, &[STORE, DATE])?;
        let frame = frame
            .lazy()
            .sort([STORE, DATE], SortMultipleOptions::default())
            .collect()?;
        Ok(Self { frame })
    }

    /// The underlying frame.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Consume the table and return its frame.
    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Number of store-days.
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Rows of one store, in date order.
    pub fn store_rows(&self, store: i64) -> Result<DataFrame> {
        store_slice(&self.frame, store)
    }

    /// Rows on which the store was open.
    pub fn open_days(&self) -> Result<DataFrame> {
        open_days(&self.frame)
    }
}

/// Inner-join daily records with store metadata on the store id.
///
/// # Errors
///
/// With [`JoinPolicy::FailFast`], returns [`MetricsError::ReferentialIntegrity`]
/// listing every store id of `daily` that `meta` does not know.
pub fn join(
    daily: &DailyTable,
    meta: &StoreMetaTable,
    policy: JoinPolicy,
) -> Result<CombinedTable> {
    let unknown: BTreeSet<i64> = daily
        .store_ids()?
        .into_iter()
        .filter(|store| !meta.contains(*store))
        .collect();

    if !unknown.is_empty() && policy == JoinPolicy::FailFast {
        return Err(MetricsError::ReferentialIntegrity {
            stores: unknown.into_iter().collect(),
        });
    }

    let frame = daily
        .frame()
        .clone()
        .lazy()
        .join(
            meta.to_frame()?.lazy(),
            [col(STORE)],
            [col(STORE)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort([STORE, DATE], SortMultipleOptions::default())
        .collect()?;

    if !unknown.is_empty() {
        tracing::warn!(
            stores = unknown.len(),
            rows = daily.len() - frame.height(),
            "dropped daily records of stores without metadata"
        );
    }

    Ok(CombinedTable { frame })
}

/// Keep only the rows on which the store was open.
pub fn open_days(frame: &DataFrame) -> Result<DataFrame> {
    require_columns(frame, &[OPEN])?;
    Ok(frame.clone().lazy().filter(col(OPEN)).collect()?)
}

/// Rows of a single store.
///
/// # Errors
///
/// Returns [`MetricsError::NotFound`] if the store has no rows.
pub fn store_slice(frame: &DataFrame, store: i64) -> Result<DataFrame> {
    require_columns(frame, &[STORE])?;
    let rows = frame
        .clone()
        .lazy()
        .filter(col(STORE).eq(lit(store)))
        .collect()?;
    if rows.height() == 0 {
        return Err(MetricsError::NotFound {
            store,
            reason: "no rows in table".to_string(),
        });
    }
    Ok(rows)
}
