//! One store's weekly series with its event state.

use crate::error::{EventError, Result};
use crate::horizon::AnalysisHorizon;
use crate::window::event_calendar;
use chrono::{Days, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use storelens_data::StoreMetaTable;
use storelens_data::frame::{date_lit, date_values, i64_values, require_columns};
use storelens_data::schema::{CUSTOMERS, DATE, OPEN, PROMO, SALES, SCHOOL_HOLIDAY};
use storelens_metrics::{
    Frequency, MetricsError, RenovationProbe, augment_with_metrics, resample_sum, store_slice,
};

/// Settings for [`weekly_store_series`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyConfig {
    /// Drop the first and last week, which are usually partial.
    pub trim_edge_weeks: bool,
    /// Drop the refurbishment weeks of a store that was closed throughout the
    /// renovation probe.
    pub drop_renovation: bool,
    /// Calendar the event state is taken from.
    pub horizon: AnalysisHorizon,
}

impl Default for WeeklyConfig {
    fn default() -> Self {
        Self {
            trim_edge_weeks: true,
            drop_renovation: true,
            horizon: AnalysisHorizon::default(),
        }
    }
}

/// Weeks removed for a store closed during the probe: the probe itself plus
/// the partial week on either side.
fn renovation_weeks(probe: &RenovationProbe) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        probe.start.checked_sub_days(Days::new(7))?,
        probe.end.checked_add_days(Days::new(7))?,
    ))
}

fn drop_renovation_weeks(store: i64, weekly: DataFrame) -> Result<DataFrame> {
    let probe = RenovationProbe::default();
    let open_in_probe: i64 = date_values(&weekly, DATE)?
        .into_iter()
        .zip(i64_values(&weekly, OPEN)?)
        .filter(|(week, _)| week.is_some_and(|w| probe.contains(w)))
        .map(|(_, open)| open.unwrap_or_default())
        .sum();
    if open_in_probe > 0 {
        return Ok(weekly);
    }
    let Some((first, last)) = renovation_weeks(&probe) else {
        return Ok(weekly);
    };

    let before = weekly.height();
    let kept = weekly
        .lazy()
        .filter(
            col(DATE)
                .lt(date_lit(first))
                .or(col(DATE).gt(date_lit(last))),
        )
        .collect()?;
    if kept.height() < before {
        tracing::info!(
            store,
            weeks = before - kept.height(),
            "dropped renovation weeks"
        );
    }
    Ok(kept)
}

/// Weekly sums of one store's rows with the competition and promo2 state at
/// the end of each week and derived metrics.
///
/// Weeks are labelled by their closing Sunday. Weeks whose Sunday lies
/// outside the configured horizon are dropped.
///
/// # Errors
///
/// Returns [`EventError::StoreNotFound`] if `combined` has no rows for the
/// store or `meta` does not know it.
pub fn weekly_store_series(
    combined: &DataFrame,
    meta: &StoreMetaTable,
    store: i64,
    config: &WeeklyConfig,
) -> Result<DataFrame> {
    let rows = match store_slice(combined, store) {
        Ok(rows) => rows,
        Err(MetricsError::NotFound { .. }) => return Err(EventError::StoreNotFound(store)),
        Err(err) => return Err(err.into()),
    };
    require_columns(&rows, &[SALES, CUSTOMERS, OPEN])?;

    let columns: Vec<&str> = [SALES, CUSTOMERS, OPEN, PROMO, SCHOOL_HOLIDAY]
        .into_iter()
        .filter(|name| rows.column(name).is_ok())
        .collect();
    let casts: Vec<Expr> = columns
        .iter()
        .map(|name| col(*name).cast(DataType::Int64))
        .collect();
    let mut weekly = resample_sum(&rows, Frequency::Weekly, &columns)?
        .lazy()
        .with_columns(casts)
        .collect()?;

    if config.trim_edge_weeks {
        let height = weekly.height();
        weekly = weekly.slice(1, height.saturating_sub(2));
    }
    if config.drop_renovation {
        weekly = drop_renovation_weeks(store, weekly)?;
    }

    let calendar = event_calendar(store, meta, &config.horizon)?;
    let series = weekly
        .lazy()
        .join(
            calendar.lazy(),
            [col(DATE)],
            [col(DATE)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort([DATE], SortMultipleOptions::default())
        .collect()?;

    Ok(augment_with_metrics(&series)?)
}
