//! Assembling a [`StoreProfile`] from the joined table.

use crate::error::Result;
use polars::prelude::DataFrame;
use storelens_data::StoreMetaTable;
use storelens_data::frame::{bool_values, f64_values, i64_values};
use storelens_metrics::aggregate::{
    AVG_CUSTOMERS, AVG_SALES, DAYS, OPEN_DAYS, PROMO_DAYS, RENOVATION, SCHOOL_HOLIDAY_DAYS,
    STATE_HOLIDAY_DAYS, STATE_HOLIDAY_OPEN_DAYS, TOTAL_CUSTOMERS, TOTAL_SALES,
};
use storelens_metrics::{MetricsError, SPC, rank_all, store_aggregates, store_slice};
use storelens_output::{ProfileRank, StoreProfile};

fn first_i64(row: &DataFrame, name: &str) -> Result<i64> {
    Ok(i64_values(row, name)?.first().copied().flatten().unwrap_or_default())
}

fn first_f64(row: &DataFrame, name: &str) -> Result<Option<f64>> {
    Ok(f64_values(row, name)?.first().copied().flatten())
}

/// Totals, day counts, metadata and cohort ranks of one store.
///
/// `combined` is the joined table of all stores; ranks are taken against
/// every store in it.
///
/// # Errors
///
/// Returns [`MetricsError::NotFound`] if `meta` does not know the store or
/// `combined` has no rows for it.
pub fn build_profile(
    store: i64,
    combined: &DataFrame,
    meta: &StoreMetaTable,
) -> Result<StoreProfile> {
    let info = meta.get(store).ok_or_else(|| MetricsError::NotFound {
        store,
        reason: "no store metadata".to_string(),
    })?;

    let row = store_aggregates(&store_slice(combined, store)?)?;
    let ranks = rank_all(store, combined)?
        .into_iter()
        .map(|rank| ProfileRank {
            metric: rank.metric.label().to_string(),
            rank: rank.rank,
            cohort_size: rank.cohort_size,
            value: rank.value,
        })
        .collect();

    Ok(StoreProfile {
        store,
        store_type: info.store_type.clone(),
        assortment: info.assortment.name().to_string(),
        total_sales: first_i64(&row, TOTAL_SALES)?,
        total_customers: first_i64(&row, TOTAL_CUSTOMERS)?,
        avg_sales: first_f64(&row, AVG_SALES)?,
        avg_customers: first_f64(&row, AVG_CUSTOMERS)?,
        spc: first_f64(&row, SPC)?,
        ranks,
        days_open: first_i64(&row, OPEN_DAYS)?,
        days_observed: first_i64(&row, DAYS)?,
        renovation: bool_values(&row, RENOVATION)?
            .first()
            .copied()
            .flatten()
            .unwrap_or(false),
        promo_days: first_i64(&row, PROMO_DAYS)?,
        state_holiday_days: first_i64(&row, STATE_HOLIDAY_DAYS)?,
        state_holiday_open_days: first_i64(&row, STATE_HOLIDAY_OPEN_DAYS)?,
        school_holiday_days: first_i64(&row, SCHOOL_HOLIDAY_DAYS)?,
        competition_distance: info.competition_distance,
        competition_since: info.competition_since,
        promo2: info.promo2,
        promo2_since: info.promo2_since,
        promo_interval: info.promo_interval.clone(),
    })
}
