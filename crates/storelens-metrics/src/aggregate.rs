//! Per-store and grouped summaries of the joined table.

use crate::error::Result;
use crate::metrics::spc_expr;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use storelens_data::frame::{date_lit, require_columns};
use storelens_data::schema::{
    ASSORTMENT, COMPETITION_DISTANCE, COMPETITION_SINCE, CUSTOMERS, DATE, IS_HOLIDAY, OPEN,
    PROMO, PROMO2, PROMO2_SINCE, PROMO_INTERVAL, SALES, SCHOOL_HOLIDAY, STORE, STORE_TYPE,
};

/// Window in which a store without any open day is considered closed for
/// refurbishment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenovationProbe {
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
}

impl Default for RenovationProbe {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2014, 7, 13).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2014, 12, 28).unwrap_or_default(),
        }
    }
}

impl RenovationProbe {
    /// Whether `date` lies in the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }

    fn covers(&self) -> Expr {
        col(DATE)
            .gt_eq(date_lit(self.start))
            .and(col(DATE).lt_eq(date_lit(self.end)))
    }
}

/// Rows observed for the store.
pub const DAYS: &str = "days";
/// Days the store was open.
pub const OPEN_DAYS: &str = "open_days";
/// Days with a running promotion.
pub const PROMO_DAYS: &str = "promo_days";
/// Days affected by school holidays.
pub const SCHOOL_HOLIDAY_DAYS: &str = "school_holiday_days";
/// Days that fell on a state holiday.
pub const STATE_HOLIDAY_DAYS: &str = "state_holiday_days";
/// Open days that fell on a state holiday.
pub const STATE_HOLIDAY_OPEN_DAYS: &str = "state_holiday_open_days";
/// Summed sales.
pub const TOTAL_SALES: &str = "total_sales";
/// Summed customers.
pub const TOTAL_CUSTOMERS: &str = "total_customers";
/// Mean sales per open day.
pub const AVG_SALES: &str = "avg_sales";
/// Mean customers per open day.
pub const AVG_CUSTOMERS: &str = "avg_customers";
/// Whether the store looks closed for refurbishment.
pub const RENOVATION: &str = "renovation";
/// Rows per group.
pub const COUNT: &str = "count";
/// Mean sales of a group.
pub const MEAN_SALES: &str = "mean_sales";
/// Mean customers of a group.
pub const MEAN_CUSTOMERS: &str = "mean_customers";

const META_COLUMNS: [&str; 7] = [
    STORE_TYPE,
    ASSORTMENT,
    COMPETITION_DISTANCE,
    COMPETITION_SINCE,
    PROMO2,
    PROMO2_SINCE,
    PROMO_INTERVAL,
];

fn flag_days(flag: Expr) -> Expr {
    flag.cast(DataType::Int64).sum()
}

fn null_f64() -> Expr {
    lit(NULL).cast(DataType::Float64)
}

/// One row per store with totals, day counts, metadata and ratios.
///
/// `spc` is null for a store without customers; `avg_sales` and
/// `avg_customers` are null for a store that never opened. A store is flagged
/// as `renovation` when its rows span the probe window and none of those
/// days was an open day.
pub fn store_aggregates(combined: &DataFrame) -> Result<DataFrame> {
    require_columns(combined, &[STORE, DATE, SALES, CUSTOMERS, OPEN])?;
    let present = |name: &str| combined.column(name).is_ok();

    let probe = RenovationProbe::default();

    let mut aggs = vec![
        len().cast(DataType::Int64).alias(DAYS),
        flag_days(col(OPEN)).alias(OPEN_DAYS),
        col(SALES).cast(DataType::Int64).sum().alias(TOTAL_SALES),
        col(CUSTOMERS).cast(DataType::Int64).sum().alias(TOTAL_CUSTOMERS),
        col(DATE)
            .min()
            .lt_eq(date_lit(probe.start))
            .and(col(DATE).max().gt_eq(date_lit(probe.end)))
            .and(flag_days(col(OPEN).and(probe.covers())).eq(lit(0)))
            .alias(RENOVATION),
    ];
    if present(PROMO) {
        aggs.push(flag_days(col(PROMO)).alias(PROMO_DAYS));
    }
    if present(SCHOOL_HOLIDAY) {
        aggs.push(flag_days(col(SCHOOL_HOLIDAY)).alias(SCHOOL_HOLIDAY_DAYS));
    }
    if present(IS_HOLIDAY) {
        aggs.push(flag_days(col(IS_HOLIDAY)).alias(STATE_HOLIDAY_DAYS));
        aggs.push(flag_days(col(OPEN).and(col(IS_HOLIDAY))).alias(STATE_HOLIDAY_OPEN_DAYS));
    }
    aggs.extend(
        META_COLUMNS
            .iter()
            .filter(|name| present(name))
            .map(|name| col(*name).first()),
    );

    let aggregates = combined
        .clone()
        .lazy()
        .group_by([col(STORE)])
        .agg(aggs)
        .with_columns([
            spc_expr(col(TOTAL_SALES), col(TOTAL_CUSTOMERS), null_f64()).alias(crate::SPC),
            spc_expr(col(TOTAL_SALES), col(OPEN_DAYS), null_f64()).alias(AVG_SALES),
            spc_expr(col(TOTAL_CUSTOMERS), col(OPEN_DAYS), null_f64()).alias(AVG_CUSTOMERS),
        ])
        .sort([STORE], SortMultipleOptions::default())
        .collect()?;

    tracing::debug!(stores = aggregates.height(), "computed store aggregates");
    Ok(aggregates)
}

/// Count, sales per customer, means and totals of sales and customers per
/// distinct value of `by`, sorted by the group keys.
pub fn group_summary(frame: &DataFrame, by: &[&str]) -> Result<DataFrame> {
    require_columns(frame, &[SALES, CUSTOMERS])?;
    require_columns(frame, by)?;

    let keys: Vec<Expr> = by.iter().map(|name| col(*name)).collect();
    let summary = frame
        .clone()
        .lazy()
        .group_by(keys)
        .agg([
            len().cast(DataType::Int64).alias(COUNT),
            col(SALES).cast(DataType::Int64).sum().alias(TOTAL_SALES),
            col(CUSTOMERS).cast(DataType::Int64).sum().alias(TOTAL_CUSTOMERS),
            col(SALES).cast(DataType::Float64).mean().alias(MEAN_SALES),
            col(CUSTOMERS).cast(DataType::Float64).mean().alias(MEAN_CUSTOMERS),
        ])
        .with_column(
            spc_expr(col(TOTAL_SALES), col(TOTAL_CUSTOMERS), null_f64()).alias(crate::SPC),
        )
        .sort(by.to_vec(), SortMultipleOptions::default())
        .collect()?;

    Ok(summary)
}
