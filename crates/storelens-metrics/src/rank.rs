//! Ranking a store within the cohort of all stores.

use crate::error::{MetricsError, Result};
use derive_more::Display;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use storelens_data::frame::{f64_values, i64_values, require_columns};
use storelens_data::schema::{CUSTOMERS, OPEN, SALES, STORE, STORE_ID_RANGE, is_valid_store_id};

const VALUE: &str = "value";

/// A per-store quantity stores are ranked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortMetric {
    /// Sum of sales over all days.
    #[display("total_sales")]
    TotalSales,
    /// Mean sales over all days.
    #[display("mean_sales")]
    MeanSales,
    /// Mean sales over open days.
    #[display("mean_open_sales")]
    MeanOpenSales,
    /// Sum of customers over all days.
    #[display("total_customers")]
    TotalCustomers,
    /// Mean customers over all days.
    #[display("mean_customers")]
    MeanCustomers,
    /// Mean customers over open days.
    #[display("mean_open_customers")]
    MeanOpenCustomers,
    /// Total sales over total customers.
    #[display("sales_per_customer")]
    SalesPerCustomer,
}

impl CohortMetric {
    /// All metrics, in report order.
    pub const ALL: [Self; 7] = [
        Self::TotalSales,
        Self::MeanSales,
        Self::MeanOpenSales,
        Self::TotalCustomers,
        Self::MeanCustomers,
        Self::MeanOpenCustomers,
        Self::SalesPerCustomer,
    ];

    /// Human-readable label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::TotalSales => "Total sales",
            Self::MeanSales => "Mean sales",
            Self::MeanOpenSales => "Mean sales (open days)",
            Self::TotalCustomers => "Total customers",
            Self::MeanCustomers => "Mean customers",
            Self::MeanOpenCustomers => "Mean customers (open days)",
            Self::SalesPerCustomer => "Sales per customer",
        }
    }

    const fn open_days_only(&self) -> bool {
        matches!(self, Self::MeanOpenSales | Self::MeanOpenCustomers)
    }

    fn aggregate(&self) -> Expr {
        let sales = col(SALES).cast(DataType::Float64);
        let customers = col(CUSTOMERS).cast(DataType::Float64);
        match self {
            Self::TotalSales => sales.sum(),
            Self::MeanSales | Self::MeanOpenSales => sales.mean(),
            Self::TotalCustomers => customers.sum(),
            Self::MeanCustomers | Self::MeanOpenCustomers => customers.mean(),
            Self::SalesPerCustomer => crate::metrics::spc_expr(
                col(SALES).sum(),
                col(CUSTOMERS).sum(),
                lit(0.0),
            ),
        }
    }
}

impl FromStr for CohortMetric {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.to_string() == s.to_ascii_lowercase())
            .ok_or_else(|| MetricsError::InvalidParameter(format!("unknown cohort metric '{s}'")))
    }
}

/// Position of one store in the cohort on one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CohortRank {
    /// Store id.
    pub store: i64,
    /// Metric ranked on.
    pub metric: CohortMetric,
    /// 1-based rank, 1 is the highest value.
    pub rank: usize,
    /// Number of stores with a value for the metric.
    pub cohort_size: usize,
    /// The store's value.
    pub value: f64,
}

/// Every store's value on one metric, ordered from rank 1 down.
#[derive(Debug, Clone)]
pub struct CohortTable {
    metric: CohortMetric,
    entries: Vec<(i64, f64)>,
}

impl CohortTable {
    /// Metric the table is ordered by.
    pub const fn metric(&self) -> CohortMetric {
        self.metric
    }

    /// `(store, value)` pairs in rank order.
    pub fn entries(&self) -> &[(i64, f64)] {
        &self.entries
    }

    /// Number of ranked stores.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no store has a value.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank of `store`, if it is part of the table.
    pub fn rank_of(&self, store: i64) -> Option<CohortRank> {
        self.entries
            .iter()
            .position(|(id, _)| *id == store)
            .map(|index| CohortRank {
                store,
                metric: self.metric,
                rank: index + 1,
                cohort_size: self.entries.len(),
                value: self.entries[index].1,
            })
    }
}

/// Compute every store's value on `metric` and order them.
///
/// Higher values rank first; ties go to the lower store id. Open-day metrics
/// leave out stores that never opened.
pub fn cohort_table(cohort: &DataFrame, metric: CohortMetric) -> Result<CohortTable> {
    require_columns(cohort, &[STORE, SALES, CUSTOMERS])?;

    let mut rows = cohort.clone().lazy();
    if metric.open_days_only() {
        require_columns(cohort, &[OPEN])?;
        rows = rows.filter(col(OPEN));
    }
    let values = rows
        .group_by([col(STORE)])
        .agg([metric.aggregate().alias(VALUE)])
        .collect()?;

    let mut entries: Vec<(i64, f64)> = i64_values(&values, STORE)?
        .into_iter()
        .zip(f64_values(&values, VALUE)?)
        .filter_map(|(store, value)| Some((store?, value?)))
        .filter(|(_, value)| value.is_finite())
        .collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    Ok(CohortTable { metric, entries })
}

fn check_store_id(store: i64) -> Result<()> {
    if is_valid_store_id(store) {
        Ok(())
    } else {
        Err(MetricsError::NotFound {
            store,
            reason: format!(
                "outside the valid id range {}..={}",
                STORE_ID_RANGE.start(),
                STORE_ID_RANGE.end()
            ),
        })
    }
}

fn missing_from_cohort(store: i64, metric: CohortMetric) -> MetricsError {
    MetricsError::NotFound {
        store,
        reason: format!("no {metric} value in the cohort"),
    }
}

/// Rank `store` among all stores of `cohort` on `metric`.
///
/// # Errors
///
/// Returns [`MetricsError::NotFound`] if the id is outside the valid store
/// range or the store has no value for the metric.
pub fn rank_store(store: i64, cohort: &DataFrame, metric: CohortMetric) -> Result<CohortRank> {
    check_store_id(store)?;
    cohort_table(cohort, metric)?
        .rank_of(store)
        .ok_or_else(|| missing_from_cohort(store, metric))
}

/// Rank `store` on every [`CohortMetric`].
///
/// A store that never opened has no open-day rank; such metrics are skipped.
/// Fails with [`MetricsError::NotFound`] if the store has no value at all.
pub fn rank_all(store: i64, cohort: &DataFrame) -> Result<Vec<CohortRank>> {
    check_store_id(store)?;
    let mut ranks = Vec::with_capacity(CohortMetric::ALL.len());
    for metric in CohortMetric::ALL {
        if let Some(rank) = cohort_table(cohort, metric)?.rank_of(store) {
            ranks.push(rank);
        }
    }
    if ranks.is_empty() {
        return Err(missing_from_cohort(store, CohortMetric::TotalSales));
    }
    Ok(ranks)
}
