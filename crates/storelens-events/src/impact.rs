//! Before/after comparison of sales and customers around an event.
//!
//! Each affected store's rows are split at its event date into a pre segment
//! (`date <= since`) and a post segment (`date >= since`). The event day
//! belongs to both segments. Ratios over a segment without days or customers
//! are reported as `None` rather than dropped, so the store stays visible.

use crate::error::{EventError, Result};
use crate::horizon::{AnalysisHorizon, EventKind};
use chrono::NaiveDate;
use derive_more::Display;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use storelens_data::frame::{date_lit, date_values, i64_values, require_columns};
use storelens_data::schema::{COMPETITION_DISTANCE, CUSTOMERS, DATE, OPEN, SALES, STORE};

/// Settings for [`compute_impact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    /// Horizon deciding which events are new.
    pub horizon: AnalysisHorizon,
    /// Drop stores whose pre or post segment has fewer days.
    pub min_days: Option<usize>,
    /// Count only days the store was open, so closed days do not dilute the
    /// daily means.
    pub open_days_only: bool,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            horizon: AnalysisHorizon::default(),
            min_days: None,
            open_days_only: true,
        }
    }
}

/// Day count and totals of one segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Segment {
    /// Days in the segment.
    pub days: usize,
    /// Summed sales.
    pub sales: i64,
    /// Summed customers.
    pub customers: i64,
}

impl Segment {
    fn daily_mean_sales(&self) -> Option<f64> {
        ratio(self.sales, self.days as i64)
    }

    fn daily_mean_customers(&self) -> Option<f64> {
        ratio(self.customers, self.days as i64)
    }

    fn spc(&self) -> Option<f64> {
        ratio(self.sales, self.customers)
    }
}

fn ratio(numerator: i64, denominator: i64) -> Option<f64> {
    (denominator != 0).then(|| numerator as f64 / denominator as f64)
}

fn difference(post: Option<f64>, pre: Option<f64>) -> Option<f64> {
    Some(post? - pre?)
}

/// Pre/post comparison for one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactRecord {
    /// Store id.
    pub store: i64,
    /// Event kind.
    pub kind: EventKind,
    /// Event date.
    pub since: NaiveDate,
    /// Competitor distance in meters, competition only.
    pub distance: Option<i64>,
    /// Days up to and including the event day.
    pub pre_days: usize,
    /// Days from the event day on.
    pub post_days: usize,
    /// Sales before.
    pub pre_sales: i64,
    /// Sales after.
    pub post_sales: i64,
    /// Customers before.
    pub pre_customers: i64,
    /// Customers after.
    pub post_customers: i64,
    /// Mean daily sales before.
    pub pre_daily_mean_sales: Option<f64>,
    /// Mean daily sales after.
    pub post_daily_mean_sales: Option<f64>,
    /// Change of mean daily sales.
    pub daily_mean_sales_diff: Option<f64>,
    /// Mean daily customers before.
    pub pre_daily_mean_customers: Option<f64>,
    /// Mean daily customers after.
    pub post_daily_mean_customers: Option<f64>,
    /// Change of mean daily customers.
    pub daily_mean_customers_diff: Option<f64>,
    /// Sales per customer before.
    pub pre_spc: Option<f64>,
    /// Sales per customer after.
    pub post_spc: Option<f64>,
    /// Change of sales per customer.
    pub spc_diff: Option<f64>,
}

impl ImpactRecord {
    /// Derive the record from the two segments.
    pub fn from_segments(
        store: i64,
        kind: EventKind,
        since: NaiveDate,
        distance: Option<i64>,
        pre: Segment,
        post: Segment,
    ) -> Self {
        Self {
            store,
            kind,
            since,
            distance,
            pre_days: pre.days,
            post_days: post.days,
            pre_sales: pre.sales,
            post_sales: post.sales,
            pre_customers: pre.customers,
            post_customers: post.customers,
            pre_daily_mean_sales: pre.daily_mean_sales(),
            post_daily_mean_sales: post.daily_mean_sales(),
            daily_mean_sales_diff: difference(post.daily_mean_sales(), pre.daily_mean_sales()),
            pre_daily_mean_customers: pre.daily_mean_customers(),
            post_daily_mean_customers: post.daily_mean_customers(),
            daily_mean_customers_diff: difference(
                post.daily_mean_customers(),
                pre.daily_mean_customers(),
            ),
            pre_spc: pre.spc(),
            post_spc: post.spc(),
            spc_diff: difference(post.spc(), pre.spc()),
        }
    }
}

/// A numeric field of [`ImpactRecord`] to order by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactMetric {
    /// Competitor distance.
    #[display("distance")]
    Distance,
    /// Pre segment days.
    #[display("pre_days")]
    PreDays,
    /// Post segment days.
    #[display("post_days")]
    PostDays,
    /// Pre segment sales.
    #[display("pre_sales")]
    PreSales,
    /// Post segment sales.
    #[display("post_sales")]
    PostSales,
    /// Pre segment customers.
    #[display("pre_customers")]
    PreCustomers,
    /// Post segment customers.
    #[display("post_customers")]
    PostCustomers,
    /// Mean daily sales before.
    #[display("pre_daily_mean_sales")]
    PreDailyMeanSales,
    /// Mean daily sales after.
    #[display("post_daily_mean_sales")]
    PostDailyMeanSales,
    /// Change of mean daily sales.
    #[display("daily_mean_sales_diff")]
    DailyMeanSalesDiff,
    /// Mean daily customers before.
    #[display("pre_daily_mean_customers")]
    PreDailyMeanCustomers,
    /// Mean daily customers after.
    #[display("post_daily_mean_customers")]
    PostDailyMeanCustomers,
    /// Change of mean daily customers.
    #[display("daily_mean_customers_diff")]
    DailyMeanCustomersDiff,
    /// Sales per customer before.
    #[display("pre_spc")]
    PreSpc,
    /// Sales per customer after.
    #[display("post_spc")]
    PostSpc,
    /// Change of sales per customer.
    #[display("spc_diff")]
    SpcDiff,
}

impl ImpactMetric {
    /// Every metric.
    pub const ALL: [Self; 16] = [
        Self::Distance,
        Self::PreDays,
        Self::PostDays,
        Self::PreSales,
        Self::PostSales,
        Self::PreCustomers,
        Self::PostCustomers,
        Self::PreDailyMeanSales,
        Self::PostDailyMeanSales,
        Self::DailyMeanSalesDiff,
        Self::PreDailyMeanCustomers,
        Self::PostDailyMeanCustomers,
        Self::DailyMeanCustomersDiff,
        Self::PreSpc,
        Self::PostSpc,
        Self::SpcDiff,
    ];

    /// The field's value on `record`, `None` when undefined.
    pub fn value(&self, record: &ImpactRecord) -> Option<f64> {
        match self {
            Self::Distance => record.distance.map(|d| d as f64),
            Self::PreDays => Some(record.pre_days as f64),
            Self::PostDays => Some(record.post_days as f64),
            Self::PreSales => Some(record.pre_sales as f64),
            Self::PostSales => Some(record.post_sales as f64),
            Self::PreCustomers => Some(record.pre_customers as f64),
            Self::PostCustomers => Some(record.post_customers as f64),
            Self::PreDailyMeanSales => record.pre_daily_mean_sales,
            Self::PostDailyMeanSales => record.post_daily_mean_sales,
            Self::DailyMeanSalesDiff => record.daily_mean_sales_diff,
            Self::PreDailyMeanCustomers => record.pre_daily_mean_customers,
            Self::PostDailyMeanCustomers => record.post_daily_mean_customers,
            Self::DailyMeanCustomersDiff => record.daily_mean_customers_diff,
            Self::PreSpc => record.pre_spc,
            Self::PostSpc => record.post_spc,
            Self::SpcDiff => record.spc_diff,
        }
    }
}

impl FromStr for ImpactMetric {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|metric| metric.to_string() == wanted)
            .ok_or_else(|| EventError::InvalidParameter(format!("unknown impact metric '{s}'")))
    }
}

/// Impact records of one event kind, ordered by store id.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactTable {
    kind: EventKind,
    records: Vec<ImpactRecord>,
}

impl ImpactTable {
    /// Build a table, ordering the records by store id.
    pub fn new(kind: EventKind, mut records: Vec<ImpactRecord>) -> Self {
        records.sort_by_key(|r| r.store);
        Self { kind, records }
    }

    /// Event kind of the table.
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// Records ordered by store id.
    pub fn records(&self) -> &[ImpactRecord] {
        &self.records
    }

    /// Record of one store.
    pub fn get(&self, store: i64) -> Option<&ImpactRecord> {
        self.records
            .binary_search_by_key(&store, |r| r.store)
            .ok()
            .map(|index| &self.records[index])
    }

    /// Number of stores.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no store was affected.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by `metric`. Undefined values come last; ties keep
    /// store id order.
    pub fn sorted_by(&self, metric: ImpactMetric, descending: bool) -> Vec<&ImpactRecord> {
        let mut sorted: Vec<&ImpactRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| match (metric.value(a), metric.value(b)) {
            (Some(x), Some(y)) if descending => y.total_cmp(&x),
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        sorted
    }

    /// The table as a frame, one row per store.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let rows = &self.records;
        let since: Vec<Option<NaiveDate>> = rows.iter().map(|r| Some(r.since)).collect();
        let ints = |f: fn(&ImpactRecord) -> i64| rows.iter().map(f).collect::<Vec<i64>>();

        let mut columns: Vec<Column> = vec![
            Series::new(STORE.into(), ints(|r| r.store)).into(),
            storelens_data::frame::opt_date_column(self.kind.since_column(), &since)?,
        ];
        if self.kind == EventKind::Competition {
            columns.push(
                Series::new(
                    COMPETITION_DISTANCE.into(),
                    rows.iter().map(|r| r.distance).collect::<Vec<_>>(),
                )
                .into(),
            );
        }
        columns.extend([
            Series::new("pre_days".into(), ints(|r| r.pre_days as i64)).into(),
            Series::new("post_days".into(), ints(|r| r.post_days as i64)).into(),
            Series::new("pre_sales".into(), ints(|r| r.pre_sales)).into(),
            Series::new("post_sales".into(), ints(|r| r.post_sales)).into(),
            Series::new("pre_customers".into(), ints(|r| r.pre_customers)).into(),
            Series::new("post_customers".into(), ints(|r| r.post_customers)).into(),
        ]);
        for metric in &ImpactMetric::ALL[7..] {
            let values: Vec<Option<f64>> = rows.iter().map(|r| metric.value(r)).collect();
            columns.push(Series::new(metric.to_string().into(), values).into());
        }

        Ok(DataFrame::new(columns)?)
    }
}

const SINCE: &str = "since";
const DISTANCE: &str = "distance";
const PRE_DAYS: &str = "pre_days";
const POST_DAYS: &str = "post_days";
const PRE_SALES: &str = "pre_sales";
const POST_SALES: &str = "post_sales";
const PRE_CUSTOMERS: &str = "pre_customers";
const POST_CUSTOMERS: &str = "post_customers";

fn segment_sum(value: &str, in_segment: Expr) -> Expr {
    when(in_segment)
        .then(col(value).cast(DataType::Int64))
        .otherwise(lit(0i64))
        .sum()
}

/// Compare every store with a new `kind` event before and after it.
///
/// `combined` is the joined table; it needs the store, date, sales and
/// customers columns plus the kind's since column (and the competition
/// distance for competition events). With
/// [`open_days_only`](ImpactConfig::open_days_only) it also needs the open
/// flag, and closed days are left out of both segments.
pub fn compute_impact(
    combined: &DataFrame,
    kind: EventKind,
    config: &ImpactConfig,
) -> Result<ImpactTable> {
    let since_column = kind.since_column();
    require_columns(combined, &[STORE, DATE, SALES, CUSTOMERS, since_column])?;
    if kind == EventKind::Competition {
        require_columns(combined, &[COMPETITION_DISTANCE])?;
    }
    if config.open_days_only {
        require_columns(combined, &[OPEN])?;
    }

    let pre = col(DATE).lt_eq(col(since_column));
    let post = col(DATE).gt_eq(col(since_column));
    let mut aggs = vec![
        col(since_column).first().alias(SINCE),
        pre.clone().cast(DataType::Int64).sum().alias(PRE_DAYS),
        post.clone().cast(DataType::Int64).sum().alias(POST_DAYS),
        segment_sum(SALES, pre.clone()).alias(PRE_SALES),
        segment_sum(SALES, post.clone()).alias(POST_SALES),
        segment_sum(CUSTOMERS, pre).alias(PRE_CUSTOMERS),
        segment_sum(CUSTOMERS, post).alias(POST_CUSTOMERS),
    ];
    if kind == EventKind::Competition {
        aggs.push(
            col(COMPETITION_DISTANCE)
                .cast(DataType::Int64)
                .first()
                .alias(DISTANCE),
        );
    }

    let mut rows = combined
        .clone()
        .lazy()
        .filter(col(since_column).gt_eq(date_lit(config.horizon.start)));
    if config.open_days_only {
        rows = rows.filter(col(OPEN));
    }
    let segments = rows
        .group_by([col(STORE)])
        .agg(aggs)
        .sort([STORE], SortMultipleOptions::default())
        .collect()?;

    let stores = i64_values(&segments, STORE)?;
    let since = date_values(&segments, SINCE)?;
    let distances = match kind {
        EventKind::Competition => i64_values(&segments, DISTANCE)?,
        EventKind::Promo2 => vec![None; segments.height()],
    };
    let counts = |name: &str| -> Result<Vec<i64>> {
        Ok(i64_values(&segments, name)?
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect())
    };
    let (pre_days, post_days) = (counts(PRE_DAYS)?, counts(POST_DAYS)?);
    let (pre_sales, post_sales) = (counts(PRE_SALES)?, counts(POST_SALES)?);
    let (pre_customers, post_customers) = (counts(PRE_CUSTOMERS)?, counts(POST_CUSTOMERS)?);

    let mut records = Vec::with_capacity(segments.height());
    let mut skipped = 0usize;
    for i in 0..segments.height() {
        let (Some(store), Some(since)) = (stores[i], since[i]) else {
            continue;
        };
        let pre = Segment {
            days: usize::try_from(pre_days[i]).unwrap_or_default(),
            sales: pre_sales[i],
            customers: pre_customers[i],
        };
        let post = Segment {
            days: usize::try_from(post_days[i]).unwrap_or_default(),
            sales: post_sales[i],
            customers: post_customers[i],
        };
        if let Some(min_days) = config.min_days
            && (pre.days < min_days || post.days < min_days)
        {
            skipped += 1;
            continue;
        }
        records.push(ImpactRecord::from_segments(
            store,
            kind,
            since,
            distances[i],
            pre,
            post,
        ));
    }

    if skipped > 0 {
        tracing::info!(
            %kind,
            skipped,
            min_days = config.min_days,
            "skipped stores below the minimum segment length"
        );
    }
    tracing::debug!(%kind, stores = records.len(), "computed impact table");

    Ok(ImpactTable::new(kind, records))
}
