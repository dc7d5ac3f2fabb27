//! Calendar resampling of daily rows.

use crate::error::{MetricsError, Result};
use crate::metrics::augment_with_metrics;
use chrono::{Datelike, Days, NaiveDate};
use derive_more::Display;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use storelens_data::frame::{date_values, opt_date_column, require_columns};
use storelens_data::schema::{CUSTOMERS, DATE, SALES};

const PERIOD: &str = "period";

/// Resampling period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Weeks ending on Sunday.
    #[default]
    #[display("weekly")]
    Weekly,
    /// Calendar months.
    #[display("monthly")]
    Monthly,
}

impl Frequency {
    /// The label of the period containing `date`: the Sunday closing its week,
    /// or the last day of its month.
    pub fn period_end(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Weekly => {
                let remaining = 7 - u64::from(date.weekday().number_from_monday());
                date.checked_add_days(Days::new(remaining))
            }
            Self::Monthly => {
                let (year, month) = if date.month() == 12 {
                    (date.year() + 1, 1)
                } else {
                    (date.year(), date.month() + 1)
                };
                NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
            }
        }
    }
}

impl FromStr for Frequency {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "weekly" | "week" | "w" => Ok(Self::Weekly),
            "monthly" | "month" | "m" => Ok(Self::Monthly),
            other => Err(MetricsError::InvalidParameter(format!(
                "unknown frequency '{other}', expected weekly or monthly"
            ))),
        }
    }
}

/// Sum `columns` per period.
///
/// The output has a `date` column holding the period label followed by one
/// column per input column, sorted by period. Periods without rows are not
/// materialized.
pub fn resample_sum(frame: &DataFrame, frequency: Frequency, columns: &[&str]) -> Result<DataFrame> {
    require_columns(frame, &[DATE])?;
    require_columns(frame, columns)?;

    let periods: Vec<Option<NaiveDate>> = date_values(frame, DATE)?
        .into_iter()
        .map(|date| date.and_then(|d| frequency.period_end(d)))
        .collect();

    let sums: Vec<Expr> = columns.iter().map(|name| col(*name).sum()).collect();
    let mut selection = vec![col(PERIOD).alias(DATE)];
    selection.extend(columns.iter().map(|name| col(*name)));

    let mut labelled = frame.clone();
    labelled.with_column(opt_date_column(PERIOD, &periods)?)?;

    let resampled = labelled
        .lazy()
        .filter(col(PERIOD).is_not_null())
        .group_by([col(PERIOD)])
        .agg(sums)
        .select(selection)
        .sort([DATE], SortMultipleOptions::default())
        .collect()?;

    Ok(resampled)
}

/// Dataset-wide sales and customers per period, with derived metrics.
pub fn timeline(frame: &DataFrame, frequency: Frequency) -> Result<DataFrame> {
    let sums = resample_sum(frame, frequency, &[SALES, CUSTOMERS])?;
    augment_with_metrics(&sums)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use storelens_data::frame::{date_column, i64_values};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(Frequency::Weekly, date(2015, 7, 27), date(2015, 8, 2))]
    #[case(Frequency::Weekly, date(2015, 8, 2), date(2015, 8, 2))]
    #[case(Frequency::Monthly, date(2015, 2, 10), date(2015, 2, 28))]
    #[case(Frequency::Monthly, date(2014, 12, 1), date(2014, 12, 31))]
    fn test_period_end(#[case] freq: Frequency, #[case] day: NaiveDate, #[case] end: NaiveDate) {
        assert_eq!(freq.period_end(day), Some(end));
    }

    #[rstest]
    #[case("weekly", Frequency::Weekly)]
    #[case("M", Frequency::Monthly)]
    fn test_parse_frequency(#[case] input: &str, #[case] expected: Frequency) {
        assert_eq!(input.parse::<Frequency>().unwrap(), expected);
        assert!("daily".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_weekly_sums() {
        let dates = [
            date(2015, 7, 31),
            date(2015, 8, 1),
            date(2015, 8, 2),
            date(2015, 8, 3),
        ];
        let frame = DataFrame::new(vec![
            date_column(DATE, &dates).unwrap(),
            Series::new(SALES.into(), [10i64, 20, 30, 40]).into(),
            Series::new(CUSTOMERS.into(), [1i64, 2, 3, 4]).into(),
        ])
        .unwrap();

        let weekly = resample_sum(&frame, Frequency::Weekly, &[SALES]).unwrap();
        assert_eq!(
            date_values(&weekly, DATE).unwrap(),
            vec![Some(date(2015, 8, 2)), Some(date(2015, 8, 9))]
        );
        assert_eq!(i64_values(&weekly, SALES).unwrap(), vec![Some(60), Some(40)]);

        let monthly = timeline(&frame, Frequency::Monthly).unwrap();
        assert_eq!(monthly.height(), 2);
        assert_eq!(
            i64_values(&monthly, crate::metrics::CUM_SALES).unwrap(),
            vec![Some(10), Some(100)]
        );
    }
}
