//! Conversions between polars columns and plain Rust values.
//!
//! Dates live in frames as polars `Date` (days since the Unix epoch). These
//! helpers build such columns from [`NaiveDate`] values and read typed values
//! back out, reporting a [`DataError::MissingColumn`] instead of a bare polars
//! error when a column is absent.

use crate::error::{DataError, Result};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Convert a calendar date to days since the Unix epoch.
pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Convert days since the Unix epoch to a calendar date.
pub fn days_to_date(days: i32) -> Result<NaiveDate> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| DataError::InvalidDate(days.to_string()))
}

/// Build a `Date` column from calendar dates.
pub fn date_column(name: &str, dates: &[NaiveDate]) -> Result<Column> {
    let days: Vec<i32> = dates.iter().map(|d| date_to_days(*d)).collect();
    let series = Series::new(name.into(), days).cast(&DataType::Date)?;
    Ok(series.into())
}

/// Build a nullable `Date` column from optional calendar dates.
pub fn opt_date_column(name: &str, dates: &[Option<NaiveDate>]) -> Result<Column> {
    let days: Vec<Option<i32>> = dates.iter().map(|d| d.map(date_to_days)).collect();
    let series = Series::new(name.into(), days).cast(&DataType::Date)?;
    Ok(series.into())
}

/// A `Date` literal for use in lazy expressions.
pub fn date_lit(date: NaiveDate) -> Expr {
    lit(date_to_days(date)).cast(DataType::Date)
}

/// Look up a column, mapping absence to [`DataError::MissingColumn`].
pub fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))
}

/// Fail unless every named column is present.
pub fn require_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    for name in names {
        column(df, name)?;
    }
    Ok(())
}

/// Read a `Date` column as optional calendar dates.
pub fn date_values(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>> {
    let days = column(df, name)?.cast(&DataType::Int32)?;
    days.i32()?
        .into_iter()
        .map(|d| d.map(days_to_date).transpose())
        .collect()
}

/// Read a numeric column as optional `i64` values.
pub fn i64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let values = column(df, name)?.cast(&DataType::Int64)?;
    Ok(values.i64()?.into_iter().collect())
}

/// Read a numeric column as optional `f64` values.
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let values = column(df, name)?.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

/// Read a boolean column as optional flags.
pub fn bool_values(df: &DataFrame, name: &str) -> Result<Vec<Option<bool>>> {
    let values = column(df, name)?.cast(&DataType::Boolean)?;
    Ok(values.bool()?.into_iter().collect())
}

/// Read a string column as optional owned strings.
pub fn str_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let values = column(df, name)?.cast(&DataType::String)?;
    Ok(values
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_round_trip() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(date_to_days(epoch), 0);
        assert_eq!(days_to_date(0).unwrap(), epoch);

        let date = NaiveDate::from_ymd_opt(2014, 3, 10).unwrap();
        assert_eq!(days_to_date(date_to_days(date)).unwrap(), date);
    }

    #[test]
    fn test_date_column_values() {
        let dates = [
            Some(NaiveDate::from_ymd_opt(2013, 1, 1).unwrap()),
            None,
            Some(NaiveDate::from_ymd_opt(2015, 7, 31).unwrap()),
        ];
        let df = DataFrame::new(vec![opt_date_column("date", &dates).unwrap()]).unwrap();

        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
        assert_eq!(date_values(&df, "date").unwrap(), dates.to_vec());
    }

    #[test]
    fn test_date_lit_filter() {
        let dates = [
            NaiveDate::from_ymd_opt(2014, 3, 9).unwrap(),
            NaiveDate::from_ymd_opt(2014, 3, 10).unwrap(),
            NaiveDate::from_ymd_opt(2014, 3, 11).unwrap(),
        ];
        let df = DataFrame::new(vec![date_column("date", &dates).unwrap()]).unwrap();
        let filtered = df
            .lazy()
            .filter(col("date").gt_eq(date_lit(dates[1])))
            .collect()
            .unwrap();
        assert_eq!(filtered.height(), 2);
    }

    #[test]
    fn test_missing_column() {
        let df = DataFrame::new(vec![Series::new("sales".into(), [1i64, 2]).into()]).unwrap();
        assert!(require_columns(&df, &["sales"]).is_ok());
        assert!(matches!(
            require_columns(&df, &["sales", "customers"]),
            Err(DataError::MissingColumn(name)) if name == "customers"
        ));
    }
}
