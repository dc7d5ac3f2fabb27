//! Daily transaction records.
//!
//! One row per store and calendar day. The loader validates every field,
//! rejects duplicate `(store, date)` keys and returns the rows sorted by store
//! then date, with the derived `is_holiday` flag attached.

use crate::config::LoadConfig;
use crate::error::{DataError, Result};
use crate::frame::{column, date_column, i64_values};
use crate::parse;
use crate::schema::{
    CUSTOMERS, DATE, DAY_OF_WEEK, IS_HOLIDAY, OPEN, PROMO, SALES, SCHOOL_HOLIDAY, STATE_HOLIDAY,
    STORE,
};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// State holiday code meaning "no holiday".
pub const NO_STATE_HOLIDAY: &str = "0";

/// A single store-day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Store id.
    pub store: i64,
    /// Calendar date.
    pub date: NaiveDate,
    /// Day of week, 1 = Monday through 7 = Sunday.
    pub day_of_week: i64,
    /// Sales amount in currency units.
    pub sales: i64,
    /// Number of customers.
    pub customers: i64,
    /// Whether the store was open.
    pub open: bool,
    /// Whether a daily promotion ran.
    pub promo: bool,
    /// State holiday code, `"0"` for none.
    pub state_holiday: String,
    /// Whether schools were on holiday.
    pub school_holiday: bool,
}

impl DailyRecord {
    /// Whether the day is a state holiday of any kind.
    pub fn is_holiday(&self) -> bool {
        self.state_holiday != NO_STATE_HOLIDAY
    }
}

/// Raw CSV row, before type conversion.
#[derive(Debug, Deserialize)]
struct RawDailyRecord {
    #[serde(rename = "Store")]
    store: String,
    #[serde(rename = "DayOfWeek")]
    day_of_week: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Sales")]
    sales: String,
    #[serde(rename = "Customers")]
    customers: String,
    #[serde(rename = "Open")]
    open: String,
    #[serde(rename = "Promo")]
    promo: String,
    #[serde(rename = "StateHoliday")]
    state_holiday: String,
    #[serde(rename = "SchoolHoliday")]
    school_holiday: String,
}

impl RawDailyRecord {
    fn parse(self, line: u64, config: &LoadConfig) -> Result<DailyRecord> {
        let day_of_week = parse::int(line, "DayOfWeek", &self.day_of_week)?;
        if !(1..=7).contains(&day_of_week) {
            return Err(DataError::parse(
                line,
                "DayOfWeek",
                format!("{day_of_week} is outside 1..=7"),
            ));
        }

        let state_holiday = self.state_holiday.trim();
        if state_holiday.is_empty() {
            return Err(DataError::parse(line, "StateHoliday", "empty holiday code"));
        }

        Ok(DailyRecord {
            store: parse::int(line, "Store", &self.store)?,
            date: parse::date(line, "Date", &self.date, &config.date_format)?,
            day_of_week,
            sales: parse::int(line, "Sales", &self.sales)?,
            customers: parse::int(line, "Customers", &self.customers)?,
            open: parse::flag(line, "Open", &self.open)?,
            promo: parse::flag(line, "Promo", &self.promo)?,
            state_holiday: state_holiday.to_string(),
            school_holiday: parse::flag(line, "SchoolHoliday", &self.school_holiday)?,
        })
    }
}

/// Daily records as a frame, unique on `(store, date)` and sorted by store then date.
#[derive(Debug, Clone)]
pub struct DailyTable {
    frame: DataFrame,
}

impl DailyTable {
    /// Build a table from typed records.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::DuplicateKey`] if two records share a store and date.
    pub fn from_records(mut records: Vec<DailyRecord>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert((record.store, record.date)) {
                return Err(DataError::DuplicateKey {
                    store: record.store,
                    date: record.date,
                });
            }
        }
        records.sort_by_key(|r| (r.store, r.date));

        let dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
        let frame = DataFrame::new(vec![
            Series::new(STORE.into(), records.iter().map(|r| r.store).collect::<Vec<_>>()).into(),
            date_column(DATE, &dates)?,
            Series::new(
                DAY_OF_WEEK.into(),
                records.iter().map(|r| r.day_of_week).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(SALES.into(), records.iter().map(|r| r.sales).collect::<Vec<_>>()).into(),
            Series::new(
                CUSTOMERS.into(),
                records.iter().map(|r| r.customers).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(OPEN.into(), records.iter().map(|r| r.open).collect::<Vec<_>>()).into(),
            Series::new(PROMO.into(), records.iter().map(|r| r.promo).collect::<Vec<_>>()).into(),
            Series::new(
                STATE_HOLIDAY.into(),
                records
                    .iter()
                    .map(|r| r.state_holiday.as_str())
                    .collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                SCHOOL_HOLIDAY.into(),
                records.iter().map(|r| r.school_holiday).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                IS_HOLIDAY.into(),
                records.iter().map(DailyRecord::is_holiday).collect::<Vec<_>>(),
            )
            .into(),
        ])?;

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

    /// Distinct store ids, ascending.
    pub fn store_ids(&self) -> Result<Vec<i64>> {
        let mut ids: Vec<i64> = i64_values(&self.frame, STORE)?.into_iter().flatten().collect();
        ids.dedup();
        Ok(ids)
    }

    /// Rows of a single store, in date order.
    pub fn store_rows(&self, store: i64) -> Result<DataFrame> {
        column(&self.frame, STORE)?;
        Ok(self
            .frame
            .clone()
            .lazy()
            .filter(col(STORE).eq(lit(store)))
            .collect()?)
    }
}

/// Parse daily records from any CSV source.
///
/// # Errors
///
/// Fails with [`DataError::Parse`] on the first malformed row and with
/// [`DataError::DuplicateKey`] on a repeated `(store, date)`. Nothing is
/// returned on failure.
pub fn load_daily_records<R: Read>(source: R, config: &LoadConfig) -> Result<DailyTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);
    let headers = reader.headers().map_err(parse::row_error)?.clone();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(parse::row_error)?;
        let line = record.position().map_or(0, csv::Position::line);
        let raw: RawDailyRecord = record
            .deserialize(Some(&headers))
            .map_err(|e| DataError::parse(line, "<row>", e.to_string()))?;
        records.push(raw.parse(line, config)?);
    }

    let table = DailyTable::from_records(records)?;
    tracing::debug!(rows = table.len(), "loaded daily records");
    Ok(table)
}

/// Parse daily records from a CSV file.
pub fn load_daily_records_from_path<P: AsRef<Path>>(
    path: P,
    config: &LoadConfig,
) -> Result<DailyTable> {
    let file = File::open(path.as_ref())?;
    load_daily_records(file, config)
}
