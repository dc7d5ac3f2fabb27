//! Per-store metadata.
//!
//! The source spreads the competition opening over a month and a year column
//! and the promo2 start over a week and a year column. The loader assembles
//! both into dates. Those parts are frequently missing or nonsensical, so a
//! pair that does not form a date becomes null rather than an error.

use crate::config::{LoadConfig, WeekConvention};
use crate::error::{DataError, Result};
use crate::frame::opt_date_column;
use crate::parse;
use crate::schema::{
    ASSORTMENT, COMPETITION_DISTANCE, COMPETITION_SINCE, PROMO_INTERVAL, PROMO2, PROMO2_SINCE,
    STORE, STORE_TYPE,
};
use chrono::NaiveDate;
use derive_more::Display;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Assortment level of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Assortment {
    /// Code `a`
    #[display("basic")]
    Basic,
    /// Code `b`
    #[display("extra")]
    Extra,
    /// Code `c`
    #[display("extended")]
    Extended,
}

impl Assortment {
    /// Map a source code (`a`, `b`, `c`) to its level.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "a" => Some(Self::Basic),
            "b" => Some(Self::Extra),
            "c" => Some(Self::Extended),
            _ => None,
        }
    }

    /// Full name of the level.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Extra => "extra",
            Self::Extended => "extended",
        }
    }
}

/// Static attributes of one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMeta {
    /// Store id.
    pub store: i64,
    /// Store type code.
    pub store_type: String,
    /// Assortment level.
    pub assortment: Assortment,
    /// Distance to the nearest competitor in meters.
    pub competition_distance: Option<i64>,
    /// First day of the month the nearest competitor opened.
    pub competition_since: Option<NaiveDate>,
    /// Whether the store takes part in promo2.
    pub promo2: bool,
    /// Sunday of the week the store joined promo2.
    pub promo2_since: Option<NaiveDate>,
    /// Months in which promo2 restarts, e.g. `Jan,Apr,Jul,Oct`.
    pub promo_interval: Option<String>,
}

/// Raw CSV row, before type conversion.
#[derive(Debug, Deserialize)]
struct RawStoreMeta {
    #[serde(rename = "Store")]
    store: String,
    #[serde(rename = "StoreType")]
    store_type: String,
    #[serde(rename = "Assortment")]
    assortment: String,
    #[serde(rename = "CompetitionDistance")]
    competition_distance: String,
    #[serde(rename = "CompetitionOpenSinceMonth")]
    competition_open_since_month: String,
    #[serde(rename = "CompetitionOpenSinceYear")]
    competition_open_since_year: String,
    #[serde(rename = "Promo2")]
    promo2: String,
    #[serde(rename = "Promo2SinceWeek")]
    promo2_since_week: String,
    #[serde(rename = "Promo2SinceYear")]
    promo2_since_year: String,
    #[serde(rename = "PromoInterval")]
    promo_interval: String,
}

impl RawStoreMeta {
    fn parse(self, line: u64, config: &LoadConfig) -> Result<StoreMeta> {
        let code = self.assortment.trim();
        let assortment = Assortment::from_code(code).ok_or_else(|| {
            DataError::parse(line, "Assortment", format!("unknown assortment code '{code}'"))
        })?;

        let store_type = self.store_type.trim();
        if store_type.is_empty() {
            return Err(DataError::parse(line, "StoreType", "empty store type"));
        }

        Ok(StoreMeta {
            store: parse::int(line, "Store", &self.store)?,
            store_type: store_type.to_string(),
            assortment,
            competition_distance: parse::opt_int(
                line,
                "CompetitionDistance",
                &self.competition_distance,
            )?,
            competition_since: competition_since(
                &self.competition_open_since_month,
                &self.competition_open_since_year,
            ),
            promo2: parse::flag(line, "Promo2", &self.promo2)?,
            promo2_since: promo2_since(
                &self.promo2_since_week,
                &self.promo2_since_year,
                config.week_convention,
            ),
            promo_interval: parse::opt_text(&self.promo_interval),
        })
    }
}

/// First day of the given month, or `None` if either part is missing or invalid.
pub fn competition_since(month: &str, year: &str) -> Option<NaiveDate> {
    let month = u32::try_from(parse::lenient_int(month)?).ok()?;
    let year = i32::try_from(parse::lenient_int(year)?).ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Sunday closing the given week, or `None` if either part is missing or invalid.
pub fn promo2_since(week: &str, year: &str, convention: WeekConvention) -> Option<NaiveDate> {
    let week = u32::try_from(parse::lenient_int(week)?).ok()?;
    let year = i32::try_from(parse::lenient_int(year)?).ok()?;
    convention.week_ending(year, week)
}

/// Store metadata with lookup by id.
#[derive(Debug, Clone, Default)]
pub struct StoreMetaTable {
    records: Vec<StoreMeta>,
    index: HashMap<i64, usize>,
}

impl StoreMetaTable {
    /// Build a table from typed rows, sorted by store id.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::DuplicateStore`] if a store id repeats.
    pub fn from_records(mut records: Vec<StoreMeta>) -> Result<Self> {
        records.sort_by_key(|r| r.store);
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if index.insert(record.store, position).is_some() {
                return Err(DataError::DuplicateStore(record.store));
            }
        }
        Ok(Self { records, index })
    }

    /// Metadata of one store.
    pub fn get(&self, store: i64) -> Option<&StoreMeta> {
        self.index.get(&store).map(|&i| &self.records[i])
    }

    /// Whether the table knows this store.
    pub fn contains(&self, store: i64) -> bool {
        self.index.contains_key(&store)
    }

    /// All rows in store order.
    pub fn records(&self) -> &[StoreMeta] {
        &self.records
    }

    /// Iterate over rows in store order.
    pub fn iter(&self) -> impl Iterator<Item = &StoreMeta> {
        self.records.iter()
    }

    /// Number of stores.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render the table as a frame with the metadata columns.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let rows = &self.records;
        let competition_since: Vec<Option<NaiveDate>> =
            rows.iter().map(|r| r.competition_since).collect();
        let promo2_since: Vec<Option<NaiveDate>> = rows.iter().map(|r| r.promo2_since).collect();

        let frame = DataFrame::new(vec![
            Series::new(STORE.into(), rows.iter().map(|r| r.store).collect::<Vec<_>>()).into(),
            Series::new(
                STORE_TYPE.into(),
                rows.iter().map(|r| r.store_type.as_str()).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                ASSORTMENT.into(),
                rows.iter().map(|r| r.assortment.name()).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                COMPETITION_DISTANCE.into(),
                rows.iter()
                    .map(|r| r.competition_distance)
                    .collect::<Vec<_>>(),
            )
            .into(),
            opt_date_column(COMPETITION_SINCE, &competition_since)?,
            Series::new(PROMO2.into(), rows.iter().map(|r| r.promo2).collect::<Vec<_>>()).into(),
            opt_date_column(PROMO2_SINCE, &promo2_since)?,
            Series::new(
                PROMO_INTERVAL.into(),
                rows.iter()
                    .map(|r| r.promo_interval.as_deref())
                    .collect::<Vec<_>>(),
            )
            .into(),
        ])?;

        Ok(frame)
    }
}

/// Parse store metadata from any CSV source.
///
/// # Errors
///
/// Fails with [`DataError::Parse`] when a required field is malformed and with
/// [`DataError::DuplicateStore`] on a repeated store id. Malformed date parts
/// do not fail the load.
pub fn load_store_meta<R: Read>(source: R, config: &LoadConfig) -> Result<StoreMetaTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);
    let headers = reader.headers().map_err(parse::row_error)?.clone();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(parse::row_error)?;
        let line = record.position().map_or(0, csv::Position::line);
        let raw: RawStoreMeta = record
            .deserialize(Some(&headers))
            .map_err(|e| DataError::parse(line, "<row>", e.to_string()))?;
        records.push(raw.parse(line, config)?);
    }

    let table = StoreMetaTable::from_records(records)?;
    tracing::debug!(stores = table.len(), "loaded store metadata");
    Ok(table)
}

/// Parse store metadata from a CSV file.
pub fn load_store_meta_from_path<P: AsRef<Path>>(
    path: P,
    config: &LoadConfig,
) -> Result<StoreMetaTable> {
    let file = File::open(path.as_ref())?;
    load_store_meta(file, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const HEADER: &str = "Store,StoreType,Assortment,CompetitionDistance,CompetitionOpenSinceMonth,\
                          CompetitionOpenSinceYear,Promo2,Promo2SinceWeek,Promo2SinceYear,PromoInterval\n";

    fn load(body: &str) -> Result<StoreMetaTable> {
        load_store_meta(format!("{HEADER}{body}").as_bytes(), &LoadConfig::default())
    }

    #[test]
    fn test_load_store_rows() {
        let table = load(
            "1,c,a,1270,9,2008,0,,,\n\
             2,a,a,570,11,2007,1,13,2010,\"Jan,Apr,Jul,Oct\"\n\
             3,a,c,14130,12,2006,1,14,2011,\"Jan,Apr,Jul,Oct\"\n",
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        let store = table.get(2).unwrap();
        assert_eq!(store.store_type, "a");
        assert_eq!(store.assortment, Assortment::Basic);
        assert_eq!(store.competition_distance, Some(570));
        assert_eq!(store.competition_since, NaiveDate::from_ymd_opt(2007, 11, 1));
        assert!(store.promo2);
        assert_eq!(store.promo2_since, NaiveDate::from_ymd_opt(2010, 4, 4));
        assert_eq!(store.promo_interval.as_deref(), Some("Jan,Apr,Jul,Oct"));

        let store = table.get(1).unwrap();
        assert!(!store.promo2);
        assert_eq!(store.promo2_since, None);
        assert_eq!(store.promo_interval, None);
        assert_eq!(table.get(3).unwrap().assortment.to_string(), "extended");
    }

    #[rstest]
    #[case("", "2008", None)]
    #[case("9", "", None)]
    #[case("13", "2008", None)]
    #[case("0", "0", None)]
    #[case("x", "2008", None)]
    #[case("9", "2008", NaiveDate::from_ymd_opt(2008, 9, 1))]
    fn test_competition_since(
        #[case] month: &str,
        #[case] year: &str,
        #[case] expected: Option<NaiveDate>,
    ) {
        assert_eq!(competition_since(month, year), expected);
    }

    #[test]
    fn test_missing_distance_is_null_but_garbage_is_error() {
        let table = load("1,a,a,,,,0,,,\n").unwrap();
        let store = table.get(1).unwrap();
        assert_eq!(store.competition_distance, None);
        assert_eq!(store.competition_since, None);

        assert!(matches!(
            load("1,a,a,far,,,0,,,\n"),
            Err(DataError::Parse { ref column, .. }) if column == "CompetitionDistance"
        ));
    }

    #[test]
    fn test_unknown_assortment_rejected() {
        assert!(matches!(
            load("1,a,z,100,,,0,,,\n"),
            Err(DataError::Parse { ref column, .. }) if column == "Assortment"
        ));
    }

    #[test]
    fn test_duplicate_store_rejected() {
        assert!(matches!(
            load("1,a,a,100,,,0,,,\n1,a,a,100,,,0,,,\n"),
            Err(DataError::DuplicateStore(1))
        ));
    }

    #[test]
    fn test_to_frame() {
        let table = load(
            "1,c,a,1270,9,2008,0,,,\n\
             2,a,b,,,,1,13,2010,\"Jan,Apr,Jul,Oct\"\n",
        )
        .unwrap();
        let frame = table.to_frame().unwrap();

        assert_eq!(frame.height(), 2);
        assert_eq!(frame.width(), 8);
        assert_eq!(frame.column(COMPETITION_SINCE).unwrap().null_count(), 1);
        assert_eq!(frame.column(PROMO2_SINCE).unwrap().dtype(), &DataType::Date);
    }
}
