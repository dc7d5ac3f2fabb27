//! Integration tests for the CSV loaders.

use chrono::NaiveDate;
use storelens_data::frame::{date_values, i64_values};
use storelens_data::schema::{DAILY_COLUMNS, SALES, STORE_META_COLUMNS};
use storelens_data::{
    DataError, LoadConfig, WeekConvention, load_daily_records, load_daily_records_from_path,
    load_store_meta,
};

const DAILY: &str = "\
Store,DayOfWeek,Date,Sales,Customers,Open,Promo,StateHoliday,SchoolHoliday
1,5,2015-07-31,5263,555,1,1,0,1
2,5,2015-07-31,6064,625,1,1,0,1
1,4,2015-07-30,5020,546,1,1,0,1
2,4,2015-07-30,5567,601,1,1,0,1
1,3,2015-07-29,0,0,0,0,a,1
";

const STORES: &str = "\
Store,StoreType,Assortment,CompetitionDistance,CompetitionOpenSinceMonth,CompetitionOpenSinceYear,Promo2,Promo2SinceWeek,Promo2SinceYear,PromoInterval
1,c,a,1270,9,2008,0,,,
2,a,a,570,11,2007,1,13,2010,\"Jan,Apr,Jul,Oct\"
";

#[test]
fn test_daily_table_shape() {
    let table = load_daily_records(DAILY.as_bytes(), &LoadConfig::default()).unwrap();

    let names: Vec<String> = table
        .frame()
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(names, DAILY_COLUMNS.map(String::from).to_vec());
    assert_eq!(table.len(), 5);

    let store_one = table.store_rows(1).unwrap();
    assert_eq!(store_one.height(), 3);
    assert_eq!(
        i64_values(&store_one, SALES).unwrap(),
        vec![Some(0), Some(5020), Some(5263)]
    );
}

#[test]
fn test_store_meta_frame_columns() {
    let table = load_store_meta(STORES.as_bytes(), &LoadConfig::default()).unwrap();
    let frame = table.to_frame().unwrap();

    let names: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(names, STORE_META_COLUMNS.map(String::from).to_vec());
}

#[test]
fn test_week_convention_changes_promo2_since() {
    let body = format!("{STORES}3,a,c,14130,12,2006,1,1,2013,\"Jan,Apr,Jul,Oct\"\n");
    let iso = load_store_meta(body.as_bytes(), &LoadConfig::default()).unwrap();
    let config = LoadConfig {
        week_convention: WeekConvention::MondayFirst,
        ..Default::default()
    };
    let monday_first = load_store_meta(body.as_bytes(), &config).unwrap();

    // 2010 starts on a Friday, so both conventions agree
    assert_eq!(
        iso.get(2).unwrap().promo2_since,
        monday_first.get(2).unwrap().promo2_since
    );
    // 2013 starts on a Tuesday: ISO week 1 ends Jan 6, %W week 1 ends Jan 13
    assert_eq!(
        iso.get(3).unwrap().promo2_since,
        NaiveDate::from_ymd_opt(2013, 1, 6)
    );
    assert_eq!(
        monday_first.get(3).unwrap().promo2_since,
        NaiveDate::from_ymd_opt(2013, 1, 13)
    );
}

#[test]
fn test_custom_date_format() {
    let body = "\
Store,DayOfWeek,Date,Sales,Customers,Open,Promo,StateHoliday,SchoolHoliday
1,5,31.07.2015,5263,555,1,1,0,1
";
    let config = LoadConfig {
        date_format: "%d.%m.%Y".to_string(),
        ..Default::default()
    };
    let table = load_daily_records(body.as_bytes(), &config).unwrap();
    assert_eq!(
        date_values(table.frame(), "date").unwrap(),
        vec![NaiveDate::from_ymd_opt(2015, 7, 31)]
    );
}

#[test]
fn test_missing_header_column_is_parse_error() {
    let body = "Store,DayOfWeek,Date,Sales\n1,5,2015-07-31,5263\n";
    assert!(matches!(
        load_daily_records(body.as_bytes(), &LoadConfig::default()),
        Err(DataError::Parse { line: 2, .. })
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let result = load_daily_records_from_path("/nonexistent/train.csv", &LoadConfig::default());
    assert!(matches!(result, Err(DataError::Io(_))));
}
