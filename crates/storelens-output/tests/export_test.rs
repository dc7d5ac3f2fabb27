//! Integration tests for profile rendering, export and reports.

use chrono::NaiveDate;
use serde::Serialize;
use storelens_output::{
    ExportFormat, Exporter, ProfileRank, ReportBuilder, StoreProfile,
};

fn profile() -> StoreProfile {
    StoreProfile {
        store: 262,
        store_type: "b".to_string(),
        assortment: "basic".to_string(),
        total_sales: 19_516_842,
        total_customers: 3_204_694,
        avg_sales: Some(20_718.5),
        avg_customers: Some(3402.0),
        spc: Some(6.09),
        ranks: vec![
            ProfileRank {
                metric: "Total sales".to_string(),
                rank: 1,
                cohort_size: 1115,
                value: 19_516_842.0,
            },
            ProfileRank {
                metric: "Sales per customer".to_string(),
                rank: 1041,
                cohort_size: 1115,
                value: 6.09,
            },
        ],
        days_open: 942,
        days_observed: 942,
        renovation: false,
        promo_days: 360,
        state_holiday_days: 19,
        state_holiday_open_days: 17,
        school_holiday_days: 167,
        competition_distance: Some(1180),
        competition_since: NaiveDate::from_ymd_opt(2013, 4, 1),
        promo2: false,
        promo2_since: None,
        promo_interval: None,
    }
}

#[derive(Debug, Serialize)]
struct ImpactRow {
    store: i64,
    since: NaiveDate,
    spc_pct_change: Option<f64>,
}

#[test]
fn test_profile_rendering() {
    let profile = profile();

    let ascii = profile.to_ascii_table();
    assert!(ascii.contains("Store Profile: 262"));
    assert!(ascii.contains("Sales per customer"));
    assert!(ascii.contains("1041"));
    assert!(!ascii.contains("Promo interval"));

    let markdown = profile.to_markdown();
    assert!(markdown.contains("# Store Profile: 262"));
    assert!(markdown.contains("| Metric | Rank | Of | Value |"));
    assert!(markdown.contains("- **Competition distance:** 1180 m"));
    assert!(markdown.contains("- **Open on state holidays:** 17 of 19 days"));
}

#[test]
fn test_profile_export_formats() {
    let profile = profile();

    let csv = profile.export_to_string(ExportFormat::Csv).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("store,field,value"));
    assert!(csv.contains("262,Rank: Total sales,1 of 1115"));

    let json: serde_json::Value =
        serde_json::from_str(&profile.export_to_string(ExportFormat::Json).unwrap()).unwrap();
    assert_eq!(json["store"], 262);
    assert_eq!(json["ranks"][1]["rank"], 1041);
}

#[test]
fn test_record_export_to_file() {
    let rows = vec![
        ImpactRow {
            store: 1,
            since: NaiveDate::from_ymd_opt(2014, 3, 1).unwrap(),
            spc_pct_change: Some(-0.04),
        },
        ImpactRow {
            store: 8,
            since: NaiveDate::from_ymd_opt(2014, 10, 1).unwrap(),
            spc_pct_change: None,
        },
    ];
    let format: ExportFormat = "csv".parse().unwrap();
    let path = std::env::temp_dir().join(format!(
        "storelens_export_test_{}.{}",
        std::process::id(),
        format.extension()
    ));

    rows.export_to_file(&path, format).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(
        written,
        "store,since,spc_pct_change\n1,2014-03-01,-0.04\n8,2014-10-01,\n"
    );
}

#[test]
fn test_report_wraps_records() {
    let report = ReportBuilder::new()
        .subject("store 262")
        .contents_from(&profile())
        .unwrap()
        .build()
        .unwrap();

    let json = report.to_json().unwrap();
    assert!(json.contains("\"subject\": \"store 262\""));
    assert_eq!(report.contents["days_open"], 942);
}
