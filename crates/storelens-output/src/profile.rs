//! Store profile: a store's key figures in one place.

use crate::export::{ExportError, ExportFormat, Exporter, to_csv};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A store's position in the cohort on one metric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileRank {
    /// Metric label.
    pub metric: String,
    /// 1-based rank.
    pub rank: usize,
    /// Number of ranked stores.
    pub cohort_size: usize,
    /// Metric value.
    pub value: f64,
}

/// Key figures of one store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreProfile {
    /// Store id.
    pub store: i64,
    /// Store type code.
    pub store_type: String,
    /// Assortment level.
    pub assortment: String,
    /// Summed sales.
    pub total_sales: i64,
    /// Summed customers.
    pub total_customers: i64,
    /// Mean sales per open day.
    pub avg_sales: Option<f64>,
    /// Mean customers per open day.
    pub avg_customers: Option<f64>,
    /// Sales per customer.
    pub spc: Option<f64>,
    /// Cohort ranks.
    pub ranks: Vec<ProfileRank>,
    /// Days the store was open.
    pub days_open: i64,
    /// Days with a record.
    pub days_observed: i64,
    /// Whether the store was closed for refurbishment.
    pub renovation: bool,
    /// Days with a promotion.
    pub promo_days: i64,
    /// Days on a state holiday.
    pub state_holiday_days: i64,
    /// Open days on a state holiday.
    pub state_holiday_open_days: i64,
    /// Days affected by school holidays.
    pub school_holiday_days: i64,
    /// Distance to the nearest competitor in meters.
    pub competition_distance: Option<i64>,
    /// Opening date of the nearest competitor.
    pub competition_since: Option<NaiveDate>,
    /// Whether the store takes part in promo2.
    pub promo2: bool,
    /// Promo2 start.
    pub promo2_since: Option<NaiveDate>,
    /// Promo2 restart months.
    pub promo_interval: Option<String>,
}

fn or_na<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

fn money(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

const fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

impl StoreProfile {
    /// Label/value pairs in display order.
    pub fn fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("Store type".to_string(), self.store_type.clone()),
            ("Assortment".to_string(), self.assortment.clone()),
            ("Total sales".to_string(), self.total_sales.to_string()),
            ("Total customers".to_string(), self.total_customers.to_string()),
            ("Sales per open day".to_string(), money(self.avg_sales)),
            ("Customers per open day".to_string(), money(self.avg_customers)),
            ("Sales per customer".to_string(), money(self.spc)),
            (
                "Days open".to_string(),
                format!("{} of {}", self.days_open, self.days_observed),
            ),
            ("Closed for renovation".to_string(), yes_no(self.renovation).to_string()),
            ("Promo days".to_string(), self.promo_days.to_string()),
            (
                "Open on state holidays".to_string(),
                format!(
                    "{} of {} days",
                    self.state_holiday_open_days, self.state_holiday_days
                ),
            ),
            ("School holidays".to_string(), self.school_holiday_days.to_string()),
            (
                "Competition distance".to_string(),
                self.competition_distance
                    .map_or_else(|| "n/a".to_string(), |d| format!("{d} m")),
            ),
            ("Competition since".to_string(), or_na(self.competition_since)),
            ("Promo2".to_string(), yes_no(self.promo2).to_string()),
        ];
        if self.promo2 {
            fields.push(("Promo2 since".to_string(), or_na(self.promo2_since)));
            fields.push((
                "Promo interval".to_string(),
                or_na(self.promo_interval.as_deref()),
            ));
        }
        fields
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nStore Profile: {}\n", self.store));
        output.push_str(&"=".repeat(80));
        output.push('\n');

        for (label, value) in self.fields() {
            output.push_str(&format!("  {:<28}{}\n", format!("{label}:"), value));
        }

        if !self.ranks.is_empty() {
            output.push_str("\nCohort Ranks:\n");
            output.push_str(&"-".repeat(80));
            output.push('\n');
            output.push_str(&format!(
                "{:<30} {:>10} {:>12} {:>16}\n",
                "Metric", "Rank", "Of", "Value"
            ));
            output.push_str(&"-".repeat(80));
            output.push('\n');
            for rank in &self.ranks {
                output.push_str(&format!(
                    "{:<30} {:>10} {:>12} {:>16.2}\n",
                    rank.metric, rank.rank, rank.cohort_size, rank.value
                ));
            }
        }

        output.push_str(&"=".repeat(80));
        output.push('\n');

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Store Profile: {}\n\n", self.store));
        for (label, value) in self.fields() {
            output.push_str(&format!("- **{label}:** {value}\n"));
        }
        output.push('\n');

        if !self.ranks.is_empty() {
            output.push_str("## Cohort Ranks\n\n");
            output.push_str("| Metric | Rank | Of | Value |\n");
            output.push_str("|--------|------|----|-------|\n");
            for rank in &self.ranks {
                output.push_str(&format!(
                    "| {} | {} | {} | {:.2} |\n",
                    rank.metric, rank.rank, rank.cohort_size, rank.value
                ));
            }
        }

        output
    }
}

impl fmt::Display for StoreProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Store {} (type {}, {})",
            self.store, self.store_type, self.assortment
        )?;
        writeln!(f, "  Total sales: {}", self.total_sales)?;
        writeln!(f, "  Sales per customer: {}", money(self.spc))?;
        writeln!(f, "  Days open: {} of {}", self.days_open, self.days_observed)?;
        Ok(())
    }
}

/// One label/value line of a profile in CSV form.
#[derive(Debug, Serialize)]
struct ProfileLine {
    store: i64,
    field: String,
    value: String,
}

impl Exporter for StoreProfile {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut lines: Vec<ProfileLine> = self
                    .fields()
                    .into_iter()
                    .map(|(field, value)| ProfileLine {
                        store: self.store,
                        field,
                        value,
                    })
                    .collect();
                lines.extend(self.ranks.iter().map(|rank| ProfileLine {
                    store: self.store,
                    field: format!("Rank: {}", rank.metric),
                    value: format!("{} of {}", rank.rank, rank.cohort_size),
                }));
                to_csv(&lines)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(promo2: bool) -> StoreProfile {
        StoreProfile {
            store: 1,
            store_type: "c".to_string(),
            assortment: "basic".to_string(),
            total_sales: 3_716_854,
            total_customers: 440_523,
            avg_sales: Some(4759.1),
            avg_customers: Some(564.05),
            spc: Some(8.437),
            ranks: vec![ProfileRank {
                metric: "Total sales".to_string(),
                rank: 584,
                cohort_size: 1115,
                value: 3_716_854.0,
            }],
            days_open: 781,
            days_observed: 942,
            renovation: false,
            promo_days: 360,
            state_holiday_days: 17,
            state_holiday_open_days: 0,
            school_holiday_days: 193,
            competition_distance: Some(1270),
            competition_since: NaiveDate::from_ymd_opt(2008, 9, 1),
            promo2,
            promo2_since: promo2.then(|| NaiveDate::from_ymd_opt(2013, 3, 31).unwrap()),
            promo_interval: promo2.then(|| "Jan,Apr,Jul,Oct".to_string()),
        }
    }

    #[test]
    fn test_ascii_table() {
        let table = profile(false).to_ascii_table();
        assert!(table.contains("Store Profile: 1"));
        assert!(table.contains("Days open:"));
        assert!(table.contains("781 of 942"));
        assert!(table.contains("Open on state holidays:     0 of 17 days"));
        assert!(table.contains("1270 m"));
        assert!(table.contains("Cohort Ranks"));
        assert!(!table.contains("Promo2 since"));
    }

    #[test]
    fn test_markdown_lists_promo2_details_when_active() {
        let md = profile(true).to_markdown();
        assert!(md.starts_with("# Store Profile: 1"));
        assert!(md.contains("- **Promo2 since:** 2013-03-31"));
        assert!(md.contains("| Total sales | 584 | 1115 |"));
    }

    #[test]
    fn test_profile_exports() {
        let csv = profile(true).export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.starts_with("store,field,value"));
        assert!(csv.contains("Rank: Total sales,584 of 1115"));

        let json = profile(true).export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"promo_interval\":\"Jan,Apr,Jul,Oct\""));
    }
}
