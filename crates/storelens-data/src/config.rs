//! Loader configuration.

use chrono::{Datelike, NaiveDate, TimeDelta, Weekday};
use serde::{Deserialize, Serialize};

/// How a (week, year) pair is turned into a calendar date.
///
/// Both conventions resolve to the Sunday that closes the week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekConvention {
    /// ISO-8601 weeks: week 1 contains the year's first Thursday.
    #[default]
    Iso,
    /// strftime `%W` weeks: week 1 starts on the year's first Monday,
    /// week 0 holds the days before it.
    MondayFirst,
}

impl WeekConvention {
    /// Sunday closing `week` of `year`, or `None` if the pair is not a valid week.
    pub fn week_ending(self, year: i32, week: u32) -> Option<NaiveDate> {
        match self {
            Self::Iso => NaiveDate::from_isoywd_opt(year, week, Weekday::Sun),
            Self::MondayFirst => {
                if week > 53 {
                    return None;
                }
                let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
                let to_monday = (7 - jan1.weekday().num_days_from_monday()) % 7;
                let first_monday = jan1.checked_add_signed(TimeDelta::days(i64::from(to_monday)))?;
                first_monday.checked_add_signed(TimeDelta::days(7 * i64::from(week) - 1))
            }
        }
    }
}

/// Configuration for the CSV loaders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// chrono format string of the daily `Date` column (default: `%Y-%m-%d`)
    pub date_format: String,
    /// Week numbering used for the promo2 start date (default: ISO)
    pub week_convention: WeekConvention,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d".to_string(),
            week_convention: WeekConvention::Iso,
        }
    }
}
