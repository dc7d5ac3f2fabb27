//! Event kinds and the analysis horizon.

use crate::error::EventError;
use chrono::NaiveDate;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use storelens_data::StoreMeta;
use storelens_data::schema::{COMPETITION_SINCE, PROMO2_SINCE};

/// A dated change in a store's situation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A competitor opened nearby.
    #[display("competition")]
    Competition,
    /// The store joined the promo2 program.
    #[display("promo2")]
    Promo2,
}

impl EventKind {
    /// Both kinds.
    pub const ALL: [Self; 2] = [Self::Competition, Self::Promo2];

    /// The store's event date, if known.
    pub const fn since(&self, meta: &StoreMeta) -> Option<NaiveDate> {
        match self {
            Self::Competition => meta.competition_since,
            Self::Promo2 => meta.promo2_since,
        }
    }

    /// Column of the joined table holding the event date.
    pub const fn since_column(&self) -> &'static str {
        match self {
            Self::Competition => COMPETITION_SINCE,
            Self::Promo2 => PROMO2_SINCE,
        }
    }

    /// Column holding the 0/1 event indicator.
    pub const fn active_column(&self) -> &'static str {
        match self {
            Self::Competition => "competition_active",
            Self::Promo2 => "promo2_active",
        }
    }
}

impl FromStr for EventKind {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "competition" => Ok(Self::Competition),
            "promo2" => Ok(Self::Promo2),
            _ => Err(EventError::InvalidKind(s.to_string())),
        }
    }
}

/// The span covered by the daily records.
///
/// Events dated on or after `start` are new events; older ones were active
/// for the whole span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisHorizon {
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
}

impl Default for AnalysisHorizon {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2013, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2015, 7, 31).unwrap_or_default(),
        }
    }
}

impl AnalysisHorizon {
    /// Whether an event dated `since` happened inside the horizon.
    pub fn is_new_event(&self, since: NaiveDate) -> bool {
        since >= self.start
    }

    /// Whether `date` lies in the horizon.
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }

    /// Every day of the horizon in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(|day| *day <= self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_horizon() {
        let horizon = AnalysisHorizon::default();
        assert_eq!(horizon.days().count(), 942);
        assert!(horizon.contains(NaiveDate::from_ymd_opt(2015, 7, 31).unwrap()));
        assert!(!horizon.contains(NaiveDate::from_ymd_opt(2015, 8, 1).unwrap()));
    }

    #[rstest]
    #[case(2012, 12, 31, false)]
    #[case(2013, 1, 1, true)]
    #[case(2016, 1, 1, true)]
    fn test_is_new_event(#[case] y: i32, #[case] m: u32, #[case] d: u32, #[case] new: bool) {
        let since = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(AnalysisHorizon::default().is_new_event(since), new);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("Promo2".parse::<EventKind>().unwrap(), EventKind::Promo2);
        assert!(matches!(
            "refit".parse::<EventKind>(),
            Err(EventError::InvalidKind(kind)) if kind == "refit"
        ));
    }
}
