//! Daily event indicators over the analysis horizon.

use crate::error::{EventError, Result};
use crate::horizon::{AnalysisHorizon, EventKind};
use chrono::NaiveDate;
use polars::prelude::*;
use storelens_data::frame::{date_column, opt_date_column};
use storelens_data::schema::{COMPETITION_DISTANCE, DATE, PROMO_INTERVAL};
use storelens_data::{StoreMeta, StoreMetaTable};

/// One store's event indicator for every day of the horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct EventWindow {
    /// Store id.
    pub store: i64,
    /// Event kind.
    pub kind: EventKind,
    /// Event date.
    pub since: NaiveDate,
    /// Competitor distance in meters, competition only.
    pub distance: Option<i64>,
    /// Promo2 restart months, promo2 only.
    pub promo_interval: Option<String>,
    /// Every day of the horizon.
    pub dates: Vec<NaiveDate>,
    /// 1 from `since` on, 0 before.
    pub indicator: Vec<i32>,
}

impl EventWindow {
    fn new(meta: &StoreMeta, kind: EventKind, since: NaiveDate, horizon: &AnalysisHorizon) -> Self {
        let dates: Vec<NaiveDate> = horizon.days().collect();
        let indicator = dates.iter().map(|day| i32::from(*day >= since)).collect();
        let (distance, promo_interval) = match kind {
            EventKind::Competition => (meta.competition_distance, None),
            EventKind::Promo2 => (None, meta.promo_interval.clone()),
        };

        Self {
            store: meta.store,
            kind,
            since,
            distance,
            promo_interval,
            dates,
            indicator,
        }
    }

    /// Number of days in the window.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the window has no days.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Days on which the event was in effect.
    pub fn active_days(&self) -> usize {
        self.indicator.iter().filter(|flag| **flag == 1).count()
    }

    /// The window as a daily frame: `date`, the indicator, the event date and
    /// the kind-specific metadata.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut frame = DataFrame::new(vec![date_column(DATE, &self.dates)?])?;
        for column in self.columns()? {
            frame.with_column(column)?;
        }
        Ok(frame)
    }

    fn columns(&self) -> Result<Vec<Column>> {
        let n = self.dates.len();
        let mut columns = vec![
            Series::new(self.kind.active_column().into(), self.indicator.clone()).into(),
            opt_date_column(self.kind.since_column(), &vec![Some(self.since); n])?,
        ];
        match self.kind {
            EventKind::Competition => columns.push(
                Series::new(COMPETITION_DISTANCE.into(), vec![self.distance; n]).into(),
            ),
            EventKind::Promo2 => columns.push(
                Series::new(
                    PROMO_INTERVAL.into(),
                    vec![self.promo_interval.as_deref(); n],
                )
                .into(),
            ),
        }
        Ok(columns)
    }
}

/// Build the window of one store's event.
///
/// Returns `None` when the event date is unknown or falls before the horizon,
/// in which case the event counts as active throughout.
///
/// # Errors
///
/// Returns [`EventError::StoreNotFound`] if `meta` has no row for `store`.
pub fn build_event_window(
    store: i64,
    kind: EventKind,
    meta: &StoreMetaTable,
    horizon: &AnalysisHorizon,
) -> Result<Option<EventWindow>> {
    let record = meta.get(store).ok_or(EventError::StoreNotFound(store))?;
    Ok(kind
        .since(record)
        .filter(|since| horizon.is_new_event(*since))
        .map(|since| EventWindow::new(record, kind, since, horizon)))
}

/// Both event kinds of one store merged into a single daily frame.
///
/// Always has a `date` column covering the horizon; the columns of a kind are
/// present only when that kind has a window.
pub fn event_calendar(
    store: i64,
    meta: &StoreMetaTable,
    horizon: &AnalysisHorizon,
) -> Result<DataFrame> {
    let dates: Vec<NaiveDate> = horizon.days().collect();
    let mut calendar = DataFrame::new(vec![date_column(DATE, &dates)?])?;
    for kind in EventKind::ALL {
        if let Some(window) = build_event_window(store, kind, meta, horizon)? {
            for column in window.columns()? {
                calendar.with_column(column)?;
            }
        }
    }
    Ok(calendar)
}
