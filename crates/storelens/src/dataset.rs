//! The loaded tables and every analysis on them.

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::profile::build_profile;
use polars::prelude::DataFrame;
use std::path::Path;
use storelens_data::schema::SALES;
use storelens_data::{DailyTable, StoreMetaTable, load_daily_records_from_path, load_store_meta_from_path};
use storelens_events::{
    EventKind, EventWindow, ImpactTable, build_event_window, compute_impact, weekly_store_series,
};
use storelens_metrics::{
    CohortMetric, CohortRank, CombinedTable, Frequency, augment_with_metrics, group_summary, join,
    rank_all, rank_store, rolling_means, store_aggregates, timeline,
};
use storelens_output::StoreProfile;

/// Daily records, store metadata and their join, built once.
#[derive(Debug, Clone)]
pub struct Dataset {
    daily: DailyTable,
    meta: StoreMetaTable,
    combined: CombinedTable,
    config: AnalysisConfig,
}

impl Dataset {
    /// Load both CSV files and join them.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        daily_path: P,
        stores_path: Q,
        config: AnalysisConfig,
    ) -> Result<Self> {
        let daily = load_daily_records_from_path(daily_path, &config.load)?;
        let meta = load_store_meta_from_path(stores_path, &config.load)?;
        tracing::info!(
            rows = daily.len(),
            stores = meta.len(),
            "loaded daily records and store metadata"
        );
        Self::from_tables(daily, meta, config)
    }

    /// Join already loaded tables.
    pub fn from_tables(
        daily: DailyTable,
        meta: StoreMetaTable,
        config: AnalysisConfig,
    ) -> Result<Self> {
        let combined = join(&daily, &meta, config.join_policy)?;
        Ok(Self {
            daily,
            meta,
            combined,
            config,
        })
    }

    /// Daily records as loaded.
    pub const fn daily(&self) -> &DailyTable {
        &self.daily
    }

    /// Store metadata as loaded.
    pub const fn meta(&self) -> &StoreMetaTable {
        &self.meta
    }

    /// The joined table.
    pub const fn combined(&self) -> &CombinedTable {
        &self.combined
    }

    /// Settings in effect.
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// One store's joined rows with the derived metric columns.
    pub fn store_frame(&self, store: i64) -> Result<DataFrame> {
        Ok(augment_with_metrics(&self.combined.store_rows(store)?)?)
    }

    /// Totals, day counts and metadata of one store, with cohort ranks.
    pub fn profile(&self, store: i64) -> Result<StoreProfile> {
        build_profile(store, self.combined.frame(), &self.meta)
    }

    /// One row per store.
    pub fn aggregates(&self) -> Result<DataFrame> {
        Ok(store_aggregates(self.combined.frame())?)
    }

    /// Grouped means and totals, over all rows or open days only.
    pub fn summary(&self, by: &[&str], open_only: bool) -> Result<DataFrame> {
        let summary = if open_only {
            group_summary(&self.combined.open_days()?, by)?
        } else {
            group_summary(self.combined.frame(), by)?
        };
        Ok(summary)
    }

    /// Chain-wide sales and customers per period.
    pub fn timeline(&self, frequency: Frequency) -> Result<DataFrame> {
        Ok(timeline(self.combined.frame(), frequency)?)
    }

    /// Rank `store` on one metric.
    pub fn rank(&self, store: i64, metric: CohortMetric) -> Result<CohortRank> {
        Ok(rank_store(store, self.combined.frame(), metric)?)
    }

    /// Rank `store` on every metric it has a value for.
    pub fn rank_all(&self, store: i64) -> Result<Vec<CohortRank>> {
        Ok(rank_all(store, self.combined.frame())?)
    }

    /// Before/after comparison of every store with a new `kind` event.
    pub fn impact(&self, kind: EventKind) -> Result<ImpactTable> {
        Ok(compute_impact(
            self.combined.frame(),
            kind,
            &self.config.impact,
        )?)
    }

    /// Daily indicator of one store's `kind` event, if it has one in the
    /// horizon.
    pub fn event_window(&self, store: i64, kind: EventKind) -> Result<Option<EventWindow>> {
        Ok(build_event_window(
            store,
            kind,
            &self.meta,
            &self.config.impact.horizon,
        )?)
    }

    /// Weekly series of one store with event state and the configured
    /// moving averages of sales.
    pub fn weekly(&self, store: i64) -> Result<DataFrame> {
        let weekly = weekly_store_series(
            self.combined.frame(),
            &self.meta,
            store,
            &self.config.weekly,
        )?;
        if self.config.rolling_windows.is_empty() {
            return Ok(weekly);
        }
        Ok(rolling_means(&weekly, SALES, &self.config.rolling_windows)?)
    }
}
