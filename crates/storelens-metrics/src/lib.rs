#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/storelens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod error;
pub mod join;
pub mod metrics;
pub mod rank;
pub mod resample;
pub mod rolling;

pub use aggregate::{RenovationProbe, group_summary, store_aggregates};
pub use error::{MetricsError, Result};
pub use join::{CombinedTable, JoinPolicy, join, open_days, store_slice};
pub use metrics::{
    CUM_CUSTOMERS, CUM_SALES, DIFF_CUSTOMERS, DIFF_SALES, METRIC_COLUMNS, PCT_CHANGE_CUSTOMERS,
    PCT_CHANGE_SALES, SPC, augment_with_metrics,
};
pub use rank::{CohortMetric, CohortRank, CohortTable, cohort_table, rank_all, rank_store};
pub use resample::{Frequency, resample_sum, timeline};
pub use rolling::{rolling_column_name, rolling_means};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
