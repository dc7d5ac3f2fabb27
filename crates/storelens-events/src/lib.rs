#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/storelens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod horizon;
pub mod impact;
pub mod weekly;
pub mod window;

pub use error::{EventError, Result};
pub use horizon::{AnalysisHorizon, EventKind};
pub use impact::{ImpactConfig, ImpactMetric, ImpactRecord, ImpactTable, Segment, compute_impact};
pub use weekly::{WeeklyConfig, weekly_store_series};
pub use window::{EventWindow, build_event_window, event_calendar};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
