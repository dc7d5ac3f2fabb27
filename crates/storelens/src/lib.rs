#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/storelens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use storelens_data as data;
pub use storelens_events as events;
pub use storelens_metrics as metrics;
pub use storelens_output as output;

pub mod config;
pub mod dataset;
pub mod error;
pub mod profile;

pub use config::AnalysisConfig;
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use profile::build_profile;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
