#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/storelens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod profile;
pub mod report;

pub use export::{ExportError, ExportFormat, Exporter};
pub use profile::{ProfileRank, StoreProfile};
pub use report::{Report, ReportBuilder, ReportError};
