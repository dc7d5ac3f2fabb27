#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/storelens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod daily;
pub mod error;
pub mod frame;
mod parse;
pub mod schema;
pub mod store;

pub use config::{LoadConfig, WeekConvention};
pub use daily::{DailyRecord, DailyTable, load_daily_records, load_daily_records_from_path};
pub use error::{DataError, Result};
pub use store::{
    Assortment, StoreMeta, StoreMetaTable, load_store_meta, load_store_meta_from_path,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
