//! Analysis settings.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use storelens_data::LoadConfig;
use storelens_events::{ImpactConfig, WeeklyConfig};
use storelens_metrics::JoinPolicy;

/// Every tunable of a [`Dataset`](crate::Dataset).
///
/// Missing fields of a JSON file fall back to their defaults:
///
/// ```json
/// {
///   "load": { "week_convention": "monday_first" },
///   "join_policy": "drop_unmatched",
///   "impact": { "min_days": 30 },
///   "rolling_windows": [4, 13]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// CSV parsing.
    pub load: LoadConfig,
    /// Handling of daily records without store metadata.
    pub join_policy: JoinPolicy,
    /// Impact table settings.
    pub impact: ImpactConfig,
    /// Weekly series settings.
    pub weekly: WeeklyConfig,
    /// Moving-average windows applied to weekly sales.
    pub rolling_windows: Vec<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            load: LoadConfig::default(),
            join_policy: JoinPolicy::default(),
            impact: ImpactConfig::default(),
            weekly: WeeklyConfig::default(),
            rolling_windows: vec![4, 13],
        }
    }
}

impl AnalysisConfig {
    /// Read settings from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&text).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }
}
