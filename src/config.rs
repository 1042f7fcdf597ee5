use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CongestionError, Result};
use crate::model::DirectionPolicy;
use crate::reshape::IdColumns;

/// Dashboard settings.
///
/// Stored as a JSON object on disk; every field is optional:
/// ```json
/// {
///   "data_file": "서울교통공사_지하철혼잡도정보_20250930.csv",
///   "direction_policy": { "mode": "keep_all" },
///   "top_n": 5
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub data_file: PathBuf,
    pub id_columns: IdColumns,
    pub direction_policy: DirectionPolicy,
    /// Warn for every time column label that is not `<h>시<m>분`.
    pub warn_on_unmatched_time_labels: bool,
    pub top_n: usize,
    pub large_result_threshold: usize,
    pub compare_result_threshold: usize,
    pub suggestion_limit: usize,
    pub cache_capacity: Option<usize>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("서울교통공사_지하철혼잡도정보_20250930.csv"),
            id_columns: IdColumns::default(),
            direction_policy: DirectionPolicy::default(),
            warn_on_unmatched_time_labels: false,
            top_n: 10,
            large_result_threshold: 10_000,
            compare_result_threshold: 5_000,
            suggestion_limit: 5,
            cache_capacity: Some(256),
        }
    }
}

impl DashboardConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CongestionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| CongestionError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Loads `path` when given, otherwise falls back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
