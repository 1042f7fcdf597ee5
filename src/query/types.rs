//! Parameter and result types shared by the query functions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Inclusive `HH:MM` window, compared lexically.
///
/// Lexical order matches chronological order only because slots are
/// zero-padded and confined to a single day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

impl TimeRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn contains(&self, slot: &str) -> bool {
        self.start.as_str() <= slot && slot <= self.end.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SingleFilter {
    pub day_type: String,
    pub line: String,
    pub station: String,
    pub direction: String,
    pub range: TimeRange,
}

/// Same as [`SingleFilter`] without a direction, to line directions up side by side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectionCompareFilter {
    pub day_type: String,
    pub line: String,
    pub station: String,
    pub range: TimeRange,
}

/// Several lines at once. `BTreeSet` keeps the selection ordered and hashable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineCompareFilter {
    pub day_type: String,
    pub lines: BTreeSet<String>,
    pub direction: String,
    pub range: TimeRange,
}

/// Marker shown as the peak time when no reading is available.
pub const PEAK_TIME_NOT_APPLICABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub max_congestion: f64,
    pub peak_time: String,
    pub avg_congestion: f64,
}

impl Default for Kpis {
    fn default() -> Self {
        Self {
            max_congestion: 0.0,
            peak_time: PEAK_TIME_NOT_APPLICABLE.to_string(),
            avg_congestion: 0.0,
        }
    }
}

/// How top-N rows are ranked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", content = "time_slot", rename_all = "snake_case")]
pub enum RankCriterion {
    /// Individual readings, highest first.
    Peak,
    /// Mean per (station, line, direction) over the window.
    Average,
    /// Individual readings at one time slot.
    AtTime(String),
}

/// Time slot label carried by rows ranked on a window average.
pub const AVERAGE_TIME_SLOT_LABEL: &str = "평균";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    pub rank: usize,
    pub time_slot: String,
    pub station_name: String,
    pub line: String,
    pub direction: String,
    pub congestion: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKey {
    Line,
    Direction,
}

/// One point of a per-series mean curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub series: String,
    pub time_slot: String,
    pub mean: f64,
}

/// Stations offered when a filter comes back empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub line: String,
    pub direction: String,
    pub stations: Vec<String>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range_is_inclusive() {
        let range = TimeRange::new("07:00", "09:00");

        assert!(range.contains("07:00"));
        assert!(range.contains("08:30"));
        assert!(range.contains("09:00"));
        assert!(!range.contains("06:30"));
        assert!(!range.contains("09:30"));
    }

    #[test]
    fn test_inverted_range_contains_nothing() {
        let range = TimeRange::new("09:00", "07:00");
        assert!(!range.contains("08:00"));
        assert!(!range.contains("09:00"));
    }

    #[test]
    fn test_kpi_default_is_fallback_triple() {
        let kpis = Kpis::default();
        assert_eq!(kpis.max_congestion, 0.0);
        assert_eq!(kpis.peak_time, "N/A");
        assert_eq!(kpis.avg_congestion, 0.0);
    }

    #[test]
    fn test_rank_criterion_json_shape() {
        let at: RankCriterion = serde_json::from_str(r#"{"mode":"at_time","time_slot":"08:00"}"#).unwrap();
        assert_eq!(at, RankCriterion::AtTime("08:00".to_string()));

        let avg: RankCriterion = serde_json::from_str(r#"{"mode":"average"}"#).unwrap();
        assert_eq!(avg, RankCriterion::Average);
    }
}
