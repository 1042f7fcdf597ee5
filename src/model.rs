//! The long (tidy) congestion table and its rows.

use serde::{Deserialize, Serialize};

/// One congestion reading: a station/line/direction/day-type at one time slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub day_type: String,
    pub line: String,
    pub station_id: Option<i64>,
    pub station_name: String,
    pub direction: String,
    pub time_slot: String,
    pub congestion: Option<f64>,
}

/// Reshaped congestion data, immutable once built.
///
/// Rows are in melt order: every raw row for the first time column, then every
/// raw row for the second, and so on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LongTable {
    pub observations: Vec<Observation>,
    /// Normalized time slot labels in source column order.
    pub time_slots: Vec<String>,
    /// Time column labels that did not match `<h>시<m>분`, kept verbatim.
    pub unmatched_time_labels: Vec<String>,
}

impl LongTable {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    /// Drops loop-direction rows when the policy asks for primary directions only.
    pub fn apply_direction_policy(mut self, policy: &DirectionPolicy) -> Self {
        if let DirectionPolicy::PrimaryOnly { loop_directions } = policy {
            self.observations
                .retain(|o| !loop_directions.iter().any(|d| d == &o.direction));
        }
        self
    }
}

/// Whether circular-line directions stay in the table handed to the views.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DirectionPolicy {
    KeepAll,
    PrimaryOnly { loop_directions: Vec<String> },
}

impl Default for DirectionPolicy {
    fn default() -> Self {
        DirectionPolicy::PrimaryOnly {
            loop_directions: vec!["내선".to_string(), "외선".to_string()],
        }
    }
}
