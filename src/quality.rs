use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{LongTable, Observation};
use crate::normalize::is_canonical_time_slot;
use crate::query::utility::{mean, median};

#[derive(Debug, Default, Serialize)]
pub struct QualityReport {
    pub generated_at: DateTime<Utc>,
    pub total_records: usize,

    // missing / zero
    pub total_missing: usize,
    pub missing_pct: f64,
    pub zero_count: usize,
    pub zero_pct: f64,

    // non-missing congestion
    pub min_congestion: Option<f64>,
    pub max_congestion: Option<f64>,
    pub mean_congestion: Option<f64>,
    pub median_congestion: Option<f64>,
    pub negative_count: usize,
    pub over_100_count: usize,

    // cardinalities
    pub unique_stations: usize,
    pub unique_lines: usize,
    pub unique_day_types: usize,
    pub non_canonical_time_slots: usize,
}

impl QualityReport {
    pub fn from_table(table: &LongTable) -> Self {
        let mut r = QualityReport {
            generated_at: Utc::now(),
            total_records: table.len(),
            ..Default::default()
        };

        let mut valid = Vec::with_capacity(table.len());
        let mut stations = HashSet::new();
        let mut lines = HashSet::new();
        let mut day_types = HashSet::new();
        let mut odd_slots = HashSet::new();

        for o in table.iter() {
            match o.congestion {
                None => r.total_missing += 1,
                Some(c) => {
                    if c == 0.0 {
                        r.zero_count += 1;
                    }
                    if c < 0.0 {
                        r.negative_count += 1;
                    }
                    if c > 100.0 {
                        r.over_100_count += 1;
                    }
                    valid.push(c);
                }
            }

            stations.insert(o.station_name.as_str());
            lines.insert(o.line.as_str());
            day_types.insert(o.day_type.as_str());

            if !is_canonical_time_slot(&o.time_slot) {
                odd_slots.insert(o.time_slot.as_str());
            }
        }

        r.missing_pct = Self::pct(r.total_missing, r.total_records);
        r.zero_pct = Self::pct(r.zero_count, r.total_records);

        if !valid.is_empty() {
            r.min_congestion = valid.iter().copied().reduce(f64::min);
            r.max_congestion = valid.iter().copied().reduce(f64::max);
            r.mean_congestion = Some(mean(&valid));
            r.median_congestion = median(&valid);
        }

        r.unique_stations = stations.len();
        r.unique_lines = lines.len();
        r.unique_day_types = day_types.len();
        r.non_canonical_time_slots = odd_slots.len();

        r
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }
}

/// Missing-value share of a filtered subset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MissingSummary {
    pub total: usize,
    pub missing: usize,
    pub missing_pct: f64,
}

impl MissingSummary {
    pub fn of(subset: &[Observation]) -> Self {
        let missing = subset.iter().filter(|o| o.congestion.is_none()).count();
        MissingSummary {
            total: subset.len(),
            missing,
            missing_pct: QualityReport::pct(missing, subset.len()),
        }
    }
}
