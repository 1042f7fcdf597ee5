//! Choices a front end offers before a query runs, and what it offers after
//! a query comes back empty.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::LongTable;
use crate::query::types::{Suggestion, TimeRange};

/// Sorted distinct values for each selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub day_types: Vec<String>,
    pub lines: Vec<String>,
    /// Stations of the selected line only.
    pub stations: Vec<String>,
    pub directions: Vec<String>,
    pub time_slots: Vec<String>,
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl FilterOptions {
    pub fn from_table(table: &LongTable, line: Option<&str>) -> Self {
        let lines = distinct(table.iter().map(|o| o.line.as_str()));
        let selected = line.or_else(|| lines.first().map(String::as_str));
        let stations = distinct(
            table
                .iter()
                .filter(|o| Some(o.line.as_str()) == selected)
                .map(|o| o.station_name.as_str()),
        );

        FilterOptions {
            day_types: distinct(table.iter().map(|o| o.day_type.as_str())),
            stations,
            directions: distinct(table.iter().map(|o| o.direction.as_str())),
            time_slots: distinct(table.iter().map(|o| o.time_slot.as_str())),
            lines,
        }
    }
}

/// Named shortcuts for the time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePreset {
    MorningCommute,
    EveningCommute,
    AllDay,
}

impl TimePreset {
    pub const fn label(self) -> &'static str {
        match self {
            TimePreset::MorningCommute => "출근",
            TimePreset::EveningCommute => "퇴근",
            TimePreset::AllDay => "전체",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "출근" | "morning" => Some(TimePreset::MorningCommute),
            "퇴근" | "evening" => Some(TimePreset::EveningCommute),
            "전체" | "all" => Some(TimePreset::AllDay),
            _ => None,
        }
    }

    /// Resolves the preset against the sorted slots of the loaded table.
    ///
    /// `AllDay` spans the first to last slot and is `None` for an empty table.
    pub fn range(self, sorted_slots: &[String]) -> Option<TimeRange> {
        match self {
            TimePreset::MorningCommute => Some(TimeRange::new("07:00", "09:00")),
            TimePreset::EveningCommute => Some(TimeRange::new("18:00", "20:00")),
            TimePreset::AllDay => Some(TimeRange::new(
                sorted_slots.first()?.clone(),
                sorted_slots.last()?.clone(),
            )),
        }
    }
}

/// Slot preselected for the at-time ranking: `08:00` when present, else the first.
pub fn default_at_time_slot(sorted_slots: &[String]) -> Option<&str> {
    sorted_slots
        .iter()
        .find(|s| *s == "08:00")
        .or_else(|| sorted_slots.first())
        .map(String::as_str)
}

/// Stations that do have data for the same line and direction.
pub fn suggest_stations(table: &LongTable, line: &str, direction: &str, limit: usize) -> Suggestion {
    let stations = distinct(
        table
            .iter()
            .filter(|o| o.line == line && o.direction == direction)
            .map(|o| o.station_name.as_str()),
    );

    Suggestion {
        line: line.to_string(),
        direction: direction.to_string(),
        total: stations.len(),
        stations: stations.into_iter().take(limit).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::obs;

    fn table() -> LongTable {
        LongTable {
            observations: vec![
                obs("평일", "2호선", "강남", "상선", "08:00", Some(1.0)),
                obs("토요일", "2호선", "역삼", "하선", "07:30", Some(1.0)),
                obs("평일", "1호선", "서울역", "상선", "05:30", None),
                obs("평일", "1호선", "시청", "상선", "08:00", None),
                obs("평일", "1호선", "종각", "상선", "08:00", None),
            ],
            time_slots: vec![],
            unmatched_time_labels: Vec::new(),
        }
    }

    #[test]
    fn test_filter_options_are_sorted_and_scoped() {
        let options = FilterOptions::from_table(&table(), Some("2호선"));

        assert_eq!(options.day_types, vec!["토요일", "평일"]);
        assert_eq!(options.lines, vec!["1호선", "2호선"]);
        assert_eq!(options.stations, vec!["강남", "역삼"]);
        assert_eq!(options.directions, vec!["상선", "하선"]);
        assert_eq!(options.time_slots, vec!["05:30", "07:30", "08:00"]);
    }

    #[test]
    fn test_filter_options_default_to_first_line() {
        let options = FilterOptions::from_table(&table(), None);
        assert_eq!(options.stations, vec!["서울역", "시청", "종각"]);
    }

    #[test]
    fn test_presets() {
        let slots = vec!["05:30".to_string(), "12:00".to_string(), "23:30".to_string()];

        assert_eq!(
            TimePreset::MorningCommute.range(&slots),
            Some(TimeRange::new("07:00", "09:00"))
        );
        assert_eq!(
            TimePreset::EveningCommute.range(&slots),
            Some(TimeRange::new("18:00", "20:00"))
        );
        assert_eq!(
            TimePreset::AllDay.range(&slots),
            Some(TimeRange::new("05:30", "23:30"))
        );
        assert_eq!(TimePreset::AllDay.range(&[]), None);
        assert_eq!(TimePreset::from_label("퇴근"), Some(TimePreset::EveningCommute));
        assert_eq!(TimePreset::MorningCommute.label(), "출근");
    }

    #[test]
    fn test_default_at_time_slot() {
        let with_eight = vec!["07:30".to_string(), "08:00".to_string()];
        let without = vec!["05:30".to_string(), "06:00".to_string()];

        assert_eq!(default_at_time_slot(&with_eight), Some("08:00"));
        assert_eq!(default_at_time_slot(&without), Some("05:30"));
        assert_eq!(default_at_time_slot(&[]), None);
    }

    #[test]
    fn test_suggest_stations_limits_but_counts_all() {
        let suggestion = suggest_stations(&table(), "1호선", "상선", 2);

        assert_eq!(suggestion.stations, vec!["서울역", "시청"]);
        assert_eq!(suggestion.total, 3);
    }
}
