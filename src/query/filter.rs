//! Row filters over the long table. Empty results are ordinary values.

use crate::model::{LongTable, Observation};
use crate::query::types::{DirectionCompareFilter, LineCompareFilter, SingleFilter};

fn select(table: &LongTable, keep: impl Fn(&Observation) -> bool) -> Vec<Observation> {
    table.iter().filter(|o| keep(*o)).cloned().collect()
}

/// Rows for one station, line, direction and day type inside the time window.
pub fn filter_single(table: &LongTable, f: &SingleFilter) -> Vec<Observation> {
    select(table, |o| {
        o.day_type == f.day_type
            && o.line == f.line
            && o.station_name == f.station
            && o.direction == f.direction
            && f.range.contains(&o.time_slot)
    })
}

/// Rows for one station across every direction it has.
pub fn filter_direction_compare(table: &LongTable, f: &DirectionCompareFilter) -> Vec<Observation> {
    select(table, |o| {
        o.day_type == f.day_type
            && o.line == f.line
            && o.station_name == f.station
            && f.range.contains(&o.time_slot)
    })
}

/// Rows for every station on any of the selected lines in one direction.
pub fn filter_line_compare(table: &LongTable, f: &LineCompareFilter) -> Vec<Observation> {
    select(table, |o| {
        o.day_type == f.day_type
            && f.lines.contains(&o.line)
            && o.direction == f.direction
            && f.range.contains(&o.time_slot)
    })
}

/// Selected lines that contributed no rows to a line comparison.
pub fn missing_lines(f: &LineCompareFilter, subset: &[Observation]) -> Vec<String> {
    f.lines
        .iter()
        .filter(|line| !subset.iter().any(|o| &o.line == *line))
        .cloned()
        .collect()
}
