//! Wide → long reshape of the congestion sheet.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CongestionError, Result};
use crate::loader::RawTable;
use crate::model::{LongTable, Observation};
use crate::normalize::{normalize_congestion, normalize_station_id, normalize_time_slot};

/// Header labels of the five identifier columns. Every other column is a time slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct IdColumns {
    pub day_type: String,
    pub line: String,
    pub station_id: String,
    pub station_name: String,
    pub direction: String,
}

impl Default for IdColumns {
    fn default() -> Self {
        Self {
            day_type: "요일구분".to_string(),
            line: "호선".to_string(),
            station_id: "역번호".to_string(),
            station_name: "출발역".to_string(),
            direction: "상하구분".to_string(),
        }
    }
}

impl IdColumns {
    fn labels(&self) -> [&str; 5] {
        [
            &self.day_type,
            &self.line,
            &self.station_id,
            &self.station_name,
            &self.direction,
        ]
    }
}

#[derive(Debug, Clone, Copy)]
struct IdIndices {
    day_type: usize,
    line: usize,
    station_id: usize,
    station_name: usize,
    direction: usize,
}

fn locate_id_columns(raw: &RawTable, columns: &IdColumns) -> Result<IdIndices> {
    let missing: Vec<String> = columns
        .labels()
        .iter()
        .filter(|label| raw.column_index(label).is_none())
        .map(|label| label.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(CongestionError::MissingColumns { missing });
    }

    let idx = |label: &str| raw.column_index(label).unwrap_or_default();
    Ok(IdIndices {
        day_type: idx(&columns.day_type),
        line: idx(&columns.line),
        station_id: idx(&columns.station_id),
        station_name: idx(&columns.station_name),
        direction: idx(&columns.direction),
    })
}

/// Unpivots the wide sheet into one [`Observation`] per (row, time column).
///
/// Time columns are whatever remains once the identifier columns are removed.
/// The result always holds `rows × time_columns` observations.
///
/// # Errors
///
/// Returns [`CongestionError::MissingColumns`] when any identifier column is absent.
#[tracing::instrument(skip_all, fields(rows = raw.row_count()))]
pub fn reshape(raw: &RawTable, columns: &IdColumns) -> Result<LongTable> {
    let ids = locate_id_columns(raw, columns)?;
    let id_labels = columns.labels();

    let time_columns: Vec<(usize, &str)> = raw
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !id_labels.contains(&h.as_str()))
        .map(|(i, h)| (i, h.as_str()))
        .collect();

    let time_slots: Vec<String> = time_columns
        .iter()
        .map(|(_, label)| normalize_time_slot(label))
        .collect();

    let mut unmatched_time_labels = Vec::new();
    for ((_, label), slot) in time_columns.iter().zip(&time_slots) {
        if *label == slot.as_str() {
            debug!(label, "time column label kept as-is");
            unmatched_time_labels.push(slot.clone());
        }
    }

    let mut observations = Vec::with_capacity(raw.row_count() * time_columns.len());

    for ((col, _), slot) in time_columns.iter().zip(&time_slots) {
        for row in &raw.rows {
            // Rows shorter than the header read as empty cells.
            let cell = |i: usize| row.get(i).map_or("", String::as_str);
            observations.push(Observation {
                day_type: cell(ids.day_type).to_string(),
                line: cell(ids.line).to_string(),
                station_id: normalize_station_id(cell(ids.station_id)),
                station_name: cell(ids.station_name).to_string(),
                direction: cell(ids.direction).to_string(),
                time_slot: slot.clone(),
                congestion: normalize_congestion(row.get(*col).map(String::as_str)),
            });
        }
    }

    info!(
        observations = observations.len(),
        time_columns = time_columns.len(),
        unmatched_time_labels = unmatched_time_labels.len(),
        "Reshaped wide table"
    );

    Ok(LongTable {
        observations,
        time_slots,
        unmatched_time_labels,
    })
}

/// Logs every time column label that did not normalize to `HH:MM`.
pub fn report_unmatched_labels(table: &LongTable) {
    for label in &table.unmatched_time_labels {
        warn!(label = %label, "time column label does not match <h>시<m>분");
    }
}
