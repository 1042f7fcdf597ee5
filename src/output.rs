//! Output formatting and persistence for dashboard results.
//!
//! Supports pretty-printing, JSON to stdout, and the spreadsheet-friendly
//! ranking export.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::level::CongestionLevel;
use crate::query::RankedRow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One exported ranking row, headed with the labels the dashboard shows.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "순위")]
    rank: usize,
    #[serde(rename = "시간대")]
    time_slot: &'a str,
    #[serde(rename = "역명")]
    station_name: &'a str,
    #[serde(rename = "호선")]
    line: &'a str,
    #[serde(rename = "방향")]
    direction: &'a str,
    #[serde(rename = "혼잡도")]
    congestion: f64,
    #[serde(rename = "등급")]
    level: &'static str,
}

impl<'a> From<&'a RankedRow> for ExportRow<'a> {
    fn from(row: &'a RankedRow) -> Self {
        ExportRow {
            rank: row.rank,
            time_slot: &row.time_slot,
            station_name: &row.station_name,
            line: &row.line,
            direction: &row.direction,
            congestion: row.congestion,
            level: CongestionLevel::of(Some(row.congestion)).emoji(),
        }
    }
}

/// Logs any result using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl std::fmt::Debug) {
    debug!("{:#?}", value);
}

/// Writes a result to stdout as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes ranking rows as BOM-prefixed UTF-8 CSV.
pub fn write_ranking<W: Write>(mut writer: W, rows: &[RankedRow]) -> Result<()> {
    writer.write_all(UTF8_BOM)?;

    let mut csv = WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in rows {
        csv.serialize(ExportRow::from(row))?;
    }
    csv.flush()?;

    Ok(())
}

/// Exports ranking rows to `path`, replacing any existing file.
pub fn export_ranking(path: &Path, rows: &[RankedRow]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_ranking(file, rows)?;
    info!(path = %path.display(), rows = rows.len(), "Ranking exported");
    Ok(())
}

/// Default export name, e.g. `혼잡도_TOP10_서울역_평일.csv`.
pub fn ranking_file_name(n: usize, station: &str, day_type: &str) -> String {
    format!("혼잡도_TOP{n}_{station}_{day_type}.csv")
}
