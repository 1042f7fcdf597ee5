//! Reads the wide congestion CSV from disk.
//!
//! Decoding tries UTF-8 first (with or without BOM) and falls back to CP949,
//! the regional encoding government exports are often published in.

use std::path::Path;

use encoding_rs::{EUC_KR, UTF_8};
use tracing::{debug, info};

use crate::error::{CongestionError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// The wide sheet exactly as read: one header row and string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == label)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Decodes raw file bytes, returning `None` when neither encoding applies.
pub fn decode_bytes(bytes: &[u8]) -> Option<String> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(body) {
        return Some(text.into_owned());
    }

    debug!("input is not UTF-8, retrying as CP949");
    EUC_KR
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

/// Parses decoded CSV text into a [`RawTable`].
///
/// Header labels are trimmed. Short rows are padded with empty cells, which
/// later normalize to missing values; surplus cells are dropped.
pub fn parse_raw_table(text: &str) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let width = headers.len();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

/// Decodes and parses already-read file bytes. `path` is only used for diagnostics.
pub fn raw_table_from_bytes(path: &Path, bytes: &[u8]) -> Result<RawTable> {
    let text = decode_bytes(bytes).ok_or_else(|| CongestionError::Encoding {
        path: path.to_path_buf(),
    })?;
    parse_raw_table(&text)
}

/// Reads the file at `path` into a [`RawTable`].
#[tracing::instrument(fields(path = %path.display()))]
pub fn read_raw_table(path: &Path) -> Result<RawTable> {
    let bytes = read_bytes(path)?;
    let table = raw_table_from_bytes(path, &bytes)?;
    info!(
        rows = table.row_count(),
        columns = table.headers.len(),
        "Raw table loaded"
    );
    Ok(table)
}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| CongestionError::Io {
        path: path.to_path_buf(),
        source,
    })
}
