//! Line-delimited JSON request loop over one [`Dashboard`] session.
//!
//! Each input line is one request; each output line is the JSON result or an
//! `{"error": ...}` object. A failing request never ends the loop.

use std::io::{BufRead, Write};

use anyhow::Result;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::dashboard::{Dashboard, RankScope};
use crate::query::{DirectionCompareFilter, LineCompareFilter, RankCriterion, SingleFilter};

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Quality,
    Options {
        #[serde(default)]
        line: Option<String>,
    },
    View(SingleFilter),
    CompareDirections(DirectionCompareFilter),
    CompareLines(LineCompareFilter),
    Top {
        scope: RankScope,
        criterion: RankCriterion,
        #[serde(default)]
        n: Option<usize>,
    },
    CacheStats,
}

fn dispatch(dash: &mut Dashboard, request: &Request) -> Result<Value> {
    let value = match request {
        Request::Quality => serde_json::to_value(dash.quality()?)?,
        Request::Options { line } => serde_json::to_value(dash.options(line.as_deref())?)?,
        Request::View(f) => serde_json::to_value(dash.station_view(f)?)?,
        Request::CompareDirections(f) => serde_json::to_value(dash.compare_directions(f)?)?,
        Request::CompareLines(f) => serde_json::to_value(dash.compare_lines(f)?)?,
        Request::Top {
            scope,
            criterion,
            n,
        } => serde_json::to_value(dash.rank(scope, criterion, *n)?)?,
        Request::CacheStats => serde_json::to_value(dash.cache_stats())?,
    };
    Ok(value)
}

/// Answers one raw request line.
pub fn handle_line(dash: &mut Dashboard, line: &str) -> Value {
    let request: Request = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "unreadable request");
            return json!({ "error": format!("bad request: {e}") });
        }
    };

    debug!(?request, "handling request");
    match dispatch(dash, &request) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "request failed");
            json!({ "error": e.to_string() })
        }
    }
}

/// Serves requests from `input` until EOF, skipping blank lines.
pub fn run<R: BufRead, W: Write>(dash: &mut Dashboard, input: R, mut output: W) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(dash, &line);
        writeln!(output, "{response}")?;
        output.flush()?;
    }
    Ok(())
}
