//! Stateless query engine over the long congestion table.
//!
//! Every function takes the immutable table (or a filtered subset) plus plain
//! parameters, so callers can memoize on the full parameter tuple.

pub mod filter;
pub mod kpi;
pub mod options;
pub mod ranking;
pub mod series;
pub mod types;
pub mod utility;

pub use filter::{filter_direction_compare, filter_line_compare, filter_single, missing_lines};
pub use kpi::compute_kpis;
pub use options::{FilterOptions, TimePreset, default_at_time_slot, suggest_stations};
pub use ranking::top_n;
pub use series::grouped_mean;
pub use types::{
    DirectionCompareFilter, Kpis, LineCompareFilter, RankCriterion, RankedRow, SeriesKey,
    SeriesPoint, SingleFilter, Suggestion, TimeRange,
};
