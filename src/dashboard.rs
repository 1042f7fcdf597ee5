//! One dashboard session: config, cache and the views a front end renders.
//!
//! Every call re-reads the input bytes so an edited file is picked up; the
//! reshape itself only runs when the content actually changed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::{CacheStats, ContentKey, QueryKey, TableCache};
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::level::{CongestionLevel, REFERENCE_THRESHOLDS};
use crate::loader::{raw_table_from_bytes, read_bytes};
use crate::model::{LongTable, Observation};
use crate::quality::{MissingSummary, QualityReport};
use crate::query::{
    DirectionCompareFilter, FilterOptions, Kpis, LineCompareFilter, RankCriterion, RankedRow,
    SeriesKey, SeriesPoint, SingleFilter, Suggestion, TimePreset, TimeRange, compute_kpis,
    filter_direction_compare, filter_line_compare, filter_single, grouped_mean, missing_lines,
    suggest_stations, top_n,
};
use crate::reshape::{report_unmatched_labels, reshape};

/// Single station view: KPIs, the readings and what to try when it is empty.
#[derive(Debug, Clone, Serialize)]
pub struct StationView {
    pub filter: SingleFilter,
    pub kpis: Kpis,
    pub max_level: CongestionLevel,
    pub avg_level: CongestionLevel,
    pub missing: MissingSummary,
    pub reference_thresholds: [f64; 3],
    pub large_result: bool,
    pub rows: Vec<Observation>,
    pub suggestion: Option<Suggestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectionComparison {
    pub filter: DirectionCompareFilter,
    pub rows: usize,
    pub series: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineComparison {
    pub filter: LineCompareFilter,
    pub rows: usize,
    pub series: Vec<SeriesPoint>,
    /// Selected lines with no data in the window.
    pub missing_lines: Vec<String>,
}

/// Which subset a ranking runs over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum RankScope {
    Station(SingleFilter),
    Lines(LineCompareFilter),
}

pub struct Dashboard {
    config: DashboardConfig,
    cache: TableCache,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        let cache = TableCache::new(config.cache_capacity);
        Self { config, cache }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Loads (or reuses) the reshaped table for the configured data file.
    pub fn load(&mut self) -> Result<(ContentKey, Arc<LongTable>)> {
        let path = self.config.data_file.clone();
        let bytes = read_bytes(&path)?;
        let key = ContentKey::new(&bytes, &self.config.id_columns, &self.config.direction_policy);

        let config = &self.config;
        let table = self.cache.table_for(&path, key, || {
            let raw = raw_table_from_bytes(&path, &bytes)?;
            let table = reshape(&raw, &config.id_columns)?;
            if config.warn_on_unmatched_time_labels {
                report_unmatched_labels(&table);
            }
            let table = table.apply_direction_policy(&config.direction_policy);
            info!(observations = table.len(), "Long table ready");
            Ok(table)
        })?;

        Ok((key, table))
    }

    fn cached_rows(&mut self, table: &LongTable, key: QueryKey) -> Arc<Vec<Observation>> {
        let compute_key = key.clone();
        self.cache.query(key, move || match &compute_key {
            QueryKey::Single(_, f) => filter_single(table, f),
            QueryKey::DirectionCompare(_, f) => filter_direction_compare(table, f),
            QueryKey::LineCompare(_, f) => filter_line_compare(table, f),
        })
    }

    pub fn quality(&mut self) -> Result<QualityReport> {
        let (_, table) = self.load()?;
        Ok(QualityReport::from_table(&table))
    }

    pub fn options(&mut self, line: Option<&str>) -> Result<FilterOptions> {
        let (_, table) = self.load()?;
        Ok(FilterOptions::from_table(&table, line))
    }

    /// Resolves a named preset against the slots of the loaded table.
    pub fn preset_range(&mut self, preset: TimePreset) -> Result<Option<TimeRange>> {
        let options = self.options(None)?;
        Ok(preset.range(&options.time_slots))
    }

    #[tracing::instrument(skip(self), fields(station = %filter.station, direction = %filter.direction))]
    pub fn station_view(&mut self, filter: &SingleFilter) -> Result<StationView> {
        let (key, table) = self.load()?;
        let rows = self.cached_rows(&table, QueryKey::Single(key, filter.clone()));

        let large_result = rows.len() > self.config.large_result_threshold;
        if large_result {
            warn!(rows = rows.len(), "large result, rendering may be slow");
        }

        let suggestion = if rows.is_empty() {
            info!("no rows for the selected filter");
            Some(suggest_stations(
                &table,
                &filter.line,
                &filter.direction,
                self.config.suggestion_limit,
            ))
        } else {
            None
        };

        let kpis = compute_kpis(&rows);
        Ok(StationView {
            filter: filter.clone(),
            max_level: CongestionLevel::of(Some(kpis.max_congestion)),
            avg_level: CongestionLevel::of(Some(kpis.avg_congestion)),
            kpis,
            missing: MissingSummary::of(&rows),
            reference_thresholds: REFERENCE_THRESHOLDS,
            large_result,
            rows: rows.to_vec(),
            suggestion,
        })
    }

    pub fn compare_directions(
        &mut self,
        filter: &DirectionCompareFilter,
    ) -> Result<DirectionComparison> {
        let (key, table) = self.load()?;
        let rows = self.cached_rows(&table, QueryKey::DirectionCompare(key, filter.clone()));

        Ok(DirectionComparison {
            filter: filter.clone(),
            rows: rows.len(),
            series: grouped_mean(&rows, SeriesKey::Direction),
        })
    }

    pub fn compare_lines(&mut self, filter: &LineCompareFilter) -> Result<LineComparison> {
        let (key, table) = self.load()?;
        let rows = self.cached_rows(&table, QueryKey::LineCompare(key, filter.clone()));

        if rows.len() > self.config.compare_result_threshold {
            info!(rows = rows.len(), "aggregating a large line comparison");
        }

        let missing = missing_lines(filter, &rows);
        if !missing.is_empty() && !rows.is_empty() {
            warn!(missing = ?missing, "some selected lines have no data");
        }

        Ok(LineComparison {
            filter: filter.clone(),
            rows: rows.len(),
            series: grouped_mean(&rows, SeriesKey::Line),
            missing_lines: missing,
        })
    }

    /// Top-N ranking over a scope; `n` defaults to the configured size.
    pub fn rank(
        &mut self,
        scope: &RankScope,
        criterion: &RankCriterion,
        n: Option<usize>,
    ) -> Result<Vec<RankedRow>> {
        let (key, table) = self.load()?;
        let query = match scope {
            RankScope::Station(f) => QueryKey::Single(key, f.clone()),
            RankScope::Lines(f) => QueryKey::LineCompare(key, f.clone()),
        };
        let rows = self.cached_rows(&table, query);
        Ok(top_n(&rows, n.unwrap_or(self.config.top_n), criterion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::io::Write;
    use std::path::Path;

    const WIDE: &str = "\
요일구분,호선,역번호,출발역,상하구분,7시0분,7시30분,8시0분
평일,1호선,150,서울역,상선,50,80,120
평일,1호선,150,서울역,하선,20,30,
평일,2호선,201,시청,내선,70,90,110
평일,2호선,201,시청,상선,40,60,
";

    fn write_csv(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("congestion.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    fn dashboard(dir: &Path) -> Dashboard {
        Dashboard::new(DashboardConfig {
            data_file: write_csv(dir, WIDE),
            ..Default::default()
        })
    }

    fn seoul_up(range: TimeRange) -> SingleFilter {
        SingleFilter {
            day_type: "평일".into(),
            line: "1호선".into(),
            station: "서울역".into(),
            direction: "상선".into(),
            range,
        }
    }

    #[test]
    fn test_load_applies_direction_policy() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(dir.path());
        let (_, table) = dash.load().unwrap();

        assert_eq!(table.len(), 9);
        assert!(table.iter().all(|o| o.direction != "내선"));
    }

    #[test]
    fn test_station_view_kpis_and_levels() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(dir.path());
        let view = dash.station_view(&seoul_up(TimeRange::new("07:00", "08:00"))).unwrap();

        assert_eq!(view.kpis.max_congestion, 120.0);
        assert_eq!(view.kpis.peak_time, "08:00");
        assert_eq!(view.max_level, CongestionLevel::VeryCrowded);
        assert_eq!(view.rows.len(), 3);
        assert!(view.suggestion.is_none());
    }

    #[test]
    fn test_empty_view_offers_suggestions() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(dir.path());
        let view = dash.station_view(&seoul_up(TimeRange::new("09:00", "07:00"))).unwrap();

        assert!(view.rows.is_empty());
        assert_eq!(view.kpis, Kpis::default());
        let suggestion = view.suggestion.unwrap();
        assert_eq!(suggestion.stations, vec!["서울역"]);
    }

    #[test]
    fn test_repeated_view_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(dir.path());
        let filter = seoul_up(TimeRange::new("07:00", "08:00"));

        dash.station_view(&filter).unwrap();
        dash.station_view(&filter).unwrap();

        let stats = dash.cache_stats();
        assert_eq!(stats.table_misses, 1);
        assert_eq!(stats.table_hits, 1);
        assert_eq!(stats.query_hits, 1);
    }

    #[test]
    fn test_edited_file_is_reshaped_again() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(dir.path());
        let filter = seoul_up(TimeRange::new("08:00", "08:00"));

        assert_eq!(dash.station_view(&filter).unwrap().kpis.max_congestion, 120.0);

        write_csv(dir.path(), &WIDE.replace(",50,80,120", ",50,80,140"));
        assert_eq!(dash.station_view(&filter).unwrap().kpis.max_congestion, 140.0);
        assert_eq!(dash.cache_stats().table_misses, 2);
    }

    #[test]
    fn test_compare_lines_reports_missing_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(dir.path());
        let filter = LineCompareFilter {
            day_type: "평일".into(),
            lines: BTreeSet::from(["1호선".to_string(), "2호선".to_string(), "9호선".to_string()]),
            direction: "상선".into(),
            range: TimeRange::new("07:00", "07:30"),
        };
        let cmp = dash.compare_lines(&filter).unwrap();

        assert_eq!(cmp.rows, 4);
        assert_eq!(cmp.missing_lines, vec!["9호선".to_string()]);
        assert_eq!(cmp.series.len(), 4);
    }

    #[test]
    fn test_compare_directions_series() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(dir.path());
        let cmp = dash
            .compare_directions(&DirectionCompareFilter {
                day_type: "평일".into(),
                line: "1호선".into(),
                station: "서울역".into(),
                range: TimeRange::new("07:00", "08:00"),
            })
            .unwrap();

        assert_eq!(cmp.rows, 6);
        // 하선 has no 08:00 reading
        assert_eq!(cmp.series.len(), 5);
    }

    #[test]
    fn test_rank_uses_configured_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = Dashboard::new(DashboardConfig {
            data_file: write_csv(dir.path(), WIDE),
            top_n: 2,
            ..Default::default()
        });
        let scope = RankScope::Station(seoul_up(TimeRange::new("07:00", "08:00")));
        let rows = dash.rank(&scope, &RankCriterion::Peak, None).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].congestion, 120.0);
    }

    #[test]
    fn test_preset_range_all_day() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(dir.path());

        assert_eq!(
            dash.preset_range(TimePreset::AllDay).unwrap(),
            Some(TimeRange::new("07:00", "08:00"))
        );
    }
}
