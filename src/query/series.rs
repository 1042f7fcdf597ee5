use std::collections::BTreeMap;

use crate::model::Observation;
use crate::query::types::{SeriesKey, SeriesPoint};
use crate::query::utility::mean;

/// Mean congestion per (series, time slot), ignoring missing readings.
///
/// With [`SeriesKey::Line`] every station of a line is folded into one curve,
/// which is what the multi-line comparison overlays. Points come back sorted
/// by series, then time slot.
pub fn grouped_mean(subset: &[Observation], key: SeriesKey) -> Vec<SeriesPoint> {
    let mut groups: BTreeMap<(&str, &str), Vec<f64>> = BTreeMap::new();

    for o in subset {
        let Some(c) = o.congestion else { continue };
        let series = match key {
            SeriesKey::Line => o.line.as_str(),
            SeriesKey::Direction => o.direction.as_str(),
        };
        groups
            .entry((series, o.time_slot.as_str()))
            .or_default()
            .push(c);
    }

    groups
        .into_iter()
        .map(|((series, time_slot), values)| SeriesPoint {
            series: series.to_string(),
            time_slot: time_slot.to_string(),
            mean: mean(&values),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::obs;

    #[test]
    fn test_line_means_fold_every_station() {
        let subset = vec![
            obs("평일", "2호선", "강남", "상선", "08:00", Some(100.0)),
            obs("평일", "2호선", "역삼", "상선", "08:00", Some(50.0)),
            obs("평일", "2호선", "선릉", "상선", "08:00", None),
            obs("평일", "1호선", "서울역", "상선", "08:00", Some(30.0)),
            obs("평일", "1호선", "서울역", "상선", "07:30", Some(20.0)),
        ];
        let points = grouped_mean(&subset, SeriesKey::Line);

        let got: Vec<(&str, &str, f64)> = points
            .iter()
            .map(|p| (p.series.as_str(), p.time_slot.as_str(), p.mean))
            .collect();
        assert_eq!(
            got,
            vec![
                ("1호선", "07:30", 20.0),
                ("1호선", "08:00", 30.0),
                ("2호선", "08:00", 75.0),
            ]
        );
    }

    #[test]
    fn test_direction_series() {
        let subset = vec![
            obs("평일", "1호선", "서울역", "상선", "08:00", Some(80.0)),
            obs("평일", "1호선", "서울역", "하선", "08:00", Some(20.0)),
        ];
        let points = grouped_mean(&subset, SeriesKey::Direction);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].series, "상선");
        assert_eq!(points[1].mean, 20.0);
    }

    #[test]
    fn test_all_missing_yields_no_points() {
        let subset = vec![obs("평일", "1호선", "서울역", "상선", "08:00", None)];
        assert!(grouped_mean(&subset, SeriesKey::Line).is_empty());
    }
}
