//! Top-N congestion rankings.
//!
//! Ties are ordered by station name, line, direction and time slot so a
//! ranking never depends on the order rows happened to arrive in.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::model::Observation;
use crate::query::types::{AVERAGE_TIME_SLOT_LABEL, RankCriterion, RankedRow};
use crate::query::utility::mean;

fn rank_order(a: &RankedRow, b: &RankedRow) -> Ordering {
    b.congestion
        .total_cmp(&a.congestion)
        .then_with(|| a.station_name.cmp(&b.station_name))
        .then_with(|| a.line.cmp(&b.line))
        .then_with(|| a.direction.cmp(&b.direction))
        .then_with(|| a.time_slot.cmp(&b.time_slot))
}

fn reading_row(o: &Observation) -> Option<RankedRow> {
    Some(RankedRow {
        rank: 0,
        time_slot: o.time_slot.clone(),
        station_name: o.station_name.clone(),
        line: o.line.clone(),
        direction: o.direction.clone(),
        congestion: o.congestion?,
    })
}

fn average_rows(subset: &[Observation]) -> Vec<RankedRow> {
    let mut groups: BTreeMap<(&str, &str, &str), Vec<f64>> = BTreeMap::new();

    for o in subset {
        if let Some(c) = o.congestion {
            groups
                .entry((o.station_name.as_str(), o.line.as_str(), o.direction.as_str()))
                .or_default()
                .push(c);
        }
    }

    groups
        .into_iter()
        .map(|((station_name, line, direction), values)| RankedRow {
            rank: 0,
            time_slot: AVERAGE_TIME_SLOT_LABEL.to_string(),
            station_name: station_name.to_string(),
            line: line.to_string(),
            direction: direction.to_string(),
            congestion: mean(&values),
        })
        .collect()
}

/// Returns the `n` most congested rows of `subset` under `criterion`, ranked from 1.
pub fn top_n(subset: &[Observation], n: usize, criterion: &RankCriterion) -> Vec<RankedRow> {
    let mut rows: Vec<RankedRow> = match criterion {
        RankCriterion::Peak => subset.iter().filter_map(reading_row).collect(),
        RankCriterion::Average => average_rows(subset),
        RankCriterion::AtTime(slot) => subset
            .iter()
            .filter(|o| &o.time_slot == slot)
            .filter_map(reading_row)
            .collect(),
    };

    rows.sort_by(rank_order);
    rows.truncate(n);

    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::obs;

    fn subset() -> Vec<Observation> {
        vec![
            obs("평일", "2호선", "강남", "상선", "08:00", Some(150.0)),
            obs("평일", "2호선", "강남", "상선", "08:30", Some(110.0)),
            obs("평일", "2호선", "강남", "하선", "08:00", Some(60.0)),
            obs("평일", "2호선", "강남", "하선", "08:30", None),
            obs("평일", "1호선", "서울역", "상선", "08:00", Some(90.0)),
            obs("평일", "1호선", "서울역", "상선", "08:30", Some(100.0)),
            obs("평일", "1호선", "서울역", "하선", "08:00", Some(40.0)),
            obs("평일", "4호선", "사당", "상선", "08:00", Some(130.0)),
            obs("평일", "4호선", "사당", "상선", "08:30", Some(20.0)),
            obs("평일", "4호선", "사당", "하선", "08:30", None),
        ]
    }

    #[test]
    fn test_peak_ranks_individual_readings() {
        let rows = top_n(&subset(), 3, &RankCriterion::Peak);

        let values: Vec<f64> = rows.iter().map(|r| r.congestion).collect();
        assert_eq!(values, vec![150.0, 130.0, 110.0]);
        assert_eq!(rows[0].time_slot, "08:00");
        assert_eq!(
            rows.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_average_top_three_of_five_groups() {
        let rows = top_n(&subset(), 3, &RankCriterion::Average);

        assert_eq!(rows.len(), 3);
        let got: Vec<(&str, &str, f64)> = rows
            .iter()
            .map(|r| (r.station_name.as_str(), r.direction.as_str(), r.congestion))
            .collect();
        assert_eq!(
            got,
            vec![
                ("강남", "상선", 130.0),
                ("서울역", "상선", 95.0),
                ("사당", "상선", 75.0),
            ]
        );
        assert!(rows.iter().all(|r| r.time_slot == AVERAGE_TIME_SLOT_LABEL));
    }

    #[test]
    fn test_average_ignores_missing_and_skips_empty_groups() {
        let rows = top_n(&subset(), 10, &RankCriterion::Average);

        // 강남 하선 averages only its one reading; 사당 하선 has none at all.
        assert_eq!(rows.len(), 5);
        let gangnam_down = rows
            .iter()
            .find(|r| r.station_name == "강남" && r.direction == "하선")
            .unwrap();
        assert_eq!(gangnam_down.congestion, 60.0);
        assert!(!rows.iter().any(|r| r.station_name == "사당" && r.direction == "하선"));
    }

    #[test]
    fn test_at_time_restricts_to_slot() {
        let rows = top_n(&subset(), 10, &RankCriterion::AtTime("08:30".to_string()));

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.time_slot == "08:30"));
        assert_eq!(rows[0].congestion, 110.0);
    }

    #[test]
    fn test_ties_break_on_station_name() {
        let subset = vec![
            obs("평일", "1호선", "종각", "상선", "08:00", Some(100.0)),
            obs("평일", "1호선", "시청", "상선", "08:00", Some(100.0)),
        ];
        let rows = top_n(&subset, 2, &RankCriterion::Peak);

        assert_eq!(rows[0].station_name, "시청");
        assert_eq!(rows[1].station_name, "종각");
    }

    #[test]
    fn test_top_n_zero_and_empty() {
        assert!(top_n(&subset(), 0, &RankCriterion::Peak).is_empty());
        assert!(top_n(&[], 10, &RankCriterion::Average).is_empty());
    }
}
