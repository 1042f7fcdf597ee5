use crate::model::Observation;
use crate::query::types::Kpis;
use crate::query::utility::mean;

/// Peak, peak time and average over the non-missing readings of `subset`.
///
/// Falls back to [`Kpis::default`] when nothing is readable. A tied peak keeps
/// the first row in subset order.
pub fn compute_kpis(subset: &[Observation]) -> Kpis {
    let readings: Vec<(&str, f64)> = subset
        .iter()
        .filter_map(|o| o.congestion.map(|c| (o.time_slot.as_str(), c)))
        .collect();

    let Some(&(first_slot, first_value)) = readings.first() else {
        return Kpis::default();
    };

    let (peak_time, max_congestion) = readings.iter().skip(1).fold(
        (first_slot, first_value),
        |best, &(slot, value)| if value > best.1 { (slot, value) } else { best },
    );

    let values: Vec<f64> = readings.iter().map(|(_, v)| *v).collect();

    Kpis {
        max_congestion,
        peak_time: peak_time.to_string(),
        avg_congestion: mean(&values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::obs;

    fn at(slot: &str, value: Option<f64>) -> Observation {
        obs("평일", "2호선", "강남", "상선", slot, value)
    }

    #[test]
    fn test_kpis_over_readings() {
        let subset = vec![
            at("07:00", Some(80.0)),
            at("07:30", Some(120.0)),
            at("08:00", None),
            at("08:30", Some(100.0)),
        ];
        let kpis = compute_kpis(&subset);

        assert_eq!(kpis.max_congestion, 120.0);
        assert_eq!(kpis.peak_time, "07:30");
        assert_eq!(kpis.avg_congestion, 100.0);
    }

    #[test]
    fn test_kpis_tie_keeps_first_row() {
        let subset = vec![
            at("09:00", Some(50.0)),
            at("07:00", Some(90.0)),
            at("08:00", Some(90.0)),
        ];
        assert_eq!(compute_kpis(&subset).peak_time, "07:00");
    }

    #[test]
    fn test_kpis_all_missing_returns_fallback() {
        let subset = vec![at("07:00", None), at("07:30", None)];
        let kpis = compute_kpis(&subset);

        assert_eq!(kpis, Kpis::default());
        assert!(!kpis.avg_congestion.is_nan());
    }

    #[test]
    fn test_kpis_empty_subset_returns_fallback() {
        assert_eq!(compute_kpis(&[]), Kpis::default());
    }

    #[test]
    fn test_kpis_negative_readings_are_kept() {
        let kpis = compute_kpis(&[at("05:30", Some(-3.0)), at("06:00", Some(-1.0))]);
        assert_eq!(kpis.max_congestion, -1.0);
        assert_eq!(kpis.avg_congestion, -2.0);
    }
}
