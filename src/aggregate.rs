use std::collections::{BTreeSet, HashMap};

use anyhow::bail;

use crate::config::{ScoringConfig, DEFAULT_WEIGHT};
use crate::models::{ActivityEvent, ExpertMetricRow, MetricBatch};

struct Accumulator {
    expert_name: String,
    quarter: String,
    raw_hours: f64,
    hour_points: f64,
    rating_total: f64,
    rating_count: usize,
    type_frequency: HashMap<String, usize>,
}

/// Collapse one quarter's events into one metric row per expert.
///
/// Excluded experts are dropped before any grouping, unmapped activity
/// types fall back to the default weight and are recorded for audit, and
/// experts under the minimum-hours floor are removed after aggregation.
/// Grouping uses only commutative sums, so input order does not matter.
pub fn aggregate_events(
    events: &[ActivityEvent],
    config: &ScoringConfig,
) -> anyhow::Result<MetricBatch> {
    let mut accumulators: HashMap<i64, Accumulator> = HashMap::new();
    let mut unmapped_types = BTreeSet::new();

    for event in events {
        if event.quantity < 0.0 {
            bail!(
                "negative quantity {} for expert {} in event {}",
                event.quantity,
                event.nik,
                event.event_name
            );
        }
        if let Some(rating) = event.rating {
            if rating < 0.0 {
                bail!(
                    "negative rating {} for expert {} in event {}",
                    rating,
                    event.nik,
                    event.event_name
                );
            }
        }
        if config.excluded_niks.contains(&event.nik) {
            continue;
        }

        let hour_weight = match config.hour_weight(&event.activity_type) {
            Some(weight) => weight,
            None => {
                unmapped_types.insert(event.activity_type.clone());
                DEFAULT_WEIGHT
            }
        };

        let entry = accumulators.entry(event.nik).or_insert_with(|| Accumulator {
            expert_name: event.expert_name.clone(),
            quarter: event.quarter.clone(),
            raw_hours: 0.0,
            hour_points: 0.0,
            rating_total: 0.0,
            rating_count: 0,
            type_frequency: HashMap::new(),
        });

        entry.raw_hours += event.quantity;
        entry.hour_points += event.quantity * hour_weight;
        if let Some(rating) = event.rating {
            entry.rating_total += rating;
            entry.rating_count += 1;
        }
        *entry
            .type_frequency
            .entry(event.activity_type.clone())
            .or_insert(0) += 1;
    }

    let mut rows = Vec::new();
    for (nik, acc) in accumulators {
        if acc.raw_hours < config.min_hours {
            continue;
        }

        let mut variety_points = 0.0;
        for (activity_type, frequency) in &acc.type_frequency {
            let weight = match config.variety_weight(activity_type) {
                Some(weight) => weight,
                None => {
                    unmapped_types.insert(activity_type.clone());
                    DEFAULT_WEIGHT
                }
            };
            variety_points += *frequency as f64 * weight;
        }

        let rating_mean = if acc.rating_count > 0 {
            Some(acc.rating_total / acc.rating_count as f64)
        } else {
            None
        };

        rows.push(ExpertMetricRow {
            nik,
            expert_name: acc.expert_name,
            quarter: acc.quarter,
            raw_hours: acc.raw_hours,
            hour_points: acc.hour_points,
            rating_mean,
            rating_count: acc.rating_count,
            variety_points,
            activity_type_count: acc.type_frequency.len(),
        });
    }

    rows.sort_by_key(|row| row.nik);
    Ok(MetricBatch {
        rows,
        unmapped_types,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn event(nik: i64, activity_type: &str, quantity: f64, rating: Option<f64>) -> ActivityEvent {
        ActivityEvent {
            id: Uuid::new_v4(),
            nik,
            expert_name: format!("Expert {nik}"),
            event_name: "Solution Enablement".to_string(),
            activity_type: activity_type.to_string(),
            quantity,
            rating,
            occurred_at: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
            quarter: "Q1".to_string(),
        }
    }

    fn open_config() -> ScoringConfig {
        ScoringConfig {
            min_hours: 0.0,
            ..ScoringConfig::default()
        }
    }

    #[test]
    fn hour_points_apply_activity_weights() {
        let events = vec![
            event(1, "Teaching", 10.0, None),
            event(1, "Content Development", 8.0, None),
            event(1, "Speaker", 4.0, None),
        ];
        let batch = aggregate_events(&events, &open_config()).unwrap();
        assert_eq!(batch.rows.len(), 1);
        let row = &batch.rows[0];
        // 10*1.4 + 8*1.5 + 4*1.3
        assert!((row.hour_points - 31.2).abs() < 1e-9);
        assert!((row.raw_hours - 22.0).abs() < 1e-9);
    }

    #[test]
    fn variety_points_count_frequency_per_type() {
        let mut events = Vec::new();
        for (activity_type, frequency) in [
            ("Coaching", 3),
            ("Mentoring", 5),
            ("Speaker", 4),
            ("Teaching", 4),
            ("Content Development", 1),
            ("Publication", 1),
        ] {
            for _ in 0..frequency {
                events.push(event(7, activity_type, 1.0, None));
            }
        }
        let batch = aggregate_events(&events, &open_config()).unwrap();
        let row = &batch.rows[0];
        // 3*1.5 + 5*1.4 + 4*1.3 + 4*1.2 + 1*1.1 + 1*1.0
        assert!((row.variety_points - 23.6).abs() < 1e-9);
        assert_eq!(row.activity_type_count, 6);
    }

    #[test]
    fn unmapped_type_defaults_and_is_recorded() {
        let events = vec![event(1, "Town Hall", 5.0, None)];
        let batch = aggregate_events(&events, &open_config()).unwrap();
        let row = &batch.rows[0];
        assert!((row.hour_points - 5.0).abs() < 1e-9);
        assert!(batch.unmapped_types.contains("Town Hall"));
    }

    #[test]
    fn rating_mean_ignores_events_without_rating() {
        let events = vec![
            event(1, "Teaching", 2.0, Some(9.0)),
            event(1, "Teaching", 2.0, Some(7.0)),
            event(1, "Teaching", 2.0, None),
        ];
        let batch = aggregate_events(&events, &open_config()).unwrap();
        let row = &batch.rows[0];
        assert_eq!(row.rating_mean, Some(8.0));
        assert_eq!(row.rating_count, 2);
    }

    #[test]
    fn excluded_niks_never_reach_aggregation() {
        let config = ScoringConfig {
            excluded_niks: vec![2],
            min_hours: 0.0,
            ..ScoringConfig::default()
        };
        let events = vec![event(1, "Teaching", 5.0, None), event(2, "Teaching", 50.0, None)];
        let batch = aggregate_events(&events, &config).unwrap();
        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].nik, 1);
    }

    #[test]
    fn minimum_hours_floor_filters_rows() {
        let config = ScoringConfig {
            min_hours: 10.0,
            ..ScoringConfig::default()
        };
        let events = vec![event(1, "Teaching", 12.0, None), event(2, "Teaching", 6.0, None)];
        let batch = aggregate_events(&events, &config).unwrap();
        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].nik, 1);
    }

    #[test]
    fn negative_quantity_rejects_the_batch() {
        let events = vec![event(1, "Teaching", -1.0, None)];
        assert!(aggregate_events(&events, &open_config()).is_err());
    }

    #[test]
    fn aggregation_is_order_independent() {
        let mut events = vec![
            event(1, "Teaching", 10.0, Some(8.0)),
            event(1, "Coaching", 4.0, None),
            event(2, "Publication", 3.0, Some(6.0)),
        ];
        let forward = aggregate_events(&events, &open_config()).unwrap();
        events.reverse();
        let reversed = aggregate_events(&events, &open_config()).unwrap();
        assert_eq!(forward.rows, reversed.rows);
    }

    #[test]
    fn empty_input_yields_empty_batch() {
        let batch = aggregate_events(&[], &open_config()).unwrap();
        assert!(batch.rows.is_empty());
        assert!(batch.unmapped_types.is_empty());
    }
}
