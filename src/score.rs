use crate::config::ScoringConfig;
use crate::models::{ExpertMetricRow, ScoreRow};
use crate::tier;

/// Scale a raw metric to 0-100 against the batch denominator. A
/// non-positive denominator maps everything to 0 instead of dividing.
pub fn normalized(raw: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        0.0
    } else {
        (raw / denominator) * 100.0
    }
}

fn batch_max(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, f64::max)
}

/// Normalize one batch of metric rows and compose final scores.
///
/// Hours are normalized against the batch maximum, ratings against the
/// fixed 1-10 scale, and variety against the batch maximum or the
/// configured reference ceiling, whichever is larger. Component weights
/// are applied as supplied; totals are not validated here.
pub fn score_batch(rows: &[ExpertMetricRow], config: &ScoringConfig) -> Vec<ScoreRow> {
    let max_hour_points = batch_max(rows.iter().map(|row| row.hour_points));
    let max_variety_points = batch_max(rows.iter().map(|row| row.variety_points));
    let variety_denominator = match config.variety_reference_max {
        Some(ceiling) => ceiling.max(max_variety_points),
        None => max_variety_points,
    };
    let weights = &config.component_weights;

    let mut scores: Vec<ScoreRow> = rows
        .iter()
        .map(|row| {
            let hours_score = normalized(row.hour_points, max_hour_points);
            let rating_score = row.rating_mean.map_or(0.0, |mean| mean * 10.0);
            let variety_score = normalized(row.variety_points, variety_denominator);
            let final_score = hours_score * (weights.hours / 100.0)
                + rating_score * (weights.rating / 100.0)
                + variety_score * (weights.variety / 100.0);

            ScoreRow {
                nik: row.nik,
                expert_name: row.expert_name.clone(),
                quarter: row.quarter.clone(),
                hours_score,
                rating_score,
                variety_score,
                final_score,
                compensation: 0.0,
                tier: tier::classify(final_score),
            }
        })
        .collect();

    scores.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scores
}
