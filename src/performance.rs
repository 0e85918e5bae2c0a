use std::collections::HashMap;

use crate::models::{PerformanceRow, QuarterHours};
use crate::score::normalized;

const QUARTER_ORDER: [&str; 4] = ["Q1", "Q2", "Q3", "Q4"];

/// Up to three quarters preceding the current one, in calendar order.
fn prior_quarters(current: &str) -> Vec<&'static str> {
    let position = QUARTER_ORDER.iter().position(|q| *q == current);
    match position {
        Some(index) => {
            let start = index.saturating_sub(3);
            QUARTER_ORDER[start..index].to_vec()
        }
        None => Vec::new(),
    }
}

/// Growth index per expert: current-quarter hours over the mean of the
/// prior quarters, max-normalized to 0-100.
///
/// Experts with no prior history divide by 1 instead of 0, so their index
/// equals the current hour total. Quarters an expert sat out count as 0
/// in the prior mean.
pub fn performance_index(hours: &[QuarterHours], current_quarter: &str) -> Vec<PerformanceRow> {
    let priors = prior_quarters(current_quarter);

    let mut by_expert: HashMap<i64, (String, HashMap<&str, f64>)> = HashMap::new();
    for record in hours {
        let entry = by_expert
            .entry(record.nik)
            .or_insert_with(|| (record.expert_name.clone(), HashMap::new()));
        let quarter = QUARTER_ORDER
            .iter()
            .find(|q| **q == record.quarter)
            .copied();
        if let Some(quarter) = quarter {
            *entry.1.entry(quarter).or_insert(0.0) += record.total_hours;
        }
    }

    let mut rows: Vec<PerformanceRow> = by_expert
        .into_iter()
        .map(|(nik, (expert_name, per_quarter))| {
            let current_hours = per_quarter.get(current_quarter).copied().unwrap_or(0.0);
            let prior_mean = if priors.is_empty() {
                0.0
            } else {
                let total: f64 = priors
                    .iter()
                    .map(|q| per_quarter.get(q).copied().unwrap_or(0.0))
                    .sum();
                total / priors.len() as f64
            };
            let denominator = if prior_mean == 0.0 { 1.0 } else { prior_mean };
            let index = current_hours / denominator;

            PerformanceRow {
                nik,
                expert_name,
                current_hours,
                prior_mean,
                index,
                score: 0.0,
            }
        })
        .collect();

    let max_index = rows.iter().map(|row| row.index).fold(0.0, f64::max);
    for row in rows.iter_mut() {
        row.score = normalized(row.index, max_index);
    }

    rows.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}
