use std::fmt::Write;
use std::path::Path;

use anyhow::Context;

use crate::models::{MetricBatch, ScoreRow};

/// Whole-unit rupiah with dot thousand separators.
pub fn format_rupiah(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.abs().to_string();
    let mut grouped = String::new();
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-Rp {grouped}")
    } else {
        format!("Rp {grouped}")
    }
}

pub fn build_report(
    quarter: &str,
    batch: &MetricBatch,
    scores: &[ScoreRow],
    budget: Option<f64>,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Expert Scorecard Report");
    let _ = writeln!(output, "Quarter {quarter}, {} eligible experts", scores.len());
    let _ = writeln!(output);

    let _ = writeln!(output, "## Batch Summary");
    if batch.rows.is_empty() {
        let _ = writeln!(output, "No eligible experts in this quarter.");
    } else {
        let total_hours: f64 = batch.rows.iter().map(|row| row.raw_hours).sum();
        let _ = writeln!(output, "- Total learning hours: {total_hours:.1}");
        let _ = writeln!(
            output,
            "- Average learning hours per expert: {:.2}",
            total_hours / batch.rows.len() as f64
        );
        if let Some(budget) = budget {
            let _ = writeln!(output, "- Compensation budget: {}", format_rupiah(budget));
        }
    }

    if !batch.unmapped_types.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Unmapped Activity Types (default weight applied)");
        for activity_type in &batch.unmapped_types {
            let _ = writeln!(output, "- {activity_type}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Scores");
    if scores.is_empty() {
        let _ = writeln!(output, "No eligible experts in this quarter.");
    } else {
        for score in scores {
            let tier_label = score
                .tier
                .map(|tier| format!("{} ({})", tier.level(), tier.benefit()))
                .unwrap_or_else(|| "Unclassified".to_string());
            if budget.is_some() {
                let _ = writeln!(
                    output,
                    "- {} ({}) final {:.2} [hours {:.2}, impact {:.2}, variety {:.2}] {}, {}",
                    score.expert_name,
                    score.nik,
                    score.final_score,
                    score.hours_score,
                    score.rating_score,
                    score.variety_score,
                    format_rupiah(score.compensation),
                    tier_label
                );
            } else {
                let _ = writeln!(
                    output,
                    "- {} ({}) final {:.2} [hours {:.2}, impact {:.2}, variety {:.2}], {}",
                    score.expert_name,
                    score.nik,
                    score.final_score,
                    score.hours_score,
                    score.rating_score,
                    score.variety_score,
                    tier_label
                );
            }
        }
    }

    output
}

pub fn export_csv(path: &Path, scores: &[ScoreRow]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer.write_record([
        "nik",
        "expert_name",
        "quarter",
        "hours_score",
        "rating_score",
        "variety_score",
        "final_score",
        "compensation",
        "tier_level",
        "benefit",
    ])?;

    for score in scores {
        writer.write_record([
            score.nik.to_string(),
            score.expert_name.clone(),
            score.quarter.clone(),
            format!("{:.2}", score.hours_score),
            format!("{:.2}", score.rating_score),
            format!("{:.2}", score.variety_score),
            format!("{:.2}", score.final_score),
            format!("{:.2}", score.compensation),
            score.tier.map(|t| t.level().to_string()).unwrap_or_default(),
            score.tier.map(|t| t.benefit().to_string()).unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
