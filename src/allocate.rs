use anyhow::bail;

use crate::models::ScoreRow;

/// Split the budget across the batch in proportion to each expert's share
/// of the total score.
///
/// A zero score total fails the whole batch instead of producing NaN
/// allocations; callers decide whether an all-zero batch should have been
/// filtered out earlier. The allocated amounts sum to the budget within
/// floating-point tolerance.
pub fn allocate(scores: &mut [ScoreRow], budget: f64) -> anyhow::Result<()> {
    if budget <= 0.0 {
        bail!("compensation budget must be positive, got {budget}");
    }
    if scores.is_empty() {
        return Ok(());
    }

    let total: f64 = scores.iter().map(|row| row.final_score).sum();
    if total <= 0.0 {
        bail!("batch score total is zero, cannot distribute budget {budget}");
    }

    for row in scores.iter_mut() {
        row.compensation = (row.final_score / total) * budget;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score_row(nik: i64, final_score: f64) -> ScoreRow {
        ScoreRow {
            nik,
            expert_name: format!("Expert {nik}"),
            quarter: "Q1".to_string(),
            hours_score: final_score,
            rating_score: final_score,
            variety_score: final_score,
            final_score,
            compensation: 0.0,
            tier: None,
        }
    }

    #[test]
    fn shares_are_proportional_to_score() {
        // Ten experts summing to 874.8; the 91.1 scorer takes its share
        // of a 45M budget.
        let finals = [91.1, 88.8, 85.1, 89.3, 90.5, 84.4, 86.7, 88.0, 83.9, 87.0];
        let mut scores: Vec<ScoreRow> = finals
            .iter()
            .enumerate()
            .map(|(i, &s)| score_row(i as i64, s))
            .collect();
        allocate(&mut scores, 45_000_000.0).unwrap();
        let expert_a = scores.iter().find(|s| s.nik == 0).unwrap();
        assert!((expert_a.compensation - 4_686_214.0).abs() < 1_000.0);
    }

    #[test]
    fn allocations_sum_to_the_budget() {
        let mut scores = vec![score_row(1, 91.1), score_row(2, 73.4), score_row(3, 55.9)];
        let budget = 45_000_000.0;
        allocate(&mut scores, budget).unwrap();
        let total: f64 = scores.iter().map(|s| s.compensation).sum();
        assert!((total - budget).abs() <= 0.01 * scores.len() as f64);
        assert!(scores.iter().all(|s| s.compensation >= 0.0));
    }

    #[test]
    fn zero_score_total_fails_the_batch() {
        let mut scores = vec![score_row(1, 0.0), score_row(2, 0.0)];
        let err = allocate(&mut scores, 1_000_000.0).unwrap_err();
        assert!(err.to_string().contains("score total is zero"));
    }

    #[test]
    fn non_positive_budget_is_rejected() {
        let mut scores = vec![score_row(1, 80.0)];
        assert!(allocate(&mut scores, 0.0).is_err());
        assert!(allocate(&mut scores, -10.0).is_err());
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let mut scores: Vec<ScoreRow> = Vec::new();
        allocate(&mut scores, 1_000_000.0).unwrap();
    }
}
