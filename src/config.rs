use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Percentage contribution of each sub-score to the final score.
/// Totals are not validated; the caller supplies weights that sum sensibly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ComponentWeights {
    pub hours: f64,
    pub rating: f64,
    pub variety: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            hours: 70.0,
            rating: 10.0,
            variety: 20.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Activity type -> multiplier applied to learning hours.
    pub hour_weights: BTreeMap<String, f64>,
    /// Activity type -> multiplier applied to assignment-variety frequency.
    pub variety_weights: BTreeMap<String, f64>,
    pub component_weights: ComponentWeights,
    /// Experts below this raw hour total in the quarter are not scored.
    pub min_hours: f64,
    /// Administratively excluded experts, removed before aggregation.
    pub excluded_niks: Vec<i64>,
    /// Optional fixed ceiling for variety normalization. When unset the
    /// batch maximum is used, as for the other metrics.
    pub variety_reference_max: Option<f64>,
    /// Total compensation budget; flag overrides take precedence.
    pub budget: Option<f64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let hour_weights = BTreeMap::from([
            ("Coaching".to_string(), 1.5),
            ("Mentoring".to_string(), 1.5),
            ("Expert Insight".to_string(), 1.3),
            ("Speaker".to_string(), 1.3),
            ("Teaching".to_string(), 1.4),
            ("Content Development".to_string(), 1.5),
            ("Publication".to_string(), 1.1),
            ("Assessor".to_string(), 1.2),
        ]);
        let variety_weights = BTreeMap::from([
            ("Coaching".to_string(), 1.5),
            ("Mentoring".to_string(), 1.4),
            ("Speaker".to_string(), 1.3),
            ("Teaching".to_string(), 1.2),
            ("Content Development".to_string(), 1.1),
            ("Publication".to_string(), 1.0),
        ]);
        Self {
            hour_weights,
            variety_weights,
            component_weights: ComponentWeights::default(),
            min_hours: 10.0,
            excluded_niks: Vec::new(),
            variety_reference_max: None,
            budget: None,
        }
    }
}

pub const DEFAULT_WEIGHT: f64 = 1.0;

impl ScoringConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn hour_weight(&self, activity_type: &str) -> Option<f64> {
        self.hour_weights.get(activity_type).copied()
    }

    pub fn variety_weight(&self, activity_type: &str) -> Option<f64> {
        self.variety_weights.get(activity_type).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_match_documented_tables() {
        let config = ScoringConfig::default();
        assert_eq!(config.hour_weight("Teaching"), Some(1.4));
        assert_eq!(config.hour_weight("Speaker"), Some(1.3));
        assert_eq!(config.hour_weight("Content Development"), Some(1.5));
        assert_eq!(config.variety_weight("Speaker"), Some(1.3));
        assert_eq!(config.hour_weight("Town Hall"), None);
    }

    #[test]
    fn component_weights_default_to_70_10_20() {
        let weights = ComponentWeights::default();
        assert_eq!(weights.hours, 70.0);
        assert_eq!(weights.rating, 10.0);
        assert_eq!(weights.variety, 20.0);
    }

    #[test]
    fn partial_config_json_keeps_defaults() {
        let config: ScoringConfig =
            serde_json::from_str(r#"{"min_hours": 12, "excluded_niks": [860066]}"#).unwrap();
        assert_eq!(config.min_hours, 12.0);
        assert_eq!(config.excluded_niks, vec![860066]);
        assert_eq!(config.component_weights.hours, 70.0);
        assert_eq!(config.hour_weight("Coaching"), Some(1.5));
    }
}
