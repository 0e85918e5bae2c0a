use chrono::NaiveDate;
use uuid::Uuid;

use crate::tier::Tier;

/// One participation record, already deduplicated by source key at ingestion.
#[derive(Debug, Clone)]
pub struct ActivityEvent {
    pub id: Uuid,
    pub nik: i64,
    pub expert_name: String,
    pub event_name: String,
    pub activity_type: String,
    pub quantity: f64,
    pub rating: Option<f64>,
    pub occurred_at: NaiveDate,
    pub quarter: String,
}

/// Aggregated metrics for one expert within one quarter.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpertMetricRow {
    pub nik: i64,
    pub expert_name: String,
    pub quarter: String,
    pub raw_hours: f64,
    pub hour_points: f64,
    pub rating_mean: Option<f64>,
    pub rating_count: usize,
    pub variety_points: f64,
    pub activity_type_count: usize,
}

/// Final computed result for one expert, re-derived on every run.
#[derive(Debug, Clone)]
pub struct ScoreRow {
    pub nik: i64,
    pub expert_name: String,
    pub quarter: String,
    pub hours_score: f64,
    pub rating_score: f64,
    pub variety_score: f64,
    pub final_score: f64,
    pub compensation: f64,
    pub tier: Option<Tier>,
}

/// Hour total for one expert within one quarter, the input to the
/// performance index.
#[derive(Debug, Clone)]
pub struct QuarterHours {
    pub nik: i64,
    pub expert_name: String,
    pub quarter: String,
    pub total_hours: f64,
}

/// Quarter-over-quarter growth result for one expert.
#[derive(Debug, Clone)]
pub struct PerformanceRow {
    pub nik: i64,
    pub expert_name: String,
    pub current_hours: f64,
    pub prior_mean: f64,
    pub index: f64,
    pub score: f64,
}

/// Aggregation output: metric rows plus the activity types that fell back
/// to the default weight, kept for the audit section of reports.
#[derive(Debug, Clone)]
pub struct MetricBatch {
    pub rows: Vec<ExpertMetricRow>,
    pub unmapped_types: std::collections::BTreeSet<String>,
}
