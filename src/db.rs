use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{ActivityEvent, QuarterHours, ScoreRow};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Quarter label for a date, used when an imported row carries no
/// explicit quarter column.
pub fn quarter_of(date: NaiveDate) -> String {
    format!("Q{}", (date.month0() / 3) + 1)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let events = vec![
        (
            "seed-001",
            910742_i64,
            "Abdi Prasetyo",
            "B2B AM Development Batch 2",
            "Teaching",
            10.0,
            Some(8.2),
            NaiveDate::from_ymd_opt(2026, 1, 20).context("invalid date")?,
        ),
        (
            "seed-002",
            910742,
            "Abdi Prasetyo",
            "Solution Enablement Produk Digital",
            "Content Development",
            8.0,
            None,
            NaiveDate::from_ymd_opt(2026, 2, 5).context("invalid date")?,
        ),
        (
            "seed-003",
            880315,
            "Nadia Kusuma",
            "Coaching Clinic Consultative Selling",
            "Coaching",
            12.0,
            Some(9.0),
            NaiveDate::from_ymd_opt(2026, 2, 12).context("invalid date")?,
        ),
        (
            "seed-004",
            880315,
            "Nadia Kusuma",
            "Brevetisasi Logic Level 1",
            "Assessor",
            6.0,
            Some(7.5),
            NaiveDate::from_ymd_opt(2026, 3, 3).context("invalid date")?,
        ),
        (
            "seed-005",
            920118,
            "Rizky Hartono",
            "Internal Auditor Induction Program",
            "Expert Insight",
            4.0,
            Some(8.8),
            NaiveDate::from_ymd_opt(2026, 3, 10).context("invalid date")?,
        ),
    ];

    for (source_key, nik, expert_name, event_name, activity_type, quantity, rating, occurred_at) in
        events
    {
        sqlx::query(
            r#"
            INSERT INTO expert_scorecard.activity_events
            (id, nik, expert_name, event_name, activity_type, quantity, rating, occurred_at, quarter, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(nik)
        .bind(expert_name)
        .bind(event_name)
        .bind(activity_type)
        .bind(quantity)
        .bind(rating)
        .bind(occurred_at)
        .bind(quarter_of(occurred_at))
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn fetch_events(pool: &PgPool, quarter: &str) -> anyhow::Result<Vec<ActivityEvent>> {
    let rows = sqlx::query(
        "SELECT id, nik, expert_name, event_name, activity_type, quantity, rating, \
         occurred_at, quarter \
         FROM expert_scorecard.activity_events \
         WHERE quarter = $1",
    )
    .bind(quarter)
    .fetch_all(pool)
    .await?;

    let mut events = Vec::new();
    for row in rows {
        events.push(ActivityEvent {
            id: row.get("id"),
            nik: row.get("nik"),
            expert_name: row.get("expert_name"),
            event_name: row.get("event_name"),
            activity_type: row.get("activity_type"),
            quantity: row.get("quantity"),
            rating: row.get("rating"),
            occurred_at: row.get("occurred_at"),
            quarter: row.get("quarter"),
        });
    }

    Ok(events)
}

pub async fn fetch_quarter_hours(pool: &PgPool) -> anyhow::Result<Vec<QuarterHours>> {
    let rows = sqlx::query(
        "SELECT nik, MAX(expert_name) AS expert_name, quarter, \
         SUM(quantity) AS total_hours \
         FROM expert_scorecard.activity_events \
         GROUP BY nik, quarter",
    )
    .fetch_all(pool)
    .await?;

    let mut totals = Vec::new();
    for row in rows {
        totals.push(QuarterHours {
            nik: row.get("nik"),
            expert_name: row.get("expert_name"),
            quarter: row.get("quarter"),
            total_hours: row.get("total_hours"),
        });
    }

    Ok(totals)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        nik: i64,
        expert_name: String,
        event_name: String,
        activity_type: String,
        quantity: f64,
        rating: Option<f64>,
        occurred_at: NaiveDate,
        quarter: Option<String>,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let quarter = row
            .quarter
            .filter(|q| !q.trim().is_empty())
            .unwrap_or_else(|| quarter_of(row.occurred_at));
        let source_key = row
            .source_key
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO expert_scorecard.activity_events
            (id, nik, expert_name, event_name, activity_type, quantity, rating, occurred_at, quarter, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(row.nik)
        .bind(&row.expert_name)
        .bind(&row.event_name)
        .bind(&row.activity_type)
        .bind(row.quantity)
        .bind(row.rating)
        .bind(row.occurred_at)
        .bind(&quarter)
        .bind(&source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

/// Idempotent upsert keyed by (nik, quarter); a re-run replaces the
/// previous snapshot for the same expert and quarter.
pub async fn upsert_scores(pool: &PgPool, scores: &[ScoreRow]) -> anyhow::Result<usize> {
    let mut written = 0usize;

    for score in scores {
        sqlx::query(
            r#"
            INSERT INTO expert_scorecard.expert_scores
            (id, nik, expert_name, quarter, hours_score, rating_score, variety_score,
             final_score, compensation, tier_level, computed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now())
            ON CONFLICT (nik, quarter) DO UPDATE
            SET expert_name = EXCLUDED.expert_name,
                hours_score = EXCLUDED.hours_score,
                rating_score = EXCLUDED.rating_score,
                variety_score = EXCLUDED.variety_score,
                final_score = EXCLUDED.final_score,
                compensation = EXCLUDED.compensation,
                tier_level = EXCLUDED.tier_level,
                computed_at = now()
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(score.nik)
        .bind(&score.expert_name)
        .bind(&score.quarter)
        .bind(score.hours_score)
        .bind(score.rating_score)
        .bind(score.variety_score)
        .bind(score.final_score)
        .bind(score.compensation)
        .bind(score.tier.map(|tier| tier.level()))
        .execute(pool)
        .await?;
        written += 1;
    }

    Ok(written)
}
