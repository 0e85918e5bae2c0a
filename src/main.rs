use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

mod aggregate;
mod allocate;
mod config;
mod db;
mod models;
mod performance;
mod report;
mod score;
mod tier;

use config::ScoringConfig;
use models::{MetricBatch, ScoreRow};

#[derive(Parser)]
#[command(name = "expert-scorecard")]
#[command(about = "Quarterly expert performance scoring and compensation allocation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import activity events from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Score one quarter and print ranked results
    Score {
        #[arg(long)]
        quarter: String,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Upsert the computed scores keyed by (nik, quarter)
        #[arg(long)]
        save: bool,
    },
    /// Quarter-over-quarter learning-hour growth index
    PerformanceIndex {
        #[arg(long)]
        quarter: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        quarter: String,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export computed scores to a CSV file
    Export {
        #[arg(long)]
        quarter: String,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long, default_value = "scores.csv")]
        out: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ScoringConfig> {
    match path {
        Some(path) => ScoringConfig::load(path),
        None => Ok(ScoringConfig::default()),
    }
}

/// Fetch one quarter's events and run the full pipeline: aggregate,
/// normalize, compose, and (when a budget is known) allocate.
async fn run_pipeline(
    pool: &PgPool,
    quarter: &str,
    config: &ScoringConfig,
    budget_flag: Option<f64>,
) -> anyhow::Result<(MetricBatch, Vec<ScoreRow>, Option<f64>)> {
    let events = db::fetch_events(pool, quarter).await?;
    let batch = aggregate::aggregate_events(&events, config)?;
    let mut scores = score::score_batch(&batch.rows, config);

    let budget = budget_flag.or(config.budget);
    if let Some(budget) = budget {
        if !scores.is_empty() {
            allocate::allocate(&mut scores, budget)?;
        }
    }

    Ok((batch, scores, budget))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} activity events from {}.", csv.display());
        }
        Commands::Score {
            quarter,
            config,
            budget,
            limit,
            save,
        } => {
            let config = load_config(config.as_ref())?;
            let (_, scores, budget) = run_pipeline(&pool, &quarter, &config, budget).await?;

            if scores.is_empty() {
                println!("No eligible experts for {quarter}.");
                return Ok(());
            }

            println!("Top experts for {quarter}:");
            for score in scores.iter().take(limit) {
                let tier_label = score
                    .tier
                    .map(|tier| tier.level().to_string())
                    .unwrap_or_else(|| "Unclassified".to_string());
                if budget.is_some() {
                    println!(
                        "- {} ({}) final {:.2}, {}, {}",
                        score.expert_name,
                        score.nik,
                        score.final_score,
                        report::format_rupiah(score.compensation),
                        tier_label
                    );
                } else {
                    println!(
                        "- {} ({}) final {:.2}, {}",
                        score.expert_name, score.nik, score.final_score, tier_label
                    );
                }
            }

            if save {
                let written = db::upsert_scores(&pool, &scores).await?;
                println!("Saved {written} score rows for {quarter}.");
            }
        }
        Commands::PerformanceIndex { quarter, limit } => {
            let hours = db::fetch_quarter_hours(&pool).await?;
            let rows = performance::performance_index(&hours, &quarter);

            if rows.is_empty() {
                println!("No activity recorded yet.");
                return Ok(());
            }

            println!("Performance index for {quarter}:");
            for row in rows.iter().take(limit) {
                println!(
                    "- {} ({}) score {:.2}, index {:.2} ({:.1}h now vs {:.1}h prior mean)",
                    row.expert_name, row.nik, row.score, row.index, row.current_hours, row.prior_mean
                );
            }
        }
        Commands::Report {
            quarter,
            config,
            budget,
            out,
        } => {
            let config = load_config(config.as_ref())?;
            let (batch, scores, budget) = run_pipeline(&pool, &quarter, &config, budget).await?;
            let report = report::build_report(&quarter, &batch, &scores, budget);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export {
            quarter,
            config,
            budget,
            out,
        } => {
            let config = load_config(config.as_ref())?;
            let (_, scores, _) = run_pipeline(&pool, &quarter, &config, budget).await?;
            if scores.is_empty() {
                println!("No eligible experts for {quarter}; nothing exported.");
                return Ok(());
            }
            report::export_csv(&out, &scores)?;
            println!("Exported {} score rows to {}.", scores.len(), out.display());
        }
    }

    Ok(())
}
