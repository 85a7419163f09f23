use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use std::fs;
use std::path::PathBuf;
use tabled::{Table, Tabled};

use readyrs::config::EngineConfig;
use readyrs::engine::AnalysisEngine;
use readyrs::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use readyrs::models::RiskLevel;
use readyrs::timeseries::InMemoryMetricStore;

/// ReadyRS - Athlete Readiness & Load Analysis CLI
///
/// Derives coaching-decision scores (ACWR, readiness, performance index,
/// injury risk) from a snapshot of athlete sessions, wellness entries, and
/// metric samples.
#[derive(Parser)]
#[command(name = "readyrs")]
#[command(version = "0.1.0")]
#[command(about = "Athlete Readiness & Load Analysis CLI", long_about = None)]
struct Cli {
    /// JSON snapshot of sessions, wellness entries, and metric samples
    #[arg(short, long, value_name = "FILE")]
    snapshot: PathBuf,

    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format (pretty, json, compact)
    #[arg(long, default_value = "compact")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Daily readiness score and training-intensity recommendation
    Readiness {
        /// Athlete identifier
        #[arg(short, long)]
        athlete: String,

        /// Reference date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,
    },

    /// Training-load block: acute/chronic load, ACWR, monotony, strain
    Load {
        /// Athlete identifier
        #[arg(short, long)]
        athlete: String,

        /// Reference date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,
    },

    /// Performance index for the most recent session
    Performance {
        /// Athlete identifier
        #[arg(short, long)]
        athlete: String,

        /// Reference date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,
    },

    /// Injury-risk assessment with contributing factors
    Risk {
        /// Athlete identifier
        #[arg(short, long)]
        athlete: String,

        /// Reference date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,
    },
}

#[derive(Tabled)]
struct ScoreRow {
    #[tabled(rename = "Component")]
    component: String,

    #[tabled(rename = "Score")]
    score: String,
}

#[derive(Tabled)]
struct FactorRow {
    #[tabled(rename = "Factor")]
    name: String,

    #[tabled(rename = "Value")]
    value: String,

    #[tabled(rename = "Contribution")]
    contribution: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig {
        level: LogLevel::from_verbosity(cli.verbose),
        format: cli.log_format,
        file_dir: None,
    };
    let _guard = init_logging(&log_config)?;

    let config = EngineConfig::load_or_default(cli.config.as_deref())?;

    let contents = fs::read_to_string(&cli.snapshot)
        .with_context(|| format!("reading snapshot {}", cli.snapshot.display()))?;
    let store: InMemoryMetricStore =
        serde_json::from_str(&contents).context("parsing snapshot JSON")?;
    store.validate().context("validating snapshot")?;

    let engine = AnalysisEngine::with_config(store, config);

    match cli.command {
        Commands::Readiness { athlete, date } => {
            let result = engine.readiness(&athlete, date)?;

            let rows = vec![
                ScoreRow {
                    component: "Sleep".to_string(),
                    score: format!("{:.1}", result.sleep_score),
                },
                ScoreRow {
                    component: "HRV / Heart rate".to_string(),
                    score: format!("{:.1}", result.hrv_score),
                },
                ScoreRow {
                    component: "Recovery".to_string(),
                    score: format!("{:.1}", result.recovery_score),
                },
                ScoreRow {
                    component: "Wellness".to_string(),
                    score: format!("{:.1}", result.wellness_score),
                },
                ScoreRow {
                    component: "Workload".to_string(),
                    score: format!("{:.1}", result.workload_score),
                },
            ];
            println!("{}", Table::new(rows));

            let headline = format!("Readiness: {:.1} / 100", result.readiness_score);
            if result.can_train_full {
                println!("{}", headline.green().bold());
            } else {
                println!("{}", headline.yellow().bold());
            }
            println!("Recommended intensity: {}", result.recommended_intensity);
            match result.acwr {
                Some(acwr) => println!("ACWR: {:.2}", acwr),
                None => println!("ACWR: n/a (insufficient history)"),
            }
            if result.injury_risk_flag {
                println!("{}", "Injury risk flag raised".red().bold());
            }
        }

        Commands::Load { athlete, date } => {
            let metrics = engine.load_metrics(&athlete, date)?;

            println!("Acute load (7d):        {:.0}", metrics.acute_load);
            println!("Chronic weekly load:    {:.0}", metrics.chronic_weekly_load);
            match metrics.acwr {
                Some(acwr) => println!("ACWR:                   {:.2}", acwr),
                None => println!("ACWR:                   n/a (insufficient history)"),
            }
            println!("Monotony:               {:.2}", metrics.monotony);
            println!("Strain:                 {:.1}", metrics.strain);
            println!("History span:           {} days", metrics.history_days);
        }

        Commands::Performance { athlete, date } => {
            let analytics = engine.performance(&athlete, date)?;

            println!(
                "Performance index: {}",
                format!("{:.1}", analytics.performance_index).bold()
            );
            match analytics.rolling_average {
                Some(avg) => println!("Rolling average (4 sessions): {:.1}", avg),
                None => println!("Rolling average: n/a (fewer than 2 sessions)"),
            }
            match analytics.baseline_zscore {
                Some(z) => println!("Baseline z-score: {:+.2}", z),
                None => println!("Baseline z-score: n/a (fewer than 3 prior sessions)"),
            }
            println!("Cluster: {}", analytics.cluster_label);
        }

        Commands::Risk { athlete, date } => {
            let assessment = engine.risk(&athlete, date)?;

            let level = assessment.risk_level.to_string();
            let level = match assessment.risk_level {
                RiskLevel::Low => level.green(),
                RiskLevel::Medium => level.yellow(),
                RiskLevel::High | RiskLevel::VeryHigh => level.red().bold(),
            };
            println!("Risk score: {:.2} ({})", assessment.risk_score, level);

            if assessment.contributing_factors.is_empty() {
                println!("No contributing factors above threshold.");
            } else {
                let rows: Vec<FactorRow> = assessment
                    .contributing_factors
                    .iter()
                    .map(|f| FactorRow {
                        name: f.name.clone(),
                        value: format!("{:.2}", f.value),
                        contribution: format!("{:.2}", f.contribution),
                    })
                    .collect();
                println!("{}", Table::new(rows));
            }
        }
    }

    Ok(())
}
