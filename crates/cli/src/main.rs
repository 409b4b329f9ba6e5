//! DevPulse CLI - developer efficiency analytics over work item histories.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use devpulse_core::{AnalysisConfig, AnalysisReport, ConfigBuilder, ConfigOverrides, WorkItemInput};
use devpulse_metrics::WorkItemAnalyzer;
use devpulse_storage::{cached_projects, filter_projects_by_name, JsonProjectCache, JsonProjectSource};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "devpulse")]
#[command(about = "Developer efficiency analytics over work item histories", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score work items and aggregate developer KPIs
    Analyze {
        /// Work items JSON (array, or object with `work_items`)
        #[arg(long)]
        input: PathBuf,
        /// Configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,
        /// JSON map of developer name to total assigned items
        #[arg(long)]
        assigned_counts: Option<PathBuf>,
        /// First day of the timeframe (YYYY-MM-DD)
        #[arg(long)]
        timeframe_start: Option<NaiveDate>,
        /// Last day of the timeframe (YYYY-MM-DD)
        #[arg(long)]
        timeframe_end: Option<NaiveDate>,
        /// Completion bonus share of the estimate
        #[arg(long)]
        completion_bonus: Option<f64>,
        /// Fair efficiency cap
        #[arg(long)]
        max_efficiency_cap: Option<f64>,
        /// Daily hour cap
        #[arg(long)]
        max_hours_per_day: Option<f64>,
        /// Weight of fair efficiency in the developer score
        #[arg(long)]
        fair_efficiency_weight: Option<f64>,
        /// Weight of delivery score in the developer score
        #[arg(long)]
        delivery_score_weight: Option<f64>,
        /// Weight of completion rate in the developer score
        #[arg(long)]
        completion_rate_weight: Option<f64>,
        /// Weight of on-time delivery in the developer score
        #[arg(long)]
        on_time_delivery_weight: Option<f64>,
        /// Comma-separated productive states, replacing the configured list
        #[arg(long, value_delimiter = ',')]
        productive_states: Option<Vec<String>>,
        /// Comma-separated blocked states, replacing the configured paused list
        #[arg(long, value_delimiter = ',')]
        blocked_states: Option<Vec<String>>,
        /// Write the full report here
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List projects through the on-disk cache
    Projects {
        /// Cache file
        #[arg(long)]
        cache: PathBuf,
        /// Project list JSON used when the cache is stale
        #[arg(long)]
        source: PathBuf,
        /// Organization recorded in the cache
        #[arg(long, default_value = "default")]
        organization: String,
        /// Ignore the cache and fetch
        #[arg(long)]
        refresh: bool,
        /// Keep only projects with this exact name
        #[arg(long = "name")]
        names: Vec<String>,
    },
    /// Print the effective configuration
    Config {
        /// Configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Accepted shapes of the analyze input file.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnalyzeInput {
    Items(Vec<WorkItemInput>),
    Batch {
        work_items: Vec<WorkItemInput>,
        #[serde(default)]
        assigned_counts: Option<HashMap<String, usize>>,
    },
}

impl AnalyzeInput {
    fn into_parts(self) -> (Vec<WorkItemInput>, Option<HashMap<String, usize>>) {
        match self {
            Self::Batch { work_items, assigned_counts } => (work_items, assigned_counts),
            Self::Items(items) => (items, None),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze {
            input,
            config,
            assigned_counts,
            timeframe_start,
            timeframe_end,
            completion_bonus,
            max_efficiency_cap,
            max_hours_per_day,
            fair_efficiency_weight,
            delivery_score_weight,
            completion_rate_weight,
            on_time_delivery_weight,
            productive_states,
            blocked_states,
            output,
        } => {
            let overrides = ConfigOverrides {
                completion_bonus_percentage: completion_bonus,
                max_efficiency_cap,
                max_hours_per_day,
                fair_efficiency_weight,
                delivery_score_weight,
                completion_rate_weight,
                on_time_delivery_weight,
                timeframe_start,
                timeframe_end,
                productive_states,
                paused_states: blocked_states,
            };
            let config = load_config(config.as_deref(), overrides).await?;

            let (items, inline_counts) = read_input(&input).await?;
            let counts = match assigned_counts {
                Some(path) => Some(read_counts(&path).await?),
                None => inline_counts,
            };

            let analyzer = WorkItemAnalyzer::new(Arc::new(config))?;
            let report = analyzer.analyze(&items, counts.as_ref());

            print_summary(&report);

            if let Some(path) = output {
                let json = serde_json::to_string_pretty(&report)?;
                tokio::fs::write(&path, json)
                    .await
                    .with_context(|| format!("writing {}", path.display()))?;
                info!("Report written to {}", path.display());
            }
        }
        Commands::Projects {
            cache,
            source,
            organization,
            refresh,
            names,
        } => {
            let cache = JsonProjectCache::new(&cache, organization);
            let source = JsonProjectSource::new(&source);
            let projects = cached_projects(&cache, &source, refresh).await?;
            let projects = filter_projects_by_name(projects, &names);

            println!("Projects ({})", projects.len());
            for project in projects {
                println!("  {} | {}", project.id, project.name);
            }
        }
        Commands::Config { config } => {
            let config = load_config(config.as_deref(), ConfigOverrides::default()).await?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

async fn load_config(path: Option<&Path>, overrides: ConfigOverrides) -> Result<AnalysisConfig> {
    let mut builder = ConfigBuilder::new();
    if let Some(path) = path {
        let json = read_file(path).await?;
        builder = builder
            .with_json(&json)
            .with_context(|| format!("loading config {}", path.display()))?;
    }
    Ok(builder.with_overrides(overrides).build()?)
}

async fn read_input(path: &Path) -> Result<(Vec<WorkItemInput>, Option<HashMap<String, usize>>)> {
    let json = read_file(path).await?;
    let input: AnalyzeInput = serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?;
    Ok(input.into_parts())
}

async fn read_counts(path: &Path) -> Result<HashMap<String, usize>> {
    let json = read_file(path).await?;
    serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
}

async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}

fn print_summary(report: &AnalysisReport) {
    let summary = &report.kpis.overall_summary;
    println!("Run {}", report.run_id);
    println!(
        "  Items: {} | Developers: {} | Avg fair efficiency: {:.2} | Avg delivery: {:.2} | Active hours: {:.2}",
        summary.total_work_items,
        summary.total_developers,
        summary.average_fair_efficiency,
        summary.average_delivery_score,
        summary.total_active_hours,
    );

    println!("Developers ({})", report.kpis.developer_metrics.len());
    for (name, m) in &report.kpis.developer_metrics {
        println!(
            "  {} | score {:.2} | fair {:.2} | delivery {:.2} | completed {}/{} | on-time {:.1}%",
            name,
            m.overall_developer_score,
            m.average_fair_efficiency,
            m.average_delivery_score,
            m.completed_items,
            m.total_work_items,
            m.on_time_delivery_percentage,
        );
    }

    if !report.kpis.bottlenecks.is_empty() {
        println!("Bottlenecks");
        for b in &report.kpis.bottlenecks {
            println!("  {} | {:.2}h avg | {} items", b.state, b.average_time_hours, b.occurrences);
        }
    }
}
