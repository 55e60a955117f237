//! decision-lens CLI.
//!
//! Usage:
//!   decision-lens analyze --brief brief.json [--frameworks swot,pareto] [--preference auto] [--simulate]
//!   decision-lens catalog

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use decision_lens::clients::{Preference, ProviderResolver};
use decision_lens::cognitive::catalog;
use decision_lens::config::{Config, GenerationScope};
use decision_lens::parse_brief;
use decision_lens::runs::{InMemoryStore, ResultStore, RunController};

#[derive(Parser)]
#[command(name = "decision-lens")]
#[command(about = "Evaluate a decision brief against a catalog of analytical frameworks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one analysis and print the final snapshot and synthesis as JSON
    Analyze {
        /// Brief file (.json or .toml)
        #[arg(long)]
        brief: PathBuf,
        /// Comma-separated framework ids; defaults to the whole catalog
        #[arg(long, value_delimiter = ',')]
        frameworks: Vec<String>,
        /// Backend preference: auto, local or hosted
        #[arg(long)]
        preference: Option<Preference>,
        /// Skip generation backends entirely and use seeded heuristics
        #[arg(long)]
        simulate: bool,
        /// Worker count (clamped to 1..=8)
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// List the framework catalog as JSON
    Catalog,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load().context("load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.runtime.log_level)
                .unwrap_or_else(|_| EnvFilter::new("decision_lens=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze {
            brief,
            frameworks,
            preference,
            simulate,
            concurrency,
        } => {
            if simulate {
                config.analysis.scope = GenerationScope::Simulation;
            }
            if let Some(n) = concurrency {
                config.analysis.max_concurrency = n;
            }
            config.validate()?;
            analyze(config, brief, frameworks, preference).await
        }
        Commands::Catalog => {
            println!("{}", serde_json::to_string_pretty(catalog::catalog())?);
            Ok(())
        }
    }
}

async fn analyze(
    config: Config,
    brief_path: PathBuf,
    frameworks: Vec<String>,
    preference: Option<Preference>,
) -> Result<()> {
    let content = std::fs::read_to_string(&brief_path)
        .with_context(|| format!("read brief {}", brief_path.display()))?;
    let is_toml = brief_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let brief = parse_brief(&content, is_toml)?;
    let preference = preference.unwrap_or(config.analysis.preference);

    info!(
        decision_id = %brief.decision_id,
        scope = config.analysis.scope.as_str(),
        preference = %preference,
        workers = config.analysis.effective_concurrency(),
        "starting analysis"
    );

    let store = Arc::new(InMemoryStore::new());
    store.insert_brief(brief.clone()).await;
    let controller = RunController::new(
        config.analysis.clone(),
        Arc::new(ProviderResolver::from_config(&config)),
        store.clone(),
        store.clone(),
    );

    let run = controller
        .create_run(&brief.decision_id, frameworks, preference)
        .await?;
    let outcome = controller.run_now(&run.id).await;

    let snapshot = controller.get_run_snapshot(&run.id).await?;
    let finalized = store.get_finalized(&run.id).await;
    let results = store.list_results(&run.id).await?;
    let output = json!({
        "snapshot": snapshot,
        "results": results,
        "propagated_map": finalized.as_ref().map(|f| &f.map),
        "synthesis": finalized.as_ref().map(|f| &f.synthesis),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    outcome?;
    Ok(())
}
