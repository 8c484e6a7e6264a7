//! textlens - LLM-backed text analysis from the command line
//!
//! Reads free-form text, runs it through the analysis pipeline, and manages
//! the stored attempt history.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use textlens_core::export::render_attempt;
use textlens_core::store::AttemptStore;
use textlens_core::types::{AnalysisRequest, DomainVariant};
use textlens_core::{CompletionClient, Config, Database, Orchestrator};

#[derive(Parser)]
#[command(name = "textlens")]
#[command(about = "Analyze free-form text with an LLM pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze text from a file, or stdin when no file is given
    Analyze {
        /// Input file; reads stdin when omitted
        input: Option<PathBuf>,

        /// Analytical lens: general, sales, education or medical
        #[arg(short, long, default_value = "general")]
        variant: DomainVariant,

        /// Pretty-print the JSON response
        #[arg(long)]
        pretty: bool,
    },

    /// List recorded attempts, newest first
    History {
        /// Show at most this many attempts
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Render one recorded attempt as plain text
    Export {
        /// Attempt id (from `textlens history`)
        id: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete one recorded attempt
    Delete {
        /// Attempt id (from `textlens history`)
        id: String,
    },

    /// Show configuration and store health
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    Config::ensure_xdg_env();
    let config = Config::load().context("failed to load configuration")?;
    let _log_guard =
        textlens_core::logging::init(&config.logging).context("failed to initialize logging")?;

    match cli.command {
        Command::Analyze {
            input,
            variant,
            pretty,
        } => run_analyze(&config, input, variant, pretty),
        Command::History { limit } => run_history(&config, limit),
        Command::Export { id, output } => run_export(&config, &id, output),
        Command::Delete { id } => run_delete(&config, &id),
        Command::Status => run_status(&config),
    }
}

/// Open the configured store; `None` when persistence is disabled or the
/// database cannot be opened. Analysis runs either way.
fn open_store_best_effort(config: &Config) -> Option<Arc<dyn AttemptStore>> {
    if !config.store.is_ready() {
        tracing::info!("store disabled in configuration");
        return None;
    }

    let path = config.store.effective_path();
    match Database::open(&path).and_then(|db| db.migrate().map(|_| db)) {
        Ok(db) => Some(Arc::new(db)),
        Err(error) => {
            tracing::warn!(%error, path = %path.display(), "store unavailable, continuing without history");
            None
        }
    }
}

/// Open the configured store, failing when it is disabled or broken.
/// History commands have nothing to do without one.
fn open_store_required(config: &Config) -> Result<Database> {
    anyhow::ensure!(
        config.store.is_ready(),
        "the store is disabled in configuration; enable it to use history commands"
    );
    let path = config.store.effective_path();
    let db = Database::open(&path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    db.migrate().context("failed to run database migrations")?;
    Ok(db)
}

fn read_input(input: Option<PathBuf>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn run_analyze(
    config: &Config,
    input: Option<PathBuf>,
    variant: DomainVariant,
    pretty: bool,
) -> Result<()> {
    let text = read_input(input)?;
    let client =
        CompletionClient::new(&config.completion).context("completion service not configured")?;
    let store = open_store_best_effort(config);
    let orchestrator = Orchestrator::new(client, store);

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let request = AnalysisRequest::new(text, variant);
    let outcome = runtime.block_on(orchestrator.analyze(&request));

    let invalid_input = outcome.error().is_some_and(|e| e.is_invalid_input());
    let failed = !outcome.is_success();

    let envelope = outcome.into_envelope();
    let json = if pretty {
        serde_json::to_string_pretty(&envelope)?
    } else {
        serde_json::to_string(&envelope)?
    };
    println!("{}", json);

    if invalid_input {
        std::process::exit(2);
    }
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn run_history(config: &Config, limit: Option<usize>) -> Result<()> {
    if !config.store.is_ready() {
        println!("The store is disabled; no attempts are recorded.");
        return Ok(());
    }

    // A broken store degrades the listing to empty rather than aborting
    let path = config.store.effective_path();
    let attempts = match Database::open(&path)
        .and_then(|db| db.migrate().map(|_| db))
        .and_then(|db| db.list())
    {
        Ok(attempts) => attempts,
        Err(error) => {
            tracing::warn!(%error, path = %path.display(), "store unavailable for history");
            println!("The store is unavailable; no attempts to show.");
            return Ok(());
        }
    };

    if attempts.is_empty() {
        println!("No recorded attempts.");
        return Ok(());
    }

    let shown = limit.unwrap_or(attempts.len());
    for attempt in attempts.iter().take(shown) {
        let preview: String = attempt.input_text.chars().take(60).collect();
        println!(
            "{}  {}  {:<9} {:<7} {}",
            attempt.id,
            attempt.created_at.format("%Y-%m-%d %H:%M:%S"),
            attempt.variant,
            attempt.status.as_str(),
            preview.replace('\n', " ")
        );
    }
    if shown < attempts.len() {
        println!("... and {} more", attempts.len() - shown);
    }
    Ok(())
}

fn run_export(config: &Config, id: &str, output: Option<PathBuf>) -> Result<()> {
    let db = open_store_required(config)?;
    let attempt = db
        .get(id)?
        .with_context(|| format!("no attempt with id {}", id))?;

    let text = render_attempt(&attempt);
    match output {
        Some(path) => {
            std::fs::write(&path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn run_delete(config: &Config, id: &str) -> Result<()> {
    let db = open_store_required(config)?;
    db.delete(id)
        .with_context(|| format!("failed to delete attempt {}", id))?;
    println!("Deleted {}", id);
    Ok(())
}

fn run_status(config: &Config) -> Result<()> {
    println!("textlens status");
    println!();
    println!("Config file:  {}", Config::config_path().display());
    println!("Model:        {}", config.completion.model);
    println!("Endpoint:     {}", config.completion.endpoint);
    println!(
        "API key:      {}",
        if config.completion.resolve_api_key().is_some() {
            "configured"
        } else {
            "missing"
        }
    );
    println!("Deadline:     {}s", config.completion.deadline_secs);
    println!("Log file:     {}", Config::log_path().display());
    println!();

    if !config.store.is_ready() {
        println!("Store:        disabled");
        return Ok(());
    }

    let path = config.store.effective_path();
    println!("Database:     {}", path.display());
    match Database::open(&path).and_then(|db| db.migrate().map(|_| db)) {
        Ok(db) => {
            let health = db.health()?;
            println!("Size:         {} bytes", health.database_size_bytes);
            println!(
                "Attempts:     {} ({} success, {} error)",
                health.total_attempts, health.success_count, health.error_count
            );
        }
        Err(error) => println!("Store:        unavailable ({})", error),
    }
    Ok(())
}
