//! x402 CLI
//!
//! Command-line interface for the x402 facilitator analytics proxy and
//! ecosystem directory.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use x402_api::{ApiConfig, ApiServer, AppState};
use x402_core::constants::{DEFAULT_API_PORT, DEFAULT_ECOSYSTEM_DIR};
use x402_core::types::{CacheOutcome, CacheStatus, CategorySlug, EcosystemEntry};
use x402_ecosystem::EcosystemLoader;

/// x402 - facilitator analytics proxy
#[derive(Parser)]
#[command(name = "x402")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = DEFAULT_API_PORT)]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Fetch facilitator data once through the cache
    Fetch {
        /// Print per-facilitator totals instead of the raw payload
        #[arg(short, long)]
        summary: bool,
    },

    /// List ecosystem entries
    Ecosystem {
        /// Only this category (e.g. "facilitators")
        #[arg(short, long)]
        category: Option<CategorySlug>,
        /// Ecosystem data directory
        #[arg(short, long, env = "ECOSYSTEM_DATA_DIR", default_value = DEFAULT_ECOSYSTEM_DIR)]
        data_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "x402=debug,info"
    } else {
        "x402=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(port, &bind).await,
        Commands::Fetch { summary } => cmd_fetch(summary).await,
        Commands::Ecosystem { category, data_dir } => cmd_ecosystem(category, data_dir).await,
    }
}

/// Run API server
async fn cmd_serve(port: u16, bind: &str) -> Result<()> {
    println!("{}", "🚀 Starting x402 API server...".cyan().bold());
    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);
    println!("\n   Press Ctrl+C to stop.\n");

    let server = ApiServer::new(ApiConfig::from_env()).context("Invalid server configuration")?;

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .context("Invalid bind address")?;
    server.run(addr).await?;

    Ok(())
}

/// Fetch facilitator data once
async fn cmd_fetch(summary: bool) -> Result<()> {
    println!("{}", "📡 Fetching facilitator data...".cyan().bold());

    let state = AppState::new(ApiConfig::from_env()).context("Invalid configuration")?;
    let outcome = state
        .proxy
        .get_facilitator_data()
        .await
        .context("Failed to fetch facilitator data")?;

    print_outcome(&outcome);

    if summary {
        let totals = outcome
            .data()
            .totals_by_facilitator()
            .context("Payload rows are not in the expected format")?;

        println!("\n{}", "Facilitators:".yellow().bold());
        for t in &totals {
            let chains: Vec<_> = t.chains.iter().map(String::as_str).collect();
            println!(
                "   {:<24} {:>12} txs  {:>16.2} volume  {}",
                t.facilitator.green(),
                t.transactions,
                t.volume,
                chains.join(", ").dimmed()
            );
        }
    } else {
        println!("{}", serde_json::to_string_pretty(outcome.data())?);
    }

    Ok(())
}

fn print_outcome(outcome: &CacheOutcome) {
    let status = match outcome.status {
        CacheStatus::Hit => "HIT".green().bold(),
        CacheStatus::Miss => "MISS".yellow().bold(),
        CacheStatus::Stale => "STALE".red().bold(),
    };
    println!("   {} {}", "Cache status:".dimmed(), status);
    if let Some(source) = outcome.source {
        println!("   {} {}", "Source:".dimmed(), source);
    }
    if let Some(age) = outcome.age_secs {
        println!("   {} {}s", "Age:".dimmed(), age);
    }
    if let Some(reason) = outcome.stale_reason {
        println!("   {} {}", "Stale reason:".dimmed(), reason.to_string().red());
    }
    println!("   {} {}", "Rows:".dimmed(), outcome.data().row_count());
}

/// List ecosystem entries
async fn cmd_ecosystem(category: Option<CategorySlug>, data_dir: PathBuf) -> Result<()> {
    let loader = EcosystemLoader::new(&data_dir);

    let groups = match category {
        Some(slug) => vec![(slug.meta().title, loader.entries_by_category(slug).await)],
        None => loader
            .by_category()
            .await
            .into_iter()
            .map(|g| (g.category.title, g.entries))
            .collect(),
    };

    for (title, entries) in &groups {
        println!("\n{} ({})", title.cyan().bold(), entries.len());
        if entries.is_empty() {
            println!("   {}", "No entries yet.".dimmed());
        }
        for entry in entries {
            print_entry(entry);
        }
    }

    Ok(())
}

fn print_entry(entry: &EcosystemEntry) {
    println!("   {} {}", entry.name.green(), entry.url.dimmed());
    println!("      {}", entry.description);
    if !entry.tags.is_empty() {
        println!("      {} {}", "tags:".dimmed(), entry.tags.join(", "));
    }
}
