//! FDP Ingest - Company data ingestion tool

use anyhow::{Context, Result};
use clap::Parser;
use fdp_common::logging::{init_logging, LogConfig, LogLevel};
use fdp_ingest::{pipeline, storage, Source};
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "fdp-ingest")]
#[command(author, version, about = "FDP company data ingestion tool")]
struct Cli {
    /// Directory containing the vendor CSV exports
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Single source to ingest (all sources when omitted)
    #[arg(short, long)]
    source: Option<Source>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Maximum database connections in the pool
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder().level(log_level).build();

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    init_logging(&log_config)?;

    let sources: Vec<Source> = match cli.source {
        Some(source) => vec![source],
        None => Source::ALL.to_vec(),
    };

    let pool = PgPoolOptions::new()
        .max_connections(cli.max_connections)
        .connect(&cli.database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    storage::apply_migrations(&pool)
        .await
        .context("Failed to apply destination schema migrations")?;

    // Sources are independent; a failure aborts that source only and the
    // remaining ones still run. The process exits non-zero if any failed.
    let mut failed = Vec::new();

    for source in sources {
        match pipeline::run(&pool, source, &cli.data_dir).await {
            Ok(stats) => {
                info!(
                    source = source.name(),
                    rows_written = stats.rows_written,
                    tables = stats.tables_written,
                    "Ingestion complete"
                );
            },
            Err(e) => {
                error!(source = source.name(), error = %e, "Ingestion failed");
                failed.push(source);
            },
        }
    }

    if !failed.is_empty() {
        anyhow::bail!(
            "{} source(s) failed: {}",
            failed.len(),
            failed
                .iter()
                .map(Source::name)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Ok(())
}
