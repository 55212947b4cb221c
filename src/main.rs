use anyhow::{Context, Result};
use chartload::db::Database;
use chartload::db::models::LoadStats;
use chartload::normalize::Catalog;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgConnectOptions;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chartload", version, about = "Streaming audience-report loader")]
struct Cli {
    /// PostgreSQL connection URL (overrides the config file)
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a report CSV and load it into PostgreSQL
    Load {
        /// Path to the audience-report CSV
        report: PathBuf,

        /// Normalize and print counts without touching the database
        #[arg(long)]
        dry_run: bool,
    },

    /// Show row counts for the report tables
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = chartload::config::AppConfig::load();

    // Resolve connection settings: CLI/env > config file > defaults
    let connect_options: PgConnectOptions = match &cli.database_url {
        Some(url) => url.parse().context("Invalid database URL")?,
        None => config.database.connect_options(),
    };

    match cli.command {
        Commands::Load { report, dry_run } => {
            println!("Reading {}", report.display());
            let rows =
                chartload::report::load_report(&report).context("Failed to read report")?;
            println!("Read {} rows", rows.len());

            let (catalog, stats) = chartload::normalize::normalize(&rows);
            println!(
                "Normalized: {} songs, {} artists, {} credits, {} performance records",
                catalog.songs.len(),
                catalog.artists.len(),
                catalog.sings.len(),
                catalog.performances.len(),
            );
            if stats.rows_missing_key > 0 {
                println!("  {} rows skipped (no song key)", stats.rows_missing_key);
            }
            if stats.rows_bad_series > 0 {
                println!(
                    "  {} rows with unusable time series",
                    stats.rows_bad_series
                );
            }

            if dry_run {
                println!("DRY RUN — no changes will be written to the database");
                return Ok(());
            }

            println!("Connecting to PostgreSQL");
            let db = Database::connect(connect_options)
                .await
                .context("Failed to connect to database")?;

            // Close the pool on failure too before surfacing the error.
            let result = load(&db, &catalog).await;
            db.close().await;
            let load_stats = result?;

            println!(
                "Load complete: {} artists, {} songs, {} credits, {} performances inserted ({} duplicates skipped)",
                load_stats.artists_inserted,
                load_stats.songs_inserted,
                load_stats.sings_inserted,
                load_stats.performances_inserted,
                load_stats.total_skipped(),
            );
        }

        Commands::Stats => {
            let db = Database::connect(connect_options)
                .await
                .context("Failed to connect to database")?;

            let result = db.table_counts().await;
            db.close().await;
            let counts = result.context("Count query failed")?;

            println!("{:<14} {:>10}", "Table", "Rows");
            for count in &counts {
                println!("{:<14} {:>10}", count.table, count.rows);
            }
        }
    }

    Ok(())
}

/// Schema setup plus the single-transaction bulk insert, separated so the
/// caller can close the pool on either outcome.
async fn load(db: &Database, catalog: &Catalog) -> Result<LoadStats> {
    println!("Recreating schema (previous report tables are dropped)");
    db.init_schema().await.context("Schema setup failed")?;

    println!("Inserting data");
    db.load_catalog(catalog).await.context("Insert failed")
}
