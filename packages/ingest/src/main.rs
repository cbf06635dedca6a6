#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the accident data ingestion tool.

use std::path::PathBuf;
use std::time::Instant;

use accident_risk_database::DbError;
use accident_risk_database::paths::accidents_db_path;
use accident_risk_database::records;
use accident_risk_ingest::{DEFAULT_BATCH_SIZE, LoadOptions, load_csv, summarize};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "accident_risk_ingest", about = "Accident data ingestion tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a US-Accidents CSV export into the accidents database
    Load {
        /// Path to the CSV file
        #[arg(long)]
        csv: PathBuf,
        /// Database file (defaults to `ACCIDENTS_DB_PATH` or `data/accidents.duckdb`)
        #[arg(long)]
        db: Option<PathBuf>,
        /// Maximum number of records to load (for testing)
        #[arg(long)]
        limit: Option<u64>,
        /// Records per INSERT batch
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
        /// Leave the summary tables untouched
        #[arg(long)]
        skip_summaries: bool,
    },
    /// Rebuild the summary tables from the loaded records
    Summarize {
        /// Database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Print record counts, top states, severity mix, and date range
    Stats {
        /// Database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command {
        Commands::Load {
            csv,
            db,
            limit,
            batch_size,
            skip_summaries,
        } => {
            let start = Instant::now();
            let db_path = db.unwrap_or_else(accidents_db_path);
            log::info!("Opening database at {}", db_path.display());
            let conn = accident_risk_database::open(&db_path)?;

            let summary = load_csv(
                &conn,
                &csv,
                LoadOptions {
                    limit,
                    batch_size,
                    refresh_summaries: !skip_summaries,
                },
            )?;

            log::info!(
                "Done: {} rows read, {} written, {} skipped (malformed={}, id={}, time={}, coords={}, severity={}) in {:.1}s",
                summary.rows_read,
                summary.records_written,
                summary.skipped(),
                summary.skipped_malformed,
                summary.skipped_missing_id,
                summary.skipped_start_time,
                summary.skipped_coordinates,
                summary.skipped_severity,
                start.elapsed().as_secs_f64(),
            );
        }
        Commands::Summarize { db } => {
            let db_path = db.unwrap_or_else(accidents_db_path);
            if !db_path.exists() {
                return Err(DbError::MissingStore { path: db_path }.into());
            }
            let conn = accident_risk_database::open(&db_path)?;
            summarize(&conn)?;
        }
        Commands::Stats { db } => {
            let db_path = db.unwrap_or_else(accidents_db_path);
            let conn = accident_risk_database::open_read_only(&db_path)?;

            println!("Database: {}", db_path.display());
            println!("Records:  {}", records::get_record_count(&conn)?);

            match records::get_date_range(&conn)? {
                Some((earliest, latest)) => println!("Range:    {earliest} .. {latest}"),
                None => println!("Range:    (empty)"),
            }

            println!("\nSeverity:");
            for (severity, count) in records::get_severity_distribution(&conn)? {
                println!("  {severity}  {count:>10}");
            }

            println!("\nTop states:");
            for (state, count) in records::get_top_states(&conn, 10)? {
                println!("  {state:<4} {count:>10}");
            }
        }
    }

    Ok(())
}
