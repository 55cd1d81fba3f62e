#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the theft record ingestion tool.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use theft_map_database::{cleanup, import};
use theft_map_ingest::{open_database, resolve_database_path, stats};

#[derive(Parser)]
#[command(name = "theft_map_ingest", about = "Theft record ingestion tool")]
struct Cli {
    /// `DuckDB` file to write (overrides `THEFT_MAP_DB`)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a CSV export, one record per row
    Import {
        /// CSV file to read
        csv: PathBuf,
        /// Delete existing records before importing
        #[arg(long)]
        replace: bool,
    },
    /// Rewrite LATITUDE/LONGITUDE as numbers, stripping stray characters
    CleanCoordinates,
    /// Show the record count and last import
    Stats,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return theft_map_ingest::interactive::run(cli.db);
    };

    let path = resolve_database_path(cli.db);
    let conn = open_database(&path)?;

    match command {
        Commands::Import { csv, replace } => {
            let start = Instant::now();
            let inserted = import::import_csv(&conn, &csv, replace)?;
            log::info!(
                "Imported {inserted} records in {:.1}s",
                start.elapsed().as_secs_f64()
            );
        }
        Commands::CleanCoordinates => {
            let summary = cleanup::clean_coordinates(&conn)?;
            println!(
                "Updated {} records, skipped {}",
                summary.updated, summary.skipped
            );
        }
        Commands::Stats => {
            println!("{}", stats(&conn)?);
        }
    }

    Ok(())
}
