#![allow(clippy::module_name_repetitions)]

//! Interactive TUI for the theft record ingestion tool.
//!
//! Provides a menu-driven interface using `dialoguer` for running ingest
//! commands without memorizing CLI flags.

use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};
use theft_map_database::{cleanup, import};

use crate::{open_database, resolve_database_path, stats};

/// Top-level actions available in the ingest interactive menu.
enum IngestAction {
    ImportCsv,
    CleanCoordinates,
    ShowStats,
}

impl IngestAction {
    const ALL: &[Self] = &[Self::ImportCsv, Self::CleanCoordinates, Self::ShowStats];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::ImportCsv => "Import CSV file",
            Self::CleanCoordinates => "Clean coordinates",
            Self::ShowStats => "Show database stats",
        }
    }
}

/// Runs the interactive menu, prompting the user to select and configure an
/// ingest operation. The database prompt defaults to `db` when given.
///
/// # Errors
///
/// Returns an error if a prompt fails, the database cannot be opened, or the
/// selected operation fails.
pub fn run(db: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let default_db = resolve_database_path(db).display().to_string();
    let db_path: String = Input::new()
        .with_prompt("Theft database")
        .default(default_db)
        .interact_text()?;
    let conn = open_database(&PathBuf::from(db_path))?;

    let labels: Vec<&str> = IngestAction::ALL.iter().map(IngestAction::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match IngestAction::ALL[idx] {
        IngestAction::ImportCsv => {
            let csv: String = Input::new().with_prompt("CSV file").interact_text()?;
            let replace = Confirm::new()
                .with_prompt("Replace existing records?")
                .default(false)
                .interact()?;
            let inserted = import::import_csv(&conn, &PathBuf::from(csv.trim()), replace)?;
            println!("Imported {inserted} records.");
        }
        IngestAction::CleanCoordinates => {
            let summary = cleanup::clean_coordinates(&conn)?;
            println!(
                "Updated {} records, skipped {}.",
                summary.updated, summary.skipped
            );
        }
        IngestAction::ShowStats => println!("{}", stats(&conn)?),
    }

    Ok(())
}
