//! Bulk import of theft records from CSV files.
//!
//! Each row becomes one document keyed by the header names exactly as they
//! appear in the file, so datasets with different column spellings keep
//! them. Empty cells are left out of the document rather than stored as
//! empty strings.

use std::io::Read;
use std::path::Path;

use duckdb::Connection;
use serde_json::{Map, Value};
use theft_map_database_models::TheftDocument;

use crate::{DbError, theft_db};

/// Reads every row of a CSV stream as a document.
///
/// # Errors
///
/// Returns [`DbError`] if the stream is not valid CSV.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<TheftDocument>, DbError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut documents = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut map = Map::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            let cell = cell.trim();
            if header.is_empty() || cell.is_empty() {
                continue;
            }
            map.insert(header.clone(), Value::String(cell.to_string()));
        }
        documents.push(TheftDocument::new(map));
    }

    Ok(documents)
}

/// Reads every row of the CSV file at `path` as a document.
///
/// # Errors
///
/// Returns [`DbError`] if the file cannot be opened or parsed.
pub fn read_csv_path(path: &Path) -> Result<Vec<TheftDocument>, DbError> {
    let file = std::fs::File::open(path)?;
    read_csv(file)
}

/// Imports a CSV file into the theft database.
///
/// With `replace`, existing documents are deleted first; otherwise the new
/// rows are appended. Returns the number of documents inserted.
///
/// # Errors
///
/// Returns [`DbError`] if the file cannot be read or the insert fails.
pub fn import_csv(conn: &Connection, path: &Path, replace: bool) -> Result<u64, DbError> {
    let documents = read_csv_path(path)?;
    if documents.is_empty() {
        log::warn!("No rows found in {}", path.display());
        return Ok(0);
    }

    if replace {
        let removed = theft_db::clear(conn)?;
        log::info!("Removed {removed} existing theft records");
    }

    let inserted = theft_db::insert_documents(conn, &documents)?;
    theft_db::update_import_metadata(conn, &path.display().to_string())?;
    log::info!("Inserted {inserted} records from {}", path.display());

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
,POLICE_STATION,Make,Time_of_day,LATITUDE,LONGITUDE,DATE
0,Karveer,Honda,Morning,16.70N,74.24,27.7.25
1,Shahupuri,,Evening,16.71,74.25,28.7.25
";

    #[test]
    fn reads_rows_as_documents() {
        let docs = read_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].as_map()["Make"], Value::String("Honda".to_string()));
        assert_eq!(
            docs[0].as_map()["LATITUDE"],
            Value::String("16.70N".to_string())
        );
    }

    #[test]
    fn skips_empty_cells_and_unnamed_columns() {
        let docs = read_csv(SAMPLE.as_bytes()).unwrap();
        assert!(!docs[1].as_map().contains_key("Make"));
        assert!(!docs[0].as_map().contains_key(""));
        assert_eq!(docs[1].as_map().len(), 5);
    }

    #[test]
    fn imports_into_duckdb() {
        let dir = std::env::temp_dir().join(format!("theft_map_import_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("thefts.csv");
        std::fs::write(&path, SAMPLE).unwrap();

        let conn = theft_db::open_in_memory().unwrap();
        assert_eq!(import_csv(&conn, &path, false).unwrap(), 2);
        assert_eq!(import_csv(&conn, &path, false).unwrap(), 2);
        assert_eq!(theft_db::get_record_count(&conn).unwrap(), 4);
        assert_eq!(import_csv(&conn, &path, true).unwrap(), 2);
        assert_eq!(theft_db::get_record_count(&conn).unwrap(), 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
