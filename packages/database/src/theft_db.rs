//! `DuckDB` theft document storage.
//!
//! The database file holds a `thefts` table with one JSON document per
//! record and a `_meta` table tracking import state.

use std::path::Path;

use duckdb::{AccessMode, Config, Connection};
use theft_map_database_models::TheftDocument;

use crate::DbError;
use crate::queries::parse_document;

/// Number of documents per INSERT chunk.
const CHUNK_SIZE: usize = 2_000;

/// Opens (or creates) the theft database and ensures the schema exists.
///
/// # Errors
///
/// Returns [`DbError`] if the connection or schema creation fails.
pub fn open(path: &Path) -> Result<Connection, DbError> {
    if let Some(parent) = path.parent() {
        crate::paths::ensure_dir(parent)?;
    }

    let conn = Connection::open(path)?;
    create_schema(&conn)?;

    Ok(conn)
}

/// Opens the theft database read-only, creating an empty one first if the
/// file does not exist yet.
///
/// # Errors
///
/// Returns [`DbError`] if the database cannot be created or opened.
pub fn open_read_only(path: &Path) -> Result<Connection, DbError> {
    if !path.exists() {
        log::warn!(
            "No theft database at {}, creating an empty one",
            path.display()
        );
        drop(open(path)?);
    }

    Ok(Connection::open_with_flags(
        path,
        Config::default().access_mode(AccessMode::ReadOnly)?,
    )?)
}

/// Opens a private in-memory database with the schema applied.
///
/// # Errors
///
/// Returns [`DbError`] if the connection or schema creation fails.
pub fn open_in_memory() -> Result<Connection, DbError> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS thefts (
            id BIGINT NOT NULL PRIMARY KEY,
            doc JSON NOT NULL
        );

        CREATE TABLE IF NOT EXISTS _meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;

    Ok(())
}

/// Appends documents to the `thefts` table, assigning ids after the
/// current maximum.
///
/// Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`DbError`] if any database operation fails.
pub fn insert_documents(conn: &Connection, documents: &[TheftDocument]) -> Result<u64, DbError> {
    if documents.is_empty() {
        return Ok(0);
    }

    let mut next_id: i64 = conn.query_row("SELECT COALESCE(MAX(id), 0) FROM thefts", [], |row| {
        row.get(0)
    })?;
    let mut total_inserted = 0u64;

    for chunk in documents.chunks(CHUNK_SIZE) {
        let mut sql = String::from("INSERT INTO thefts (id, doc) VALUES ");
        for i in 0..chunk.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str("(?, CAST(? AS JSON))");
        }

        let mut stmt = conn.prepare(&sql)?;
        let mut param_idx = 1usize;

        for doc in chunk {
            next_id += 1;
            stmt.raw_bind_parameter(param_idx, next_id)?;
            stmt.raw_bind_parameter(param_idx + 1, serde_json::to_string(doc)?)?;
            param_idx += 2;
        }

        let rows = stmt.raw_execute()?;
        total_inserted += u64::try_from(rows).unwrap_or(0);
    }

    Ok(total_inserted)
}

/// Deletes every stored document.
///
/// # Errors
///
/// Returns [`DbError`] if the delete fails.
pub fn clear(conn: &Connection) -> Result<u64, DbError> {
    let rows = conn.execute("DELETE FROM thefts", [])?;
    Ok(u64::try_from(rows).unwrap_or(0))
}

/// Returns every stored document with its id, in id order.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a document is malformed.
pub fn load_documents(conn: &Connection) -> Result<Vec<(i64, TheftDocument)>, DbError> {
    let mut stmt = conn.prepare("SELECT id, CAST(doc AS VARCHAR) FROM thefts ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, text)| parse_document(&text).map(|doc| (id, doc)))
        .collect()
}

/// Replaces the stored documents for the given ids.
///
/// # Errors
///
/// Returns [`DbError`] if the update fails.
pub fn update_documents(
    conn: &Connection,
    updates: &[(i64, TheftDocument)],
) -> Result<u64, DbError> {
    if updates.is_empty() {
        return Ok(0);
    }

    let mut stmt = conn.prepare("UPDATE thefts SET doc = CAST(? AS JSON) WHERE id = ?")?;
    let mut total = 0u64;

    for (id, doc) in updates {
        let rows = stmt.execute(duckdb::params![serde_json::to_string(doc)?, id])?;
        total += u64::try_from(rows).unwrap_or(0);
    }

    Ok(total)
}

/// Returns the number of stored documents.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn get_record_count(conn: &Connection) -> Result<u64, DbError> {
    let mut stmt = conn.prepare("SELECT COUNT(*) FROM thefts")?;
    let count: i64 = stmt.query_row([], |row| row.get(0))?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Gets a metadata value from the `_meta` table.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn get_meta(conn: &Connection, key: &str) -> Result<Option<String>, DbError> {
    let mut stmt = conn.prepare("SELECT value FROM _meta WHERE key = ?")?;
    let result = stmt.query_row([key], |row| row.get(0));
    match result {
        Ok(v) => Ok(Some(v)),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DbError::DuckDb(e)),
    }
}

/// Sets a metadata value in the `_meta` table.
///
/// # Errors
///
/// Returns [`DbError`] if the upsert fails.
pub fn set_meta(conn: &Connection, key: &str, value: &str) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO _meta (key, value) VALUES (?, ?)
         ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
        duckdb::params![key, value],
    )?;
    Ok(())
}

/// Records which file was imported and the resulting record count.
///
/// # Errors
///
/// Returns [`DbError`] if the metadata update fails.
pub fn update_import_metadata(conn: &Connection, source_file: &str) -> Result<(), DbError> {
    let count = get_record_count(conn)?;
    let now = chrono::Utc::now().to_rfc3339();

    set_meta(conn, "source_file", source_file)?;
    set_meta(conn, "record_count", &count.to_string())?;
    set_meta(conn, "last_imported_at", &now)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(value: serde_json::Value) -> TheftDocument {
        match value {
            serde_json::Value::Object(map) => TheftDocument::new(map),
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn insert_assigns_sequential_ids() {
        let conn = open_in_memory().unwrap();
        insert_documents(&conn, &[doc(json!({ "MAKE": "Honda" }))]).unwrap();
        insert_documents(
            &conn,
            &[doc(json!({ "MAKE": "Hero" })), doc(json!({ "Make": "Bajaj" }))],
        )
        .unwrap();

        let loaded = load_documents(&conn).unwrap();
        let ids: Vec<i64> = loaded.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(get_record_count(&conn).unwrap(), 3);
    }

    #[test]
    fn meta_round_trip() {
        let conn = open_in_memory().unwrap();
        assert_eq!(get_meta(&conn, "source_file").unwrap(), None);
        update_import_metadata(&conn, "thefts.csv").unwrap();
        assert_eq!(
            get_meta(&conn, "source_file").unwrap().as_deref(),
            Some("thefts.csv")
        );
        assert_eq!(
            get_meta(&conn, "record_count").unwrap().as_deref(),
            Some("0")
        );
    }

    #[test]
    fn update_replaces_document() {
        let conn = open_in_memory().unwrap();
        insert_documents(&conn, &[doc(json!({ "LATITUDE": "16.7x" }))]).unwrap();
        update_documents(&conn, &[(1, doc(json!({ "LATITUDE": 16.7 })))]).unwrap();
        let loaded = load_documents(&conn).unwrap();
        assert_eq!(loaded[0].1.as_map()["LATITUDE"], json!(16.7));
    }
}
