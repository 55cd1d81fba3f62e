#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the theft database.
//!
//! All paths are relative to the project root's `data/` directory.

use std::path::{Path, PathBuf};

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`, falling back to the
/// current directory when the crate is not built inside the workspace.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the default theft `DuckDB` file.
#[must_use]
pub fn default_db_path() -> PathBuf {
    data_dir().join("thefts.duckdb")
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_db_lives_under_data() {
        let path = default_db_path();
        assert!(path.starts_with(data_dir()));
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("thefts.duckdb"));
    }

    #[test]
    fn ensure_dir_accepts_empty_parent() {
        assert!(ensure_dir(Path::new("")).is_ok());
    }
}
