use anyhow::{bail, Context, Result};
use models::MonthData;
use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use crate::months::months_from_value;

const DATABASE_FILE: &str = "months.json";

/// Resolves a directory (existing, or any path not ending in `.json`) to
/// the `months.json` file inside it.
pub fn resolve_database_path<P: AsRef<Path>>(database_path: P) -> PathBuf {
    let path = database_path.as_ref();
    if path.is_dir() || (!path.exists() && !path.to_string_lossy().ends_with(".json")) {
        path.join(DATABASE_FILE)
    } else {
        path.to_path_buf()
    }
}

/// Ensures that the months database exists at the specified path.
/// A missing file is created holding an empty array. An existing file that
/// is not valid JSON is left untouched and reported as an error so that
/// no data is silently discarded.
///
/// # Example
/// ```no_run
/// use utils::ensure_database_exists;
///
/// let db_path = ensure_database_exists("database").unwrap();
/// println!("Database ready at: {:?}", db_path);
/// ```
pub fn ensure_database_exists<P: AsRef<Path>>(database_path: P) -> Result<PathBuf> {
    let db_path = resolve_database_path(database_path);

    match File::open(&db_path) {
        Ok(mut file) => {
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            serde_json::from_str::<serde_json::Value>(&contents)
                .with_context(|| format!("Database at {:?} is not valid JSON", db_path))?;
        }
        Err(_) => {
            write_months(&db_path, &[])?;
            tracing::info!("Initialized empty months database at {:?}", db_path);
        }
    }

    Ok(db_path)
}

/// Reads every month record, validating the shape of each one and
/// rejecting repeated ids. Ensures the database exists before reading.
pub fn read_months<P: AsRef<Path>>(database_path: P) -> Result<Vec<MonthData>> {
    let db_path = ensure_database_exists(database_path)?;
    load_months(&db_path)
}

/// Like [`read_months`], but a missing database is an error instead of
/// being created. Used by commands that only look at the data.
pub fn read_existing_months<P: AsRef<Path>>(database_path: P) -> Result<Vec<MonthData>> {
    let db_path = resolve_database_path(database_path);
    if !db_path.is_file() {
        bail!("No months database at {:?}", db_path);
    }
    load_months(&db_path)
}

fn load_months(db_path: &Path) -> Result<Vec<MonthData>> {
    let mut file =
        File::open(db_path).with_context(|| format!("Cannot open database at {:?}", db_path))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("Database at {:?} is not valid JSON", db_path))?;
    let months = months_from_value(value)
        .with_context(|| format!("Database at {:?} has invalid month records", db_path))?;

    tracing::debug!(count = months.len(), "Loaded month records from {:?}", db_path);
    Ok(months)
}

/// Writes the records as a pretty-printed JSON array.
pub fn write_months<P: AsRef<Path>>(database_path: P, months: &[MonthData]) -> Result<PathBuf> {
    let db_path = resolve_database_path(database_path);

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(&db_path)
        .with_context(|| format!("Cannot create database file at {:?}", db_path))?;
    let formatted = serde_json::to_string_pretty(months)?;
    file.write_all(formatted.as_bytes())?;

    Ok(db_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::MonthName;

    #[test]
    fn test_directory_resolves_to_months_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_database_path(dir.path()), dir.path().join("months.json"));

        let explicit = dir.path().join("custom.json");
        assert_eq!(resolve_database_path(&explicit), explicit);
    }

    #[test]
    fn test_missing_database_is_initialized_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("months.json");

        let months = read_months(&path).unwrap();
        assert!(months.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
    }

    #[test]
    fn test_invalid_json_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("months.json");
        std::fs::write(&path, "{broken").unwrap();

        assert!(read_months(&path).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{broken");
    }

    #[test]
    fn test_non_array_database_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("months.json");
        std::fs::write(&path, r#"{"months": []}"#).unwrap();

        assert!(read_months(&path).is_err());
    }

    #[test]
    fn test_repeated_ids_are_rejected_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("months.json");
        let contents = r#"[
            {"id": "1", "month": "Janeiro", "year": 2025, "revenue": 100.0},
            {"id": "1", "month": "Fevereiro", "year": 2025, "revenue": 200.0}
        ]"#;
        std::fs::write(&path, contents).unwrap();

        let err = read_months(&path).unwrap_err();
        assert!(format!("{err:#}").contains("\"1\" appears more than once"));
        assert!(read_existing_months(&path).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), contents);
    }

    #[test]
    fn test_read_existing_does_not_create_missing_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("months.json");

        assert!(read_existing_months(&path).is_err());
        assert!(!path.exists());

        write_months(&path, &[]).unwrap();
        assert!(read_existing_months(&path).unwrap().is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let month = MonthData::new(MonthName::Outubro, 2025, 4200.0, 35.0).with_expense("Gás", 80.5);

        let path = write_months(dir.path(), std::slice::from_ref(&month)).unwrap();
        let loaded = read_months(&path).unwrap();

        assert_eq!(loaded, vec![month]);
    }
}
