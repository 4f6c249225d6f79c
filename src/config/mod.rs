//! Configuration management.
//!
//! Two kinds of configuration exist:
//! - **Database location**: a single store shared by every project, at
//!   `~/.spark/spark_store.db` unless overridden.
//! - **Project marker**: a `.spark` YAML file in each working directory
//!   naming the project and its default collection (see [`spark_file`]).

mod spark_file;

pub use spark_file::{read_config, spark_file_path, write_config, SparkConfig, SPARK_FILE};

use std::path::{Path, PathBuf};

/// Environment variable overriding the database location.
pub const DB_ENV: &str = "SPARK_DB";

/// Get the global spark directory (`~/.spark/`).
#[must_use]
pub fn global_spark_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".spark"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. If `explicit_path` is provided, use it directly
/// 2. `SPARK_DB` environment variable
/// 3. Global location: `~/.spark/spark_store.db`
///
/// Returns `None` if no location can be determined.
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Ok(db_path) = std::env::var(DB_ENV) {
        if !db_path.trim().is_empty() {
            return Some(PathBuf::from(db_path));
        }
    }

    global_spark_dir().map(|dir| dir.join("spark_store.db"))
}

/// The current working directory, canonicalized when possible.
///
/// # Errors
///
/// Returns an error if the working directory cannot be read at all.
pub fn current_dir() -> std::io::Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(cwd.canonicalize().unwrap_or(cwd))
}

/// Canonical string form of a directory path, used as a context key.
#[must_use]
pub fn path_key(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_db_path_with_explicit() {
        let explicit = PathBuf::from("/custom/path/sparks.db");
        let result = resolve_db_path(Some(&explicit));
        assert_eq!(result, Some(explicit));
    }

    #[test]
    fn test_resolve_db_path_defaults_to_store_file() {
        if std::env::var_os(DB_ENV).is_some() {
            return;
        }
        if let Some(path) = resolve_db_path(None) {
            assert!(path.ends_with(Path::new(".spark").join("spark_store.db")));
        }
    }

    #[test]
    fn test_path_key_canonicalizes() {
        let dir = tempfile::TempDir::new().unwrap();
        let dotted = dir.path().join(".");
        assert_eq!(path_key(&dotted), path_key(dir.path()));
    }

    #[test]
    fn test_path_key_keeps_missing_paths() {
        assert_eq!(path_key(Path::new("/no/such/dir")), "/no/such/dir");
    }
}
