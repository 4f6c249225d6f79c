//! Working directory to context resolution.
//!
//! This is the only place where a read creates a row: the first command
//! run in a directory registers a context for it. Every other lookup
//! reports absence instead.

use crate::config::SparkConfig;
use crate::error::Result;
use crate::model::Context;
use crate::storage::SqliteStorage;
use std::path::Path;
use tracing::debug;

/// Return the context for `working_dir`, creating it from `config` if needed.
///
/// # Errors
///
/// Returns an error if the lookup or the insert fails.
pub fn resolve_context(
    storage: &mut SqliteStorage,
    working_dir: &Path,
    config: &SparkConfig,
) -> Result<Context> {
    let key = crate::config::path_key(working_dir);

    if let Some(context) = storage.get_context_by_working_dir(&key)? {
        debug!(id = context.id, path = %key, "Resolved existing context");
        return Ok(context);
    }

    storage.create_context(&key, &config.project_name)
}

/// Like [`resolve_context`], returning only the id.
///
/// # Errors
///
/// Returns an error if the lookup or the insert fails.
pub fn resolve_context_id(
    storage: &mut SqliteStorage,
    working_dir: &Path,
    config: &SparkConfig,
) -> Result<i64> {
    resolve_context(storage, working_dir, config).map(|c| c.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config() -> SparkConfig {
        SparkConfig {
            project_name: "my cool app".to_string(),
            default_collection: "general".to_string(),
        }
    }

    #[test]
    fn test_first_resolution_creates_context() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let dir = TempDir::new().unwrap();

        let context = resolve_context(&mut storage, dir.path(), &config()).unwrap();
        assert_eq!(context.project_name, "my cool app");
        assert_eq!(storage.list_contexts().unwrap().len(), 1);
    }

    #[test]
    fn test_second_resolution_reuses_context() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let dir = TempDir::new().unwrap();

        let first = resolve_context_id(&mut storage, dir.path(), &config()).unwrap();
        let second = resolve_context_id(&mut storage, dir.path(), &config()).unwrap();
        assert_eq!(first, second);
        assert_eq!(storage.list_contexts().unwrap().len(), 1);
    }

    #[test]
    fn test_distinct_directories_get_distinct_contexts() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();

        let first = resolve_context_id(&mut storage, a.path(), &config()).unwrap();
        let second = resolve_context_id(&mut storage, b.path(), &config()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_equivalent_paths_share_context() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let dir = TempDir::new().unwrap();

        let plain = resolve_context_id(&mut storage, dir.path(), &config()).unwrap();
        let dotted = resolve_context_id(&mut storage, &dir.path().join("."), &config()).unwrap();
        assert_eq!(plain, dotted);
    }
}
