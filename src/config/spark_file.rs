//! The per-directory `.spark` marker file.
//!
//! Holds the project name and default collection for one working
//! directory. Written wholesale by `spark init`, read by every command
//! that needs a context.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the marker file, relative to the working directory.
pub const SPARK_FILE: &str = ".spark";

/// Contents of a `.spark` file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SparkConfig {
    pub project_name: String,
    pub default_collection: String,
}

/// Path of the marker file inside `dir`.
#[must_use]
pub fn spark_file_path(dir: &Path) -> PathBuf {
    dir.join(SPARK_FILE)
}

/// Write a `.spark` file into `dir`, replacing any existing one.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_config(dir: &Path, project_name: &str, default_collection: &str) -> Result<PathBuf> {
    let config = SparkConfig {
        project_name: project_name.to_string(),
        default_collection: default_collection.to_string(),
    };
    let path = spark_file_path(dir);
    let yaml = serde_yaml::to_string(&config)?;
    fs::write(&path, yaml)?;
    debug!(path = %path.display(), "Wrote spark config");
    Ok(path)
}

/// Read the `.spark` file from `dir`.
///
/// # Errors
///
/// Returns `Error::ConfigMissing` if the file does not exist, or a YAML
/// error if it cannot be parsed.
pub fn read_config(dir: &Path) -> Result<SparkConfig> {
    let path = spark_file_path(dir);
    if !path.exists() {
        return Err(Error::ConfigMissing { path: dir.to_path_buf() });
    }
    let raw = fs::read_to_string(&path)?;
    let config: SparkConfig = serde_yaml::from_str(&raw)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        write_config(dir.path(), "my cool app", "general").unwrap();

        let config = read_config(dir.path()).unwrap();
        assert_eq!(config.project_name, "my cool app");
        assert_eq!(config.default_collection, "general");
    }

    #[test]
    fn test_write_overwrites() {
        let dir = TempDir::new().unwrap();
        write_config(dir.path(), "first", "general").unwrap();
        write_config(dir.path(), "second", "ideas").unwrap();

        let config = read_config(dir.path()).unwrap();
        assert_eq!(config.project_name, "second");
        assert_eq!(config.default_collection, "ideas");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_config(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigMissing { .. }));
    }

    #[test]
    fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SPARK_FILE), "project_name: [unclosed").unwrap();
        assert!(matches!(read_config(dir.path()).unwrap_err(), Error::Yaml(_)));
    }

    #[test]
    fn test_file_is_yaml_mapping() {
        let dir = TempDir::new().unwrap();
        let path = write_config(dir.path(), "proj", "general").unwrap();
        let raw = fs::read_to_string(path).unwrap();
        assert!(raw.contains("project_name: proj"));
        assert!(raw.contains("default_collection: general"));
    }
}
