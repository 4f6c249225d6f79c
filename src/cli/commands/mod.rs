//! Command implementations.
//!
//! Each handler opens one [`SqliteStorage`] for the duration of the
//! command. The storage is dropped (and the connection closed) when the
//! handler returns.

pub mod collection;
pub mod completions;
pub mod context;
pub mod init;
pub mod spark;

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::model::{format_timestamp, Spark};
use crate::storage::SqliteStorage;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

/// Open the store for one command invocation.
///
/// # Errors
///
/// Returns `Error::NotInitialized` if no database location can be
/// determined, or an error if the store cannot be opened.
pub fn open_storage(db_path: Option<&PathBuf>) -> Result<SqliteStorage> {
    let db_path = resolve_db_path(db_path.map(|p| p.as_path())).ok_or(Error::NotInitialized)?;
    SqliteStorage::open(&db_path)
}

/// Print a confirmation line.
pub(crate) fn print_success(message: &str) {
    println!("{}", format!("✓ {message}").green());
}

/// Print a "nothing to show" line.
pub(crate) fn print_empty(message: &str) {
    println!("{}", message.yellow());
}

/// Print a value as pretty JSON.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One-line listing of a spark: `<id>: <content> [YYYY-MM-DD HH:MM]`.
pub(crate) fn spark_line(spark: &Spark) -> String {
    format!("{}: {} [{}]", spark.id, spark.content, format_timestamp(spark.created_at))
}

/// Spark as rendered in JSON output, with readable timestamps.
#[derive(Serialize)]
pub(crate) struct SparkOutput {
    id: i64,
    content: String,
    context_id: i64,
    created_at: String,
    updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    collections: Option<Vec<String>>,
}

impl SparkOutput {
    pub(crate) fn with_collections(spark: &Spark, collections: Vec<String>) -> Self {
        Self { collections: Some(collections), ..Self::from(spark) }
    }
}

impl From<&Spark> for SparkOutput {
    fn from(s: &Spark) -> Self {
        Self {
            id: s.id,
            content: s.content.clone(),
            context_id: s.context_id,
            created_at: format_rfc3339(s.created_at),
            updated_at: format_rfc3339(s.updated_at),
            collections: None,
        }
    }
}

pub(crate) fn format_rfc3339(ts: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ts)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spark_line_format() {
        let spark = Spark {
            id: 4,
            content: "refactor the parser".to_string(),
            created_at: 0,
            updated_at: 0,
            context_id: 1,
        };
        let line = spark_line(&spark);
        assert!(line.starts_with("4: refactor the parser ["));
        assert!(line.ends_with(']'));
    }

    #[test]
    fn test_open_storage_explicit_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sparks.db");
        open_storage(Some(&path)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_spark_output_collections_optional() {
        let spark = Spark {
            id: 1,
            content: "x".to_string(),
            created_at: 0,
            updated_at: 0,
            context_id: 1,
        };
        let plain = serde_json::to_value(SparkOutput::from(&spark)).unwrap();
        assert!(plain.get("collections").is_none());

        let tagged =
            serde_json::to_value(SparkOutput::with_collections(&spark, vec!["general".into()]))
                .unwrap();
        assert_eq!(tagged["collections"][0], "general");
    }
}
