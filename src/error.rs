//! Error types for the spark CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 3=not_found, 4=validation, 7=config, 8=io)
//! - Context-aware recovery hints
//! - Structured JSON output for `--json` consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for spark operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    NotInitialized,
    DatabaseError,

    // Not Found (exit 3)
    ContextNotFound,
    SparkNotFound,
    CollectionNotFound,

    // Validation (exit 4)
    InvalidName,
    ReservedName,
    InvalidArgument,
    CollectionExists,

    // Config (exit 7)
    ConfigMissing,
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::ContextNotFound => "CONTEXT_NOT_FOUND",
            Self::SparkNotFound => "SPARK_NOT_FOUND",
            Self::CollectionNotFound => "COLLECTION_NOT_FOUND",
            Self::InvalidName => "INVALID_NAME",
            Self::ReservedName => "RESERVED_NAME",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::CollectionExists => "COLLECTION_EXISTS",
            Self::ConfigMissing => "CONFIG_MISSING",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::NotInitialized | Self::DatabaseError => 2,
            Self::ContextNotFound | Self::SparkNotFound | Self::CollectionNotFound => 3,
            Self::InvalidName
            | Self::ReservedName
            | Self::InvalidArgument
            | Self::CollectionExists => 4,
            Self::ConfigMissing | Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in spark operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("No .spark file found in {}. Run 'spark init' first.", path.display())]
    ConfigMissing { path: PathBuf },

    #[error("Could not determine a location for the spark database")]
    NotInitialized,

    #[error("Context not found: {id}")]
    ContextNotFound { id: i64 },

    #[error("No context found for path: {path}")]
    NoContextForPath { path: String },

    #[error("Spark with ID {id} not found")]
    SparkNotFound { id: i64 },

    #[error("Collection '{name}' not found")]
    CollectionNotFound { name: String },

    #[error("Collection '{name}' already exists")]
    CollectionExists { name: String },

    #[error("{0}")]
    InvalidName(String),

    #[error("'{0}' is a reserved word.")]
    ReservedName(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::ConfigMissing { .. } => ErrorCode::ConfigMissing,
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::ContextNotFound { .. } | Self::NoContextForPath { .. } => {
                ErrorCode::ContextNotFound
            }
            Self::SparkNotFound { .. } => ErrorCode::SparkNotFound,
            Self::CollectionNotFound { .. } => ErrorCode::CollectionNotFound,
            Self::CollectionExists { .. } => ErrorCode::CollectionExists,
            Self::InvalidName(_) => ErrorCode::InvalidName,
            Self::ReservedName(_) => ErrorCode::ReservedName,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Yaml(_) => ErrorCode::ConfigError,
            Self::Json(_) => ErrorCode::JsonError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => {
                Some("Pass --db <path> or set SPARK_DB to choose a database file".to_string())
            }
            Self::NoContextForPath { .. } => {
                Some("Use `spark contexts` to see the known project directories.".to_string())
            }
            Self::SparkNotFound { .. } => {
                Some("Use `spark list` to see the sparks in this project.".to_string())
            }
            Self::CollectionNotFound { .. } => {
                Some("Use `spark collections` to see available collections.".to_string())
            }
            Self::ReservedName(_) => Some("Reserved words: all, list, help".to_string()),
            Self::ConfigMissing { .. }
            | Self::ContextNotFound { .. }
            | Self::CollectionExists { .. }
            | Self::InvalidName(_)
            | Self::InvalidArgument(_)
            | Self::Database(_)
            | Self::Io(_)
            | Self::Yaml(_)
            | Self::Json(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::SparkNotFound { id: 7 }.exit_code(), 3);
        assert_eq!(Error::ReservedName("all".into()).exit_code(), 4);
        assert_eq!(
            Error::ConfigMissing { path: PathBuf::from("/tmp") }.exit_code(),
            7
        );
        assert_eq!(Error::NotInitialized.exit_code(), 2);
    }

    #[test]
    fn test_config_missing_message_mentions_init() {
        let err = Error::ConfigMissing { path: PathBuf::from("/work/app") };
        assert!(err.to_string().contains("spark init"));
    }

    #[test]
    fn test_structured_json_includes_hint() {
        let json = Error::SparkNotFound { id: 42 }.to_structured_json();
        assert_eq!(json["error"]["code"], "SPARK_NOT_FOUND");
        assert_eq!(json["error"]["message"], "Spark with ID 42 not found");
        assert!(json["error"]["hint"].is_string());
    }
}
