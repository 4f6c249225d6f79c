//! Data models for spark.
//!
//! This module contains all domain models:
//! - Context (one per working directory)
//! - Spark (a captured idea, owned by a context)
//! - Collection (a named tag grouping sparks)

pub mod collection;
pub mod context;
pub mod spark;

pub use collection::{Collection, CollectionSummary, CollectionUpdate};
pub use context::{Context, ContextUpdate};
pub use spark::{Spark, SparkUpdate};

/// Current time as Unix milliseconds, the storage format for all timestamps.
#[must_use]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Render a stored timestamp as `YYYY-MM-DD HH:MM` in local time.
#[must_use]
pub fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ts)
        .map(|dt| dt.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp_local() {
        let local = chrono::Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 59).unwrap();
        assert_eq!(format_timestamp(local.timestamp_millis()), "2024-03-09 14:05");
    }

    #[test]
    fn test_format_timestamp_out_of_range() {
        assert_eq!(format_timestamp(i64::MAX), "N/A");
    }
}
