//! Spark model.

use serde::{Deserialize, Serialize};

/// A single captured idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spark {
    pub id: i64,

    /// The idea itself (never empty)
    pub content: String,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last mutation timestamp (Unix milliseconds)
    pub updated_at: i64,

    /// Owning context; fixed at creation
    pub context_id: i64,
}

/// Mutable fields of a spark.
///
/// `context_id` is deliberately absent: a spark never moves between contexts.
#[derive(Debug, Clone, Default)]
pub struct SparkUpdate {
    pub content: Option<String>,
}

impl SparkUpdate {
    /// Update that replaces the content.
    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self { content: Some(content.into()) }
    }
}
