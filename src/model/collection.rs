//! Collection model.
//!
//! Collections are global named tags. A spark may belong to any number of
//! them, across contexts.

use serde::{Deserialize, Serialize};

/// A named grouping of sparks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: i64,

    /// Cleaned, unique name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

/// A collection together with the number of sparks in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSummary {
    #[serde(flatten)]
    pub collection: Collection,
    pub spark_count: usize,
}

/// Mutable fields of a collection.
///
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default)]
pub struct CollectionUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}
