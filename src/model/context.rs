//! Context model.
//!
//! A context is the project scope bound to one working directory. It is
//! created the first time a command runs in that directory.

use serde::{Deserialize, Serialize};

/// A project scope bound to one working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub id: i64,

    /// Absolute path of the working directory
    pub working_directory: String,

    /// Display name, taken from the `.spark` file
    pub project_name: String,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

/// Mutable fields of a context. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ContextUpdate {
    pub working_directory: Option<String>,
    pub project_name: Option<String>,
}

impl ContextUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.working_directory.is_none() && self.project_name.is_none()
    }
}
