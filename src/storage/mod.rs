//! SQLite storage layer for spark.
//!
//! This module provides the persistence layer using SQLite with:
//! - Foreign keys enforced (sparks cascade with their context)
//! - Transaction discipline for atomic writes
//!
//! # Submodules
//!
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - Main SQLite storage implementation

pub mod schema;
pub mod sqlite;

pub use sqlite::{Membership, SqliteStorage};
