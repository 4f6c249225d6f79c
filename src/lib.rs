//! Spark - capture and organize your coding ideas.
//!
//! This crate provides the core functionality for the `spark` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - `.spark` marker files and database location
//! - [`model`] - Data types (Context, Spark, Collection)
//! - [`resolver`] - Working directory to context resolution
//! - [`storage`] - SQLite database layer
//! - [`validate`] - Project and collection name rules
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod resolver;
pub mod storage;
pub mod validate;

pub use error::{Error, Result};
