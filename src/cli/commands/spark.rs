//! Spark command implementations (add, list, search, show, edit, delete).

use crate::cli::ListArgs;
use crate::config::{self, read_config, SparkConfig};
use crate::error::{Error, Result};
use crate::model::{format_timestamp, Collection, Spark, SparkUpdate};
use crate::resolver::resolve_context_id;
use crate::storage::SqliteStorage;
use crate::validate::{clean_name, validate_collection_name, validate_content};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{open_storage, print_empty, print_json, print_success, spark_line, SparkOutput};

#[derive(Serialize)]
struct SparkListOutput {
    sparks: Vec<SparkOutput>,
    count: usize,
}

impl SparkListOutput {
    fn new(sparks: &[Spark]) -> Self {
        Self {
            count: sparks.len(),
            sparks: sparks.iter().map(SparkOutput::from).collect(),
        }
    }
}

#[derive(Serialize)]
struct SparkAddOutput {
    id: i64,
    collection: String,
}

// ── add ──────────────────────────────────────────────────────

/// Execute `spark add`.
///
/// # Errors
///
/// Returns an error if the config is missing, the collection name is
/// invalid, or a storage operation fails.
pub fn execute_add(
    content: &str,
    collection: Option<&str>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let cwd = config::current_dir()?;
    let config = read_config(&cwd)?;
    let mut storage = open_storage(db_path)?;

    let (spark, collection) = add_spark(&mut storage, &cwd, &config, content, collection)?;

    if json {
        print_json(&SparkAddOutput { id: spark.id, collection: collection.name })?;
    } else {
        print_success(&format!("Spark #{} added successfully", spark.id));
    }
    Ok(())
}

/// Create a spark in the context of `cwd` and file it into a collection.
///
/// The collection is the one named, or the project's default collection;
/// either is created if it does not exist yet. The spark, the collection
/// and the membership are written together or not at all.
///
/// # Errors
///
/// Returns an error if the content is blank, the collection name is
/// invalid, or a storage operation fails.
pub fn add_spark(
    storage: &mut SqliteStorage,
    cwd: &Path,
    config: &SparkConfig,
    content: &str,
    collection: Option<&str>,
) -> Result<(Spark, Collection)> {
    let content = validate_content(content)?;
    let collection_name =
        validate_collection_name(collection.unwrap_or(&config.default_collection))?;

    let context_id = resolve_context_id(storage, cwd, config)?;
    storage.create_spark_in_collection(context_id, content, &collection_name)
}

// ── list ─────────────────────────────────────────────────────

/// Execute `spark list`.
///
/// # Errors
///
/// Returns an error if the context path or collection is unknown, the
/// config is missing, or a query fails.
pub fn execute_list(args: &ListArgs, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let cwd = config::current_dir()?;
    let mut storage = open_storage(db_path)?;

    let sparks = list_sparks(&mut storage, &cwd, args)?;

    if json {
        return print_json(&SparkListOutput::new(&sparks));
    }
    if sparks.is_empty() {
        print_empty("No sparks found");
        return Ok(());
    }
    for spark in &sparks {
        println!("{}", spark_line(spark));
    }
    Ok(())
}

/// Select sparks for `spark list`.
///
/// Filters apply in order of precedence: explicit context path, then
/// today-only, then collection, then the current context.
///
/// # Errors
///
/// Returns `Error::NoContextForPath` or `Error::CollectionNotFound` for
/// unknown filters, or an error if the config is missing or a query fails.
pub fn list_sparks(storage: &mut SqliteStorage, cwd: &Path, args: &ListArgs) -> Result<Vec<Spark>> {
    if let Some(path) = &args.context {
        let key = config::path_key(path);
        let context = storage
            .get_context_by_working_dir(&key)?
            .ok_or(Error::NoContextForPath { path: key })?;
        return storage.sparks_by_context(context.id);
    }

    let config = read_config(cwd)?;
    let context_id = resolve_context_id(storage, cwd, &config)?;

    if args.today {
        return storage.sparks_from_today(context_id);
    }

    if let Some(name) = &args.collection {
        let name = clean_name(name);
        let collection = storage
            .get_collection_by_name(&name)?
            .ok_or(Error::CollectionNotFound { name })?;
        return storage.sparks_by_collection(collection.id);
    }

    storage.sparks_by_context(context_id)
}

// ── search ───────────────────────────────────────────────────

/// Execute `spark search`.
///
/// # Errors
///
/// Returns an error if the config is missing or the query fails.
pub fn execute_search(query: &str, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let cwd = config::current_dir()?;
    let config = read_config(&cwd)?;
    let mut storage = open_storage(db_path)?;

    let context_id = resolve_context_id(&mut storage, &cwd, &config)?;
    let sparks = storage.search_sparks(context_id, query)?;
    debug!(query, hits = sparks.len(), "Search complete");

    if json {
        return print_json(&SparkListOutput::new(&sparks));
    }
    if sparks.is_empty() {
        print_empty(&format!("No sparks found for '{query}'"));
        return Ok(());
    }
    for spark in &sparks {
        println!("{}: {}", spark.id, spark.content);
    }
    Ok(())
}

// ── show ─────────────────────────────────────────────────────

/// Execute `spark show`.
///
/// # Errors
///
/// Returns `Error::SparkNotFound` if the spark does not exist.
pub fn execute_show(spark_id: i64, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db_path)?;
    let (spark, collections) = spark_details(&storage, spark_id)?;
    let names: Vec<String> = collections.into_iter().map(|c| c.name).collect();

    if json {
        return print_json(&SparkOutput::with_collections(&spark, names));
    }

    println!("ID: {}", spark.id);
    println!("Content: {}", spark.content);
    println!("Created: {}", format_timestamp(spark.created_at));
    println!("Updated: {}", format_timestamp(spark.updated_at));
    if !names.is_empty() {
        println!("Collections: {}", names.join(", "));
    }
    Ok(())
}

/// Fetch a spark and the collections it belongs to.
///
/// # Errors
///
/// Returns `Error::SparkNotFound` if the spark does not exist.
pub fn spark_details(storage: &SqliteStorage, spark_id: i64) -> Result<(Spark, Vec<Collection>)> {
    let spark = require_spark(storage, spark_id)?;
    let collections = storage.spark_collections(spark_id)?;
    Ok((spark, collections))
}

// ── edit ─────────────────────────────────────────────────────

/// Execute `spark edit`.
///
/// # Errors
///
/// Returns `Error::SparkNotFound` if the spark does not exist, or a
/// validation error for blank content.
pub fn execute_edit(
    spark_id: i64,
    content: &str,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let mut storage = open_storage(db_path)?;
    let spark = edit_spark(&mut storage, spark_id, content)?;

    if json {
        print_json(&SparkOutput::from(&spark))?;
    } else {
        print_success(&format!("Spark #{spark_id} updated"));
    }
    Ok(())
}

/// Replace a spark's content.
///
/// # Errors
///
/// Returns `Error::SparkNotFound` if the spark does not exist, or a
/// validation error for blank content. Nothing is written on error.
pub fn edit_spark(storage: &mut SqliteStorage, spark_id: i64, content: &str) -> Result<Spark> {
    let content = validate_content(content)?;
    storage.update_spark(spark_id, &SparkUpdate::content(content))
}

// ── delete ───────────────────────────────────────────────────

/// Execute `spark delete`.
///
/// # Errors
///
/// Returns `Error::SparkNotFound` if the spark does not exist.
pub fn execute_delete(spark_id: i64, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut storage = open_storage(db_path)?;
    storage.delete_spark(spark_id)?;

    if json {
        print_json(&serde_json::json!({ "id": spark_id, "deleted": true }))?;
    } else {
        print_success(&format!("Spark #{spark_id} deleted"));
    }
    Ok(())
}

pub(crate) fn require_spark(storage: &SqliteStorage, spark_id: i64) -> Result<Spark> {
    storage
        .get_spark(spark_id)?
        .ok_or(Error::SparkNotFound { id: spark_id })
}
