//! Collection command implementations.
//!
//! - `spark collections` - list all collections with spark counts
//! - `spark collections create <name>` - create a collection
//! - `spark collections add <name> <spark_id>` - file a spark (creates the collection)
//! - `spark collections remove <name> <spark_id>` - unfile a spark
//! - `spark collections delete <name>` - delete a collection, keeping its sparks

use crate::cli::CollectionAction;
use crate::error::{Error, Result};
use crate::model::{Collection, CollectionSummary};
use crate::storage::{Membership, SqliteStorage};
use crate::validate::{clean_name, validate_collection_name};
use clap::ValueEnum;
use serde::Serialize;
use std::path::PathBuf;

use super::spark::require_spark;
use super::{open_storage, print_empty, print_json, print_success};

const USAGE: &str = "Use: collections [create|add|remove|delete] [name] [spark_id]";

#[derive(Serialize)]
struct CollectionListOutput {
    collections: Vec<CollectionSummary>,
    count: usize,
}

/// Execute the collections command.
///
/// # Errors
///
/// Returns an error if arguments are missing for the action, a name is
/// invalid, or a storage operation fails.
pub fn execute(
    action: Option<&str>,
    name: Option<&str>,
    spark_id: Option<i64>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let action = action.map(parse_action).transpose()?;
    let mut storage = open_storage(db_path)?;

    let Some(action) = action else {
        return execute_list(&storage, json);
    };

    let name = name.ok_or_else(|| Error::InvalidArgument(USAGE.to_string()))?;

    match action {
        CollectionAction::Create => {
            let collection = create(&mut storage, name)?;
            report(json, &collection, &format!("Collection '{}' created", collection.name))
        }
        CollectionAction::Add => {
            let spark_id = spark_id.ok_or_else(|| Error::InvalidArgument(USAGE.to_string()))?;
            let collection = add(&mut storage, name, spark_id)?;
            report(
                json,
                &collection,
                &format!("Spark #{spark_id} added to '{}'", collection.name),
            )
        }
        CollectionAction::Remove => {
            let spark_id = spark_id.ok_or_else(|| Error::InvalidArgument(USAGE.to_string()))?;
            let collection = remove(&mut storage, name, spark_id)?;
            report(
                json,
                &collection,
                &format!("Spark #{spark_id} removed from '{}'", collection.name),
            )
        }
        CollectionAction::Delete => {
            let collection = delete(&mut storage, name)?;
            report(json, &collection, &format!("Collection '{}' deleted", collection.name))
        }
    }
}

/// Map a `collections` action word to its action.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` with the usage line for unknown words.
pub fn parse_action(word: &str) -> Result<CollectionAction> {
    CollectionAction::from_str(word, true)
        .map_err(|_| Error::InvalidArgument(format!("Unknown action '{word}'. {USAGE}")))
}

fn execute_list(storage: &SqliteStorage, json: bool) -> Result<()> {
    let collections = storage.list_collections()?;

    if json {
        return print_json(&CollectionListOutput { count: collections.len(), collections });
    }
    if collections.is_empty() {
        print_empty("No collections found");
        return Ok(());
    }
    for summary in &collections {
        println!("{} ({} sparks)", summary.collection.name, summary.spark_count);
    }
    Ok(())
}

fn report(json: bool, collection: &Collection, message: &str) -> Result<()> {
    if json {
        print_json(collection)
    } else {
        print_success(message);
        Ok(())
    }
}

/// Create a collection under a validated name.
///
/// # Errors
///
/// Returns a validation error, or `Error::CollectionExists`.
pub fn create(storage: &mut SqliteStorage, name: &str) -> Result<Collection> {
    let name = validate_collection_name(name)?;
    storage.create_collection(&name, None)
}

/// File a spark into a collection, creating the collection if needed.
///
/// # Errors
///
/// Returns `Error::SparkNotFound` if the spark does not exist (the
/// collection is not created in that case), or a validation error.
pub fn add(storage: &mut SqliteStorage, name: &str, spark_id: i64) -> Result<Collection> {
    let name = validate_collection_name(name)?;
    require_spark(storage, spark_id)?;

    let collection = storage.find_or_create_collection(&name)?;
    match storage.add_spark_to_collection(spark_id, collection.id)? {
        Membership::Missing => Err(Error::SparkNotFound { id: spark_id }),
        Membership::Added | Membership::Unchanged | Membership::Removed => Ok(collection),
    }
}

/// Take a spark out of a collection. Not being a member is not an error.
///
/// # Errors
///
/// Returns `Error::CollectionNotFound` or `Error::SparkNotFound`.
pub fn remove(storage: &mut SqliteStorage, name: &str, spark_id: i64) -> Result<Collection> {
    let collection = require_collection(storage, name)?;
    match storage.remove_spark_from_collection(spark_id, collection.id)? {
        Membership::Missing => Err(Error::SparkNotFound { id: spark_id }),
        Membership::Added | Membership::Unchanged | Membership::Removed => Ok(collection),
    }
}

/// Delete a collection by name.
///
/// # Errors
///
/// Returns `Error::CollectionNotFound` if no collection has that name.
pub fn delete(storage: &mut SqliteStorage, name: &str) -> Result<Collection> {
    let collection = require_collection(storage, name)?;
    storage.delete_collection(collection.id)?;
    Ok(collection)
}

fn require_collection(storage: &SqliteStorage, name: &str) -> Result<Collection> {
    let name = clean_name(name);
    storage
        .get_collection_by_name(&name)?
        .ok_or(Error::CollectionNotFound { name })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_with_spark() -> (SqliteStorage, i64) {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let context = storage.create_context("/work/app", "app").unwrap();
        let spark = storage.create_spark(context.id, "idea").unwrap();
        (storage, spark.id)
    }

    #[test]
    fn test_parse_action() {
        assert_eq!(parse_action("add").unwrap(), CollectionAction::Add);
        assert_eq!(parse_action("DELETE").unwrap(), CollectionAction::Delete);

        let err = parse_action("rename").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(err.to_string().contains(USAGE));
    }

    #[test]
    fn test_create_validates_name() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        assert!(matches!(create(&mut storage, "list"), Err(Error::ReservedName(_))));
        assert!(matches!(create(&mut storage, "x!"), Err(Error::InvalidName(_))));

        let collection = create(&mut storage, "Big Ideas").unwrap();
        assert_eq!(collection.name, "big ideas");
        assert!(matches!(
            create(&mut storage, "big ideas"),
            Err(Error::CollectionExists { .. })
        ));
    }

    #[test]
    fn test_add_twice_is_single_membership() {
        let (mut storage, spark_id) = storage_with_spark();
        add(&mut storage, "ideas", spark_id).unwrap();
        add(&mut storage, "ideas", spark_id).unwrap();

        let summaries = storage.list_collections().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].spark_count, 1);
    }

    #[test]
    fn test_add_missing_spark_creates_nothing() {
        let (mut storage, spark_id) = storage_with_spark();
        let err = add(&mut storage, "ideas", spark_id + 1).unwrap_err();
        assert!(matches!(err, Error::SparkNotFound { .. }));
        assert!(storage.list_collections().unwrap().is_empty());
    }

    #[test]
    fn test_remove() {
        let (mut storage, spark_id) = storage_with_spark();
        add(&mut storage, "ideas", spark_id).unwrap();

        remove(&mut storage, "Ideas", spark_id).unwrap();
        assert_eq!(storage.list_collections().unwrap()[0].spark_count, 0);

        // Removing again is a no-op.
        remove(&mut storage, "ideas", spark_id).unwrap();
        assert!(matches!(
            remove(&mut storage, "unknown", spark_id),
            Err(Error::CollectionNotFound { .. })
        ));
    }

    #[test]
    fn test_delete_keeps_sparks() {
        let (mut storage, spark_id) = storage_with_spark();
        add(&mut storage, "ideas", spark_id).unwrap();

        delete(&mut storage, "ideas").unwrap();
        assert!(storage.list_collections().unwrap().is_empty());
        assert!(storage.get_spark(spark_id).unwrap().is_some());
        assert!(matches!(
            delete(&mut storage, "ideas"),
            Err(Error::CollectionNotFound { .. })
        ));
    }
}
