//! SQLite storage implementation.
//!
//! This module provides the storage backend for spark using SQLite.
//! Every write goes through [`SqliteStorage::mutate`], which wraps the
//! closure in an IMMEDIATE transaction and rolls back on error.

use crate::error::{Error, Result};
use crate::model::{
    now_millis, Collection, CollectionSummary, CollectionUpdate, Context, ContextUpdate, Spark,
    SparkUpdate,
};
use crate::storage::schema::apply_schema;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, trace};

const CONTEXT_COLUMNS: &str = "id, working_directory, project_name, created_at";
const SPARK_COLUMNS: &str = "id, content, created_at, updated_at, context_id";
const COLLECTION_COLUMNS: &str = "id, name, description, created_at, updated_at";

/// SQLite-based storage backend.
///
/// One instance is opened per command invocation and dropped when the
/// command returns, which closes the connection.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Outcome of a membership toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// The spark joined the collection.
    Added,
    /// The spark left the collection.
    Removed,
    /// Nothing to do: already a member (add) or not a member (remove).
    Unchanged,
    /// The spark or the collection does not exist. No write happened.
    Missing,
}

impl SqliteStorage {
    /// Open a database at the given path.
    ///
    /// Creates the parent directory and the database file if needed, and
    /// applies the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a database with an optional busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_millis(timeout_ms.unwrap_or(5000)))?;

        apply_schema(&conn)?;
        debug!(path = %path.display(), "Opened spark store");
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute a mutation inside a transaction.
    ///
    /// Begins an IMMEDIATE transaction, runs the closure, and commits.
    /// If the closure fails the transaction is dropped, which rolls it back.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or an error if begin/commit fails.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        trace!(op, "Transaction started");

        match f(&tx) {
            Ok(result) => {
                tx.commit()?;
                debug!(op, "Transaction committed");
                Ok(result)
            }
            Err(e) => {
                debug!(op, error = %e, "Transaction rolled back");
                Err(e)
            }
        }
    }

    // ==================
    // Context Operations
    // ==================

    /// Create a context for a working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a context already exists for the directory or the insert fails.
    pub fn create_context(&mut self, working_directory: &str, project_name: &str) -> Result<Context> {
        let now = now_millis();

        let context = self.mutate("create_context", |tx| {
            tx.execute(
                "INSERT INTO contexts (working_directory, project_name, created_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![working_directory, project_name, now],
            )?;

            Ok(Context {
                id: tx.last_insert_rowid(),
                working_directory: working_directory.to_string(),
                project_name: project_name.to_string(),
                created_at: now,
            })
        })?;

        info!(id = context.id, path = working_directory, "Created context");
        Ok(context)
    }

    /// Get a context by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_context(&self, id: i64) -> Result<Option<Context>> {
        let context = self
            .conn
            .query_row(
                &format!("SELECT {CONTEXT_COLUMNS} FROM contexts WHERE id = ?1"),
                [id],
                map_context_row,
            )
            .optional()?;
        Ok(context)
    }

    /// Get the context registered for a working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_context_by_working_dir(&self, working_directory: &str) -> Result<Option<Context>> {
        let context = self
            .conn
            .query_row(
                &format!("SELECT {CONTEXT_COLUMNS} FROM contexts WHERE working_directory = ?1"),
                [working_directory],
                map_context_row,
            )
            .optional()?;
        Ok(context)
    }

    /// List all contexts in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_contexts(&self) -> Result<Vec<Context>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {CONTEXT_COLUMNS} FROM contexts ORDER BY id"))?;
        let contexts = stmt
            .query_map([], map_context_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(contexts)
    }

    /// Apply an update to a context.
    ///
    /// # Errors
    ///
    /// Returns `Error::ContextNotFound` if the context does not exist.
    pub fn update_context(&mut self, id: i64, update: &ContextUpdate) -> Result<Context> {
        self.mutate("update_context", |tx| {
            let mut context = tx
                .query_row(
                    &format!("SELECT {CONTEXT_COLUMNS} FROM contexts WHERE id = ?1"),
                    [id],
                    map_context_row,
                )
                .optional()?
                .ok_or(Error::ContextNotFound { id })?;

            if update.is_empty() {
                return Ok(context);
            }
            if let Some(path) = &update.working_directory {
                context.working_directory.clone_from(path);
            }
            if let Some(name) = &update.project_name {
                context.project_name.clone_from(name);
            }

            tx.execute(
                "UPDATE contexts SET working_directory = ?1, project_name = ?2 WHERE id = ?3",
                rusqlite::params![context.working_directory, context.project_name, id],
            )?;
            Ok(context)
        })
    }

    /// Delete a context together with its sparks and their memberships.
    ///
    /// # Errors
    ///
    /// Returns `Error::ContextNotFound` if the context does not exist.
    pub fn delete_context(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_context", |tx| {
            let affected = tx.execute("DELETE FROM contexts WHERE id = ?1", [id])?;
            if affected == 0 {
                return Err(Error::ContextNotFound { id });
            }
            Ok(())
        })
    }

    /// Count the sparks owned by a context.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_sparks(&self, context_id: i64) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sparks WHERE context_id = ?1",
            [context_id],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    // ================
    // Spark Operations
    // ================

    /// Create a spark in a context.
    ///
    /// # Errors
    ///
    /// Returns `Error::ContextNotFound` if the context does not exist, or an
    /// error if the insert fails.
    pub fn create_spark(&mut self, context_id: i64, content: &str) -> Result<Spark> {
        let now = now_millis();

        let spark = self.mutate("create_spark", |tx| insert_spark(tx, context_id, content, now))?;

        info!(id = spark.id, context_id, "Created spark");
        Ok(spark)
    }

    /// Create a spark and file it into a collection in one transaction.
    ///
    /// The collection is created if no collection has that name yet. If any
    /// step fails, neither the spark nor the collection is written.
    ///
    /// # Errors
    ///
    /// Returns `Error::ContextNotFound` if the context does not exist, or an
    /// error if any insert fails.
    pub fn create_spark_in_collection(
        &mut self,
        context_id: i64,
        content: &str,
        collection_name: &str,
    ) -> Result<(Spark, Collection)> {
        let now = now_millis();

        let (spark, collection) = self.mutate("create_spark_in_collection", |tx| {
            let spark = insert_spark(tx, context_id, content, now)?;
            let collection = match find_collection_by_name(tx, collection_name)? {
                Some(collection) => collection,
                None => insert_collection(tx, collection_name, None, now)?,
            };
            tx.execute(
                "INSERT OR IGNORE INTO spark_collections (spark_id, collection_id) VALUES (?1, ?2)",
                [spark.id, collection.id],
            )?;
            Ok((spark, collection))
        })?;

        info!(id = spark.id, context_id, collection = %collection.name, "Created spark");
        Ok((spark, collection))
    }

    /// Get a spark by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_spark(&self, id: i64) -> Result<Option<Spark>> {
        let spark = self
            .conn
            .query_row(
                &format!("SELECT {SPARK_COLUMNS} FROM sparks WHERE id = ?1"),
                [id],
                map_spark_row,
            )
            .optional()?;
        Ok(spark)
    }

    /// Apply an update to a spark and advance its `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `Error::SparkNotFound` if the spark does not exist.
    pub fn update_spark(&mut self, id: i64, update: &SparkUpdate) -> Result<Spark> {
        self.mutate("update_spark", |tx| {
            let mut spark = tx
                .query_row(
                    &format!("SELECT {SPARK_COLUMNS} FROM sparks WHERE id = ?1"),
                    [id],
                    map_spark_row,
                )
                .optional()?
                .ok_or(Error::SparkNotFound { id })?;

            if let Some(content) = &update.content {
                spark.content.clone_from(content);
            }
            // Strictly increasing, even for two edits within one millisecond.
            spark.updated_at = now_millis().max(spark.updated_at + 1);

            tx.execute(
                "UPDATE sparks SET content = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![spark.content, spark.updated_at, id],
            )?;
            Ok(spark)
        })
    }

    /// Delete a spark.
    ///
    /// # Errors
    ///
    /// Returns `Error::SparkNotFound` if the spark does not exist.
    pub fn delete_spark(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_spark", |tx| {
            let affected = tx.execute("DELETE FROM sparks WHERE id = ?1", [id])?;
            if affected == 0 {
                return Err(Error::SparkNotFound { id });
            }
            Ok(())
        })
    }

    /// All sparks of a context, in storage order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn sparks_by_context(&self, context_id: i64) -> Result<Vec<Spark>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SPARK_COLUMNS} FROM sparks WHERE context_id = ?1 ORDER BY id"
        ))?;
        let sparks = stmt
            .query_map([context_id], map_spark_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(sparks)
    }

    /// All sparks in a collection, across contexts.
    ///
    /// Empty if the collection does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn sparks_by_collection(&self, collection_id: i64) -> Result<Vec<Spark>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.content, s.created_at, s.updated_at, s.context_id
             FROM sparks s
             JOIN spark_collections sc ON sc.spark_id = s.id
             WHERE sc.collection_id = ?1
             ORDER BY s.id",
        )?;
        let sparks = stmt
            .query_map([collection_id], map_spark_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(sparks)
    }

    /// Sparks of a context created on the current local calendar day.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn sparks_from_today(&self, context_id: i64) -> Result<Vec<Spark>> {
        self.sparks_on_day(context_id, Local::now().date_naive())
    }

    /// Sparks of a context created on the given local calendar day.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn sparks_on_day(&self, context_id: i64, day: NaiveDate) -> Result<Vec<Spark>> {
        let start = local_midnight_millis(day);
        let end = day.succ_opt().map_or(i64::MAX, local_midnight_millis);

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SPARK_COLUMNS} FROM sparks
             WHERE context_id = ?1 AND created_at >= ?2 AND created_at < ?3
             ORDER BY id"
        ))?;
        let sparks = stmt
            .query_map(rusqlite::params![context_id, start, end], map_spark_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(sparks)
    }

    /// Case-insensitive substring search over spark content within a context.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn search_sparks(&self, context_id: i64, term: &str) -> Result<Vec<Spark>> {
        // Lowercasing happens in Rust so non-ASCII text folds too.
        let needle = term.to_lowercase();
        let sparks = self
            .sparks_by_context(context_id)?
            .into_iter()
            .filter(|s| s.content.to_lowercase().contains(&needle))
            .collect();
        Ok(sparks)
    }

    /// Collections a spark belongs to, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn spark_collections(&self, spark_id: i64) -> Result<Vec<Collection>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.name, c.description, c.created_at, c.updated_at
             FROM collections c
             JOIN spark_collections sc ON sc.collection_id = c.id
             WHERE sc.spark_id = ?1
             ORDER BY c.name",
        )?;
        let collections = stmt
            .query_map([spark_id], map_collection_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(collections)
    }

    // =====================
    // Collection Operations
    // =====================

    /// Create a collection.
    ///
    /// # Errors
    ///
    /// Returns `Error::CollectionExists` if the name is taken, or an error if
    /// the insert fails.
    pub fn create_collection(&mut self, name: &str, description: Option<&str>) -> Result<Collection> {
        let now = now_millis();

        let collection = self.mutate("create_collection", |tx| {
            if find_collection_by_name(tx, name)?.is_some() {
                return Err(Error::CollectionExists { name: name.to_string() });
            }
            insert_collection(tx, name, description, now)
        })?;

        info!(id = collection.id, name, "Created collection");
        Ok(collection)
    }

    /// Get a collection by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_collection(&self, id: i64) -> Result<Option<Collection>> {
        let collection = self
            .conn
            .query_row(
                &format!("SELECT {COLLECTION_COLUMNS} FROM collections WHERE id = ?1"),
                [id],
                map_collection_row,
            )
            .optional()?;
        Ok(collection)
    }

    /// Get a collection by exact name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_collection_by_name(&self, name: &str) -> Result<Option<Collection>> {
        find_collection_by_name(&self.conn, name)
    }

    /// Find a collection by name, creating it if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup or the insert fails.
    pub fn find_or_create_collection(&mut self, name: &str) -> Result<Collection> {
        if let Some(collection) = self.get_collection_by_name(name)? {
            return Ok(collection);
        }
        self.create_collection(name, None)
    }

    /// List all collections with their spark counts, in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_collections(&self) -> Result<Vec<CollectionSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.name, c.description, c.created_at, c.updated_at, COUNT(sc.spark_id)
             FROM collections c
             LEFT JOIN spark_collections sc ON sc.collection_id = c.id
             GROUP BY c.id
             ORDER BY c.id",
        )?;
        let collections = stmt
            .query_map([], |row| {
                let count: i64 = row.get(5)?;
                Ok(CollectionSummary {
                    collection: map_collection_row(row)?,
                    spark_count: usize::try_from(count).unwrap_or_default(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(collections)
    }

    /// Apply an update to a collection.
    ///
    /// # Errors
    ///
    /// Returns `Error::CollectionNotFound` if the collection does not exist,
    /// or `Error::CollectionExists` if renaming onto a taken name.
    pub fn update_collection(&mut self, id: i64, update: &CollectionUpdate) -> Result<Collection> {
        self.mutate("update_collection", |tx| {
            let mut collection = tx
                .query_row(
                    &format!("SELECT {COLLECTION_COLUMNS} FROM collections WHERE id = ?1"),
                    [id],
                    map_collection_row,
                )
                .optional()?
                .ok_or_else(|| Error::CollectionNotFound { name: format!("#{id}") })?;

            if let Some(name) = &update.name {
                let taken = tx
                    .prepare("SELECT 1 FROM collections WHERE name = ?1 AND id != ?2")?
                    .exists(rusqlite::params![name, id])?;
                if taken {
                    return Err(Error::CollectionExists { name: name.clone() });
                }
                collection.name.clone_from(name);
            }
            if let Some(description) = &update.description {
                collection.description.clone_from(description);
            }
            collection.updated_at = now_millis().max(collection.updated_at + 1);

            tx.execute(
                "UPDATE collections SET name = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
                rusqlite::params![
                    collection.name,
                    collection.description,
                    collection.updated_at,
                    id
                ],
            )?;
            Ok(collection)
        })
    }

    /// Delete a collection. Its sparks are kept; only memberships go.
    ///
    /// # Errors
    ///
    /// Returns `Error::CollectionNotFound` if the collection does not exist.
    pub fn delete_collection(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_collection", |tx| {
            let affected = tx.execute("DELETE FROM collections WHERE id = ?1", [id])?;
            if affected == 0 {
                return Err(Error::CollectionNotFound { name: format!("#{id}") });
            }
            Ok(())
        })
    }

    // =====================
    // Membership Operations
    // =====================

    /// Add a spark to a collection. Adding twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or insert fails.
    pub fn add_spark_to_collection(&mut self, spark_id: i64, collection_id: i64) -> Result<Membership> {
        self.mutate("add_spark_to_collection", |tx| {
            if !both_exist(tx, spark_id, collection_id)? {
                return Ok(Membership::Missing);
            }
            let affected = tx.execute(
                "INSERT OR IGNORE INTO spark_collections (spark_id, collection_id) VALUES (?1, ?2)",
                [spark_id, collection_id],
            )?;
            Ok(if affected == 0 { Membership::Unchanged } else { Membership::Added })
        })
    }

    /// Remove a spark from a collection. Removing a non-member is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or delete fails.
    pub fn remove_spark_from_collection(
        &mut self,
        spark_id: i64,
        collection_id: i64,
    ) -> Result<Membership> {
        self.mutate("remove_spark_from_collection", |tx| {
            if !both_exist(tx, spark_id, collection_id)? {
                return Ok(Membership::Missing);
            }
            let affected = tx.execute(
                "DELETE FROM spark_collections WHERE spark_id = ?1 AND collection_id = ?2",
                [spark_id, collection_id],
            )?;
            Ok(if affected == 0 { Membership::Unchanged } else { Membership::Removed })
        })
    }
}

fn insert_spark(tx: &Transaction, context_id: i64, content: &str, now: i64) -> Result<Spark> {
    let context_exists = tx
        .prepare("SELECT 1 FROM contexts WHERE id = ?1")?
        .exists([context_id])?;
    if !context_exists {
        return Err(Error::ContextNotFound { id: context_id });
    }

    tx.execute(
        "INSERT INTO sparks (content, created_at, updated_at, context_id) VALUES (?1, ?2, ?2, ?3)",
        rusqlite::params![content, now, context_id],
    )?;

    Ok(Spark {
        id: tx.last_insert_rowid(),
        content: content.to_string(),
        created_at: now,
        updated_at: now,
        context_id,
    })
}

fn insert_collection(
    tx: &Transaction,
    name: &str,
    description: Option<&str>,
    now: i64,
) -> Result<Collection> {
    tx.execute(
        "INSERT INTO collections (name, description, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        rusqlite::params![name, description, now],
    )?;

    Ok(Collection {
        id: tx.last_insert_rowid(),
        name: name.to_string(),
        description: description.map(ToString::to_string),
        created_at: now,
        updated_at: now,
    })
}

fn find_collection_by_name(conn: &Connection, name: &str) -> Result<Option<Collection>> {
    let collection = conn
        .query_row(
            &format!("SELECT {COLLECTION_COLUMNS} FROM collections WHERE name = ?1"),
            [name],
            map_collection_row,
        )
        .optional()?;
    Ok(collection)
}

fn both_exist(tx: &Transaction, spark_id: i64, collection_id: i64) -> Result<bool> {
    let spark = tx.prepare("SELECT 1 FROM sparks WHERE id = ?1")?.exists([spark_id])?;
    let collection = tx
        .prepare("SELECT 1 FROM collections WHERE id = ?1")?
        .exists([collection_id])?;
    Ok(spark && collection)
}

/// Unix milliseconds of the first local instant of `day`.
fn local_midnight_millis(day: NaiveDate) -> i64 {
    day_start_millis(day, |naive| {
        naive
            .and_local_timezone(Local)
            .earliest()
            .map(|dt| dt.timestamp_millis())
    })
}

/// Start of `day` as resolved by `to_millis`.
///
/// When midnight falls in a DST gap, the first whole hour that exists
/// locally starts the day.
fn day_start_millis(day: NaiveDate, to_millis: impl Fn(NaiveDateTime) -> Option<i64>) -> i64 {
    (0..24)
        .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        .find_map(|time| to_millis(day.and_time(time)))
        .unwrap_or_else(|| day.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
}

fn map_context_row(row: &rusqlite::Row) -> rusqlite::Result<Context> {
    Ok(Context {
        id: row.get(0)?,
        working_directory: row.get(1)?,
        project_name: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn map_spark_row(row: &rusqlite::Row) -> rusqlite::Result<Spark> {
    Ok(Spark {
        id: row.get(0)?,
        content: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
        context_id: row.get(4)?,
    })
}

fn map_collection_row(row: &rusqlite::Row) -> rusqlite::Result<Collection> {
    Ok(Collection {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
