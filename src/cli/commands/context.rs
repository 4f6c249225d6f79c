//! `spark contexts` - list the project directories spark knows about.

use crate::error::Result;
use crate::model::{format_timestamp, Context};
use crate::storage::SqliteStorage;
use serde::Serialize;
use std::path::PathBuf;

use super::{format_rfc3339, open_storage, print_empty, print_json};

#[derive(Serialize)]
struct ContextOutput {
    id: i64,
    working_directory: String,
    project_name: String,
    created_at: String,
    spark_count: usize,
}

#[derive(Serialize)]
struct ContextListOutput {
    contexts: Vec<ContextOutput>,
    count: usize,
}

/// Execute the contexts command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or queried.
pub fn execute(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db_path)?;
    let contexts = contexts_with_counts(&storage)?;

    if json {
        let output = ContextListOutput {
            count: contexts.len(),
            contexts: contexts
                .into_iter()
                .map(|(c, spark_count)| ContextOutput {
                    id: c.id,
                    created_at: format_rfc3339(c.created_at),
                    working_directory: c.working_directory,
                    project_name: c.project_name,
                    spark_count,
                })
                .collect(),
        };
        return print_json(&output);
    }

    if contexts.is_empty() {
        print_empty("No contexts found");
        return Ok(());
    }
    for (context, count) in &contexts {
        println!(
            "{}: {} ({}) - {count} sparks, since {}",
            context.id,
            context.project_name,
            context.working_directory,
            format_timestamp(context.created_at)
        );
    }
    Ok(())
}

fn contexts_with_counts(storage: &SqliteStorage) -> Result<Vec<(Context, usize)>> {
    storage
        .list_contexts()?
        .into_iter()
        .map(|c| {
            let count = storage.count_sparks(c.id)?;
            Ok((c, count))
        })
        .collect()
}
