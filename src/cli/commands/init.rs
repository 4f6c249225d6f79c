//! Initialize a spark project in the current directory.
//!
//! Writes the `.spark` marker file. The context row itself is created
//! lazily by the first command that needs it.

use crate::cli::InitArgs;
use crate::config::{self, SparkConfig};
use crate::error::Result;
use crate::validate::{validate_collection_name, validate_project_name};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default collection offered at the prompt.
pub const DEFAULT_COLLECTION: &str = "general";

#[derive(Serialize)]
struct InitOutput {
    path: PathBuf,
    project_name: String,
    default_collection: String,
}

/// Execute the init command.
///
/// Prompts on stdin for any value not given on the command line.
///
/// # Errors
///
/// Returns an error if a name fails validation or the file cannot be written.
pub fn execute(args: &InitArgs, json: bool) -> Result<()> {
    let project_name = match &args.project_name {
        Some(name) => name.clone(),
        None => prompt("Project name", None)?,
    };
    let default_collection = match &args.default_collection {
        Some(name) => name.clone(),
        None => prompt("Default collection", Some(DEFAULT_COLLECTION))?,
    };

    let cwd = config::current_dir()?;
    let config = init_project(&cwd, &project_name, &default_collection)?;

    if json {
        let output = InitOutput {
            path: config::spark_file_path(&cwd),
            project_name: config.project_name,
            default_collection: config.default_collection,
        };
        super::print_json(&output)?;
    } else {
        super::print_success(".spark file created successfully in current directory");
    }

    Ok(())
}

/// Validate both names and write the `.spark` file into `dir`.
///
/// # Errors
///
/// Returns a validation error before anything is written, or an I/O error.
pub fn init_project(dir: &Path, project_name: &str, default_collection: &str) -> Result<SparkConfig> {
    let project_name = validate_project_name(project_name)?;
    let default_collection = validate_collection_name(default_collection)?;

    let path = config::write_config(dir, &project_name, &default_collection)?;
    info!(path = %path.display(), project = %project_name, "Initialized spark project");

    Ok(SparkConfig { project_name, default_collection })
}

/// Ask for a value on stdin. An empty answer takes the default, if any.
fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    let mut stdout = io::stdout();
    match default {
        Some(d) => write!(stdout, "{label} [{d}]: ")?,
        None => write!(stdout, "{label}: ")?,
    }
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim();

    Ok(match default {
        Some(d) if answer.is_empty() => d.to_string(),
        _ => answer.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn test_init_cleans_names() {
        let dir = TempDir::new().unwrap();
        let config = init_project(dir.path(), "My Cool App!!", "General").unwrap();

        assert_eq!(config.project_name, "my cool app");
        assert_eq!(config.default_collection, "general");
        assert_eq!(config::read_config(dir.path()).unwrap(), config);
    }

    #[test]
    fn test_init_rejects_short_project_name() {
        let dir = TempDir::new().unwrap();
        let err = init_project(dir.path(), "!!a", "general").unwrap_err();
        assert!(matches!(err, Error::InvalidName(_)));
        assert!(!config::spark_file_path(dir.path()).exists());
    }

    #[test]
    fn test_init_rejects_reserved_collection() {
        let dir = TempDir::new().unwrap();
        let err = init_project(dir.path(), "my app", "all").unwrap_err();
        assert!(matches!(err, Error::ReservedName(_)));
        assert!(!config::spark_file_path(dir.path()).exists());
    }

    #[test]
    fn test_init_overwrites_existing() {
        let dir = TempDir::new().unwrap();
        init_project(dir.path(), "first app", "general").unwrap();
        init_project(dir.path(), "second app", "ideas").unwrap();

        let config = config::read_config(dir.path()).unwrap();
        assert_eq!(config.project_name, "second app");
        assert_eq!(config.default_collection, "ideas");
    }
}
