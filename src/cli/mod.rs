//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Spark - Capture and organize your coding ideas
#[derive(Parser, Debug)]
#[command(name = "spark", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.spark/spark_store.db)
    #[arg(long, global = true, env = "SPARK_DB")]
    pub db: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no logging, no error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Creates a new spark context in the current directory
    Init(InitArgs),

    /// Add a new spark
    Add {
        /// The idea to capture
        content: String,

        /// Collection name (default: the project's default collection)
        #[arg(short, long)]
        collection: Option<String>,
    },

    /// List sparks
    List(ListArgs),

    /// Manage collections
    Collections {
        /// What to do: create, add, remove or delete (omit to list all collections)
        action: Option<String>,

        /// Collection name
        name: Option<String>,

        /// Spark ID (for add/remove)
        spark_id: Option<i64>,
    },

    /// Search sparks in the current project
    Search {
        /// Case-insensitive text to look for
        query: String,
    },

    /// Show spark details
    Show {
        /// Spark ID
        spark_id: i64,
    },

    /// Edit a spark
    Edit {
        /// Spark ID
        spark_id: i64,

        /// New content
        content: String,
    },

    /// Delete a spark
    Delete {
        /// Spark ID
        spark_id: i64,
    },

    /// List known project contexts
    Contexts,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Default)]
pub struct InitArgs {
    /// Name of the project (prompted if omitted)
    #[arg(long)]
    pub project_name: Option<String>,

    /// Default collection for sparks (prompted if omitted)
    #[arg(long)]
    pub default_collection: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Filter by collection name
    #[arg(short, long)]
    pub collection: Option<String>,

    /// Show only today's sparks
    #[arg(short, long)]
    pub today: bool,

    /// Show sparks from a specific context path
    #[arg(long, alias = "ctx")]
    pub context: Option<PathBuf>,
}

/// Actions of the `collections` command.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectionAction {
    /// Create a collection
    Create,
    /// Add a spark to a collection (created if missing)
    Add,
    /// Remove a spark from a collection
    Remove,
    /// Delete a collection (its sparks are kept)
    Delete,
}

/// Supported shells for completions.
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
