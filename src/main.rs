//! spark CLI entry point.

use clap::Parser;
use colored::Colorize;
use sparks::cli::commands;
use sparks::cli::{Cli, Commands};
use sparks::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e, &cli);
            // Only a failed init aborts with a failing status; every other
            // command reports the failure and exits normally.
            if matches!(cli.command, Commands::Init(_)) {
                ExitCode::from(e.exit_code())
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}

fn report_error(e: &Error, cli: &Cli) {
    if cli.quiet {
        return;
    }
    if cli.json {
        eprintln!("{}", e.to_structured_json());
        return;
    }
    eprintln!("{}", format!("✗ {e}").red());
    if let Some(hint) = e.hint() {
        eprintln!("  Hint: {hint}");
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let db = cli.db.as_ref();
    let json = cli.json;

    match &cli.command {
        Commands::Init(args) => commands::init::execute(args, json),
        Commands::Add { content, collection } => {
            commands::spark::execute_add(content, collection.as_deref(), db, json)
        }
        Commands::List(args) => commands::spark::execute_list(args, db, json),
        Commands::Collections { action, name, spark_id } => {
            commands::collection::execute(action.as_deref(), name.as_deref(), *spark_id, db, json)
        }
        Commands::Search { query } => commands::spark::execute_search(query, db, json),
        Commands::Show { spark_id } => commands::spark::execute_show(*spark_id, db, json),
        Commands::Edit { spark_id, content } => {
            commands::spark::execute_edit(*spark_id, content, db, json)
        }
        Commands::Delete { spark_id } => commands::spark::execute_delete(*spark_id, db, json),
        Commands::Contexts => commands::context::execute(db, json),
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
