//! SHELF CLI
//!
//! Command-line interface for SHELF - local book catalog management.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shelf_core::{BookPatch, BookStore, Config, StorageError};

mod commands;
mod editor;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "SHELF - Local book catalog with CSV import/export")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Answer yes to every confirmation prompt
    #[arg(long, global = true)]
    yes: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List books (shows pending notices first)
    #[command(alias = "ls")]
    List {
        /// Only show books whose title, author, year or ISBN contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show book details
    Show {
        /// Book ID (full UUID or prefix)
        id: String,
    },
    /// Register a new book
    #[command(alias = "register")]
    Add {
        #[command(flatten)]
        fields: BookFields,
    },
    /// Edit a book (prompts for each field when no field flags are given)
    Edit {
        /// Book ID (full UUID or prefix)
        id: String,
        #[command(flatten)]
        fields: BookFields,
    },
    /// Delete a book
    #[command(alias = "rm")]
    Delete {
        /// Book ID (full UUID or prefix)
        id: String,
    },
    /// Delete every book
    Clear,
    /// Replace the catalog with the contents of a CSV file
    Import {
        /// CSV file with a header row
        file: PathBuf,
        /// Validate every row and import nothing if any row is invalid
        #[arg(long)]
        strict: bool,
    },
    /// Show the rows of a CSV file without importing it
    View {
        /// CSV file with a header row
        file: PathBuf,
        /// Only show rows with this text in any column
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Export the catalog as CSV
    Export {
        /// Destination file (defaults to {export_dir}/{export_prefix}_YYYY-MM-DD.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show catalog statistics and storage location
    Stats,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

/// Book field values given on the command line
#[derive(Args, Debug, Default, Clone)]
struct BookFields {
    /// Title
    #[arg(short, long)]
    title: Option<String>,
    /// Author
    #[arg(short, long)]
    author: Option<String>,
    /// Publication year (four digits)
    #[arg(short, long)]
    year: Option<String>,
    /// ISBN-13 (e.g. 978-4-06-182009-8)
    #[arg(short, long)]
    isbn: Option<String>,
}

impl BookFields {
    fn into_patch(self) -> BookPatch {
        BookPatch {
            title: self.title,
            author: self.author,
            year: self.year,
            isbn: self.isbn,
        }
    }
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, export_dir, export_prefix, header_style, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:?}", err);
            print_storage_hint(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet), cli.yes);

    // Config commands work without opening the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    // Viewing a file never touches the catalog
    if let Commands::View { file, filter } = &cli.command {
        return commands::transfer::view(file.clone(), filter.clone(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())?;
    init_logging(&config);

    let mut store = BookStore::open_with_config(&config)?;

    match cli.command {
        Commands::List { search } => commands::book::list(&mut store, search, &output),
        Commands::Show { id } => commands::book::show(&store, id, &output),
        Commands::Add { fields } => commands::book::add(&mut store, fields.into_patch(), &output),
        Commands::Edit { id, fields } => {
            commands::book::edit(&mut store, id, fields.into_patch(), &output)
        }
        Commands::Delete { id } => commands::book::delete(&mut store, id, &output),
        Commands::Clear => commands::book::clear(&mut store, &output),
        Commands::Import { file, strict } => {
            commands::transfer::import(&mut store, file, strict, &output)
        }
        Commands::Export { output: path } => {
            commands::transfer::export(&store, &config, path, &output)
        }
        Commands::Stats => commands::stats::show(&store, &config, &output),
        Commands::Config { .. } | Commands::View { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Suggest a fix when the failure came from the slot files
fn print_storage_hint(err: &anyhow::Error) {
    let Some(storage) = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<StorageError>())
    else {
        return;
    };

    if let Some(suggestion) = storage.recovery_suggestion() {
        if storage.is_recoverable() {
            eprintln!("Hint: {} Then run the command again.", suggestion);
        } else {
            eprintln!("Hint: {}", suggestion);
        }
    }
}

/// Initialize logging
///
/// Only initializes if SHELF_LOG environment variable is set.
/// Appends to config.log_file or {data_dir}/debug.log, never the terminal.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("SHELF_LOG") else {
        return;
    };

    let log_path = config.log_path();

    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(log_directives(&log_level));

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}

/// Filter directives for the core library and this binary
///
/// Targets are crate names; the binary's crate is `shelf`, not the package name.
fn log_directives(level: &str) -> String {
    format!("shelf_core={},{}={}", level, env!("CARGO_CRATE_NAME"), level)
}
