//! itemsync CLI
//!
//! Offline-first item collection with background sync.
//!
//! # Commands
//!
//! - `list` - Show items passing the current (or a given) filter
//! - `add` - Add an item and push it to the remote
//! - `categories` - List the known categories
//! - `select` - Change the persisted category filter
//! - `random` - Show a random visible item
//! - `sync` - Run one reconciliation cycle
//! - `watch` - Sync on an interval until interrupted
//! - `import` / `export` - Move the collection in and out as JSON

mod commands;

use clap::{Parser, Subcommand};
use itemsync_core::ImportMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Offline-first item collection with background sync.
#[derive(Parser, Debug)]
#[command(name = "itemsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the local collection
    #[arg(global = true, short, long, env = "ITEMSYNC_DATA_DIR", default_value = ".itemsync")]
    data_dir: PathBuf,

    /// Remote collection endpoint
    #[arg(global = true, short, long, env = "ITEMSYNC_ENDPOINT")]
    endpoint: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show items passing the current filter
    List {
        /// Show this category instead of the persisted filter
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Add an item
    Add {
        /// Item text
        text: String,

        /// Item category
        #[arg(short, long)]
        category: String,

        /// Do not push the new item to the remote
        #[arg(long)]
        offline: bool,
    },

    /// List the known categories
    Categories,

    /// Change the category filter ("all" shows everything)
    Select {
        /// Category name or "all"
        category: String,
    },

    /// Show a random item from the current filter
    Random,

    /// Run one sync cycle
    Sync,

    /// Sync on startup and then on an interval until Ctrl-C
    Watch {
        /// Seconds between cycles
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },

    /// Import items from a JSON file
    Import {
        /// File containing a JSON array of items
        file: PathBuf,

        /// How imported items are combined with the collection
        #[arg(short, long, default_value_t = ImportMode::Merge)]
        mode: ImportMode,
    },

    /// Export the collection to a JSON file
    Export {
        /// Output path (defaults to a timestamped name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = commands::sync_config(cli.endpoint.as_deref());
    let data_dir = cli.data_dir.as_path();

    match cli.command {
        Commands::List { category } => commands::list::run(data_dir, category.as_deref())?,
        Commands::Add {
            text,
            category,
            offline,
        } => commands::add::run(data_dir, &config, &text, &category, offline).await?,
        Commands::Categories => commands::categories::run(data_dir)?,
        Commands::Select { category } => commands::select::run(data_dir, &category)?,
        Commands::Random => commands::random::run(data_dir)?,
        Commands::Sync => commands::sync::run(data_dir, &config).await?,
        Commands::Watch { interval } => {
            let config = match interval {
                Some(secs) => config.with_sync_interval(std::time::Duration::from_secs(secs)),
                None => config,
            };
            commands::watch::run(data_dir, &config).await?;
        }
        Commands::Import { file, mode } => commands::import::run(data_dir, &file, mode).await?,
        Commands::Export { output } => commands::export::run(data_dir, output.as_deref())?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_global_flags() {
        let cli = Cli::try_parse_from([
            "itemsync",
            "add",
            "Stay hungry",
            "--category",
            "Motivation",
            "--data-dir",
            "/tmp/items",
            "--offline",
        ])
        .unwrap();

        assert_eq!(cli.data_dir, PathBuf::from("/tmp/items"));
        assert!(matches!(
            cli.command,
            Commands::Add { ref text, ref category, offline: true }
                if text == "Stay hungry" && category == "Motivation"
        ));
    }

    #[test]
    fn parses_import_mode() {
        let cli = Cli::try_parse_from(["itemsync", "import", "items.json", "--mode", "replace"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Import { mode: ImportMode::Replace, .. }
        ));

        let cli = Cli::try_parse_from(["itemsync", "import", "items.json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Import { mode: ImportMode::Merge, .. }
        ));
    }

    #[test]
    fn rejects_zero_interval() {
        assert!(Cli::try_parse_from(["itemsync", "watch", "--interval", "0"]).is_err());
    }
}
