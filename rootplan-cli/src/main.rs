use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use rootplan::commands;
use rootplan::core::{OutputFormat, OutputWriter};
use rootplan::{logging, Settings};

#[derive(Parser)]
#[command(name = "rootplan")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Preview and commit sandboxed batches of filesystem changes",
    long_about = "Plans of directory creation, moves, deletes and text replacement, \
                  confined to a single root directory. Every plan can be previewed \
                  without touching disk before it is committed."
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, text, markdown)
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Settings file (defaults to ./rootplan.toml and the user config file)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Preview or commit a plan read from a JSON file or stdin
    Plan {
        /// Plan file (reads stdin when omitted or "-")
        plan: Option<PathBuf>,

        /// Root directory, overriding the plan's "root"
        #[arg(short, long)]
        root: Option<String>,

        /// Apply the operations
        #[arg(long, conflicts_with = "dry_run")]
        commit: bool,

        /// Only preview, even if the plan says "commit": true
        #[arg(long)]
        dry_run: bool,
    },

    /// List the entries under a root
    List {
        /// Root directory
        root: String,

        /// Maximum number of entries to return
        #[arg(short = 'm', long)]
        max_entries: Option<usize>,
    },

    /// Run an MCP server on stdio
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init(cli.verbose);

    let output = OutputWriter::new(cli.format);
    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            if output.write_error(&format!("{:#}", e)).is_err() {
                eprintln!("Error: {:#}", e);
            }
            std::process::exit(1);
        }
    }
}

/// Dispatch the subcommand. `Ok(false)` means some plan operation failed.
async fn run(cli: Cli) -> Result<bool> {
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Plan {
            plan,
            root,
            commit,
            dry_run,
        } => {
            let commit = match (commit, dry_run) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            commands::plan::run(plan, root, commit, &settings, cli.format).await
        }
        Commands::List { root, max_entries } => {
            commands::list::run(root, max_entries, &settings, cli.format).await?;
            Ok(true)
        }
        Commands::Serve => {
            commands::serve::run(settings).await?;
            Ok(true)
        }
    }
}
