//! ctagsym CLI - workspace symbol search from the command line.
//!
//! Reads the ctags file of each project root, searches it, resolves symbol
//! locations, and regenerates the tags files on request.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

/// ctagsym: workspace symbols from ctags files.
#[derive(Parser)]
#[command(name = "ctagsym")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project root directory (repeatable; defaults to current directory)
    #[arg(short, long = "root", global = true)]
    roots: Vec<PathBuf>,

    /// Settings file (defaults to .ctagsym.yaml in the first root)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for symbols by name
    Search {
        /// Search query (case-insensitive substring unless --regex)
        query: String,

        /// Treat the query as a regular expression
        #[arg(long)]
        regex: bool,

        /// Maximum number of results (overrides maxNumberOfSymbols; 0 = unlimited)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Resolve every result to a line before printing
        #[arg(long)]
        resolve: bool,

        /// Print LSP workspace symbols as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve LSP workspace symbols read as JSON from stdin
    Resolve,

    /// Regenerate the tags file of every root
    Regenerate,

    /// Notify that a file was saved (regenerates its root if enabled)
    Saved {
        /// Path of the saved file
        path: PathBuf,
    },

    /// Show per-root tags file statistics
    Stats,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = cli::Context::load(cli.roots, cli.config.as_deref()).and_then(|ctx| {
        match cli.command {
            Commands::Search {
                query,
                regex,
                limit,
                resolve,
                json,
            } => cli::search::run(
                &ctx,
                &query,
                &cli::search::SearchOptions {
                    regex,
                    limit,
                    resolve,
                    json,
                },
            ),
            Commands::Resolve => cli::resolve::run(),
            Commands::Regenerate => cli::regenerate::run(&ctx),
            Commands::Saved { path } => cli::saved::run(&ctx, &path),
            Commands::Stats => cli::stats::run(&ctx, cli.verbose > 0),
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            for cause in e.chain().skip(1) {
                eprintln!("  {}: {cause}", "caused by".dimmed());
            }
            ExitCode::FAILURE
        }
    }
}
