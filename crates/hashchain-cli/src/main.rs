//! # hashchain CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hashchain_cli::create::{run_new, NewArgs};
use hashchain_cli::edit::{run_set, SetArgs};
use hashchain_cli::history::{run_log, LogArgs};
use hashchain_cli::show::{run_show, ShowArgs};
use hashchain_cli::verify::{run_verify, VerifyArgs};
use hashchain_cli::DEFAULT_STORE_DIR;
use hashchain_file::FileStore;

/// Hashchain — self-verifying, version-chained files.
///
/// Every stored version is named by the SHA-256 of its header, and every
/// header names the version it was derived from.
#[derive(Parser, Debug)]
#[command(name = "hashchain", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding stored versions.
    #[arg(long, global = true, value_name = "DIR", default_value = DEFAULT_STORE_DIR)]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a new chain and store its first version.
    New(NewArgs),

    /// Print a stored version.
    Show(ShowArgs),

    /// Derive the next version with updated body fields.
    Set(SetArgs),

    /// Check a version's reference id and body Merkle root.
    Verify(VerifyArgs),

    /// List a version and its stored ancestors, newest first.
    Log(LogArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let store = FileStore::new(&cli.store);
    tracing::debug!(store = %store.root().display(), "opened file store");

    let result = match cli.command {
        Commands::New(args) => run_new(&args, &store),
        Commands::Show(args) => run_show(&args, &store),
        Commands::Set(args) => run_set(&args, &store),
        Commands::Verify(args) => run_verify(&args, &store),
        Commands::Log(args) => run_log(&args, &store),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
