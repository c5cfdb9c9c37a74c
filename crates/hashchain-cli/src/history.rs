//! # Log Subcommand
//!
//! Prints the ancestry of a version, newest first, one line per version.

use anyhow::{Context, Result};
use clap::Args;

use hashchain_file::FileStore;

/// Arguments for `hashchain log`.
#[derive(Args, Debug)]
pub struct LogArgs {
    /// Reference id to start from.
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Execute `hashchain log`.
pub fn run_log(args: &LogArgs, store: &FileStore) -> Result<u8> {
    let chain = store
        .ancestry_files(&args.id)
        .with_context(|| format!("failed to walk chain from {}", args.id))?;
    for (id, file) in &chain {
        println!("{id}  height={}", file.chain_height());
    }
    Ok(0)
}
