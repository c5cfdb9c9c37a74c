//! # New Subcommand
//!
//! Starts a chain: builds an initial file from `--header` and `--field`
//! assignments, stores it, and prints its reference id.

use anyhow::{Context, Result};
use clap::Args;

use hashchain_file::{ChainedFile, FileStore};

use crate::parse_assignments;

/// Arguments for `hashchain new`.
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Custom header field, written once (repeatable).
    #[arg(long = "header", value_name = "NAME=VALUE")]
    pub headers: Vec<String>,

    /// Body field (repeatable).
    #[arg(long = "field", value_name = "NAME=VALUE")]
    pub fields: Vec<String>,
}

/// Execute `hashchain new`.
pub fn run_new(args: &NewArgs, store: &FileStore) -> Result<u8> {
    let header = parse_assignments(&args.headers)?;
    let mut file = ChainedFile::new(header);
    for (name, value) in parse_assignments(&args.fields)? {
        file.set(name, value);
    }

    let id = store
        .put(&mut file)
        .with_context(|| format!("failed to store new file in {}", store.root().display()))?;
    tracing::info!(reference = %id, "created chain");
    println!("{id}");
    Ok(0)
}
