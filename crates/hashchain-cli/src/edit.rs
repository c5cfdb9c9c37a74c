//! # Set Subcommand
//!
//! Loads a stored version, applies `--field` assignments to a writable
//! derived copy, and stores the result as the next version in the chain.

use anyhow::{bail, Context, Result};
use clap::Args;

use hashchain_core::ContentDigest;
use hashchain_file::FileStore;

use crate::parse_assignments;

/// Arguments for `hashchain set`.
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Reference id of the version to derive from.
    #[arg(value_name = "ID")]
    pub id: String,

    /// Body field to write (repeatable).
    #[arg(long = "field", value_name = "NAME=VALUE", required = true)]
    pub fields: Vec<String>,
}

/// Execute `hashchain set`.
pub fn run_set(args: &SetArgs, store: &FileStore) -> Result<u8> {
    let parent = ContentDigest::from_hex(&args.id)
        .with_context(|| format!("invalid reference id {:?}", args.id))?
        .to_hex();
    let updates = parse_assignments(&args.fields)?;
    if updates.is_empty() {
        bail!("no fields given");
    }

    let mut file = store
        .get(&parent)
        .with_context(|| format!("failed to load {parent}"))?;
    file.make_writable();
    for (name, value) in updates {
        file.set(name, value);
    }

    let id = store.put(&mut file).context("failed to store next version")?;
    if id == parent {
        tracing::warn!(reference = %id, "fields unchanged; no new version created");
    } else {
        tracing::info!(
            reference = %id,
            previous = %parent,
            height = file.chain_height(),
            "stored next version"
        );
    }
    println!("{id}");
    Ok(0)
}
