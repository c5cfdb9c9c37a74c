//! # Show Subcommand

use anyhow::{Context, Result};
use clap::Args;

use hashchain_file::FileStore;

/// Arguments for `hashchain show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Reference id of the version to print.
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Execute `hashchain show`: print chain position, header and body.
pub fn run_show(args: &ShowArgs, store: &FileStore) -> Result<u8> {
    let file = store
        .get(&args.id)
        .with_context(|| format!("failed to load {}", args.id))?;

    println!("reference: {}", args.id);
    println!("previous:  {}", file.previous_reference());
    println!("height:    {}", file.chain_height());
    println!(
        "header:\n{}",
        serde_json::to_string_pretty(file.header().fields().as_map())?
    );
    println!("body:\n{}", serde_json::to_string_pretty(file.body())?);
    Ok(0)
}
