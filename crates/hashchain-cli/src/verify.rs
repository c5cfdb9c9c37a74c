//! # Verify Subcommand
//!
//! Two checks, both reported:
//!
//! 1. The stored header hashes to the requested reference id.
//! 2. The body's Merkle root matches the header's reference.
//!
//! A failure of either exits with status 1.

use anyhow::Result;
use clap::Args;

use hashchain_core::HashChainError;
use hashchain_file::FileStore;

/// Arguments for `hashchain verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Reference id of the version to check.
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Execute `hashchain verify`.
pub fn run_verify(args: &VerifyArgs, store: &FileStore) -> Result<u8> {
    let file = match store.get(&args.id) {
        Ok(file) => file,
        Err(HashChainError::Integrity(msg)) => {
            println!("FAIL: reference mismatch: {msg}");
            return Ok(1);
        }
        Err(HashChainError::NotFound(id)) => {
            println!("FAIL: not found: {id}");
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    };

    if !file.verify_integrity()? {
        println!(
            "FAIL: body does not match merkle root {}",
            file.header().merkle_root_reference()
        );
        return Ok(1);
    }
    println!("OK: {} (height {})", args.id, file.chain_height());
    Ok(0)
}
