//! # hashchain-cli — Command-Line Access to Hashchain Files
//!
//! Provides the `hashchain` binary over a [`FileStore`] directory.
//!
//! ## Subcommands
//!
//! - `hashchain new` — start a chain and store its first version.
//! - `hashchain show` — print a stored version.
//! - `hashchain set` — derive, edit and store the next version.
//! - `hashchain verify` — recheck reference id and body Merkle root.
//! - `hashchain log` — walk the chain back from a version.
//!
//! ```bash
//! hashchain new --header created_by=jared --field title=draft
//! hashchain set <ID> --field title=final --field pages=12
//! hashchain log <ID>
//! ```
//!
//! Every handler returns the process exit code: `0` on success, `1` when a
//! check fails. Hard errors (I/O, malformed input) propagate as `anyhow`
//! errors and are reported by `main`.

pub mod create;
pub mod edit;
pub mod history;
pub mod show;
pub mod verify;

use anyhow::{bail, Result};
use serde_json::Value;

use hashchain_core::FieldMap;

/// Default store directory, relative to the working directory.
pub const DEFAULT_STORE_DIR: &str = ".hashchain";

/// Parse a `name=value` assignment.
///
/// The value is read as JSON when it parses (`5`, `true`, `[1,2]`,
/// `"quoted"`), and as a plain string otherwise.
pub fn parse_assignment(raw: &str) -> Result<(String, Value)> {
    let Some((name, value)) = raw.split_once('=') else {
        bail!("expected NAME=VALUE, got {raw:?}");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("empty field name in {raw:?}");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

/// Parse a list of assignments into a field map. Later duplicates win.
pub fn parse_assignments(raw: &[String]) -> Result<FieldMap> {
    let mut fields = FieldMap::new();
    for item in raw {
        let (name, value) = parse_assignment(item)?;
        fields.insert(name, value);
    }
    Ok(fields)
}
