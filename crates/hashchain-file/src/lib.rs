//! # hashchain-file — Version-Chained Files
//!
//! A hashchain file is a header plus a body. The header carries write-once
//! metadata, the Merkle root of the body, and the digest of the header it
//! was derived from. Every stored version therefore names its predecessor,
//! and any edit to a stored version's body is detectable.
//!
//! - **`Header`** — custom fields plus the compare-and-swap chain fields.
//! - **`Body`** — user content, read-only until explicitly copied for edit.
//! - **`ChainedFile`** — keeps header and body balanced and extends the
//!   chain at most once per instance.
//! - **`FileStore`** — directory persistence keyed by reference id.
//!
//! ## Example
//!
//! ```
//! use hashchain_file::ChainedFile;
//!
//! let mut first = ChainedFile::new(Default::default());
//! first.set("title", "draft");
//! let first_id = first.reference_id().unwrap();
//!
//! let bytes = first.get_content().unwrap();
//! let mut second = ChainedFile::from_bytes(&bytes).unwrap();
//! second.make_writable();
//! second.set("title", "final");
//! second.reference_id().unwrap();
//!
//! assert_eq!(second.previous_reference(), first_id);
//! assert_eq!(second.chain_height(), 1);
//! ```

pub mod body;
pub mod file;
pub mod header;
pub mod store;

pub use body::Body;
pub use file::ChainedFile;
pub use header::Header;
pub use store::FileStore;
