//! # File Store — Directory Persistence by Reference Id
//!
//! Stores file versions at `{root}/{reference_id}.hcf`, where the reference
//! id is the hex header digest.
//!
//! ## Integrity Invariant
//!
//! A filename is a claim about content. On every read the header digest is
//! recomputed from the stored bytes and compared with the requested id, so
//! a renamed, truncated or edited file is reported instead of returned.
//!
//! Writes are create-if-absent. Two writers storing the same version write
//! the same bytes, so an existing file is left in place.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use hashchain_core::{ContentDigest, HashChainError};

use crate::file::ChainedFile;

/// Extension of stored file versions.
pub const FILE_EXTENSION: &str = "hcf";

/// A directory of file versions addressed by reference id.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// A store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for a reference digest.
    pub fn path_for(&self, reference: &ContentDigest) -> PathBuf {
        self.root
            .join(format!("{}.{FILE_EXTENSION}", reference.to_hex()))
    }

    /// Balance and write `file`, returning its reference id.
    pub fn put(&self, file: &mut ChainedFile) -> Result<String, HashChainError> {
        let reference = file.reference_digest()?;
        let content = file.get_content()?;

        fs::create_dir_all(&self.root)?;
        let path = self.path_for(&reference);
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(mut f) => {
                f.write_all(&content)?;
                tracing::debug!(reference = %reference, path = %path.display(), "stored file version");
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                tracing::debug!(reference = %reference, "file version already stored");
            }
            Err(e) => return Err(e.into()),
        }
        Ok(reference.to_hex())
    }

    /// Read and verify the version named `reference_id`.
    ///
    /// The result is read-only and derived.
    ///
    /// # Errors
    ///
    /// - `InvalidDigest` if `reference_id` is not 64 hex characters.
    /// - `NotFound` if no such version is stored.
    /// - `Integrity` if the stored header does not hash to `reference_id`.
    pub fn get(&self, reference_id: &str) -> Result<ChainedFile, HashChainError> {
        let reference = ContentDigest::from_hex(reference_id)?;
        let path = self.path_for(&reference);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(HashChainError::NotFound(reference.to_hex()));
            }
            Err(e) => return Err(e.into()),
        };

        let file = ChainedFile::from_bytes(&bytes)?;
        let recomputed = file.header().digest()?;
        if recomputed != reference {
            return Err(HashChainError::Integrity(format!(
                "file at {} has header digest {} but is stored as {}",
                path.display(),
                recomputed,
                reference
            )));
        }
        tracing::debug!(reference = %reference, "loaded file version");
        Ok(file)
    }

    /// Whether a version named `reference_id` is stored.
    pub fn contains(&self, reference_id: &str) -> Result<bool, HashChainError> {
        let reference = ContentDigest::from_hex(reference_id)?;
        Ok(self.path_for(&reference).is_file())
    }

    /// Reference ids following `previous_reference` links from
    /// `reference_id`, newest first.
    ///
    /// Stops at the first version of the chain (zero previous hash) or at a
    /// predecessor that is not in this store.
    pub fn ancestry(&self, reference_id: &str) -> Result<Vec<String>, HashChainError> {
        Ok(self
            .ancestry_files(reference_id)?
            .into_iter()
            .map(|(id, _)| id)
            .collect())
    }

    /// Like [`ancestry`](Self::ancestry), but also yields each verified
    /// version as it was loaded during the walk.
    pub fn ancestry_files(
        &self,
        reference_id: &str,
    ) -> Result<Vec<(String, ChainedFile)>, HashChainError> {
        let mut chain = Vec::new();
        let mut current = ContentDigest::from_hex(reference_id)?.to_hex();
        loop {
            let file = self.get(&current)?;
            let previous = file.header().previous_hash();
            chain.push((current, file));
            if previous.is_zero() || !self.contains(&previous.to_hex())? {
                break;
            }
            current = previous.to_hex();
        }
        Ok(chain)
    }

    /// All stored reference ids, sorted.
    pub fn list(&self) -> Result<Vec<String>, HashChainError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if ContentDigest::from_hex(stem).is_ok() {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_file() -> ChainedFile {
        let header = json!({"created_by": "Jared", "timestamp": "2018-07-10T00:00:00Z"});
        let mut file = ChainedFile::new(header.as_object().cloned().unwrap_or_default());
        file.set("fieldA", "ABC");
        file
    }

    #[test]
    fn put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let mut file = new_file();
        let id = store.put(&mut file).unwrap();

        assert!(store.path_for(&ContentDigest::from_hex(&id).unwrap()).exists());
        let loaded = store.get(&id).unwrap();
        assert_eq!(loaded.get("fieldA"), Some(&json!("ABC")));
        assert!(loaded.is_readonly());
        assert!(!loaded.is_initial());
    }

    #[test]
    fn put_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let mut file = new_file();
        let a = store.put(&mut file).unwrap();
        let b = store.put(&mut file).unwrap();
        assert_eq!(a, b);
        assert_eq!(store.list().unwrap(), vec![a]);
    }

    #[test]
    fn get_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let err = store.get(&"ab".repeat(32)).unwrap_err();
        assert!(matches!(err, HashChainError::NotFound(_)));
    }

    #[test]
    fn get_rejects_malformed_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.get("not-a-digest"),
            Err(HashChainError::InvalidDigest(_))
        ));
    }

    #[test]
    fn get_detects_misfiled_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let mut file = new_file();
        let id = store.put(&mut file).unwrap();

        let wrong = ContentDigest::new([0x11; 32]);
        fs::copy(
            store.path_for(&ContentDigest::from_hex(&id).unwrap()),
            store.path_for(&wrong),
        )
        .unwrap();
        assert!(matches!(
            store.get(&wrong.to_hex()),
            Err(HashChainError::Integrity(_))
        ));
    }

    #[test]
    fn ancestry_files_carry_loaded_versions() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let mut first = new_file();
        let first_id = store.put(&mut first).unwrap();

        let mut next = store.get(&first_id).unwrap();
        next.make_writable();
        next.set("fieldA", "XYZ");
        let next_id = store.put(&mut next).unwrap();

        let walked = store.ancestry_files(&next_id.to_uppercase()).unwrap();
        let ids: Vec<&str> = walked.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, [next_id.as_str(), first_id.as_str()]);
        assert_eq!(walked[0].1.chain_height(), 1);
        assert_eq!(walked[1].1.get("fieldA"), Some(&json!("ABC")));
    }

    #[test]
    fn list_ignores_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
        fs::write(dir.path().join("short.hcf"), b"{}").unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn list_on_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent"));
        assert!(store.list().unwrap().is_empty());
        assert!(!store.contains(&"00".repeat(32)).unwrap());
    }
}
