//! Content digests for declared inputs and the generated file

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{FlexgenError, FlexgenResult};

use super::ResolvedTask;

/// SHA-256 digest rendered as `sha256:<hex>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Prefix for SHA-256 digests
    pub const PREFIX: &'static str = "sha256:";

    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self::from_hasher(Sha256::new_with_prefix(bytes))
    }

    fn from_hasher(hasher: Sha256) -> Self {
        Self(format!("{}{:x}", Self::PREFIX, hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex part without prefix
    pub fn hex(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Digest of the file at `path`, or `None` when there is no regular file there
pub fn file_digest(path: &Path) -> FlexgenResult<Option<ContentDigest>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(ContentDigest::of_bytes(&bytes))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(_) if path.is_dir() => Ok(None),
        Err(e) => Err(FlexgenError::Io(e)),
    }
}

/// Fingerprint of everything that determines the generator's output.
///
/// Covers source content, skeleton content, purge flag, target directory and
/// target class. Each field is labelled and length-prefixed.
pub fn input_fingerprint(task: &ResolvedTask) -> FlexgenResult<ContentDigest> {
    let read = |what: &'static str, path: &Path| {
        fs::read(path).map_err(|source| FlexgenError::UnreadableInput {
            what,
            path: path.to_path_buf(),
            source,
        })
    };

    let mut hasher = Sha256::new();
    let mut field = |label: &str, bytes: &[u8]| {
        hasher.update(label.as_bytes());
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    };

    field("source", &read("source file", &task.source_file)?);
    match &task.skeleton {
        Some(skeleton) => field("skeleton", &read("skeleton", skeleton)?),
        None => field("skeleton", b""),
    }
    field("purge", &[u8::from(task.purge_old_files)]);
    field("target_dir", task.output_dir.as_os_str().as_encoded_bytes());
    field("target_class", task.target_class.as_bytes());

    Ok(ContentDigest::from_hasher(hasher))
}
