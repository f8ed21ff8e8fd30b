//! Removal of previously generated output

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::error::{FlexgenError, FlexgenResult};

/// What a purge found at the target path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Purged {
    /// Nothing was there
    Nothing,
    /// A file or symlink was removed
    File,
    /// A directory tree was removed
    Directory,
}

/// Recursively delete whatever exists at `path`.
///
/// Symlinks are removed themselves, never followed. Errors are not retried.
pub fn purge(path: &Path) -> FlexgenResult<Purged> {
    let purge_error = |source: io::Error| FlexgenError::Purge {
        path: path.to_path_buf(),
        source,
    };

    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Purged::Nothing),
        Err(e) => return Err(purge_error(e)),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path).map_err(purge_error)?;
        Ok(Purged::Directory)
    } else {
        fs::remove_file(path).map_err(purge_error)?;
        Ok(Purged::File)
    }
}
