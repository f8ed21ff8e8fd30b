//! Output path derivation
//!
//! Derived paths are never stored; they are recomputed from the current
//! inputs every time they are needed so they cannot drift apart.

use std::path::{Component, Path, PathBuf};

use crate::error::{FlexgenError, FlexgenResult};

/// Extension of the file the generator writes
pub const OUTPUT_EXTENSION: &str = "java";

/// Resolve `path` against `project_dir` unless it is already absolute
pub fn resolve_against(project_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_dir.join(path)
    }
}

/// Directory handed to the generator: the override if set, else `target_dir`
/// relative to the project.
pub fn target_output_dir(
    project_dir: &Path,
    target_dir: Option<&Path>,
    override_dir: Option<&Path>,
) -> Option<PathBuf> {
    override_dir
        .or(target_dir)
        .map(|dir| resolve_against(project_dir, dir))
}

/// `{output_dir}/{target_class}.java`
pub fn target_file(output_dir: &Path, target_class: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", target_class, OUTPUT_EXTENSION))
}

/// Drop `.` and fold `dir/..` without touching the filesystem.
///
/// `..` that would climb above a root is dropped; leading `..` on a relative
/// path is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Reject class names that cannot become a single file name
pub fn validate_target_class(name: &str) -> FlexgenResult<()> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name.contains(['/', '\\']) {
        Some("name contains a path separator")
    } else if name == "." || name == ".." {
        Some("name is a relative directory reference")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(FlexgenError::InvalidTargetClass {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
