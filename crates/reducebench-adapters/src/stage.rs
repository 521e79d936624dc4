//! Staging a reducer working directory.

use reducebench_error::AdapterError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Filesystem steps that prepare one reducer run, applied in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagePlan {
    /// Directories to create (with parents).
    pub dirs: Vec<PathBuf>,

    /// `(from, to)` file copies.
    pub copies: Vec<(PathBuf, PathBuf)>,

    /// Files to mark executable after copying.
    pub executables: Vec<PathBuf>,

    /// Directories to delete if present.
    pub clear: Vec<PathBuf>,
}

pub fn apply_stage_plan(plan: &StagePlan) -> Result<(), AdapterError> {
    for dir in &plan.dirs {
        fs::create_dir_all(dir).map_err(|e| AdapterError::io("create dir", dir, e))?;
    }

    for (from, to) in &plan.copies {
        tracing::debug!(from = %from.display(), to = %to.display(), "copy");
        fs::copy(from, to).map_err(|e| AdapterError::io("copy", from, e))?;
    }

    for path in &plan.executables {
        set_executable(path)?;
    }

    for dir in &plan.clear {
        remove_dir_if_present(dir);
    }

    Ok(())
}

#[cfg(unix)]
pub fn set_executable(path: &Path) -> Result<(), AdapterError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o777))
        .map_err(|e| AdapterError::io("chmod", path, e))
}

#[cfg(not(unix))]
pub fn set_executable(path: &Path) -> Result<(), AdapterError> {
    // No mode bits; only check the file is there.
    fs::metadata(path)
        .map(|_| ())
        .map_err(|e| AdapterError::io("stat", path, e))
}

/// Delete a directory tree, ignoring failures.
///
/// A missing directory is the common case. Other failures are logged and
/// the run proceeds against whatever is left behind.
pub fn remove_dir_if_present(dir: &Path) {
    match fs::remove_dir_all(dir) {
        Ok(()) => tracing::debug!(dir = %dir.display(), "removed previous output"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "could not remove previous output")
        }
    }
}
