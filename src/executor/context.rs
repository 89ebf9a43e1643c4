//! Scoped working directory
//!
//! The process working directory is global state. `ExecutionContext` changes
//! it for the lifetime of the value and puts it back on drop. Early returns,
//! errors and unwinding panics all restore it. Under `panic = "abort"` (the
//! release profile) a panic ends the process without running `Drop`.

use crate::errors::{ConfigError, ReleaseError};
use std::env;
use std::path::{Path, PathBuf};

/// Holds the original and target working directories of one invocation
#[derive(Debug)]
pub struct ExecutionContext {
    original: PathBuf,
    target: PathBuf,
}

impl ExecutionContext {
    /// Records the current directory and changes to `target`.
    ///
    /// A relative `target` is resolved against the current directory once,
    /// so [`target`](Self::target) is always absolute.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError::DirectoryNotFound` if `target` is not a
    /// directory. The current directory is untouched in that case.
    pub fn enter(target: &Path) -> Result<Self, ReleaseError> {
        let original = env::current_dir()?;
        let target = original.join(target);

        if !target.is_dir() {
            return Err(ReleaseError::DirectoryNotFound { path: target });
        }

        env::set_current_dir(&target)?;
        tracing::debug!(
            from = %original.display(),
            to = %target.display(),
            "Changed working directory"
        );

        Ok(Self { original, target })
    }

    /// Directory that was current before `enter`
    #[must_use]
    pub fn original(&self) -> &Path {
        &self.original
    }

    /// Directory that is current while this value lives
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        match env::set_current_dir(&self.original) {
            Ok(()) => {
                tracing::debug!(to = %self.original.display(), "Restored working directory");
            }
            Err(e) => {
                tracing::error!(
                    to = %self.original.display(),
                    error = %e,
                    "Failed to restore working directory"
                );
            }
        }
    }
}

/// Returns the parent of the directory containing `invoker`.
///
/// Tools installed as `<root>/bin/shipkit` or `<root>/scripts/shipkit` then
/// operate on `<root>` no matter where they are called from.
///
/// # Errors
///
/// Fails if `invoker` cannot be canonicalized or has no grandparent.
pub fn resolve_base_dir(invoker: &Path) -> Result<PathBuf, ConfigError> {
    let invoker = invoker
        .canonicalize()
        .map_err(|e| ConfigError::ProjectRoot(format!("{}: {e}", invoker.display())))?;

    invoker
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            ConfigError::ProjectRoot(format!("{} has no parent directory", invoker.display()))
        })
}

/// Base directory derived from the running executable's location.
///
/// # Errors
///
/// See [`resolve_base_dir`].
pub fn invoker_base_dir() -> Result<PathBuf, ConfigError> {
    let exe = env::current_exe().map_err(|e| ConfigError::ProjectRoot(e.to_string()))?;
    resolve_base_dir(&exe)
}
