//! Release tasks
//!
//! Each task turns configuration into one or more [`Invocation`]s and runs
//! them through a [`CommandExecutor`], stopping at the first failure.
//!
//! [`Invocation`]: crate::executor::Invocation
//! [`CommandExecutor`]: crate::executor::CommandExecutor

mod coverage;
mod upload;
mod viewer;

pub use coverage::{CoveragePlan, CoverageTask, MODULE_SEARCH_PATH};
pub use upload::UploadTask;
pub use viewer::open_invocation;

use std::collections::HashMap;
use std::path::Path;

/// Variables available to `${VAR}` expansion in configured arguments
pub(crate) fn expansion_env(project_root: &Path) -> HashMap<String, String> {
    let mut env: HashMap<String, String> = std::env::vars().collect();
    env.insert(
        "PROJECT_ROOT".to_string(),
        project_root.to_string_lossy().to_string(),
    );
    env
}
