//! Prelude module for common imports

pub use crate::artifact::{ArtifactDirectory, ArtifactFilter, SelectionMode, select};
pub use crate::errors::{ConfigError, ReleaseError};
pub use crate::executor::{CommandExecutor, CommandRunner, DryRunExecutor, ExitStatus, Invocation};
pub use crate::infrastructure::{Config, CoverageConfig, UploadConfig};
pub use crate::tasks::{CoverageTask, UploadTask};
