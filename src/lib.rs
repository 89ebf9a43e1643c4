//! # Shipkit - Release & Coverage Automation
//!
//! Shipkit replaces the shell wrappers that usually sit next to a Python
//! package: uploading the built distributables to a package index, and
//! running the test suite under coverage.
//!
//! ## Quick Start
//!
//! ```no_run
//! use shipkit::prelude::*;
//! use std::path::Path;
//!
//! let root = Path::new("/work/my-package");
//! let config = UploadConfig {
//!     mode: SelectionMode::Latest,
//!     ..UploadConfig::default()
//! };
//!
//! let task = UploadTask::from_config(root, &config)?;
//! task.run(&CommandRunner::new())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Features
//!
//! - **Deterministic selection**: every artifact, or only the newest one with
//!   a stable name tie-break, minus excluded names
//! - **Scoped working directory**: restored on success, error and unwinding
//!   panic
//! - **Exit code passthrough**: the delegated tool's code is the process code
//! - **Dry runs**: print the exact commands without running them
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <https://www.apache.org/licenses/LICENSE-2.0>)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or <https://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod artifact;
pub mod errors;
pub mod executor;
pub mod infrastructure;
pub mod tasks;

// Prelude module for common imports
pub mod prelude;

// Re-export commonly used types
pub use artifact::{ArtifactDirectory, ArtifactEntry, ArtifactFilter, SelectionMode, select};
pub use errors::{ConfigError, ReleaseError};
pub use executor::{
    CommandExecutor, CommandRunner, DryRunExecutor, ExecutionContext, ExitStatus, Invocation,
    RunnerState,
};
pub use infrastructure::{Config, init_logging};
pub use tasks::{CoverageTask, UploadTask};

/// Version of the shipkit crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
