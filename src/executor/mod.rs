//! Command execution layer
//!
//! This module contains the executor trait, the host runner and the
//! dry-run implementation, plus the scoped working directory they share.

mod context;
mod dry_run;
mod runner;
mod shell;
mod traits;

pub use context::{ExecutionContext, invoker_base_dir, resolve_base_dir};
pub use dry_run::DryRunExecutor;
pub use runner::{CommandRunner, RunnerState};
pub use shell::{expand_variables, split_args};
pub use traits::{CommandExecutor, ExitStatus, Invocation};
