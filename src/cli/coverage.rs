//! `shipkit coverage` - Run tests under coverage
//!
//! Requires `MODULE_SEARCH_PATH` to point at the project's source root.
//!
//! ## Usage
//!
//! ```bash
//! MODULE_SEARCH_PATH=src shipkit coverage --module pytest
//! shipkit coverage --no-open -- tests/
//! ```

use super::Session;
use anyhow::{Context, Result};
use clap::Args;
use shipkit::tasks::CoverageTask;
use std::path::PathBuf;

/// Arguments of `shipkit coverage`
#[derive(Args, Debug, Clone)]
pub struct CoverageArgs {
    /// Entry module run under coverage (e.g. `pytest`)
    #[arg(short, long)]
    pub module: Option<String>,

    /// Source root exported to the child, relative to the project root
    #[arg(long, env = "MODULE_SEARCH_PATH")]
    pub module_search_path: Option<PathBuf>,

    /// Do not open the HTML report
    #[arg(long)]
    pub no_open: bool,

    /// Arguments for the entry module, after `-m <module>`
    #[arg(last = true)]
    pub tool_args: Vec<String>,
}

/// Runs the coverage task with CLI overrides applied
pub fn coverage(session: &Session, args: CoverageArgs) -> Result<()> {
    let mut config = session.config.coverage.clone();
    if args.module.is_some() {
        config.entry_module = args.module;
    }
    if args.no_open {
        config.open_report = false;
    }

    let mut task =
        CoverageTask::from_config(&session.project_root, &config, args.module_search_path)?;
    task.extra_args.extend(args.tool_args);

    task.run(session.executor.as_ref())
        .context("Coverage run failed")?;

    Ok(())
}
