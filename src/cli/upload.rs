//! `shipkit upload` - Upload built artifacts
//!
//! Wraps `twine upload`. By default every file in `dist/` is uploaded;
//! `--mode latest` uploads only the most recently built one.
//!
//! ## Usage
//!
//! ```bash
//! shipkit upload
//! shipkit upload --mode latest --repository testpypi
//! shipkit upload --exclude-name .asc
//! shipkit upload -- --skip-existing
//! ```

use super::Session;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use shipkit::artifact::SelectionMode;
use shipkit::tasks::UploadTask;
use std::path::PathBuf;

/// Arguments of `shipkit upload`
#[derive(Args, Debug, Clone)]
pub struct UploadArgs {
    /// Which artifacts to upload
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Artifact directory, relative to the project root
    #[arg(long)]
    pub dist: Option<PathBuf>,

    /// Repository name from the upload tool's config
    #[arg(short, long)]
    pub repository: Option<String>,

    /// Skip files whose name contains this text (repeatable, comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude_name: Vec<String>,

    /// Skip files whose name matches this regex from the start (repeatable)
    #[arg(long)]
    pub exclude_regex: Vec<String>,

    /// Extra arguments passed to the upload tool
    #[arg(last = true)]
    pub tool_args: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    All,
    Latest,
}

impl From<ModeArg> for SelectionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::All => SelectionMode::All,
            ModeArg::Latest => SelectionMode::Latest,
        }
    }
}

/// Runs the upload task with CLI overrides applied
pub fn upload(session: &Session, args: UploadArgs) -> Result<()> {
    let mut config = session.config.upload.clone();
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    if let Some(dist) = args.dist {
        config.dist_dir = dist;
    }
    if args.repository.is_some() {
        config.repository = args.repository;
    }
    config.exclude_name.extend(args.exclude_name);
    config.exclude_regex.extend(args.exclude_regex);

    let mut task = UploadTask::from_config(&session.project_root, &config)?;
    task.extra_args.extend(args.tool_args);

    task.run(session.executor.as_ref())
        .with_context(|| format!("Upload from {} failed", task.dist_dir.display()))?;

    tracing::info!("Upload complete");
    Ok(())
}
