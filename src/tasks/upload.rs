//! Upload built artifacts to a package index
//!
//! Builds a single `twine upload` style invocation from the artifacts chosen
//! by [`SelectionMode`] and hands it to a [`CommandExecutor`].

use super::expansion_env;
use crate::artifact::{ArtifactDirectory, ArtifactFilter, SelectionMode};
use crate::errors::{ConfigError, ReleaseError};
use crate::executor::{CommandExecutor, ExitStatus, Invocation, split_args};
use crate::infrastructure::UploadConfig;
use std::path::{Path, PathBuf};

/// Resolved settings for one upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    /// Directory the tool runs in
    pub project_root: PathBuf,
    /// Absolute artifact directory
    pub dist_dir: PathBuf,
    /// Upload tool
    pub tool: String,
    /// Which artifacts to upload
    pub mode: SelectionMode,
    /// Named repository
    pub repository: Option<String>,
    /// Extra tool arguments, placed before the artifact paths
    pub extra_args: Vec<String>,
    /// Files in `dist_dir` that are never uploaded
    pub exclude: ArtifactFilter,
}

impl UploadTask {
    /// Builds a task from config.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidArgs` if `extra_args` cannot be split,
    /// `ConfigError::InvalidPattern` for a bad `exclude_regex` entry.
    pub fn from_config(project_root: &Path, config: &UploadConfig) -> Result<Self, ConfigError> {
        let env = expansion_env(project_root);
        Ok(Self {
            project_root: project_root.to_path_buf(),
            dist_dir: project_root.join(&config.dist_dir),
            tool: config.tool.clone(),
            mode: config.mode,
            repository: config.repository.clone(),
            extra_args: split_args(&config.extra_args, &env)?,
            exclude: ArtifactFilter::new(
                config.exclude_name.iter().cloned(),
                &config.exclude_regex,
            )?,
        })
    }

    /// Selects artifacts and builds the upload command.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError::DirectoryNotFound` for a missing artifact
    /// directory and `ReleaseError::EmptyDirectory` when nothing would be
    /// uploaded.
    pub fn plan(&self) -> Result<Invocation, ReleaseError> {
        let directory = ArtifactDirectory::read_filtered(&self.dist_dir, &self.exclude)?;
        let artifacts = directory.select(self.mode)?;
        if artifacts.is_empty() {
            return Err(ReleaseError::EmptyDirectory {
                path: self.dist_dir.clone(),
            });
        }

        tracing::info!(
            mode = %self.mode,
            count = artifacts.len(),
            dir = %self.dist_dir.display(),
            "Selected artifacts"
        );

        let mut invocation = Invocation::new(&self.project_root, &self.tool).arg("upload");
        if let Some(repository) = &self.repository {
            invocation = invocation.arg("--repository").arg(repository);
        }
        invocation = invocation.arg("--verbose").args(self.extra_args.iter().cloned());

        Ok(artifacts
            .iter()
            .fold(invocation, |inv, path| inv.path_arg(path)))
    }

    /// Uploads the selected artifacts.
    ///
    /// # Errors
    ///
    /// Planning errors, plus `ReleaseError::NonZeroExit` if the tool fails.
    pub fn run(&self, executor: &dyn CommandExecutor) -> Result<ExitStatus, ReleaseError> {
        let invocation = self.plan()?;
        executor.run(&invocation)?.check(&self.tool)
    }
}
