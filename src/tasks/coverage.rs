//! Test coverage run and reports
//!
//! Runs the entry module under the coverage tool, prints the text report,
//! writes the HTML report and opens it. Every step is validated before the
//! first one runs; a failing step stops the rest.

use super::expansion_env;
use super::viewer::open_invocation;
use crate::errors::{ConfigError, ReleaseError};
use crate::executor::{CommandExecutor, ExitStatus, Invocation, split_args};
use crate::infrastructure::CoverageConfig;
use std::path::{Path, PathBuf};

/// Environment variable holding the project's source root
pub const MODULE_SEARCH_PATH: &str = "MODULE_SEARCH_PATH";

/// Resolved settings for one coverage run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageTask {
    /// Directory the tool runs in
    pub project_root: PathBuf,
    /// Coverage tool
    pub tool: String,
    /// Module run under coverage
    pub entry_module: Option<String>,
    /// Source root as given, before validation
    pub module_search_path: Option<PathBuf>,
    /// Interpreter search-path variable
    pub search_path_var: String,
    /// HTML report directory
    pub html_dir: PathBuf,
    /// Open the report when done
    pub open_report: bool,
    /// Arguments for the entry module, after `-m <module>`
    pub extra_args: Vec<String>,
}

/// Commands a coverage run will execute, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoveragePlan {
    /// `run`, `report` and `html` steps
    pub steps: Vec<Invocation>,
    /// Viewer command, if the report should be opened
    pub open: Option<Invocation>,
    /// Path of the generated HTML index
    pub report: PathBuf,
}

impl CoverageTask {
    /// Builds a task from config and the externally supplied search path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidArgs` if `extra_args` cannot be split.
    pub fn from_config(
        project_root: &Path,
        config: &CoverageConfig,
        module_search_path: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let env = expansion_env(project_root);
        Ok(Self {
            project_root: project_root.to_path_buf(),
            tool: config.tool.clone(),
            entry_module: config.entry_module.clone(),
            module_search_path,
            search_path_var: config.search_path_var.clone(),
            html_dir: config.html_dir.clone(),
            open_report: config.open_report,
            extra_args: split_args(&config.extra_args, &env)?,
        })
    }

    /// Absolute, existing source root.
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingModuleSearchPath` when unset or empty,
    /// `ConfigError::InvalidSearchPath` when it is not a directory.
    pub fn resolved_search_path(&self) -> Result<PathBuf, ConfigError> {
        let raw = self
            .module_search_path
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingModuleSearchPath)?;

        let candidate = self.project_root.join(raw);
        if !candidate.is_dir() {
            return Err(ConfigError::InvalidSearchPath { path: candidate });
        }

        candidate
            .canonicalize()
            .map_err(|_| ConfigError::InvalidSearchPath { path: candidate })
    }

    /// Validates settings and builds every command.
    ///
    /// # Errors
    ///
    /// Configuration errors only; nothing is executed.
    pub fn plan(&self) -> Result<CoveragePlan, ReleaseError> {
        let search_path = self.resolved_search_path()?;
        let entry_module = self
            .entry_module
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .ok_or(ConfigError::MissingEntryModule)?;

        let html_dir = self.project_root.join(&self.html_dir);
        let report = html_dir.join("index.html");

        let step = |name: &str| {
            Invocation::new(&self.project_root, &self.tool)
                .arg(name)
                .env(MODULE_SEARCH_PATH, &search_path)
                .env(self.search_path_var.clone(), &search_path)
        };

        let steps = vec![
            step("run")
                .args(["-m", entry_module])
                .args(self.extra_args.iter().cloned()),
            step("report"),
            step("html").arg("-d").path_arg(&html_dir),
        ];

        let open = self
            .open_report
            .then(|| open_invocation(&self.project_root, &report));

        Ok(CoveragePlan {
            steps,
            open,
            report,
        })
    }

    /// Runs the coverage steps and opens the report.
    ///
    /// A viewer that is missing or fails only produces a warning.
    ///
    /// # Errors
    ///
    /// Planning errors, plus `ReleaseError::NonZeroExit` for the first
    /// failing step.
    pub fn run(&self, executor: &dyn CommandExecutor) -> Result<ExitStatus, ReleaseError> {
        let plan = self.plan()?;

        for step in &plan.steps {
            executor.run(step)?.check(&self.tool)?;
        }

        println!("HTML report: {}", plan.report.display());

        if let Some(open) = &plan.open {
            if executor.is_available(open) {
                match executor.run(open) {
                    Ok(status) if status.success() => {}
                    Ok(status) => tracing::warn!(code = status.code(), "Viewer exited with an error"),
                    Err(e) => tracing::warn!(error = %e, "Could not open report"),
                }
            } else {
                tracing::warn!(viewer = %open.program, "No viewer available, not opening report");
            }
        }

        Ok(ExitStatus::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::testing::RecordingExecutor;
    use pretty_assertions::assert_eq;
    use std::ffi::OsString;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("src")).unwrap();
        temp
    }

    fn config() -> CoverageConfig {
        CoverageConfig {
            entry_module: Some("pytest".to_string()),
            ..CoverageConfig::default()
        }
    }

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    fn task(root: &Path, config: &CoverageConfig, search: Option<&str>) -> CoverageTask {
        CoverageTask::from_config(root, config, search.map(PathBuf::from)).unwrap()
    }

    #[test]
    fn test_missing_search_path_fails_before_running() {
        let project = project();
        let executor = RecordingExecutor::default();

        let err = task(project.path(), &config(), None)
            .run(&executor)
            .unwrap_err();

        assert_eq!(err, ReleaseError::Config(ConfigError::MissingModuleSearchPath));
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn test_empty_search_path_counts_as_missing() {
        let project = project();
        let err = task(project.path(), &config(), Some("")).plan().unwrap_err();
        assert_eq!(err, ReleaseError::Config(ConfigError::MissingModuleSearchPath));
    }

    #[test]
    fn test_nonexistent_search_path() {
        let project = project();
        let err = task(project.path(), &config(), Some("lib")).plan().unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Config(ConfigError::InvalidSearchPath { .. })
        ));
    }

    #[test]
    fn test_missing_entry_module() {
        let project = project();
        let err = task(project.path(), &CoverageConfig::default(), Some("src"))
            .plan()
            .unwrap_err();
        assert_eq!(err, ReleaseError::Config(ConfigError::MissingEntryModule));
    }

    #[test]
    fn test_plan_steps_and_environment() {
        let project = project();
        let src = project.path().join("src").canonicalize().unwrap();
        let src = src.into_os_string();

        let plan = task(project.path(), &config(), Some("src")).plan().unwrap();

        let args: Vec<Vec<OsString>> = plan.steps.iter().map(|s| s.args.clone()).collect();
        let html_dir = project.path().join("htmlcov");
        assert_eq!(
            args,
            vec![
                os_args(&["run", "-m", "pytest"]),
                os_args(&["report"]),
                vec!["html".into(), "-d".into(), html_dir.clone().into_os_string()],
            ]
        );

        for step in &plan.steps {
            assert_eq!(step.program, "coverage");
            assert_eq!(step.env.get(MODULE_SEARCH_PATH), Some(&src));
            assert_eq!(step.env.get("PYTHONPATH"), Some(&src));
        }

        assert_eq!(plan.report, html_dir.join("index.html"));
        assert!(plan.open.is_some());
    }

    #[test]
    fn test_absolute_search_path_is_kept() {
        let project = project();
        let src = project.path().join("src");

        let resolved = task(project.path(), &config(), Some(&src.to_string_lossy()))
            .resolved_search_path()
            .unwrap();

        assert_eq!(resolved, src.canonicalize().unwrap());
    }

    #[test]
    fn test_run_stops_at_first_failure() {
        let project = project();
        let executor = RecordingExecutor::with_codes([0, 2]);

        let err = task(project.path(), &config(), Some("src"))
            .run(&executor)
            .unwrap_err();

        assert_eq!(
            err,
            ReleaseError::NonZeroExit {
                program: "coverage".to_string(),
                code: 2
            }
        );
        let calls = executor.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].args, os_args(&["report"]));
    }

    #[test]
    fn test_run_opens_report() {
        let project = project();
        let executor = RecordingExecutor::default();

        let status = task(project.path(), &config(), Some("src"))
            .run(&executor)
            .unwrap();

        assert!(status.success());
        let calls = executor.calls();
        assert_eq!(calls.len(), 4);
        assert!(
            calls[3]
                .args
                .last()
                .is_some_and(|a| Path::new(a).ends_with("htmlcov/index.html"))
        );
    }

    #[test]
    fn test_viewer_failure_is_not_fatal() {
        let project = project();
        let executor = RecordingExecutor::with_codes([0, 0, 0, 1]);

        let status = task(project.path(), &config(), Some("src"))
            .run(&executor)
            .unwrap();

        assert!(status.success());
    }

    #[test]
    fn test_no_open() {
        let project = project();
        let executor = RecordingExecutor::default();
        let config = CoverageConfig {
            open_report: false,
            extra_args: "tests/ -x".to_string(),
            ..config()
        };

        task(project.path(), &config, Some("src"))
            .run(&executor)
            .unwrap();

        let calls = executor.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].args, os_args(&["run", "-m", "pytest", "tests/", "-x"]));
    }
}
