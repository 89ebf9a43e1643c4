use super::context::ExecutionContext;
use super::traits::{CommandExecutor, ExitStatus, Invocation};
use crate::errors::ReleaseError;
use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

/// Lifecycle of a single [`CommandRunner::run`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// Nothing has changed yet
    Init,
    /// Working directory points at the base directory
    DirectoryChanged,
    /// Child process is running
    ChildRunning,
    /// Original working directory is back
    DirectoryRestored,
    /// Terminal state
    Done,
}

impl fmt::Display for RunnerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::DirectoryChanged => "directory-changed",
            Self::ChildRunning => "child-running",
            Self::DirectoryRestored => "directory-restored",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Runs delegated tools on the host with inherited stdio
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    _private: (),
}

impl CommandRunner {
    /// Creates a new runner
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `invocation.program` against the child's `PATH`.
    ///
    /// Path-like programs are resolved relative to the base directory. The
    /// returned path is absolute.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError::CommandNotFound` when nothing executable matches,
    /// `ReleaseError::Io` if the current directory cannot be read.
    pub fn resolve_program(invocation: &Invocation) -> Result<PathBuf, ReleaseError> {
        let search_path: Option<OsString> = invocation
            .env
            .get("PATH")
            .cloned()
            .or_else(|| env::var_os("PATH"));

        let cwd = env::current_dir()?.join(&invocation.base_dir);

        which::which_in(&invocation.program, search_path, cwd).map_err(|e| {
            tracing::debug!(program = %invocation.program, error = %e, "Program lookup failed");
            ReleaseError::CommandNotFound {
                program: invocation.program.clone(),
            }
        })
    }

    fn transition(state: &mut RunnerState, next: RunnerState) {
        tracing::debug!(from = %state, to = %next, "Runner state");
        *state = next;
    }

    fn spawn_and_wait(
        program: &Path,
        cwd: &Path,
        invocation: &Invocation,
    ) -> Result<ExitStatus, ReleaseError> {
        let mut cmd = Command::new(program);
        cmd.args(&invocation.args);
        cmd.envs(&invocation.env);
        cmd.current_dir(cwd);
        cmd.stdin(Stdio::inherit());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        // Already resolved, so a spawn failure is not CommandNotFound
        let status = cmd.status().map_err(|e| {
            ReleaseError::Io(format!("Failed to start {}: {e}", program.display()))
        })?;

        Ok(ExitStatus::from(status))
    }
}

impl CommandExecutor for CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<ExitStatus, ReleaseError> {
        let mut state = RunnerState::Init;
        let program = Self::resolve_program(invocation)?;

        tracing::info!(command = %invocation, cwd = %invocation.base_dir.display(), "Running");

        let context = ExecutionContext::enter(&invocation.base_dir)?;
        Self::transition(&mut state, RunnerState::DirectoryChanged);

        let start = Instant::now();
        Self::transition(&mut state, RunnerState::ChildRunning);
        let result = Self::spawn_and_wait(&program, context.target(), invocation);

        drop(context);
        Self::transition(&mut state, RunnerState::DirectoryRestored);
        Self::transition(&mut state, RunnerState::Done);

        match &result {
            Ok(status) => tracing::info!(
                program = %invocation.program,
                code = status.code(),
                duration_ms = start.elapsed().as_millis(),
                "Command finished"
            ),
            Err(e) => tracing::error!(program = %invocation.program, error = %e, "Command failed to start"),
        }

        result
    }

    fn is_available(&self, invocation: &Invocation) -> bool {
        Self::resolve_program(invocation).is_ok()
    }
}
