//! Command execution traits
//!
//! This module defines the seam between release tasks and the process that
//! actually runs delegated tools.

use crate::errors::ReleaseError;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Trait for running a single external command
#[allow(clippy::missing_errors_doc)]
pub trait CommandExecutor: Send + Sync {
    /// Runs the invocation to completion and returns the child's exit status
    fn run(&self, invocation: &Invocation) -> Result<ExitStatus, ReleaseError>;

    /// Returns true if the invocation's program can be resolved for execution
    fn is_available(&self, invocation: &Invocation) -> bool;
}

/// Full description of one external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Directory the command runs in
    pub base_dir: PathBuf,

    /// Program name or path
    pub program: String,

    /// Arguments, passed through verbatim
    pub args: Vec<OsString>,

    /// Extra environment for the child only
    pub env: BTreeMap<String, OsString>,
}

impl Invocation {
    /// Creates an invocation of `program` in `base_dir` with no arguments
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>, program: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    /// Appends one argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends a path argument, byte for byte
    #[must_use]
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.as_os_str())
    }

    /// Sets an environment variable for the child
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Shell-quoted command line, without the environment.
    ///
    /// For display only: arguments that are not valid UTF-8 are shown lossily.
    #[must_use]
    pub fn command_line(&self) -> String {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.program.clone());
        words.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        shell_words::join(words)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{}={} ", key, shell_words::quote(&value.to_string_lossy()))?;
        }
        write!(f, "{}", self.command_line())
    }
}

/// Exit status of a delegated tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    code: i32,
}

impl ExitStatus {
    /// Status of a successful run
    pub const SUCCESS: Self = Self { code: 0 };

    /// Wraps a raw exit code
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        Self { code }
    }

    /// Numeric exit code
    #[must_use]
    pub fn code(self) -> i32 {
        self.code
    }

    /// Returns true if the code is zero
    #[must_use]
    pub fn success(self) -> bool {
        self.code == 0
    }

    /// Turns a non-zero status into `ReleaseError::NonZeroExit`.
    ///
    /// # Errors
    ///
    /// Fails when the code is not zero.
    pub fn check(self, program: &str) -> Result<Self, ReleaseError> {
        if self.success() {
            Ok(self)
        } else {
            Err(ReleaseError::NonZeroExit {
                program: program.to_string(),
                code: self.code,
            })
        }
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self { code };
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self { code: 128 + signal };
            }
        }

        Self { code: -1 }
    }
}
