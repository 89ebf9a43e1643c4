//! Error types for release tasks

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while selecting artifacts or running delegated tools
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReleaseError {
    /// Artifact directory does not exist or is not a directory
    #[error("Directory not found: {}", path.display())]
    DirectoryNotFound {
        /// The missing directory.
        path: PathBuf,
    },

    /// No regular files were found where at least one was required
    #[error("No artifacts found in {}", path.display())]
    EmptyDirectory {
        /// The directory that was searched.
        path: PathBuf,
    },

    /// Program could not be resolved on the search path
    #[error("Command not found: {program}")]
    CommandNotFound {
        /// Program name as given by the caller.
        program: String,
    },

    /// Delegated tool exited with a non-zero code
    #[error("'{program}' exited with code {code}")]
    NonZeroExit {
        /// Program that failed.
        program: String,
        /// Exit code returned by the program.
        code: i32,
    },

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ReleaseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl ReleaseError {
    /// Process exit code to report for this error.
    ///
    /// A failing delegated tool passes its own code through; everything
    /// else maps to `1`.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::NonZeroExit { code, .. } => u8::try_from(*code)
                .ok()
                .filter(|c| *c != 0)
                .unwrap_or(1),
            _ => 1,
        }
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `MODULE_SEARCH_PATH` was not provided
    #[error("MODULE_SEARCH_PATH is not set; point it at the project's source root")]
    MissingModuleSearchPath,

    /// No entry module was configured for the coverage run
    #[error("No entry module configured; pass --module or set [coverage] entry_module")]
    MissingEntryModule,

    /// Search path does not point at an existing directory
    #[error("Module search path does not exist: {}", path.display())]
    InvalidSearchPath {
        /// The offending path.
        path: PathBuf,
    },

    /// Config file could not be parsed
    #[error("Failed to parse {}: {message}", path.display())]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// Unknown selection mode
    #[error("Invalid selection mode: '{0}' (expected 'all' or 'latest')")]
    InvalidMode(String),

    /// Project root could not be determined
    #[error("Cannot determine project root: {0}")]
    ProjectRoot(String),

    /// Exclusion pattern is not a valid regular expression
    #[error("Invalid exclude pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The pattern as configured.
        pattern: String,
        /// Regex compiler message.
        message: String,
    },

    /// Extra arguments could not be split into words
    #[error("Invalid argument string '{input}': {message}")]
    InvalidArgs {
        /// The raw argument string.
        input: String,
        /// Tokenizer message.
        message: String,
    },
}
