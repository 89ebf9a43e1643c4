//! Configuration management
//!
//! Settings come from built-in defaults, an optional `shipkit.toml` in the
//! project root, and `SHIPKIT_*` environment variables. CLI flags are applied
//! on top by the caller.

use crate::artifact::SelectionMode;
use crate::errors::ConfigError;
use crate::executor::invoker_base_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-project config file
pub const CONFIG_FILE_NAME: &str = "shipkit.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Logging settings
    pub log: LogConfig,
    /// Upload task settings
    pub upload: UploadConfig,
    /// Coverage task settings
    pub coverage: CoverageConfig,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Level or `EnvFilter` directive
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Upload task settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Upload tool
    pub tool: String,
    /// Artifact directory, relative to the project root
    pub dist_dir: PathBuf,
    /// Which artifacts to upload
    pub mode: SelectionMode,
    /// Named repository passed as `--repository`
    pub repository: Option<String>,
    /// Extra tool arguments, shell-quoted
    pub extra_args: String,
    /// Skip files whose name contains any of these
    pub exclude_name: Vec<String>,
    /// Skip files whose name matches any of these regexes from the start
    pub exclude_regex: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            tool: "twine".to_string(),
            dist_dir: PathBuf::from("dist"),
            mode: SelectionMode::All,
            repository: None,
            extra_args: String::new(),
            exclude_name: Vec::new(),
            exclude_regex: Vec::new(),
        }
    }
}

/// Coverage task settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoverageConfig {
    /// Coverage tool
    pub tool: String,
    /// Module run under coverage (`coverage run -m <module>`)
    pub entry_module: Option<String>,
    /// Interpreter search-path variable exported to the child
    pub search_path_var: String,
    /// HTML report directory, relative to the project root
    pub html_dir: PathBuf,
    /// Open the HTML report when done
    pub open_report: bool,
    /// Arguments for the entry module, after `-m <module>`, shell-quoted
    pub extra_args: String,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            tool: "coverage".to_string(),
            entry_module: None,
            search_path_var: "PYTHONPATH".to_string(),
            html_dir: PathBuf::from("htmlcov"),
            open_report: true,
            extra_args: String::new(),
        }
    }
}

impl Config {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` with `origin` as the path.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Loads a config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Self::from_toml_str(&content, path)
    }

    /// Loads `explicit` if given, else `shipkit.toml` in `project_root` if
    /// present, else defaults.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn discover(project_root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = project_root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            tracing::debug!(root = %project_root.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Applies `SHIPKIT_*` overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidMode` for a bad `SHIPKIT_UPLOAD_MODE`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("SHIPKIT_LOG") {
            self.log.level = level;
        }
        if let Some(mode) = lookup("SHIPKIT_UPLOAD_MODE") {
            self.upload.mode = mode.parse()?;
        }
        if let Some(repository) = lookup("SHIPKIT_REPOSITORY") {
            self.upload.repository = Some(repository);
        }
        if let Some(module) = lookup("SHIPKIT_COVERAGE_MODULE") {
            self.coverage.entry_module = Some(module);
        }
        Ok(())
    }
}

/// Determines the directory release tasks operate in.
///
/// In order: `explicit`; the grandparent of the running executable if it
/// holds a `shipkit.toml`; the nearest ancestor of `cwd` holding one; the
/// grandparent of the running executable.
///
/// # Errors
///
/// Returns `ConfigError::ProjectRoot` if no candidate can be resolved.
pub fn locate_project_root(explicit: Option<&Path>, cwd: &Path) -> Result<PathBuf, ConfigError> {
    if let Some(root) = explicit {
        let absolute = if root.is_absolute() {
            root.to_path_buf()
        } else {
            cwd.join(root)
        };
        return absolute
            .canonicalize()
            .map_err(|e| ConfigError::ProjectRoot(format!("{}: {e}", absolute.display())));
    }

    let invoker_root = invoker_base_dir();
    if let Ok(root) = &invoker_root
        && root.join(CONFIG_FILE_NAME).is_file()
    {
        return Ok(root.clone());
    }

    if let Some(root) = cwd
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE_NAME).is_file())
    {
        return Ok(root.to_path_buf());
    }

    invoker_root
}
