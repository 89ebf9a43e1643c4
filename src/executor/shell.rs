//! Argument expansion for configured tool arguments
//!
//! Extra arguments come from config files and environment variables as a
//! single string. They are expanded with `${VAR}` syntax and then split with
//! POSIX shell quoting rules.
//!
//! ```rust
//! use std::collections::HashMap;
//! use shipkit::executor::split_args;
//!
//! let env = HashMap::from([("REPO".to_string(), "testpypi".to_string())]);
//! let args = split_args("--repository ${REPO} --comment 'first release'", &env).unwrap();
//! assert_eq!(args, ["--repository", "testpypi", "--comment", "first release"]);
//! ```

use crate::errors::ConfigError;
use regex::Regex;
use std::collections::HashMap;

/// Expands `${VAR_NAME}` references in `input`.
///
/// Unknown variables are left as written.
#[must_use]
pub fn expand_variables(input: &str, env: &HashMap<String, String>) -> String {
    static VAR_PATTERN: once_cell::sync::Lazy<Regex> =
        once_cell::sync::Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

    VAR_PATTERN
        .replace_all(input, |caps: &regex::Captures| {
            let var_name = caps.get(1).map_or("", |m| m.as_str());
            env.get(var_name).cloned().unwrap_or_else(|| {
                caps.get(0)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default()
            })
        })
        .to_string()
}

/// Expands `input` and splits it into arguments.
///
/// # Errors
///
/// Returns `ConfigError::InvalidArgs` for unbalanced quotes.
pub fn split_args(input: &str, env: &HashMap<String, String>) -> Result<Vec<String>, ConfigError> {
    let expanded = expand_variables(input, env);
    shell_words::split(&expanded).map_err(|e| ConfigError::InvalidArgs {
        input: input.to_string(),
        message: e.to_string(),
    })
}
