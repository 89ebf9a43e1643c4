//! shipkit - release and coverage automation
//!
//! Command-line wrapper around the tools a Python package release needs.
//!
//! ## Commands
//!
//! - `shipkit upload` - Upload built artifacts with `twine`
//! - `shipkit coverage` - Run tests under `coverage` and open the HTML report
//! - `shipkit completions` - Generate shell completions
//!
//! ## Installation
//!
//! ```bash
//! cargo install shipkit
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Upload everything in dist/
//! shipkit upload
//!
//! # Upload only the newest artifact to TestPyPI
//! shipkit upload --mode latest --repository testpypi
//!
//! # See what would run
//! shipkit --dry-run upload
//!
//! # Coverage with the source root on the module search path
//! MODULE_SEARCH_PATH=src shipkit coverage --module pytest
//! ```
//!
//! The exit code is the delegated tool's exit code when it fails, `1` for
//! any other error.

use shipkit::errors::ReleaseError;
use std::process::ExitCode;

mod cli;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e
                .downcast_ref::<ReleaseError>()
                .map_or(1, ReleaseError::exit_code);
            ExitCode::from(code)
        }
    }
}
