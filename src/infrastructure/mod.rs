//! Infrastructure layer
//!
//! Configuration loading and logging setup.

mod config;
mod logging;

pub use config::{
    CONFIG_FILE_NAME, Config, CoverageConfig, LogConfig, UploadConfig, locate_project_root,
};
pub use logging::init_logging;
