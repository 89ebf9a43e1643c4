//! CLI front end for shipkit
//!
//! Subcommands:
//! - `upload`: Upload built artifacts with the upload tool
//! - `coverage`: Run tests under coverage and open the HTML report
//! - `completions`: Generate shell completions

pub mod completions;
pub mod coverage;
pub mod upload;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use shipkit::executor::{CommandExecutor, CommandRunner, DryRunExecutor};
use shipkit::infrastructure::{Config, init_logging, locate_project_root};
use std::path::PathBuf;

/// CLI arguments for shipkit
#[derive(Parser, Debug)]
#[command(name = "shipkit")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Project root (defaults to the parent of the executable's directory)
    #[arg(long, global = true, env = "SHIPKIT_PROJECT_ROOT")]
    project_root: Option<PathBuf>,

    /// Config file (defaults to <project root>/shipkit.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the commands instead of running them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload built artifacts to a package index
    Upload(upload::UploadArgs),

    /// Run tests under coverage and produce text and HTML reports
    Coverage(coverage::CoverageArgs),

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: ShellArg,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ShellArg {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// State shared by the task subcommands
pub struct Session {
    /// Directory delegated tools run in
    pub project_root: PathBuf,
    /// Merged configuration
    pub config: Config,
    /// Real or dry-run executor
    pub executor: Box<dyn CommandExecutor>,
}

/// Build the CLI command for completion generation
pub fn build_cli() -> clap::Command {
    Args::command()
}

fn open_session(args: &Args) -> Result<Session> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let project_root = locate_project_root(args.project_root.as_deref(), &cwd)?;

    let mut config = Config::discover(&project_root, args.config.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok())?;

    let level = if args.quiet {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        config.log.level.as_str()
    };
    init_logging(level);

    tracing::debug!(root = %project_root.display(), dry_run = args.dry_run, "Session ready");

    let executor: Box<dyn CommandExecutor> = if args.dry_run {
        Box::new(DryRunExecutor::new())
    } else {
        Box::new(CommandRunner::new())
    };

    Ok(Session {
        project_root,
        config,
        executor,
    })
}

/// Parse and execute CLI arguments
pub fn run() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Upload(ref upload_args) => {
            let session = open_session(&args)?;
            upload::upload(&session, upload_args.clone())?;
        }
        Command::Coverage(ref coverage_args) => {
            let session = open_session(&args)?;
            coverage::coverage(&session, coverage_args.clone())?;
        }
        Command::Completions { shell, ref output } => {
            use clap_complete::Shell;

            let shell_enum = match shell {
                ShellArg::Bash => Shell::Bash,
                ShellArg::Zsh => Shell::Zsh,
                ShellArg::Fish => Shell::Fish,
                ShellArg::PowerShell => Shell::PowerShell,
            };

            let completions = completions::generate_completions(shell_enum)?;

            if let Some(output_path) = output {
                completions::save_completions(&completions, output_path)?;
            } else {
                println!("{completions}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_upload_flags() {
        let args = Args::try_parse_from([
            "shipkit",
            "--dry-run",
            "upload",
            "--mode",
            "latest",
            "--repository",
            "testpypi",
            "--",
            "--skip-existing",
        ])
        .unwrap();

        assert!(args.dry_run);
        match args.command {
            Command::Upload(parsed) => {
                assert_eq!(parsed.mode, Some(upload::ModeArg::Latest));
                assert_eq!(parsed.repository.as_deref(), Some("testpypi"));
                assert_eq!(parsed.tool_args, vec!["--skip-existing".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_exclude_flags() {
        let args = Args::try_parse_from([
            "shipkit",
            "upload",
            "--exclude-name",
            ".asc,.sig",
            "--exclude-regex",
            "README.*",
            "--exclude-regex",
            "pkg-0\\.",
        ])
        .unwrap();

        match args.command {
            Command::Upload(parsed) => {
                assert_eq!(parsed.exclude_name, vec![".asc".to_string(), ".sig".to_string()]);
                assert_eq!(
                    parsed.exclude_regex,
                    vec!["README.*".to_string(), "pkg-0\\.".to_string()]
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Args::try_parse_from(["shipkit", "-v", "-q", "upload"]).is_err());
    }
}
