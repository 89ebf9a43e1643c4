use super::traits::{CommandExecutor, ExitStatus, Invocation};
use crate::errors::ReleaseError;
use std::sync::Mutex;

/// Executor that prints what would run and reports success
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    planned: Mutex<Vec<String>>,
}

impl DryRunExecutor {
    /// Creates a new dry-run executor
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines printed so far
    #[must_use]
    pub fn planned(&self) -> Vec<String> {
        self.planned
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl CommandExecutor for DryRunExecutor {
    fn run(&self, invocation: &Invocation) -> Result<ExitStatus, ReleaseError> {
        let line = format!(
            "[dry-run] (cd {} && {})",
            shell_words::quote(&invocation.base_dir.to_string_lossy()),
            invocation
        );
        println!("{line}");

        if let Ok(mut guard) = self.planned.lock() {
            guard.push(line);
        }

        Ok(ExitStatus::SUCCESS)
    }

    fn is_available(&self, _invocation: &Invocation) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_records_and_succeeds() {
        let executor = DryRunExecutor::new();
        let invocation = Invocation::new("/work/my project", "twine")
            .arg("upload")
            .arg("dist/pkg.whl");

        let status = executor.run(&invocation).unwrap();

        assert!(status.success());
        assert_eq!(
            executor.planned(),
            vec!["[dry-run] (cd '/work/my project' && twine upload dist/pkg.whl)".to_string()]
        );
    }
}
