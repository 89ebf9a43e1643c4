use crate::executor::Invocation;
use std::path::Path;

/// Builds the command that opens `target` in the host's default viewer
#[must_use]
pub fn open_invocation(base_dir: &Path, target: &Path) -> Invocation {
    if cfg!(target_os = "macos") {
        Invocation::new(base_dir, "open").path_arg(target)
    } else if cfg!(windows) {
        // `start` treats the first quoted argument as a window title
        Invocation::new(base_dir, "cmd")
            .args(["/C", "start", ""])
            .path_arg(target)
    } else {
        Invocation::new(base_dir, "xdg-open").path_arg(target)
    }
}
