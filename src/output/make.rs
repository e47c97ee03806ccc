// Running the documentation build after the pages are written

use crate::error::Result;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::info;

/// An external build step, `<command> <target>`, run inside the output
/// directory
#[derive(Debug, Clone)]
pub struct BuildRunner {
    command: String,
    target: String,
    working_dir: PathBuf,
}

impl BuildRunner {
    pub fn new(command: impl Into<String>, target: impl Into<String>, working_dir: &Path) -> Self {
        Self {
            command: command.into(),
            target: target.into(),
            working_dir: working_dir.to_path_buf(),
        }
    }

    /// Run the build and wait for it. The child inherits stdout and stderr;
    /// failing to start it is an I/O error.
    pub fn run(&self) -> Result<ExitStatus> {
        info!(
            command = %self.command,
            target = %self.target,
            dir = %self.working_dir.display(),
            "running build"
        );

        let status = Command::new(&self.command)
            .arg(&self.target)
            .current_dir(&self.working_dir)
            .status()?;

        info!(code = ?status.code(), "build finished");
        Ok(status)
    }
}

/// Exit code to report for a finished build, if it failed
pub fn failure_code(status: &ExitStatus) -> Option<u8> {
    if status.success() {
        return None;
    }
    Some(match status.code() {
        Some(code) => u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1),
        None => 1,
    })
}
