//! Std adapters for reducebench.
//!
//! In clean-arch terms: this is where we touch the world. The reducer is a
//! child process, its working area is a directory we stage, and its output
//! is a handful of files we read back.

mod stage;
mod workfolder;

pub use reducebench_error::AdapterError;
pub use stage::{StagePlan, apply_stage_plan, remove_dir_if_present, set_executable};
pub use workfolder::{
    CAPTURE_FILE, INITIAL_DIR, capture_paths, read_capture_lines, read_metrics_table,
};

use anyhow::Context;
use std::path::PathBuf;
use std::time::Instant;

/// A command run in the caller's working directory and environment.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub argv: Vec<String>,
}

impl CommandSpec {
    /// `sh <script>`, inheriting cwd and environment.
    pub fn shell_script(script: impl Into<PathBuf>) -> Self {
        Self {
            argv: vec![
                "sh".to_string(),
                script.into().to_string_lossy().into_owned(),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Exit code, or -1 when the child was killed by a signal.
    pub exit_code: i32,
    pub wall_ms: u64,
}

/// Runs a command to completion and reports how it exited.
///
/// Standard streams are inherited; nothing is captured.
pub trait ProcessRunner {
    fn run(&self, spec: &CommandSpec) -> Result<RunOutcome, AdapterError>;
}

#[derive(Debug, Default, Clone)]
pub struct StdProcessRunner;

impl ProcessRunner for StdProcessRunner {
    fn run(&self, spec: &CommandSpec) -> Result<RunOutcome, AdapterError> {
        use std::process::Command;

        if spec.argv.is_empty() {
            return Err(AdapterError::EmptyArgv);
        }

        let start = Instant::now();
        let mut cmd = Command::new(&spec.argv[0]);
        if spec.argv.len() > 1 {
            cmd.args(&spec.argv[1..]);
        }

        let status = cmd
            .status()
            .with_context(|| format!("failed to run {:?}", spec.argv))
            .map_err(AdapterError::Other)?;

        let wall_ms = start.elapsed().as_millis() as u64;

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(sig) = status.signal() {
                tracing::warn!(argv = ?spec.argv, signal = sig, "command terminated by signal");
            }
        }

        Ok(RunOutcome {
            exit_code: status.code().unwrap_or(-1),
            wall_ms,
        })
    }
}
