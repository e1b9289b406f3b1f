//! exiftool-backed metadata stripping.

use super::check_dependency;
use crate::error::{
    CoreError, CoreResult, command_failed_error, command_start_error, command_wait_error,
};
use crate::execution::CancellationFlag;
use crate::scrub::MetadataTool;

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

/// How often a running exiftool is checked for exit or cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Strips every writable tag in place with `exiftool -all= -overwrite_original`.
#[derive(Debug, Clone)]
pub struct ExiftoolStripper {
    program: String,
}

impl Default for ExiftoolStripper {
    fn default() -> Self {
        Self::new("exiftool")
    }
}

impl ExiftoolStripper {
    /// Uses the given program name or path instead of `exiftool`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl MetadataTool for ExiftoolStripper {
    fn name(&self) -> &str {
        "exiftool"
    }

    fn is_available(&self) -> bool {
        check_dependency(&self.program, "-ver").is_ok()
    }

    fn strip(&self, path: &Path, cancel: &CancellationFlag) -> CoreResult<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-all=", "-overwrite_original", "-q"])
            .arg(path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        log::debug!("Running: {:?}", cmd);

        let mut child = cmd
            .spawn()
            .map_err(|e| command_start_error(self.program.clone(), e))?;
        let status = loop {
            if cancel.is_cancelled() {
                if let Err(e) = child.kill() {
                    log::warn!("Failed to kill cancelled {}: {}", self.program, e);
                }
                let _ = child.wait();
                return Err(CoreError::Cancelled);
            }
            match child
                .try_wait()
                .map_err(|e| command_wait_error(self.program.clone(), e))?
            {
                Some(status) => break status,
                None => thread::sleep(POLL_INTERVAL),
            }
        };

        if !status.success() {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                let _ = pipe.read_to_string(&mut stderr);
            }
            return Err(command_failed_error(self.program.clone(), status, stderr.trim()));
        }
        Ok(())
    }
}
