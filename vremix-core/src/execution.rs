// ============================================================================
// vremix-core/src/execution.rs
// ============================================================================
//
// EXECUTION ADAPTER: Run One Compiled Pipeline Through ffmpeg
//
// RemixExecutor turns a PipelineSpec into an ffmpeg invocation, spawns it
// through an FfmpegSpawner and classifies the result. It never panics and
// never retries: every problem becomes ExecutionResult::Failure with a
// human-readable detail, and a partial output is removed.
//
// KEY COMPONENTS:
// - CancellationFlag: shared flag checked between ffmpeg events
// - ExecutionResult: Success { output } | Failure { detail }
// - RemixExecutor: spawn, drain events, wait, classify

use crate::error::CoreError;
use crate::external::ffmpeg_builder::build_remix_invocation;
use crate::external::{FfmpegProcess, FfmpegSpawner};
use crate::pipeline::PipelineSpec;

use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel as FfmpegLogLevel};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Error lines kept in a failure detail.
const MAX_ERROR_LINES: usize = 8;

/// Cooperative cancellation shared between the caller and running remixes.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of one ffmpeg run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Success { output: PathBuf },
    Failure { detail: String },
}

impl ExecutionResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    fn failure(detail: impl Into<String>) -> Self {
        ExecutionResult::Failure {
            detail: detail.into(),
        }
    }
}

/// Extracts an error message from an ffmpeg event, if it carries one.
pub(crate) fn error_line(event: &FfmpegEvent) -> Option<String> {
    match event {
        FfmpegEvent::Error(message) if !is_non_critical_ffmpeg_error(message) => {
            Some(message.trim().to_string())
        }
        FfmpegEvent::Log(FfmpegLogLevel::Error | FfmpegLogLevel::Fatal, message) => {
            Some(message.trim().to_string())
        }
        _ => None,
    }
}

/// ffmpeg messages that appear on stderr without indicating a problem.
fn is_non_critical_ffmpeg_error(error: &str) -> bool {
    error.contains("deprecated pixel format")
        || error.contains("No accelerated colorspace conversion")
        || error.contains("automatically inserted filter")
        || error.contains("Timestamps are unset")
        || error.contains("first frame is no keyframe")
}

/// Runs compiled pipelines with ffmpeg.
#[derive(Debug, Clone)]
pub struct RemixExecutor<S> {
    spawner: S,
}

impl<S: FfmpegSpawner> RemixExecutor<S> {
    pub fn new(spawner: S) -> Self {
        Self { spawner }
    }

    /// Remixes `input` into `output` according to `pipeline`.
    ///
    /// The input is only read. On any failure the (possibly partial) output
    /// file is removed.
    pub fn run(
        &self,
        input: &Path,
        output: &Path,
        pipeline: &PipelineSpec,
        cancel: &CancellationFlag,
    ) -> ExecutionResult {
        let result = self.run_inner(input, output, pipeline, cancel);
        if let ExecutionResult::Failure { detail } = &result {
            log::error!("Remix of {} failed: {}", input.display(), detail);
            if output.exists() {
                if let Err(e) = std::fs::remove_file(output) {
                    log::warn!("Could not remove partial output {}: {}", output.display(), e);
                }
            }
        }
        result
    }

    fn run_inner(
        &self,
        input: &Path,
        output: &Path,
        pipeline: &PipelineSpec,
        cancel: &CancellationFlag,
    ) -> ExecutionResult {
        if !input.is_file() {
            return ExecutionResult::failure(format!(
                "input file not found: {}",
                input.display()
            ));
        }
        if cancel.is_cancelled() {
            return ExecutionResult::failure("cancelled before start");
        }

        let invocation = build_remix_invocation(input, output, pipeline);
        log::debug!("ffmpeg command: {}", invocation.display());

        let mut process = match self.spawner.spawn(&invocation) {
            Ok(process) => process,
            Err(e) => return ExecutionResult::failure(format!("could not start ffmpeg: {e}")),
        };

        let mut errors: Vec<String> = Vec::new();
        let events = process.handle_events(|event| {
            if cancel.is_cancelled() {
                return Err(CoreError::Cancelled);
            }
            if let Some(line) = error_line(&event) {
                log::debug!(target: "ffmpeg_log", "{line}");
                errors.push(line);
            }
            Ok(())
        });

        match events {
            Err(CoreError::Cancelled) => {
                if let Err(e) = process.kill() {
                    log::warn!("Failed to kill cancelled ffmpeg: {}", e);
                }
                let _ = process.wait();
                return ExecutionResult::failure("cancelled");
            }
            Err(e) => {
                let _ = process.kill();
                let _ = process.wait();
                return ExecutionResult::failure(format!("ffmpeg event stream failed: {e}"));
            }
            Ok(()) => {}
        }

        let status = match process.wait() {
            Ok(status) => status,
            Err(e) => return ExecutionResult::failure(e.to_string()),
        };
        if cancel.is_cancelled() {
            return ExecutionResult::failure("cancelled");
        }
        if !status.success() {
            let tail = errors
                .iter()
                .rev()
                .take(MAX_ERROR_LINES)
                .rev()
                .cloned()
                .collect::<Vec<_>>()
                .join("; ");
            return ExecutionResult::failure(if tail.is_empty() {
                format!("ffmpeg exited with {status}")
            } else {
                format!("ffmpeg exited with {status}: {tail}")
            });
        }

        match std::fs::metadata(output) {
            Ok(meta) if meta.len() > 0 => ExecutionResult::Success {
                output: output.to_path_buf(),
            },
            _ => ExecutionResult::failure(format!(
                "ffmpeg reported success but {} is missing or empty",
                output.display()
            )),
        }
    }
}
