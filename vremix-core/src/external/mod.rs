// ============================================================================
// vremix-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with External CLI Tools
//
// This module encapsulates interactions with ffmpeg, ffprobe and exiftool.
// Each tool sits behind a trait so the engine can be exercised with the
// mock implementations in `mocks`.
//
// KEY COMPONENTS:
// - FfmpegSpawner / FfmpegProcess: ffmpeg execution (ffmpeg-sidecar)
// - ffmpeg_builder: PipelineSpec -> ffmpeg arguments
// - FfprobeExecutor: residual metadata inspection
// - ExiftoolStripper: enhanced metadata stripping
// - Dependency checking

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// exiftool metadata stripping
pub mod exiftool;

/// ffmpeg argument building from compiled pipelines
pub mod ffmpeg_builder;

/// Traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Traits and implementations for executing ffprobe commands
pub mod ffprobe_executor;

/// Mock tools for tests and dry runs
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use exiftool::ExiftoolStripper;
pub use ffmpeg_builder::{build_remix_invocation, build_strip_invocation};
pub use ffmpeg_executor::{
    FfmpegInvocation, FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner,
};
pub use ffprobe_executor::{CommandFfprobeExecutor, FfprobeExecutor, ResidualTag};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `cmd_name version_arg` with output discarded. Only a failure to
/// start the process counts as missing; the exit status is ignored.
///
/// # Returns
///
/// * `Ok(())` - If the command could be started
/// * `Err(CoreError::DependencyNotFound)` - If the command is not found
/// * `Err(CoreError::CommandStart)` - If the command exists but fails to start
pub fn check_dependency(cmd_name: &str, version_arg: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg(version_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}

/// Verifies that ffmpeg can be started. Required before any remix.
pub fn check_ffmpeg() -> CoreResult<()> {
    check_dependency("ffmpeg", "-version")
}
