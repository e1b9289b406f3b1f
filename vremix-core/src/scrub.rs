// ============================================================================
// vremix-core/src/scrub.rs
// ============================================================================
//
// METADATA SCRUBBER: Strip Identifying Metadata From Outputs
//
// Scrubbing tries an enhanced tool (exiftool) first and falls back to an
// ffmpeg stream copy with metadata mapping disabled. A fallback is not
// silent: the outcome says which tool ran and why the enhanced one did not.

use crate::error::{CoreError, CoreResult};
use crate::execution::CancellationFlag;
use crate::external::ffmpeg_builder::build_strip_invocation;
use crate::external::{FfmpegProcess, FfmpegSpawner};
use crate::temp_files;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Something that can strip metadata from a file in place.
pub trait MetadataTool: Send + Sync {
    /// Tool name reported in scrub outcomes.
    fn name(&self) -> &str;

    fn is_available(&self) -> bool;

    /// Removes metadata from `path`, replacing the file.
    ///
    /// A raised `cancel` stops the tool and yields `Cancelled`; `path` is
    /// then left as it was or fully stripped, never half-written.
    fn strip(&self, path: &Path, cancel: &CancellationFlag) -> CoreResult<()>;
}

/// Which tool produced the scrubbed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScrubOutcome {
    /// The enhanced tool stripped the file
    Enhanced { tool: String },
    /// The fallback tool stripped the file because the enhanced one could not
    Degraded { tool: String, reason: String },
}

impl ScrubOutcome {
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, ScrubOutcome::Degraded { .. })
    }

    #[must_use]
    pub fn tool(&self) -> &str {
        match self {
            ScrubOutcome::Enhanced { tool } | ScrubOutcome::Degraded { tool, .. } => tool,
        }
    }
}

/// Strips metadata by stream-copying through ffmpeg into a sibling
/// temporary file, then atomically replacing the original.
#[derive(Debug, Clone)]
pub struct FfmpegMetadataStripper<S> {
    spawner: S,
}

impl<S: FfmpegSpawner> FfmpegMetadataStripper<S> {
    pub fn new(spawner: S) -> Self {
        Self { spawner }
    }
}

impl<S: FfmpegSpawner> MetadataTool for FfmpegMetadataStripper<S> {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn strip(&self, path: &Path, cancel: &CancellationFlag) -> CoreResult<()> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("mp4");
        // Same directory so the final rename stays on one filesystem
        let temp = temp_files::create_temp_file(dir, ".vremix_scrub", extension)?;

        let invocation = build_strip_invocation(path, temp.path());
        let mut process = self.spawner.spawn(&invocation)?;
        let mut errors = Vec::new();
        let events = process.handle_events(|event| {
            if cancel.is_cancelled() {
                return Err(CoreError::Cancelled);
            }
            if let Some(line) = crate::execution::error_line(&event) {
                errors.push(line);
            }
            Ok(())
        });
        if let Err(e) = events {
            let _ = process.kill();
            let _ = process.wait();
            return Err(e);
        }
        let status = process.wait()?;
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        if !status.success() {
            return Err(crate::error::command_failed_error(
                "ffmpeg (metadata strip)",
                status,
                errors.join("; "),
            ));
        }
        if std::fs::metadata(temp.path()).map(|m| m.len()).unwrap_or(0) == 0 {
            return Err(CoreError::OperationFailed(
                "ffmpeg metadata strip produced no output".to_string(),
            ));
        }

        temp.persist(path).map_err(|e| CoreError::Io(e.error))?;
        Ok(())
    }
}

/// Enhanced-then-fallback metadata scrubbing.
pub struct MetadataScrubber<E, F> {
    enhanced: Option<E>,
    fallback: F,
}

impl<E: MetadataTool, F: MetadataTool> MetadataScrubber<E, F> {
    /// `enhanced` is skipped entirely when `None` (e.g. disabled by config).
    pub fn new(enhanced: Option<E>, fallback: F) -> Self {
        Self { enhanced, fallback }
    }

    /// Strips metadata from `path`.
    ///
    /// # Errors
    ///
    /// `ScrubFailed` when the fallback fails too, or when `cancel` is
    /// raised (no fallback is attempted then). The file may still carry
    /// metadata and must not be published.
    pub fn scrub(&self, path: &Path, cancel: &CancellationFlag) -> CoreResult<ScrubOutcome> {
        let failed = |detail: String| CoreError::ScrubFailed {
            path: path.to_path_buf(),
            detail,
        };
        if !path.is_file() {
            return Err(failed("file does not exist".to_string()));
        }
        if cancel.is_cancelled() {
            return Err(failed("cancelled".to_string()));
        }

        let reason = match &self.enhanced {
            None => "enhanced tool disabled".to_string(),
            Some(tool) if !tool.is_available() => format!("{} not available", tool.name()),
            Some(tool) => match tool.strip(path, cancel) {
                Ok(()) => {
                    log::debug!("Stripped metadata from {} with {}", path.display(), tool.name());
                    return Ok(ScrubOutcome::Enhanced {
                        tool: tool.name().to_string(),
                    });
                }
                Err(CoreError::Cancelled) => return Err(failed("cancelled".to_string())),
                Err(e) => format!("{} failed: {}", tool.name(), e),
            },
        };
        if cancel.is_cancelled() {
            return Err(failed("cancelled".to_string()));
        }

        log::warn!(
            "Metadata scrub of {} degraded to {}: {}",
            path.display(),
            self.fallback.name(),
            reason
        );
        match self.fallback.strip(path, cancel) {
            Ok(()) => Ok(ScrubOutcome::Degraded {
                tool: self.fallback.name().to_string(),
                reason,
            }),
            Err(CoreError::Cancelled) => Err(failed("cancelled".to_string())),
            Err(e) => Err(failed(format!("{reason}; {} failed: {e}", self.fallback.name()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::{
        MOCK_METADATA_MARKER, MockFfmpegSpawner, MockMetadataTool, MockOutcome, has_mock_metadata,
    };
    use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
    use tempfile::TempDir;

    fn media_file(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("out.mp4");
        std::fs::write(&path, format!("frames{MOCK_METADATA_MARKER}frames")).unwrap();
        path
    }

    #[test]
    fn test_enhanced_tool_used_when_available() {
        let dir = tempfile::tempdir().unwrap();
        let path = media_file(&dir);
        let exiftool = MockMetadataTool::working("exiftool");
        let fallback = MockMetadataTool::working("ffmpeg");
        let scrubber = MetadataScrubber::new(Some(exiftool.clone()), fallback.clone());

        let outcome = scrubber.scrub(&path, &CancellationFlag::new()).unwrap();
        assert_eq!(outcome, ScrubOutcome::Enhanced { tool: "exiftool".to_string() });
        assert_eq!(exiftool.calls().len(), 1);
        assert!(fallback.calls().is_empty());
        assert!(!has_mock_metadata(&path).unwrap());
    }

    #[test]
    fn test_unavailable_enhanced_tool_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let path = media_file(&dir);
        let scrubber = MetadataScrubber::new(
            Some(MockMetadataTool::unavailable("exiftool")),
            MockMetadataTool::working("ffmpeg"),
        );

        match scrubber.scrub(&path, &CancellationFlag::new()).unwrap() {
            ScrubOutcome::Degraded { tool, reason } => {
                assert_eq!(tool, "ffmpeg");
                assert!(reason.contains("not available"), "{reason}");
            }
            other => panic!("expected degraded outcome, got {other:?}"),
        }
        assert!(!has_mock_metadata(&path).unwrap());
    }

    #[test]
    fn test_failing_enhanced_tool_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let path = media_file(&dir);
        let scrubber = MetadataScrubber::new(
            Some(MockMetadataTool::failing("exiftool")),
            MockMetadataTool::working("ffmpeg"),
        );
        let outcome = scrubber.scrub(&path, &CancellationFlag::new()).unwrap();
        assert!(outcome.is_degraded());
        assert_eq!(outcome.tool(), "ffmpeg");
    }

    #[test]
    fn test_both_tools_failing_is_scrub_failed() {
        let dir = tempfile::tempdir().unwrap();
        let path = media_file(&dir);
        let scrubber = MetadataScrubber::new(
            Some(MockMetadataTool::failing("exiftool")),
            MockMetadataTool::failing("ffmpeg"),
        );
        assert!(matches!(
            scrubber.scrub(&path, &CancellationFlag::new()),
            Err(CoreError::ScrubFailed { .. })
        ));
    }

    #[test]
    fn test_scrub_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = media_file(&dir);
        let scrubber = MetadataScrubber::new(
            Some(MockMetadataTool::working("exiftool")),
            MockMetadataTool::working("ffmpeg"),
        );
        scrubber.scrub(&path, &CancellationFlag::new()).unwrap();
        let first = std::fs::read(&path).unwrap();
        scrubber.scrub(&path, &CancellationFlag::new()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), first);
        assert!(!has_mock_metadata(&path).unwrap());
    }

    #[test]
    fn test_ffmpeg_stripper_replaces_file_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = media_file(&dir);
        let spawner = MockFfmpegSpawner::succeeding();
        let stripper = FfmpegMetadataStripper::new(spawner.clone());

        stripper.strip(&path, &CancellationFlag::new()).unwrap();
        assert!(!has_mock_metadata(&path).unwrap());
        let calls = spawner.get_received_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].iter().any(|a| a == "copy"));
        // No temporary files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_ffmpeg_stripper_failure_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = media_file(&dir);
        let spawner = MockFfmpegSpawner::new();
        spawner.set_default(MockOutcome::ExitError { events: Vec::new(), exit_code: 1 });
        let stripper = FfmpegMetadataStripper::new(spawner);

        assert!(stripper.strip(&path, &CancellationFlag::new()).is_err());
        assert!(has_mock_metadata(&path).unwrap());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_file_is_scrub_failed() {
        let scrubber = MetadataScrubber::new(
            None::<MockMetadataTool>,
            MockMetadataTool::working("ffmpeg"),
        );
        assert!(matches!(
            scrubber.scrub(Path::new("/nonexistent/out.mp4"), &CancellationFlag::new()),
            Err(CoreError::ScrubFailed { .. })
        ));
    }

    #[test]
    fn test_cancelled_scrub_runs_no_tool() {
        let dir = tempfile::tempdir().unwrap();
        let path = media_file(&dir);
        let exiftool = MockMetadataTool::working("exiftool");
        let fallback = MockMetadataTool::working("ffmpeg");
        let scrubber = MetadataScrubber::new(Some(exiftool.clone()), fallback.clone());
        let cancel = CancellationFlag::new();
        cancel.cancel();

        match scrubber.scrub(&path, &cancel) {
            Err(CoreError::ScrubFailed { detail, .. }) => assert_eq!(detail, "cancelled"),
            other => panic!("expected cancelled scrub, got {other:?}"),
        }
        assert!(exiftool.calls().is_empty());
        assert!(fallback.calls().is_empty());
    }

    #[test]
    fn test_ffmpeg_stripper_cancel_kills_and_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = media_file(&dir);
        let spawner = MockFfmpegSpawner::new();
        spawner.set_default(MockOutcome::Success {
            events: vec![FfmpegEvent::Log(LogLevel::Info, "size=1kB".to_string())],
            create_output: true,
        });
        let stripper = FfmpegMetadataStripper::new(spawner.clone());
        let cancel = CancellationFlag::new();
        cancel.cancel();

        assert!(matches!(stripper.strip(&path, &cancel), Err(CoreError::Cancelled)));
        assert_eq!(spawner.kill_count(), 1);
        assert!(has_mock_metadata(&path).unwrap());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
