// vremix-core/src/external/mocks.rs

// --- Mocking Infrastructure ---
//
// Mock ffmpeg and metadata tools. They are thread-safe so batches can run on
// the rayon pool in tests. "Media" files handled by the mocks are plain
// bytes; metadata is modeled by MOCK_METADATA_MARKER being present.

use super::ffmpeg_executor::{FfmpegInvocation, FfmpegProcess, FfmpegSpawner};
use crate::error::{CoreError, CoreResult};
use crate::execution::CancellationFlag;
use crate::scrub::MetadataTool;

use ffmpeg_sidecar::event::FfmpegEvent;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Bytes standing in for identifying metadata inside a mock media file.
pub const MOCK_METADATA_MARKER: &str = "[meta:title=source-clip]";

/// Content written when a mock run has no readable input.
pub const MOCK_OUTPUT_BYTES: &[u8] = b"mock-media-payload";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

fn without_marker(bytes: &[u8]) -> Vec<u8> {
    String::from_utf8_lossy(bytes)
        .replace(MOCK_METADATA_MARKER, "")
        .into_bytes()
}

/// What a mock ffmpeg run does.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Emit events, exit 0, optionally write the output file
    Success {
        events: Vec<FfmpegEvent>,
        create_output: bool,
    },
    /// Emit events and exit with the given code
    ExitError { events: Vec<FfmpegEvent>, exit_code: i32 },
    /// Fail to start, as if ffmpeg were not installed
    SpawnError,
}

/// Mock implementation of FfmpegProcess.
pub struct MockFfmpegProcess {
    events: Vec<FfmpegEvent>,
    exit_status: ExitStatus,
    kills: Arc<AtomicUsize>,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        for event in self.events.drain(..) {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }

    fn kill(&mut self) -> CoreResult<()> {
        self.kills.fetch_add(1, Ordering::SeqCst);
        self.exit_status = exit_status(137);
        Ok(())
    }
}

struct MockFfmpegExpectation {
    arg_pattern: String,
    outcome: MockOutcome,
}

/// Mock implementation of FfmpegSpawner.
///
/// Expectations are matched by substring against the arguments and
/// consumed in insertion order; unmatched calls use the default outcome.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Arc<Mutex<Vec<MockFfmpegExpectation>>>,
    default_outcome: Arc<Mutex<Option<MockOutcome>>>,
    received_calls: Arc<Mutex<Vec<Vec<String>>>>,
    kills: Arc<AtomicUsize>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawner whose every run succeeds and writes its output.
    pub fn succeeding() -> Self {
        let spawner = Self::new();
        spawner.set_default(MockOutcome::Success {
            events: Vec::new(),
            create_output: true,
        });
        spawner
    }

    pub fn set_default(&self, outcome: MockOutcome) {
        *lock(&self.default_outcome) = Some(outcome);
    }

    pub fn add_expectation(&self, arg_pattern: &str, outcome: MockOutcome) {
        lock(&self.expectations).push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            outcome,
        });
    }

    pub fn add_success_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        create_output: bool,
    ) {
        self.add_expectation(
            arg_pattern,
            MockOutcome::Success {
                events,
                create_output,
            },
        );
    }

    pub fn add_exit_error_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        exit_code: i32,
    ) {
        self.add_expectation(arg_pattern, MockOutcome::ExitError { events, exit_code });
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str) {
        self.add_expectation(arg_pattern, MockOutcome::SpawnError);
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        lock(&self.received_calls).clone()
    }

    /// Number of processes killed through `FfmpegProcess::kill`.
    pub fn kill_count(&self) -> usize {
        self.kills.load(Ordering::SeqCst)
    }

    fn write_output(args: &[String]) {
        let Some(output) = args.last().map(PathBuf::from) else {
            log::warn!("MockFfmpegSpawner couldn't find output path in args");
            return;
        };
        let content = args
            .iter()
            .position(|a| a == "-i")
            .and_then(|i| args.get(i + 1))
            .and_then(|input| std::fs::read(input).ok())
            .map(|bytes| without_marker(&bytes))
            .unwrap_or_else(|| MOCK_OUTPUT_BYTES.to_vec());

        if let Some(parent) = output.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match std::fs::write(&output, content) {
            Ok(()) => log::debug!("MockFfmpegSpawner wrote {}", output.display()),
            Err(e) => log::error!("MockFfmpegSpawner failed to write {}: {}", output.display(), e),
        }
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, invocation: &FfmpegInvocation) -> CoreResult<Self::Process> {
        let args = invocation.args().to_vec();
        lock(&self.received_calls).push(args.clone());

        let matched = {
            let mut expectations = lock(&self.expectations);
            expectations
                .iter()
                .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)))
                .map(|index| expectations.remove(index).outcome)
        };
        let outcome = match matched.or_else(|| lock(&self.default_outcome).clone()) {
            Some(outcome) => outcome,
            None => {
                log::error!("MockFfmpegSpawner: No expectation found for args: {:?}", args);
                return Err(CoreError::OperationFailed(format!(
                    "MockFfmpegSpawner: no expectation for {}",
                    invocation.display()
                )));
            }
        };

        match outcome {
            MockOutcome::Success {
                events,
                create_output,
            } => {
                if create_output {
                    Self::write_output(&args);
                }
                Ok(MockFfmpegProcess {
                    events,
                    exit_status: exit_status(0),
                    kills: Arc::clone(&self.kills),
                })
            }
            MockOutcome::ExitError { events, exit_code } => Ok(MockFfmpegProcess {
                events,
                exit_status: exit_status(exit_code),
                kills: Arc::clone(&self.kills),
            }),
            MockOutcome::SpawnError => Err(CoreError::CommandStart(
                "ffmpeg (mock)".to_string(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "ffmpeg not found"),
            )),
        }
    }
}

/// Mock metadata tool that removes [`MOCK_METADATA_MARKER`] from files.
#[derive(Clone)]
pub struct MockMetadataTool {
    name: String,
    available: bool,
    fail: bool,
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockMetadataTool {
    /// An available tool whose strips succeed.
    pub fn working(name: &str) -> Self {
        Self {
            name: name.to_string(),
            available: true,
            fail: false,
            calls: Arc::default(),
        }
    }

    /// A tool that reports itself as not installed.
    pub fn unavailable(name: &str) -> Self {
        Self {
            available: false,
            ..Self::working(name)
        }
    }

    /// An available tool whose strips fail.
    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::working(name)
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        lock(&self.calls).clone()
    }
}

impl MetadataTool for MockMetadataTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn strip(&self, path: &Path, cancel: &CancellationFlag) -> CoreResult<()> {
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        lock(&self.calls).push(path.to_path_buf());
        if self.fail {
            return Err(CoreError::OperationFailed(format!(
                "{} failed on {}",
                self.name,
                path.display()
            )));
        }
        let bytes = std::fs::read(path)?;
        std::fs::write(path, without_marker(&bytes))?;
        Ok(())
    }
}

/// True when a mock media file still carries metadata.
pub fn has_mock_metadata(path: &Path) -> CoreResult<bool> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).contains(MOCK_METADATA_MARKER))
}
