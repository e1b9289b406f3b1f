//! Single-file remix orchestration.
//!
//! `RemixEngine::remix_file` is the control flow for one input:
//! parameters -> compile -> reserve output -> ffmpeg -> scrub -> record.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::execution::{CancellationFlag, ExecutionResult, RemixExecutor};
use crate::external::{ExiftoolStripper, FfmpegSpawner, SidecarSpawner, check_ffmpeg};
use crate::params::ParameterSet;
use crate::pipeline::{PipelineCompiler, PipelineSpec};
use crate::record::{RunRecord, RunRecorder};
use crate::sampler::ParameterSampler;
use crate::scrub::{FfmpegMetadataStripper, MetadataScrubber, MetadataTool, ScrubOutcome};
use crate::temp_files::reserve_output_path;
use crate::utils::file_size_or_zero;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Where the parameters of one remix come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterSource {
    /// Draw a fresh set from a sampler seeded with `seed`
    Sampled { seed: u64 },
    /// Use the given set as is (replay or caller-provided)
    Fixed(ParameterSet),
}

/// Everything produced by one successful remix.
#[derive(Debug, Clone)]
pub struct RemixOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    /// None when records are disabled or writing the record failed
    pub record_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub parameters: ParameterSet,
    pub pipeline: PipelineSpec,
    pub scrub: ScrubOutcome,
    pub duration: Duration,
    pub input_size: u64,
    pub output_size: u64,
    /// Non-fatal problems, e.g. a run record that could not be written
    pub warnings: Vec<String>,
}

/// The remix engine: sampler, compiler, executor, scrubber and recorder
/// wired together for one configuration.
pub struct RemixEngine<S, E> {
    config: CoreConfig,
    compiler: PipelineCompiler,
    executor: RemixExecutor<S>,
    scrubber: MetadataScrubber<E, FfmpegMetadataStripper<S>>,
    recorder: RunRecorder,
}

impl RemixEngine<SidecarSpawner, ExiftoolStripper> {
    /// Engine backed by the real ffmpeg and exiftool binaries.
    ///
    /// # Errors
    ///
    /// `DependencyNotFound` if ffmpeg is not installed, `Config` if the
    /// configuration is invalid.
    pub fn production(config: CoreConfig) -> CoreResult<Self> {
        check_ffmpeg()?;
        Self::new(config, SidecarSpawner, ExiftoolStripper::default())
    }
}

impl<S, E> RemixEngine<S, E>
where
    S: FfmpegSpawner + Clone,
    E: MetadataTool,
{
    pub fn new(config: CoreConfig, spawner: S, enhanced_scrubber: E) -> CoreResult<Self> {
        config.validate()?;
        let enhanced = config.use_exiftool.then_some(enhanced_scrubber);
        Ok(Self {
            compiler: PipelineCompiler::new(config.encoder.clone()),
            executor: RemixExecutor::new(spawner.clone()),
            scrubber: MetadataScrubber::new(enhanced, FfmpegMetadataStripper::new(spawner)),
            recorder: RunRecorder::new(config.overwrite),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Resolves a parameter source into a concrete set.
    pub fn parameters(&self, source: &ParameterSource) -> ParameterSet {
        match source {
            ParameterSource::Sampled { seed } => ParameterSampler::seeded(*seed)
                .with_options(self.config.sampler_options())
                .sample(),
            ParameterSource::Fixed(set) => set.clone(),
        }
    }

    /// Remixes one input into a freshly named output.
    ///
    /// # Errors
    ///
    /// * `Cancelled` - cancellation was requested before the remix started
    /// * `MissingDimension` / `ParameterOutOfRange` - invalid fixed parameters
    /// * `ExecutionFailed` - ffmpeg failed; no output is left behind
    /// * `ScrubFailed` - metadata could not be stripped; the output is deleted
    ///
    /// A run record that cannot be written is reported in
    /// `RemixOutcome::warnings` instead.
    pub fn remix_file(
        &self,
        input: &Path,
        source: &ParameterSource,
        cancel: &CancellationFlag,
    ) -> CoreResult<RemixOutcome> {
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        let start = Instant::now();
        if !input.is_file() {
            return Err(CoreError::ExecutionFailed {
                input: input.to_path_buf(),
                detail: "input file not found".to_string(),
            });
        }

        let seed = match source {
            ParameterSource::Sampled { seed } => Some(*seed),
            ParameterSource::Fixed(_) => None,
        };
        let parameters = self.parameters(source);
        log::debug!(
            "Parameters for {}: {}",
            input.display(),
            serde_json::to_string(&parameters)?
        );
        let pipeline = self.compiler.compile(&parameters)?;

        let output = reserve_output_path(
            &self.config.output_dir,
            &self.config.output_extension,
            self.config.overwrite,
        )?;
        log::info!("Remixing {} -> {}", input.display(), output.display());

        if let ExecutionResult::Failure { detail } =
            self.executor.run(input, &output, &pipeline, cancel)
        {
            return Err(CoreError::ExecutionFailed {
                input: input.to_path_buf(),
                detail,
            });
        }

        let scrub = match self.scrubber.scrub(&output, cancel) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Deleting {}: {}", output.display(), e);
                if let Err(remove_err) = std::fs::remove_file(&output) {
                    log::warn!("Could not delete {}: {}", output.display(), remove_err);
                }
                return Err(e);
            }
        };

        let mut warnings = Vec::new();
        if let ScrubOutcome::Degraded { tool, reason } = &scrub {
            warnings.push(format!("metadata stripped with {tool} ({reason})"));
        }

        let record_path = if self.config.write_records {
            let written = RunRecord::new(
                input,
                &output,
                seed,
                parameters.clone(),
                pipeline.clone(),
                Some(scrub.clone()),
            )
            .and_then(|record| self.recorder.record(&record));
            match written {
                Ok(path) => Some(path),
                Err(e) => {
                    log::warn!("Run record for {} not written: {}", output.display(), e);
                    warnings.push(e.to_string());
                    None
                }
            }
        } else {
            None
        };

        let outcome = RemixOutcome {
            input: input.to_path_buf(),
            input_size: file_size_or_zero(input),
            output_size: file_size_or_zero(&output),
            output,
            record_path,
            seed,
            parameters,
            pipeline,
            scrub,
            duration: start.elapsed(),
            warnings,
        };
        log::info!(
            "Finished {} in {}",
            outcome.output.display(),
            crate::utils::format_duration(outcome.duration)
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfigBuilder;
    use crate::external::mocks::{
        MOCK_METADATA_MARKER, MockFfmpegSpawner, MockMetadataTool, MockOutcome, has_mock_metadata,
    };
    use crate::params::Dimension;
    use crate::record::record_path_for;
    use tempfile::TempDir;

    type MockEngine = RemixEngine<MockFfmpegSpawner, MockMetadataTool>;

    fn setup(spawner: MockFfmpegSpawner, tool: MockMetadataTool) -> (TempDir, PathBuf, MockEngine) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.mov");
        std::fs::write(&input, format!("video{MOCK_METADATA_MARKER}")).unwrap();
        let config = CoreConfigBuilder::new()
            .output_dir(dir.path().join("out"))
            .build()
            .unwrap();
        let engine = RemixEngine::new(config, spawner, tool).unwrap();
        (dir, input, engine)
    }

    fn output_dir_entries(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path().join("out")).map(|d| d.count()).unwrap_or(0)
    }

    #[test]
    fn test_remix_file_end_to_end() {
        let (dir, input, engine) = setup(
            MockFfmpegSpawner::succeeding(),
            MockMetadataTool::working("exiftool"),
        );
        let outcome = engine
            .remix_file(&input, &ParameterSource::Sampled { seed: 5 }, &CancellationFlag::new())
            .unwrap();

        assert!(outcome.output.exists());
        assert!(!has_mock_metadata(&outcome.output).unwrap());
        assert_eq!(outcome.scrub, ScrubOutcome::Enhanced { tool: "exiftool".to_string() });
        assert_eq!(outcome.seed, Some(5));
        assert!(outcome.warnings.is_empty());
        let record = RunRecorder::read(outcome.record_path.as_ref().unwrap()).unwrap();
        assert_eq!(record.parameters, outcome.parameters);
        assert_eq!(record.input, "clip.mov");
        assert_eq!(output_dir_entries(&dir), 2);
        // Input untouched
        assert!(has_mock_metadata(&input).unwrap());
    }

    #[test]
    fn test_same_seed_same_parameters() {
        let (_dir, input, engine) = setup(
            MockFfmpegSpawner::succeeding(),
            MockMetadataTool::working("exiftool"),
        );
        let cancel = CancellationFlag::new();
        let a = engine.remix_file(&input, &ParameterSource::Sampled { seed: 9 }, &cancel).unwrap();
        let b = engine.remix_file(&input, &ParameterSource::Sampled { seed: 9 }, &cancel).unwrap();
        assert_eq!(a.parameters, b.parameters);
        assert_eq!(a.pipeline, b.pipeline);
        assert_ne!(a.output, b.output);
    }

    #[test]
    fn test_execution_failure_leaves_no_output() {
        let spawner = MockFfmpegSpawner::new();
        spawner.set_default(MockOutcome::ExitError { events: Vec::new(), exit_code: 1 });
        let (dir, input, engine) = setup(spawner, MockMetadataTool::working("exiftool"));

        let err = engine
            .remix_file(&input, &ParameterSource::Sampled { seed: 1 }, &CancellationFlag::new())
            .unwrap_err();
        assert!(matches!(err, CoreError::ExecutionFailed { .. }));
        assert_eq!(output_dir_entries(&dir), 0);
    }

    #[test]
    fn test_scrub_failure_deletes_output() {
        let spawner = MockFfmpegSpawner::new();
        // The encode succeeds, the fallback stream copy fails
        spawner.add_success_expectation("-vf", Vec::new(), true);
        spawner.set_default(MockOutcome::ExitError { events: Vec::new(), exit_code: 1 });
        let (dir, input, engine) = setup(spawner, MockMetadataTool::failing("exiftool"));

        let err = engine
            .remix_file(&input, &ParameterSource::Sampled { seed: 2 }, &CancellationFlag::new())
            .unwrap_err();
        assert!(matches!(err, CoreError::ScrubFailed { .. }));
        assert_eq!(output_dir_entries(&dir), 0);
    }

    #[test]
    fn test_degraded_scrub_is_reported() {
        let (_dir, input, engine) = setup(
            MockFfmpegSpawner::succeeding(),
            MockMetadataTool::unavailable("exiftool"),
        );
        let outcome = engine
            .remix_file(&input, &ParameterSource::Sampled { seed: 3 }, &CancellationFlag::new())
            .unwrap();
        assert!(outcome.scrub.is_degraded());
        assert_eq!(outcome.warnings.len(), 1);
        let record = RunRecorder::read(&record_path_for(&outcome.output)).unwrap();
        assert_eq!(record.scrub, Some(outcome.scrub.clone()));
    }

    #[test]
    fn test_fixed_parameters_are_used_verbatim() {
        let (_dir, input, engine) = setup(
            MockFfmpegSpawner::succeeding(),
            MockMetadataTool::working("exiftool"),
        );
        let set = ParameterSampler::seeded(77).sample();
        let outcome = engine
            .remix_file(&input, &ParameterSource::Fixed(set.clone()), &CancellationFlag::new())
            .unwrap();
        assert_eq!(outcome.parameters, set);
        assert_eq!(outcome.seed, None);
    }

    #[test]
    fn test_invalid_fixed_parameters_rejected_before_output() {
        let (dir, input, engine) = setup(
            MockFfmpegSpawner::succeeding(),
            MockMetadataTool::working("exiftool"),
        );
        let set = ParameterSet::from_values([(Dimension::ZoomFactor, 1.00)]);
        let err = engine
            .remix_file(&input, &ParameterSource::Fixed(set), &CancellationFlag::new())
            .unwrap_err();
        assert!(matches!(err, CoreError::ParameterOutOfRange { .. }));
        assert_eq!(output_dir_entries(&dir), 0);
    }

    #[test]
    fn test_cancelled_before_start() {
        let (_dir, input, engine) = setup(
            MockFfmpegSpawner::succeeding(),
            MockMetadataTool::working("exiftool"),
        );
        let cancel = CancellationFlag::new();
        cancel.cancel();
        assert!(matches!(
            engine.remix_file(&input, &ParameterSource::Sampled { seed: 1 }, &cancel),
            Err(CoreError::Cancelled)
        ));
    }
}
