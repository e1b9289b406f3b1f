//! Core library for producing randomized, metadata-free remixes of videos.
//!
//! The engine samples a bounded ParameterSet, compiles it into an ordered,
//! tool-agnostic pipeline, runs that pipeline through ffmpeg, strips
//! identifying metadata from the result and records what was applied.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use vremix_core::config::CoreConfigBuilder;
//! use vremix_core::{BatchParameters, CancellationFlag, RemixEngine, process_videos};
//! use std::path::{Path, PathBuf};
//!
//! let config = CoreConfigBuilder::new()
//!     .output_dir(PathBuf::from("/path/to/remixed"))
//!     .jobs(2)
//!     .build()
//!     .unwrap();
//! let engine = RemixEngine::production(config).unwrap();
//!
//! let files = vremix_core::find_processable_files(Path::new("/path/to/videos")).unwrap();
//! let report = process_videos(
//!     &engine,
//!     &files,
//!     &BatchParameters::Sampled { master_seed: Some(42) },
//!     &CancellationFlag::new(),
//!     |_| {},
//! )
//! .unwrap();
//! println!("{} remixed", report.succeeded().count());
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod execution;
pub mod external;
pub mod params;
pub mod pipeline;
pub mod processing;
pub mod record;
pub mod sampler;
pub mod scrub;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder};
pub use discovery::find_processable_files;
pub use error::{CoreError, CoreResult};
pub use execution::{CancellationFlag, ExecutionResult, RemixExecutor};
pub use params::{Dimension, EncodingVariation, ParameterSet, TransformationSpec};
pub use pipeline::{EncoderSettings, Operation, PipelineCompiler, PipelineSpec, Stage};
pub use processing::{
    BatchParameters, BatchReport, FileReport, FileStatus, ParameterSource, RemixEngine,
    RemixOutcome, process_videos,
};
pub use record::{RunRecord, RunRecorder};
pub use sampler::{ParameterSampler, SamplerOptions};
pub use scrub::{MetadataScrubber, MetadataTool, ScrubOutcome};
pub use utils::{format_bytes, format_duration};
