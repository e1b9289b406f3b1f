//! Configuration structures and constants for the vremix-core library.
//!
//! This module provides the configuration for a remix run: where outputs go,
//! how many files are processed concurrently, the fixed encoder settings the
//! compiled pipelines resolve against, and which optional stages are used.

mod builder;

use crate::error::{CoreError, CoreResult};
use crate::pipeline::EncoderSettings;
use crate::sampler::SamplerOptions;

use std::path::PathBuf;

pub use builder::CoreConfigBuilder;

// Default constants

/// Video encoder used for every remix.
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";

/// x264 speed preset.
pub const DEFAULT_VIDEO_PRESET: &str = "medium";

/// CRF used when no encoding variation is sampled.
/// Range: 0-51, lower is higher quality.
pub const DEFAULT_CRF: u8 = 22;

/// Video bitrate cap in kbps before bitrate jitter is applied.
pub const DEFAULT_VIDEO_BITRATE_KBPS: u32 = 2000;

pub const DEFAULT_AUDIO_CODEC: &str = "aac";

pub const DEFAULT_AUDIO_BITRATE_KBPS: u32 = 128;

/// Container extension of remixed outputs.
pub const DEFAULT_OUTPUT_EXTENSION: &str = "mp4";

/// Prefix of generated output file names.
pub const OUTPUT_FILE_PREFIX: &str = "remix";

/// Main configuration structure for the vremix-core library.
///
/// All fields have sensible defaults, so only the output directory needs to
/// be set. The builder pattern provides a convenient way to create and
/// validate instances.
///
/// # Examples
///
/// ```rust,no_run
/// use vremix_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .output_dir(PathBuf::from("/path/to/remixed"))
///     .jobs(4)
///     .encoding_variation(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory where remixed files and their run records are written
    pub output_dir: PathBuf,

    /// Allow replacing existing outputs and records
    pub overwrite: bool,

    /// Number of remixes processed concurrently (1 = sequential)
    pub jobs: usize,

    /// Encoder settings the output stages resolve against
    pub encoder: EncoderSettings,

    /// Sample bitrate/crf jitter and frame blending
    pub encoding_variation: bool,

    /// Try exiftool before falling back to ffmpeg for metadata stripping
    pub use_exiftool: bool,

    /// Write a run record next to each output
    pub write_records: bool,

    /// Container extension of remixed outputs
    pub output_extension: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("remixed"),
            overwrite: false,
            jobs: 1,
            encoder: EncoderSettings::default(),
            encoding_variation: true,
            use_exiftool: true,
            write_records: true,
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
        }
    }
}

impl CoreConfig {
    /// Sampler options implied by this configuration.
    #[must_use]
    pub fn sampler_options(&self) -> SamplerOptions {
        SamplerOptions {
            encoding_variation: self.encoding_variation,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CoreResult<()> {
        if self.jobs == 0 {
            return Err(CoreError::Config("jobs must be at least 1".to_string()));
        }
        if self.encoder.video_codec.trim().is_empty() || self.encoder.audio_codec.trim().is_empty()
        {
            return Err(CoreError::Config("codec names must not be empty".to_string()));
        }
        if self.encoder.preset.trim().is_empty() {
            return Err(CoreError::Config("encoder preset must not be empty".to_string()));
        }
        if self.encoder.crf > 51 {
            return Err(CoreError::Config(format!(
                "crf {} is outside 0-51",
                self.encoder.crf
            )));
        }
        if self.encoder.video_bitrate_kbps == 0 || self.encoder.audio_bitrate_kbps == 0 {
            return Err(CoreError::Config("bitrates must be greater than zero".to_string()));
        }
        if self.output_extension.is_empty() || self.output_extension.contains(['.', '/', '\\']) {
            return Err(CoreError::Config(format!(
                "invalid output extension '{}'",
                self.output_extension
            )));
        }
        Ok(())
    }
}
