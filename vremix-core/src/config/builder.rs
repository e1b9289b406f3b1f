// ============================================================================
// vremix-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// This module implements the builder pattern for the CoreConfig structure,
// providing a fluent API with defaults. `build` validates the result instead
// of panicking on bad input.

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::CoreConfig;
use crate::error::CoreResult;
use crate::pipeline::EncoderSettings;

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use vremix_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .output_dir(PathBuf::from("/tmp/remixed"))
///     .jobs(2)
///     .overwrite(false)
///     .use_exiftool(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.jobs, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new CoreConfigBuilder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory where remixed files are written.
    pub fn output_dir(mut self, output_dir: PathBuf) -> Self {
        self.config.output_dir = output_dir;
        self
    }

    /// Allows replacing existing outputs and run records.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.config.overwrite = overwrite;
        self
    }

    /// Sets the number of concurrent remixes.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.config.jobs = jobs;
        self
    }

    /// Replaces the encoder settings.
    pub fn encoder(mut self, encoder: EncoderSettings) -> Self {
        self.config.encoder = encoder;
        self
    }

    /// Sets whether bitrate/crf jitter and frame blending are sampled.
    pub fn encoding_variation(mut self, enabled: bool) -> Self {
        self.config.encoding_variation = enabled;
        self
    }

    /// Sets whether exiftool is tried before the ffmpeg fallback.
    pub fn use_exiftool(mut self, enabled: bool) -> Self {
        self.config.use_exiftool = enabled;
        self
    }

    /// Sets whether run records are written.
    pub fn write_records(mut self, enabled: bool) -> Self {
        self.config.write_records = enabled;
        self
    }

    /// Sets the container extension of outputs (without the dot).
    pub fn output_extension(mut self, extension: &str) -> Self {
        self.config.output_extension = extension.to_string();
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> CoreResult<CoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let config = CoreConfigBuilder::new()
            .output_dir(PathBuf::from("out"))
            .jobs(3)
            .overwrite(true)
            .encoding_variation(false)
            .use_exiftool(false)
            .write_records(false)
            .output_extension("mkv")
            .build()
            .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.jobs, 3);
        assert!(config.overwrite);
        assert!(!config.encoding_variation);
        assert!(!config.use_exiftool);
        assert!(!config.write_records);
        assert_eq!(config.output_extension, "mkv");
    }

    #[test]
    fn test_builder_validates() {
        assert!(CoreConfigBuilder::new().jobs(0).build().is_err());
    }
}
