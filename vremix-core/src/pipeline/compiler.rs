//! ParameterSet -> PipelineSpec compilation.
//!
//! Compilation is pure and total over in-range input. Out-of-range or
//! non-finite values are rejected rather than clamped, so a record always
//! describes exactly what was applied.

use super::{Operation, PipelineSpec};
use crate::config::{
    DEFAULT_AUDIO_BITRATE_KBPS, DEFAULT_AUDIO_CODEC, DEFAULT_CRF, DEFAULT_VIDEO_BITRATE_KBPS,
    DEFAULT_VIDEO_CODEC, DEFAULT_VIDEO_PRESET,
};
use crate::error::CoreResult;
use crate::params::{Dimension, ParameterSet};

use serde::{Deserialize, Serialize};

/// Fixed encoder settings the compiled output stages are resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderSettings {
    pub video_codec: String,
    pub preset: String,
    /// CRF used when the ParameterSet carries no encoding variation
    pub crf: u8,
    /// Video bitrate cap before jitter is applied
    pub video_bitrate_kbps: u32,
    pub audio_codec: String,
    pub audio_bitrate_kbps: u32,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_VIDEO_PRESET.to_string(),
            crf: DEFAULT_CRF,
            video_bitrate_kbps: DEFAULT_VIDEO_BITRATE_KBPS,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate_kbps: DEFAULT_AUDIO_BITRATE_KBPS,
        }
    }
}

/// Compiles ParameterSets into PipelineSpecs.
#[derive(Debug, Clone, Default)]
pub struct PipelineCompiler {
    encoder: EncoderSettings,
}

impl PipelineCompiler {
    #[must_use]
    pub fn new(encoder: EncoderSettings) -> Self {
        Self { encoder }
    }

    #[must_use]
    pub fn encoder(&self) -> &EncoderSettings {
        &self.encoder
    }

    /// Compiles `params` into an ordered pipeline.
    ///
    /// # Errors
    ///
    /// * `MissingDimension` - a dimension of the table is absent
    /// * `ParameterOutOfRange` - a value lies outside its bounds or is not finite
    pub fn compile(&self, params: &ParameterSet) -> CoreResult<PipelineSpec> {
        let value = |dimension: Dimension| -> CoreResult<f64> {
            dimension.spec().check(params.require(dimension)?)
        };
        let is_neutral = |dimension: Dimension, v: f64| dimension.spec().is_neutral(v);

        let zoom = value(Dimension::ZoomFactor)?;
        let speed = value(Dimension::PlaybackSpeed)?;
        let saturation = value(Dimension::Saturation)?;
        let brightness = value(Dimension::Brightness)?;
        let contrast = value(Dimension::Contrast)?;
        let volume = value(Dimension::Volume)?;
        let hue = value(Dimension::HueShift)?;
        let noise = value(Dimension::Noise)?;
        let sharpness = value(Dimension::Sharpness)?;
        if let Some(encoding) = params.encoding() {
            encoding.validate()?;
        }

        let mut pipeline = PipelineSpec::default();

        // Geometry
        pipeline.push(Operation::Zoom { factor: zoom });

        // Color
        if !(is_neutral(Dimension::Brightness, brightness)
            && is_neutral(Dimension::Contrast, contrast)
            && is_neutral(Dimension::Saturation, saturation))
        {
            pipeline.push(Operation::ColorBalance {
                brightness,
                contrast,
                saturation,
            });
        }
        if !is_neutral(Dimension::HueShift, hue) {
            pipeline.push(Operation::HueRotate { degrees: hue });
        }

        // Quality
        if !is_neutral(Dimension::Noise, noise) {
            pipeline.push(Operation::Noise {
                strength: noise_strength(noise),
            });
        }
        if !is_neutral(Dimension::Sharpness, sharpness) {
            pipeline.push(Operation::Sharpen {
                amount: round_to(sharpness - 1.0, 2),
            });
        }

        // Timing: both streams or neither
        if !is_neutral(Dimension::PlaybackSpeed, speed) {
            pipeline.push(Operation::VideoTimeScale { factor: speed });
            pipeline.push(Operation::AudioTimeScale { factor: speed });
        }

        // Level
        if !is_neutral(Dimension::Volume, volume) {
            pipeline.push(Operation::Gain { factor: volume });
        }

        // Variation
        let mut crf = self.encoder.crf;
        let mut max_bitrate_kbps = self.encoder.video_bitrate_kbps;
        if let Some(encoding) = params.encoding() {
            if encoding.frame_blend > 0.0 {
                pipeline.push(Operation::FrameBlend {
                    weight: encoding.frame_blend,
                });
            }
            crf = encoding.crf;
            let jittered = f64::from(self.encoder.video_bitrate_kbps) * encoding.bitrate_factor;
            max_bitrate_kbps = jittered.round() as u32;
        }

        // Output
        pipeline.push(Operation::VideoEncode {
            codec: self.encoder.video_codec.clone(),
            preset: self.encoder.preset.clone(),
            crf,
            max_bitrate_kbps,
        });
        pipeline.push(Operation::AudioEncode {
            codec: self.encoder.audio_codec.clone(),
            bitrate_kbps: self.encoder.audio_bitrate_kbps,
        });
        pipeline.push(Operation::StripMetadata);
        pipeline.push(Operation::FastStart);

        log::debug!(
            "Compiled pipeline: {}",
            pipeline
                .stages()
                .iter()
                .map(|s| s.operation.id())
                .collect::<Vec<_>>()
                .join(" -> ")
        );
        Ok(pipeline)
    }
}

/// ffmpeg noise strength for an intensity: hundredths rounded up, so any
/// non-zero intensity yields at least strength 1.
fn noise_strength(noise: f64) -> u32 {
    // Trim representation error so 0.01 * 100 stays 1
    ((noise * 100.0 - 1e-9).ceil() as u32).max(1)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
