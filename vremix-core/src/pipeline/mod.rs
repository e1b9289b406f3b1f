// ============================================================================
// vremix-core/src/pipeline/mod.rs
// ============================================================================
//
// PIPELINE: Tool-Agnostic Description of a Remix
//
// A PipelineSpec is the ordered list of stages compiled from one
// ParameterSet. Stages carry their final numeric arguments; nothing
// downstream of the compiler draws random values.
//
// KEY COMPONENTS:
// - Stage / Operation: one filter or encoder setting with resolved arguments
// - StageKind: video filter, audio filter or encoding setting
// - StagePhase: ordering class (geometry < color < quality < timing ...)
// - PipelineCompiler: ParameterSet -> PipelineSpec (see compiler.rs)

mod compiler;

pub use compiler::{EncoderSettings, PipelineCompiler};

use serde::{Deserialize, Serialize};

/// Which stream (or the encoder) a stage applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    VideoFilter,
    AudioFilter,
    Encoding,
}

/// Ordering class of a stage. Compiled pipelines list stages in
/// non-decreasing phase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagePhase {
    Geometry,
    Color,
    Quality,
    Timing,
    Level,
    Variation,
    Output,
}

/// A single operation with resolved arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Scale up by `factor` and crop back to the original frame size
    Zoom { factor: f64 },
    /// Equalizer balance; all three arguments are always resolved
    ColorBalance {
        brightness: f64,
        contrast: f64,
        saturation: f64,
    },
    HueRotate { degrees: f64 },
    /// Temporal noise, integer strength in ffmpeg's 0-100 scale
    Noise { strength: u32 },
    /// Positive amounts sharpen, negative amounts soften
    Sharpen { amount: f64 },
    /// Playback speed multiplier for the video stream
    VideoTimeScale { factor: f64 },
    /// Pitch-preserving playback speed multiplier for the audio stream
    AudioTimeScale { factor: f64 },
    Gain { factor: f64 },
    /// Blend each frame with its predecessor at the given weight
    FrameBlend { weight: f64 },
    VideoEncode {
        codec: String,
        preset: String,
        crf: u8,
        max_bitrate_kbps: u32,
    },
    AudioEncode { codec: String, bitrate_kbps: u32 },
    StripMetadata,
    FastStart,
}

impl Operation {
    #[must_use]
    pub fn kind(&self) -> StageKind {
        match self {
            Operation::Zoom { .. }
            | Operation::ColorBalance { .. }
            | Operation::HueRotate { .. }
            | Operation::Noise { .. }
            | Operation::Sharpen { .. }
            | Operation::VideoTimeScale { .. }
            | Operation::FrameBlend { .. } => StageKind::VideoFilter,
            Operation::AudioTimeScale { .. } | Operation::Gain { .. } => StageKind::AudioFilter,
            Operation::VideoEncode { .. }
            | Operation::AudioEncode { .. }
            | Operation::StripMetadata
            | Operation::FastStart => StageKind::Encoding,
        }
    }

    #[must_use]
    pub fn phase(&self) -> StagePhase {
        match self {
            Operation::Zoom { .. } => StagePhase::Geometry,
            Operation::ColorBalance { .. } | Operation::HueRotate { .. } => StagePhase::Color,
            Operation::Noise { .. } | Operation::Sharpen { .. } => StagePhase::Quality,
            Operation::VideoTimeScale { .. } | Operation::AudioTimeScale { .. } => {
                StagePhase::Timing
            }
            Operation::Gain { .. } => StagePhase::Level,
            Operation::FrameBlend { .. } => StagePhase::Variation,
            Operation::VideoEncode { .. }
            | Operation::AudioEncode { .. }
            | Operation::StripMetadata
            | Operation::FastStart => StagePhase::Output,
        }
    }

    /// Short identifier used in logs.
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Operation::Zoom { .. } => "zoom",
            Operation::ColorBalance { .. } => "color_balance",
            Operation::HueRotate { .. } => "hue_rotate",
            Operation::Noise { .. } => "noise",
            Operation::Sharpen { .. } => "sharpen",
            Operation::VideoTimeScale { .. } => "video_time_scale",
            Operation::AudioTimeScale { .. } => "audio_time_scale",
            Operation::Gain { .. } => "gain",
            Operation::FrameBlend { .. } => "frame_blend",
            Operation::VideoEncode { .. } => "video_encode",
            Operation::AudioEncode { .. } => "audio_encode",
            Operation::StripMetadata => "strip_metadata",
            Operation::FastStart => "fast_start",
        }
    }
}

/// One entry of a compiled pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub kind: StageKind,
    pub phase: StagePhase,
    #[serde(flatten)]
    pub operation: Operation,
}

impl Stage {
    #[must_use]
    pub fn new(operation: Operation) -> Self {
        Self {
            kind: operation.kind(),
            phase: operation.phase(),
            operation,
        }
    }
}

/// Ordered, tool-agnostic description of the operations for one remix.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineSpec {
    stages: Vec<Stage>,
}

impl PipelineSpec {
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Stages of the given kind, in pipeline order.
    pub fn stages_of(&self, kind: StageKind) -> impl Iterator<Item = &Stage> {
        self.stages.iter().filter(move |s| s.kind == kind)
    }

    /// Filter stages (video and audio), i.e. everything but encoder settings.
    pub fn filter_stages(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter().filter(|s| s.kind != StageKind::Encoding)
    }

    pub(crate) fn push(&mut self, operation: Operation) {
        self.stages.push(Stage::new(operation));
    }

    /// True when phases never decrease along the pipeline.
    #[must_use]
    pub fn is_phase_ordered(&self) -> bool {
        self.stages.windows(2).all(|w| w[0].phase <= w[1].phase)
    }
}
