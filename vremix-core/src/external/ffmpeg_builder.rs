//! FFmpeg argument building.
//!
//! Translates a compiled [`PipelineSpec`] into ffmpeg arguments. This is the
//! only place that knows ffmpeg filter syntax; the pipeline itself stays
//! tool-agnostic.

use super::ffmpeg_executor::FfmpegInvocation;
use crate::pipeline::{Operation, PipelineSpec, StageKind};

use std::path::Path;

/// Container tags blanked on every encode.
pub const BLANKED_TAGS: [&str; 9] = [
    "title",
    "author",
    "comment",
    "description",
    "synopsis",
    "show",
    "episode_id",
    "network",
    "company",
];

/// Builder for constructing filter chains
#[derive(Debug, Default)]
pub struct FilterChain {
    filters: Vec<String>,
}

impl FilterChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter to the chain; empty filters are ignored
    #[must_use]
    pub fn add_filter(mut self, filter: String) -> Self {
        if !filter.is_empty() {
            self.filters.push(filter);
        }
        self
    }

    /// Builds the filter chain into a single filter string
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(","))
        }
    }
}

/// Renders a filter operation as ffmpeg filter syntax. Encoder settings
/// render to `None`.
#[must_use]
pub fn filter_expression(operation: &Operation) -> Option<String> {
    let expression = match operation {
        Operation::Zoom { factor } => format!(
            "scale=trunc(iw*{factor}/2)*2:trunc(ih*{factor}/2)*2,\
             crop=trunc(iw/{factor}/2)*2:trunc(ih/{factor}/2)*2"
        ),
        Operation::ColorBalance {
            brightness,
            contrast,
            saturation,
        } => format!("eq=brightness={brightness}:contrast={contrast}:saturation={saturation}"),
        Operation::HueRotate { degrees } => format!("hue=h={degrees}"),
        Operation::Noise { strength } => format!("noise=alls={strength}:allf=t"),
        // unsharp blurs for negative amounts
        Operation::Sharpen { amount } => format!("unsharp=5:5:{amount}:5:5:0"),
        Operation::VideoTimeScale { factor } => format!("setpts=PTS/{factor}"),
        Operation::AudioTimeScale { factor } => format!("atempo={factor}"),
        Operation::Gain { factor } => format!("volume={factor}"),
        Operation::FrameBlend { weight } => {
            let previous = (weight * 100.0).round() / 100.0;
            let current = ((1.0 - weight) * 100.0).round() / 100.0;
            format!("tmix=frames=2:weights='{previous} {current}'")
        }
        Operation::VideoEncode { .. }
        | Operation::AudioEncode { .. }
        | Operation::StripMetadata
        | Operation::FastStart => return None,
    };
    Some(expression)
}

fn chain_for(pipeline: &PipelineSpec, kind: StageKind) -> Option<String> {
    pipeline
        .stages_of(kind)
        .filter_map(|stage| filter_expression(&stage.operation))
        .fold(FilterChain::new(), FilterChain::add_filter)
        .build()
}

/// Flags that drop container/stream metadata and make the muxer output
/// reproducible.
fn metadata_strip_args(args: &mut Vec<String>) {
    args.extend(
        [
            "-map_metadata",
            "-1",
            "-map_chapters",
            "-1",
            "-fflags",
            "+bitexact",
            "-flags:v",
            "+bitexact",
            "-flags:a",
            "+bitexact",
        ]
        .map(String::from),
    );
}

/// Builds the full remix invocation for one input.
#[must_use]
pub fn build_remix_invocation(
    input: &Path,
    output: &Path,
    pipeline: &PipelineSpec,
) -> FfmpegInvocation {
    let mut args: Vec<String> = vec![
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
    ];

    if let Some(vf) = chain_for(pipeline, StageKind::VideoFilter) {
        args.push("-vf".to_string());
        args.push(vf);
    }
    if let Some(af) = chain_for(pipeline, StageKind::AudioFilter) {
        args.push("-af".to_string());
        args.push(af);
    }

    for stage in pipeline.stages_of(StageKind::Encoding) {
        match &stage.operation {
            Operation::VideoEncode {
                codec,
                preset,
                crf,
                max_bitrate_kbps,
            } => {
                args.extend([
                    "-c:v".to_string(),
                    codec.clone(),
                    "-preset".to_string(),
                    preset.clone(),
                    "-crf".to_string(),
                    crf.to_string(),
                    "-maxrate".to_string(),
                    format!("{max_bitrate_kbps}k"),
                    "-bufsize".to_string(),
                    format!("{}k", max_bitrate_kbps.saturating_mul(2)),
                ]);
            }
            Operation::AudioEncode {
                codec,
                bitrate_kbps,
            } => {
                args.extend([
                    "-c:a".to_string(),
                    codec.clone(),
                    "-b:a".to_string(),
                    format!("{bitrate_kbps}k"),
                ]);
            }
            Operation::StripMetadata => {
                metadata_strip_args(&mut args);
                for tag in BLANKED_TAGS {
                    args.push("-metadata".to_string());
                    args.push(format!("{tag}="));
                }
            }
            Operation::FastStart => {
                args.push("-movflags".to_string());
                args.push("+faststart".to_string());
            }
            _ => {}
        }
    }

    args.push(output.to_string_lossy().into_owned());
    FfmpegInvocation::new(args)
}

/// Builds a stream-copy invocation that rewrites `input` to `output`
/// without any metadata.
#[must_use]
pub fn build_strip_invocation(input: &Path, output: &Path) -> FfmpegInvocation {
    let mut args: Vec<String> = vec![
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
        "-map".to_string(),
        "0".to_string(),
        "-c".to_string(),
        "copy".to_string(),
    ];
    metadata_strip_args(&mut args);
    args.push(output.to_string_lossy().into_owned());
    FfmpegInvocation::new(args)
}
