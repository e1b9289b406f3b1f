//! FFprobe integration for metadata inspection.
//!
//! Lists the container and stream tags that could still identify a file
//! after remixing. ffprobe is run with JSON output and parsed through
//! `serde_json::Value`, since tag sets differ per container.

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};

use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::process::Command;

/// Technical tags that carry no information about the source.
const TECHNICAL_TAGS: [&str; 7] = [
    "major_brand",
    "minor_version",
    "compatible_brands",
    "handler_name",
    "vendor_id",
    "language",
    "duration",
];

/// A non-empty tag still present in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResidualTag {
    /// `format` for container tags, `stream:<index>` for stream tags
    pub scope: String,
    pub key: String,
    pub value: String,
}

/// Trait for inspecting the metadata of a media file.
pub trait FfprobeExecutor: Send + Sync {
    /// Returns every identifying tag left in `path`.
    fn identifying_tags(&self, path: &Path) -> CoreResult<Vec<ResidualTag>>;
}

/// Runs the `ffprobe` binary found on PATH.
#[derive(Debug, Clone, Default)]
pub struct CommandFfprobeExecutor;

impl CommandFfprobeExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn probe(path: &Path) -> CoreResult<Value> {
        if !path.exists() {
            return Err(CoreError::PathError(format!(
                "File not found: {}",
                path.display()
            )));
        }

        let mut cmd = Command::new("ffprobe");
        cmd.args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_entries",
            "format_tags:stream_tags",
        ])
        .arg(path);
        log::debug!("Running: {:?}", cmd);

        let output = cmd
            .output()
            .map_err(|e| command_start_error("ffprobe", e))?;
        if !output.status.success() {
            return Err(command_failed_error(
                "ffprobe",
                output.status,
                String::from_utf8_lossy(&output.stderr),
            ));
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

impl FfprobeExecutor for CommandFfprobeExecutor {
    fn identifying_tags(&self, path: &Path) -> CoreResult<Vec<ResidualTag>> {
        let json = Self::probe(path)?;
        Ok(residual_tags(&json))
    }
}

fn is_identifying(key: &str) -> bool {
    !TECHNICAL_TAGS
        .iter()
        .any(|technical| key.eq_ignore_ascii_case(technical))
}

fn collect_tags(scope: &str, tags: Option<&Value>, out: &mut Vec<ResidualTag>) {
    let Some(Value::Object(tags)) = tags else {
        return;
    };
    for (key, value) in tags {
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if value.trim().is_empty() || !is_identifying(key) {
            continue;
        }
        out.push(ResidualTag {
            scope: scope.to_string(),
            key: key.clone(),
            value,
        });
    }
}

/// Extracts identifying tags from ffprobe's JSON output.
#[must_use]
pub fn residual_tags(json: &Value) -> Vec<ResidualTag> {
    let mut tags = Vec::new();
    collect_tags("format", json.pointer("/format/tags"), &mut tags);
    if let Some(Value::Array(streams)) = json.get("streams") {
        for (index, stream) in streams.iter().enumerate() {
            collect_tags(&format!("stream:{index}"), stream.get("tags"), &mut tags);
        }
    }
    tags
}
