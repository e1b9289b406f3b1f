//! Run records: the audit trail of one remix.
//!
//! A record holds everything needed to explain (and replay) an output: the
//! ParameterSet, the compiled pipeline, the seed, the scrub outcome and when
//! it was produced. Records are written once, as pretty JSON, next to the
//! output they describe.

use crate::error::{CoreError, CoreResult};
use crate::params::ParameterSet;
use crate::pipeline::PipelineSpec;
use crate::scrub::ScrubOutcome;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Extension appended to the output stem for its record.
pub const RECORD_EXTENSION: &str = "remix.json";

/// Parameters and provenance of one remixed output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// File name of the input (no directory, so records do not leak paths)
    pub input: String,
    pub output: PathBuf,
    pub created_at: DateTime<Utc>,
    /// Per-file seed, absent for replayed or fixed parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub parameters: ParameterSet,
    pub pipeline: PipelineSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrub: Option<ScrubOutcome>,
    pub tool_version: String,
}

impl RunRecord {
    /// Builds a record stamped with the current time and crate version.
    pub fn new(
        input: &Path,
        output: &Path,
        seed: Option<u64>,
        parameters: ParameterSet,
        pipeline: PipelineSpec,
        scrub: Option<ScrubOutcome>,
    ) -> CoreResult<Self> {
        Ok(Self {
            input: crate::utils::get_filename_safe(input)?,
            output: output.to_path_buf(),
            created_at: Utc::now(),
            seed,
            parameters,
            pipeline,
            scrub,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}

/// Path of the record describing `output`: `<stem>.remix.json`.
#[must_use]
pub fn record_path_for(output: &Path) -> PathBuf {
    output.with_extension(RECORD_EXTENSION)
}

/// Writes and reads run records.
#[derive(Debug, Clone, Default)]
pub struct RunRecorder {
    overwrite: bool,
}

impl RunRecorder {
    #[must_use]
    pub fn new(overwrite: bool) -> Self {
        Self { overwrite }
    }

    /// Writes `record` next to its output and returns the record path.
    ///
    /// # Errors
    ///
    /// `RecordWrite` when the record exists (and overwrite is off) or
    /// cannot be written.
    pub fn record(&self, record: &RunRecord) -> CoreResult<PathBuf> {
        let path = record_path_for(&record.output);
        let record_err = |detail: String| CoreError::RecordWrite {
            path: path.clone(),
            detail,
        };

        let json = serde_json::to_string_pretty(record).map_err(|e| record_err(e.to_string()))?;

        let mut options = OpenOptions::new();
        options.write(true);
        if self.overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        let mut file = options.open(&path).map_err(|e| {
            if e.kind() == ErrorKind::AlreadyExists {
                record_err("record already exists".to_string())
            } else {
                record_err(e.to_string())
            }
        })?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.write_all(b"\n"))
            .map_err(|e| record_err(e.to_string()))?;

        log::debug!("Wrote run record {}", path.display());
        Ok(path)
    }

    /// Loads a record back from disk.
    pub fn read(path: &Path) -> CoreResult<RunRecord> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
