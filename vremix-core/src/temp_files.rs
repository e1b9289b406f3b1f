//! Temporary file management and output name reservation.
//!
//! Temporary files lean on the tempfile crate so they are cleaned up via
//! Drop even on error paths. Output names are reserved by creating the file
//! with `create_new`, which makes concurrent remixes collision-free.

use crate::config::OUTPUT_FILE_PREFIX;
use crate::error::{CoreError, CoreResult};

use chrono::Local;
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::{Builder as TempFileBuilder, NamedTempFile};

/// Attempts before giving up on finding a free output name.
const MAX_RESERVE_ATTEMPTS: usize = 16;

/// Creates a temporary file with prefix and extension. Auto-deleted when dropped.
pub fn create_temp_file(dir: &Path, prefix: &str, extension: &str) -> CoreResult<NamedTempFile> {
    std::fs::create_dir_all(dir)?;
    let temp_file = TempFileBuilder::new()
        .prefix(&format!("{prefix}_"))
        .suffix(&format!(".{extension}"))
        .tempfile_in(dir)?;

    Ok(temp_file)
}

fn random_suffix(len: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Builds a candidate output name: `remix_<YYYYmmdd_HHMMSS>_<6 alnum>.<ext>`.
#[must_use]
pub fn output_file_name(extension: &str) -> String {
    format!(
        "{OUTPUT_FILE_PREFIX}_{}_{}.{extension}",
        Local::now().format("%Y%m%d_%H%M%S"),
        random_suffix(6)
    )
}

/// Claims `candidate` by creating it.
///
/// Without `overwrite` an existing file is never reused and the call fails
/// with `OutputExists`.
pub fn reserve_candidate(candidate: &Path, overwrite: bool) -> CoreResult<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    match options.open(candidate) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            Err(CoreError::OutputExists(candidate.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Reserves a fresh output path inside `dir` by creating an empty file.
///
/// The empty placeholder is later overwritten by ffmpeg (`-y`). When
/// `overwrite` is false an existing name is never reused; with `overwrite`
/// set the first candidate is taken even if a file of that name exists.
///
/// # Errors
///
/// `OutputExists` with the last candidate when every attempt collided.
pub fn reserve_output_path(dir: &Path, extension: &str, overwrite: bool) -> CoreResult<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let mut last_err = None;
    for _ in 0..MAX_RESERVE_ATTEMPTS {
        let candidate = dir.join(output_file_name(extension));
        match reserve_candidate(&candidate, overwrite) {
            Ok(()) => {
                log::debug!("Reserved output path {}", candidate.display());
                return Ok(candidate);
            }
            Err(e @ CoreError::OutputExists(_)) => {
                log::debug!("Output name {} taken, retrying", candidate.display());
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| {
        CoreError::OperationFailed(format!(
            "Could not reserve a unique output name in {}",
            dir.display()
        ))
    }))
}
