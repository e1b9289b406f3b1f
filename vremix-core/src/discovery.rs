//! File discovery module for finding video files to remix.
//!
//! Searches the top level of a directory (no recursion) for files with a
//! supported media extension, compared case-insensitively.

use crate::error::{CoreError, CoreResult};

use std::path::{Path, PathBuf};

/// Extensions accepted as remix inputs.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["mp4", "avi", "mov", "mkv", "webm"];

/// Checks if the given path is an existing file with a supported extension.
#[must_use]
pub fn is_supported_media_file(path: &Path) -> bool {
    path.is_file() && has_supported_extension(path)
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Finds media files eligible for remixing in the specified directory.
///
/// # Arguments
///
/// * `input_dir` - The directory to search
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Discovered files, sorted by path
/// * `Err(CoreError::Io)` - If the directory cannot be read
/// * `Err(CoreError::NoFilesFound)` - If no media files are found
///
/// # Examples
///
/// ```rust,no_run
/// use vremix_core::find_processable_files;
/// use std::path::Path;
///
/// match find_processable_files(Path::new("/path/to/videos")) {
///     Ok(files) => println!("Found {} video files", files.len()),
///     Err(e) => println!("Error finding video files: {}", e),
/// }
/// ```
pub fn find_processable_files(input_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let read_dir = std::fs::read_dir(input_dir)?;
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            is_supported_media_file(&path).then_some(path)
        })
        .collect();

    if files.is_empty() {
        return Err(CoreError::NoFilesFound);
    }
    // read_dir order is platform dependent; seeded batches need a stable order
    files.sort();
    log::debug!("Discovered {} media files in {}", files.len(), input_dir.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_matching_is_case_insensitive() {
        assert!(has_supported_extension(Path::new("a.MP4")));
        assert!(has_supported_extension(Path::new("a.WebM")));
        assert!(has_supported_extension(Path::new("a.mov")));
        assert!(!has_supported_extension(Path::new("a.txt")));
        assert!(!has_supported_extension(Path::new("mp4")));
    }
}
