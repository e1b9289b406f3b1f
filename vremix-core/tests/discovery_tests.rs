// vremix-core/tests/discovery_tests.rs

use std::fs::{self, File};
use tempfile::tempdir;
use vremix_core::discovery::find_processable_files;
use vremix_core::error::CoreError;

#[test]
fn test_find_processable_files() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input_dir = dir.path();

    File::create(input_dir.join("b_clip.mp4"))?;
    File::create(input_dir.join("a_clip.MOV"))?; // Case insensitive
    File::create(input_dir.join("c_clip.webm"))?;
    File::create(input_dir.join("d_clip.avi"))?;
    File::create(input_dir.join("e_clip.mkv"))?;
    File::create(input_dir.join("notes.txt"))?;
    File::create(input_dir.join("cover.jpg"))?;
    fs::create_dir(input_dir.join("nested.mp4"))?; // Directory with a media-like name
    fs::create_dir(input_dir.join("subdir"))?;
    File::create(input_dir.join("subdir").join("deep.mp4"))?; // Not searched

    let files = find_processable_files(input_dir)?;
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(
        names,
        vec!["a_clip.MOV", "b_clip.mp4", "c_clip.webm", "d_clip.avi", "e_clip.mkv"]
    );
    Ok(())
}

#[test]
fn test_find_processable_files_empty() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    File::create(dir.path().join("readme.md"))?;

    match find_processable_files(dir.path()) {
        Err(CoreError::NoFilesFound) => {}
        other => panic!("Expected NoFilesFound, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_find_processable_files_missing_dir() {
    let result = find_processable_files(std::path::Path::new("/nonexistent/vremix/input"));
    assert!(matches!(result, Err(CoreError::Io(_))));
}
