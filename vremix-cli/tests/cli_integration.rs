use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn vremix_cmd() -> Command {
    Command::cargo_bin("vremix").expect("Failed to find vremix binary")
}

#[test]
fn test_params_is_deterministic_for_a_seed() -> Result<(), Box<dyn Error>> {
    let first = vremix_cmd().args(["params", "--seed", "42"]).output()?;
    let second = vremix_cmd().args(["params", "--seed", "42"]).output()?;

    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    let document: serde_json::Value = serde_json::from_slice(&first.stdout)?;
    assert_eq!(document["seed"], 42);
    assert!(document["parameters"].is_object());
    Ok(())
}

#[test]
fn test_params_differs_between_seeds() -> Result<(), Box<dyn Error>> {
    let a = vremix_cmd().args(["params", "--seed", "1"]).output()?;
    let b = vremix_cmd().args(["params", "--seed", "2"]).output()?;
    assert_ne!(a.stdout, b.stdout);
    Ok(())
}

#[test]
fn test_remix_non_existent_input() -> Result<(), Box<dyn Error>> {
    let output_dir = tempdir()?;

    vremix_cmd()
        .args(["remix", "--input", "surely/this/does/not/exist/input.mp4", "--output"])
        .arg(output_dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Invalid input path"));
    Ok(())
}

#[test]
fn test_remix_empty_directory_succeeds() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    std::fs::write(input_dir.path().join("notes.txt"), "not a video")?;

    vremix_cmd()
        .arg("remix")
        .arg("-i")
        .arg(input_dir.path())
        .arg("-o")
        .arg(output_dir.path().join("out"))
        .assert()
        .success();
    Ok(())
}

#[test]
fn test_remix_unsupported_file() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    let input = input_dir.path().join("notes.txt");
    std::fs::write(&input, "not a video")?;

    vremix_cmd()
        .arg("remix")
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(output_dir.path())
        .assert()
        .failure()
        .stderr(contains("not a supported video file"));
    Ok(())
}

#[test]
fn test_remix_replay_with_missing_record() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    let input = input_dir.path().join("clip.mp4");
    std::fs::write(&input, "dummy content")?;

    vremix_cmd()
        .arg("remix")
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(output_dir.path())
        .arg("--replay")
        .arg(input_dir.path().join("missing.remix.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Failed to read run record"));
    Ok(())
}

#[test]
fn test_remix_rejects_zero_jobs() {
    vremix_cmd()
        .args(["remix", "-i", "in", "-o", "out", "--jobs", "0"])
        .assert()
        .failure();
}

#[test]
fn test_inspect_missing_file() {
    vremix_cmd()
        .args(["inspect", "surely/this/does/not/exist/clip.mp4"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Failed to inspect"));
}
