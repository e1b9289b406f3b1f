//! Implementation of the 'remix' subcommand.
//!
//! Discovers input files, builds the core configuration from the CLI
//! arguments, runs the batch through vremix-core and prints a summary.

use crate::cli::RemixArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::terminal::{self, BatchProgress};

use vremix_core::config::CoreConfigBuilder;
use vremix_core::discovery::is_supported_media_file;
use vremix_core::{
    BatchParameters, BatchReport, CancellationFlag, CoreConfig, CoreError, FileReport,
    FileStatus, ParameterSet, RemixEngine, RunRecorder, format_bytes, format_duration,
    process_videos,
};

use log::{debug, info, warn};
use std::fs;
use std::path::PathBuf;

/// Discovers media files from the input path (file or directory).
pub fn discover_remix_files(args: &RemixArgs) -> CliResult<Vec<PathBuf>> {
    let input_path = args.input_path.canonicalize().map_err(|e| {
        CoreError::PathError(format!(
            "Invalid input path '{}': {}",
            args.input_path.display(),
            e
        ))
    })?;

    let metadata = fs::metadata(&input_path).map_err(|e| {
        CoreError::PathError(format!(
            "Failed to access input path '{}': {}",
            input_path.display(),
            e
        ))
    })?;

    if metadata.is_dir() {
        match vremix_core::find_processable_files(&input_path) {
            Ok(files) => Ok(files),
            Err(CoreError::NoFilesFound) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    } else if metadata.is_file() {
        if is_supported_media_file(&input_path) {
            Ok(vec![input_path])
        } else {
            Err(CoreError::PathError(format!(
                "Input file '{}' is not a supported video file",
                input_path.display()
            )))
        }
    } else {
        Err(CoreError::PathError(format!(
            "Input path '{}' is neither a file nor a directory",
            input_path.display()
        )))
    }
}

/// Creates the CoreConfig from CLI arguments.
pub fn create_core_config(args: &RemixArgs) -> CliResult<CoreConfig> {
    CoreConfigBuilder::new()
        .output_dir(args.output_dir.clone())
        .jobs(usize::from(args.jobs))
        .overwrite(args.overwrite)
        .encoding_variation(!args.no_encoding_variation)
        .use_exiftool(!args.no_exiftool)
        .write_records(!args.no_records)
        .build()
}

/// Chooses sampled or replayed parameters for the batch.
pub fn batch_parameters(args: &RemixArgs) -> CliResult<BatchParameters> {
    match &args.replay {
        Some(record_path) => {
            let record = RunRecorder::read(record_path).cli_with_context(|| {
                format!("Failed to read run record '{}'", record_path.display())
            })?;
            info!(
                "Replaying parameters recorded for {} ({})",
                record.input,
                record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            Ok(BatchParameters::Fixed(record.parameters))
        }
        None => Ok(BatchParameters::Sampled {
            master_seed: args.seed,
        }),
    }
}

/// Installs a Ctrl-C handler that cancels the running batch.
fn install_interrupt_handler(cancel: &CancellationFlag) {
    let flag = cancel.clone();
    let installed = ctrlc::set_handler(move || {
        if !flag.is_cancelled() {
            eprintln!("\nInterrupted, cancelling remaining files...");
        }
        flag.cancel();
    });
    if let Err(e) = installed {
        warn!("Could not install Ctrl-C handler: {e}");
    }
}

fn report_file(progress: &BatchProgress, report: &FileReport) {
    let name = report
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| report.input.display().to_string());

    progress.suspend(|| match &report.status {
        FileStatus::Succeeded(outcome) => {
            terminal::print_success(&format!("{name} -> {}", outcome.output.display()));
            for warning in &outcome.warnings {
                terminal::print_warning(warning);
            }
        }
        FileStatus::Failed(error) => terminal::print_failure(&name, &error.to_string()),
        FileStatus::Cancelled => terminal::print_warning(&format!("{name}: cancelled")),
    });
    progress.inc();
}

/// Lists the dimensions of `parameters` that differ from neutral.
pub fn applied_parameters(parameters: &ParameterSet) -> String {
    let active = parameters.active();
    if active.is_empty() {
        return "none".to_string();
    }
    active
        .iter()
        .map(|(dimension, value)| format!("{dimension}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prints the per-file and total summary of a finished batch.
pub fn print_summary(report: &BatchReport) {
    let outcomes: Vec<_> = report.succeeded().collect();
    if !outcomes.is_empty() {
        terminal::print_section("Remix Summary");
        for outcome in &outcomes {
            terminal::print_processing(&outcome.input.display().to_string());
            terminal::print_status("Output", &outcome.output.display().to_string(), false);
            if let Some(seed) = outcome.seed {
                terminal::print_status("Seed", &seed.to_string(), false);
            }
            terminal::print_status("Applied", &applied_parameters(&outcome.parameters), false);
            terminal::print_status("Stages", &outcome.pipeline.stages().len().to_string(), false);
            terminal::print_status("Metadata", &outcome.scrub.tool().to_string(), false);
            terminal::print_status("Time", &format_duration(outcome.duration), false);
            terminal::print_status("Input size", &format_bytes(outcome.input_size), false);
            terminal::print_status("Output size", &format_bytes(outcome.output_size), false);
            if let Some(record) = &outcome.record_path {
                terminal::print_status("Record", &record.display().to_string(), false);
            }
        }
    }

    terminal::print_section("Totals");
    terminal::print_status("Remixed", &outcomes.len().to_string(), true);
    terminal::print_status("Failed", &report.failed_count().to_string(), report.failed_count() > 0);
    if report.cancelled_count() > 0 {
        terminal::print_status("Cancelled", &report.cancelled_count().to_string(), true);
    }
    if report.degraded_scrub_count() > 0 {
        terminal::print_warning(&format!(
            "{} file(s) scrubbed with the ffmpeg fallback only",
            report.degraded_scrub_count()
        ));
    }
    terminal::print_status("Total time", &format_duration(report.total_duration), false);
}

/// Runs the remix command.
///
/// Returns `Ok(true)` when every file succeeded, `Ok(false)` when at least
/// one file failed or was cancelled.
pub fn run_remix(args: RemixArgs) -> CliResult<bool> {
    let files = discover_remix_files(&args)?;
    if files.is_empty() {
        terminal::print_warning(&format!(
            "No video files found in '{}'",
            args.input_path.display()
        ));
        return Ok(true);
    }

    let config = create_core_config(&args)?;
    let parameters = batch_parameters(&args)?;
    fs::create_dir_all(&config.output_dir).cli_with_context(|| {
        format!(
            "Failed to create output directory '{}'",
            config.output_dir.display()
        )
    })?;

    terminal::print_section("Remix");
    terminal::print_status("Input", &args.input_path.display().to_string(), false);
    terminal::print_status("Output", &config.output_dir.display().to_string(), false);
    terminal::print_status("Files", &files.len().to_string(), true);
    terminal::print_status("Jobs", &config.jobs.to_string(), false);
    match &parameters {
        BatchParameters::Sampled { master_seed: Some(seed) } => {
            terminal::print_status("Seed", &seed.to_string(), false);
        }
        BatchParameters::Sampled { master_seed: None } => {}
        BatchParameters::Fixed(_) => terminal::print_status("Parameters", "replayed", false),
    }
    debug!("Core configuration: {config:?}");

    let engine = RemixEngine::production(config)?;

    let cancel = CancellationFlag::new();
    install_interrupt_handler(&cancel);

    info!("");
    let progress = BatchProgress::new(files.len());
    let report = process_videos(&engine, &files, &parameters, &cancel, |file_report| {
        report_file(&progress, file_report)
    });
    progress.finish();
    let report = report?;

    print_summary(&report);
    Ok(!report.has_failures())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use tempfile::tempdir;
    use vremix_core::{ParameterSampler, PipelineCompiler, RunRecord, RunRecorder};

    fn remix_args(extra: &[&str]) -> RemixArgs {
        let mut argv = vec!["vremix", "remix"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Remix(args) => args,
            other => panic!("Expected Remix command, got {other:?}"),
        }
    }

    #[test]
    fn test_discover_single_file_and_directory() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("b.mp4"), "x")?;
        fs::write(dir.path().join("a.mov"), "x")?;
        fs::write(dir.path().join("notes.txt"), "x")?;
        let dir_arg = dir.path().to_string_lossy().into_owned();

        let files = discover_remix_files(&remix_args(&["-i", &dir_arg, "-o", "out"]))?;
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.mov"));

        let file_arg = dir.path().join("b.mp4").to_string_lossy().into_owned();
        let files = discover_remix_files(&remix_args(&["-i", &file_arg, "-o", "out"]))?;
        assert_eq!(files.len(), 1);

        let text_arg = dir.path().join("notes.txt").to_string_lossy().into_owned();
        assert!(discover_remix_files(&remix_args(&["-i", &text_arg, "-o", "out"])).is_err());
        Ok(())
    }

    #[test]
    fn test_discover_empty_directory_is_not_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let dir_arg = dir.path().to_string_lossy().into_owned();
        let files = discover_remix_files(&remix_args(&["-i", &dir_arg, "-o", "out"]))?;
        assert!(files.is_empty());
        Ok(())
    }

    #[test]
    fn test_discover_missing_input() {
        let args = remix_args(&["-i", "/nonexistent/vremix/clip.mp4", "-o", "out"]);
        let err = discover_remix_files(&args).unwrap_err();
        assert!(err.to_string().contains("Invalid input path"));
    }

    #[test]
    fn test_create_core_config_maps_flags() {
        let args = remix_args(&[
            "-i",
            "in",
            "-o",
            "out",
            "-j",
            "3",
            "--overwrite",
            "--no-encoding-variation",
            "--no-exiftool",
            "--no-records",
        ]);
        let config = create_core_config(&args).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.jobs, 3);
        assert!(config.overwrite);
        assert!(!config.encoding_variation);
        assert!(!config.use_exiftool);
        assert!(!config.write_records);
    }

    #[test]
    fn test_batch_parameters_sampled_and_replayed() -> Result<(), Box<dyn std::error::Error>> {
        let params = batch_parameters(&remix_args(&["-i", "in", "-o", "out", "--seed", "5"]))?;
        assert_eq!(params, BatchParameters::Sampled { master_seed: Some(5) });

        let dir = tempdir()?;
        let set = ParameterSampler::seeded(5).sample();
        let pipeline = PipelineCompiler::default().compile(&set)?;
        let record = RunRecord::new(
            &dir.path().join("clip.mp4"),
            &dir.path().join("remix_out.mp4"),
            Some(5),
            set.clone(),
            pipeline,
            None,
        )?;
        let record_path = RunRecorder::new(false).record(&record)?;
        let record_arg = record_path.to_string_lossy().into_owned();

        let params =
            batch_parameters(&remix_args(&["-i", "in", "-o", "out", "--replay", &record_arg]))?;
        assert_eq!(params, BatchParameters::Fixed(set));

        let missing = batch_parameters(&remix_args(&[
            "-i",
            "in",
            "-o",
            "out",
            "--replay",
            "/nonexistent.remix.json",
        ]));
        assert!(missing.unwrap_err().to_string().contains("Failed to read run record"));
        Ok(())
    }

    #[test]
    fn test_applied_parameters_lists_non_neutral_dimensions() {
        use vremix_core::Dimension;

        let set = ParameterSet::from_values([
            (Dimension::ZoomFactor, 1.04),
            (Dimension::PlaybackSpeed, 1.0),
            (Dimension::Brightness, 0.0),
            (Dimension::Noise, 0.01),
        ]);
        assert_eq!(applied_parameters(&set), "zoom_factor=1.04, noise=0.01");
        assert_eq!(
            applied_parameters(&ParameterSet::from_values([(Dimension::Volume, 1.0)])),
            "none"
        );
    }
}
