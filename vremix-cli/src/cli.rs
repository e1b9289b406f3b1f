// vremix-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "vremix: randomized, metadata-free video remixing",
    long_about = "Applies small randomized transformations to videos via the vremix-core \
                  library, strips identifying metadata and records the applied parameters."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose (debug) output
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remixes a video file, or every video in a directory
    Remix(RemixArgs),
    /// Prints a sampled parameter set and its pipeline as JSON without processing
    Params(ParamsArgs),
    /// Lists identifying metadata tags still present in a file
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
pub struct RemixArgs {
    /// Input video file or directory of videos
    #[arg(short = 'i', long = "input", required = true, value_name = "INPUT_PATH")]
    pub input_path: PathBuf,

    /// Directory where remixed files and run records will be saved
    #[arg(short = 'o', long = "output", required = true, value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Number of files remixed concurrently
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: u16,

    /// Master seed; the same seed and inputs reproduce the same parameters
    #[arg(long, value_name = "SEED", conflicts_with = "replay")]
    pub seed: Option<u64>,

    /// Replace existing outputs and run records
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,

    /// Disable bitrate/crf jitter and frame blending
    #[arg(long, default_value_t = false)]
    pub no_encoding_variation: bool,

    /// Skip exiftool and strip metadata with ffmpeg only
    #[arg(long, default_value_t = false)]
    pub no_exiftool: bool,

    /// Do not write a run record next to each output
    #[arg(long, default_value_t = false)]
    pub no_records: bool,

    /// Reapply the parameters stored in an existing run record
    #[arg(long, value_name = "RECORD_JSON")]
    pub replay: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ParamsArgs {
    /// Seed for the sampler (random when omitted)
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Disable bitrate/crf jitter and frame blending
    #[arg(long, default_value_t = false)]
    pub no_encoding_variation: bool,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// File to inspect
    #[arg(required = true, value_name = "FILE")]
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remix_basic_args() {
        let cli = Cli::parse_from(["vremix", "remix", "-i", "clips", "-o", "out"]);

        match cli.command {
            Commands::Remix(args) => {
                assert_eq!(args.input_path, PathBuf::from("clips"));
                assert_eq!(args.output_dir, PathBuf::from("out"));
                assert_eq!(args.jobs, 1);
                assert!(args.seed.is_none());
                assert!(!args.overwrite);
                assert!(!args.no_encoding_variation);
                assert!(!args.no_exiftool);
                assert!(!args.no_records);
                assert!(args.replay.is_none());
            }
            other => panic!("Expected Remix command, got {other:?}"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_remix_all_flags() {
        let cli = Cli::parse_from([
            "vremix",
            "-v",
            "remix",
            "--input",
            "a.mp4",
            "--output",
            "out",
            "--jobs",
            "4",
            "--seed",
            "42",
            "--overwrite",
            "--no-encoding-variation",
            "--no-exiftool",
            "--no-records",
        ]);

        assert!(cli.verbose);
        match cli.command {
            Commands::Remix(args) => {
                assert_eq!(args.jobs, 4);
                assert_eq!(args.seed, Some(42));
                assert!(args.overwrite);
                assert!(args.no_encoding_variation);
                assert!(args.no_exiftool);
                assert!(args.no_records);
            }
            other => panic!("Expected Remix command, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let result = Cli::try_parse_from(["vremix", "remix", "-i", "a", "-o", "b", "--jobs", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_seed_conflicts_with_replay() {
        let result = Cli::try_parse_from([
            "vremix", "remix", "-i", "a", "-o", "b", "--seed", "1", "--replay", "r.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_params_and_inspect() {
        let cli = Cli::parse_from(["vremix", "params", "--seed", "7", "--no-encoding-variation"]);
        match cli.command {
            Commands::Params(args) => {
                assert_eq!(args.seed, Some(7));
                assert!(args.no_encoding_variation);
            }
            other => panic!("Expected Params command, got {other:?}"),
        }

        let cli = Cli::parse_from(["vremix", "inspect", "clip.mp4", "--verbose"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Inspect(args) => assert_eq!(args.file, PathBuf::from("clip.mp4")),
            other => panic!("Expected Inspect command, got {other:?}"),
        }
    }
}
