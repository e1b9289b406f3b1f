// vremix-cli/src/main.rs
//
// Entry point for the vremix binary: parses arguments, initializes logging,
// dispatches to the subcommand and maps the outcome to an exit code.
//
// Exit codes:
// - 0: success
// - 1: fatal error (missing tools, unreadable input or record)
// - 2: the batch ran but at least one file failed or was cancelled

use clap::Parser;
use console::style;
use std::process;
use vremix_cli::{Cli, Commands, logging, run_inspect, run_params, run_remix};

const EXIT_FATAL: i32 = 1;
const EXIT_FILE_FAILURES: i32 = 2;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Remix(args) => run_remix(args),
        Commands::Params(args) => run_params(args).map(|()| true),
        Commands::Inspect(args) => run_inspect(args).map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(EXIT_FILE_FAILURES),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            process::exit(EXIT_FATAL);
        }
    }
}
