//! Implementation of the 'inspect' subcommand.

use crate::cli::InspectArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::terminal;

use vremix_core::external::{CommandFfprobeExecutor, FfprobeExecutor, ResidualTag};

use std::path::Path;

/// Collects the identifying tags left in `path`.
pub fn residual_tags<P: FfprobeExecutor>(probe: &P, path: &Path) -> CliResult<Vec<ResidualTag>> {
    probe
        .identifying_tags(path)
        .cli_with_context(|| format!("Failed to inspect '{}'", path.display()))
}

/// Runs the inspect command with the ffprobe found on PATH.
pub fn run_inspect(args: InspectArgs) -> CliResult<()> {
    let tags = residual_tags(&CommandFfprobeExecutor::new(), &args.file)?;

    terminal::print_section("Metadata");
    terminal::print_status("File", &args.file.display().to_string(), false);
    if tags.is_empty() {
        terminal::print_success("No identifying metadata found");
        return Ok(());
    }

    terminal::print_warning(&format!("{} identifying tag(s) present", tags.len()));
    for tag in &tags {
        terminal::print_status(&format!("{} {}", tag.scope, tag.key), &tag.value, false);
    }
    Ok(())
}
