// vremix-cli/src/lib.rs
//
// Library portion of the vremix CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod terminal;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, InspectArgs, ParamsArgs, RemixArgs};
pub use commands::inspect::run_inspect;
pub use commands::params::run_params;
pub use commands::remix::run_remix;
pub use error::{CliErrorContext, CliResult};
