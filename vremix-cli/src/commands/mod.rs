//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Batch remixing of a file or directory.
pub mod remix;

/// Parameter preview without processing.
pub mod params;

/// Residual metadata listing.
pub mod inspect;
