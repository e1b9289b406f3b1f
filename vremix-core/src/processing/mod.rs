//! Remix orchestration.
//!
//! This module wires the engine components together: `remix` handles a
//! single input end to end, `batch` fans a list of inputs out over a rayon
//! worker pool.

/// Single-file control flow and the RemixEngine
pub mod remix;

/// Batch processing, seed derivation and reports
pub mod batch;

pub use batch::{BatchParameters, BatchReport, FileReport, FileStatus, derive_seeds, process_videos};
pub use remix::{ParameterSource, RemixEngine, RemixOutcome};
