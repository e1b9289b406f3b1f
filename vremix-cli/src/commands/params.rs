//! Implementation of the 'params' subcommand.
//!
//! Samples one ParameterSet, compiles it and prints both as JSON without
//! touching any file.

use crate::cli::ParamsArgs;
use crate::error::{CliErrorContext, CliResult};

use vremix_core::processing::derive_seeds;
use vremix_core::{ParameterSampler, PipelineCompiler, SamplerOptions};

use serde_json::{Value, json};

/// Builds the JSON document printed by `vremix params`.
pub fn params_document(args: &ParamsArgs) -> CliResult<Value> {
    let seed = match args.seed {
        Some(seed) => seed,
        None => derive_seeds(None, 1)?
            .into_iter()
            .next()
            .cli_context("Failed to draw a seed")?,
    };

    let parameters = ParameterSampler::seeded(seed)
        .with_options(SamplerOptions {
            encoding_variation: !args.no_encoding_variation,
        })
        .sample();
    let pipeline = PipelineCompiler::default().compile(&parameters)?;

    Ok(json!({
        "seed": seed,
        "parameters": parameters,
        "pipeline": pipeline,
    }))
}

/// Runs the params command, printing pretty JSON to stdout.
pub fn run_params(args: ParamsArgs) -> CliResult<()> {
    let document = params_document(&args)?;
    let text = serde_json::to_string_pretty(&document)?;
    println!("{text}");
    Ok(())
}
