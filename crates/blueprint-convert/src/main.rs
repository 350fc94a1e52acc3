//! blueprint-convert - Convert a LaTeX blueprint to Lean `@[blueprint]` attributes

use blueprint_convert::report::render_summary;
use blueprint_convert::{
    Args, Collaborators, Config, LakePositionLookup, Outcome, PandocTranscoder, run,
};
use blueprint_core::PathDocuments;
use clap::Parser;
use eyre::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the --extract-only JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_args(Args::parse())?;
    let transcoder = PandocTranscoder::new(&config.pandoc_command);
    let positions = LakePositionLookup::new(&config.lake_command);

    let outcome = run(
        &config,
        &PathDocuments,
        Collaborators {
            transcoder: &transcoder,
            positions: &positions,
        },
    )?;

    match outcome {
        Outcome::Extracted(json) => println!("{json}"),
        Outcome::Converted(summary) => eprint!("{}", render_summary(&summary)),
    }
    Ok(())
}
