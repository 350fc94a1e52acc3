//! blueprint-convert - Move a LaTeX blueprint into Lean `@[blueprint]` attributes
//!
//! Reads `web.tex` and everything it includes, extracts the theorem-like
//! environments as a dependency graph, finds the Lean declaration behind each
//! node through `lake exe add_position_info`, and writes the statement, proof
//! and dependencies of each node as an attribute on that declaration. The
//! converted environments are replaced by `\inputleannode{..}` in the LaTeX.

pub mod config;
pub mod pandoc;
pub mod pipeline;
pub mod positions;
pub mod process;
pub mod report;

pub use config::{Args, Config};
pub use pandoc::PandocTranscoder;
pub use pipeline::{Collaborators, Outcome, RunSummary, run};
pub use positions::{LakePositionLookup, PositionLookup};
