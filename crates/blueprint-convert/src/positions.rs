//! Looking up where each node is declared in the Lean project.
//!
//! The lookup runs on the Lean side (`lake exe add_position_info`): it reads
//! the node JSON on stdin and writes the same array back with `hasLean`,
//! `location` and `file` filled in.

use crate::process::capture;
use eyre::Result;

/// Lake executable that adds declaration positions to node JSON
pub const POSITION_TOOL: &str = "add_position_info";

/// Annotates node JSON with declaration positions
pub trait PositionLookup {
    /// `nodes_json` is a JSON array of nodes; `modules` are imported before
    /// names are looked up. Returns the position-augmented JSON array.
    fn lookup(&self, nodes_json: &str, modules: &[String]) -> Result<String>;
}

/// [`PositionLookup`] running `lake exe add_position_info`
#[derive(Debug, Clone)]
pub struct LakePositionLookup {
    command: String,
}

impl LakePositionLookup {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for LakePositionLookup {
    fn default() -> Self {
        Self::new("lake")
    }
}

impl PositionLookup for LakePositionLookup {
    fn lookup(&self, nodes_json: &str, modules: &[String]) -> Result<String> {
        let imports = modules.join(",");
        capture(
            &self.command,
            &["exe", POSITION_TOOL, "--imports", &imports],
            nodes_json,
        )
    }
}
