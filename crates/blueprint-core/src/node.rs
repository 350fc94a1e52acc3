//! Blueprint nodes and their JSON interchange form.
//!
//! The JSON shape is shared with the position-lookup tool on the Lean side,
//! so field names are camel-cased and sets serialize as plain arrays.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Quote a string as a Lean (JSON-compatible) string literal.
pub fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// One half of a node: the statement or the proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePart {
    /// Whether the blueprint marks this part as formalized (`\leanok`)
    pub lean_ok: bool,
    /// Prose with directives stripped
    pub text: String,
    /// Dependencies resolved to node identifiers
    pub uses: IndexSet<String>,
    /// Dependencies still expressed as raw labels
    pub uses_raw: IndexSet<String>,
    /// The environment this part came from (`theorem`, `proof`, ...)
    pub latex_env: String,
}

impl NodePart {
    pub fn new(
        lean_ok: bool,
        text: impl Into<String>,
        uses_raw: impl IntoIterator<Item = String>,
        latex_env: impl Into<String>,
    ) -> Self {
        Self {
            lean_ok,
            text: text.into(),
            uses: IndexSet::new(),
            uses_raw: uses_raw.into_iter().collect(),
            latex_env: latex_env.into(),
        }
    }

    /// Resolved identifiers followed by quoted raw labels.
    pub fn all_uses(&self) -> Vec<String> {
        self.uses
            .iter()
            .cloned()
            .chain(self.uses_raw.iter().map(|u| quote(u)))
            .collect()
    }
}

/// A vertex of the dependency graph.
///
/// A node without a proof is definition-like, one with a proof is
/// theorem-like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Lean identifier, unique across the graph
    pub name: String,
    pub statement: NodePart,
    pub proof: Option<NodePart>,
    pub not_ready: bool,
    pub discussion: Option<u64>,
    pub title: Option<String>,
}

impl Node {
    /// Union of the resolved dependencies of the statement and the proof.
    pub fn uses(&self) -> IndexSet<&str> {
        let mut uses: IndexSet<&str> = self.statement.uses.iter().map(String::as_str).collect();
        if let Some(proof) = &self.proof {
            uses.extend(proof.uses.iter().map(String::as_str));
        }
        uses
    }

    /// Whether `name` is among the resolved dependencies of either part.
    pub fn depends_on(&self, name: &str) -> bool {
        self.statement.uses.contains(name)
            || self.proof.as_ref().is_some_and(|p| p.uses.contains(name))
    }
}

/// 1-indexed line, byte column within the line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationRange {
    pub pos: Position,
    pub end_pos: Position,
}

/// Where a declaration lives in the Lean project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationLocation {
    /// Module name, e.g. `Project.Algebra.Basic`
    pub module: String,
    pub range: DeclarationRange,
}

impl DeclarationLocation {
    /// First component of the module name
    pub fn root_module(&self) -> &str {
        self.module.split('.').next().unwrap_or_default()
    }
}

/// A node as returned by the position lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeWithPosition {
    #[serde(flatten)]
    pub node: Node,
    pub has_lean: bool,
    pub location: Option<DeclarationLocation>,
    pub file: Option<String>,
}

impl NodeWithPosition {
    /// A node with no declaration in the target project
    pub fn unlocated(node: Node) -> Self {
        Self {
            node,
            has_lean: false,
            location: None,
            file: None,
        }
    }

    pub fn located(node: Node, file: impl Into<String>, location: DeclarationLocation) -> Self {
        Self {
            node,
            has_lean: true,
            location: Some(location),
            file: Some(file.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }
}

/// Serialize nodes for the position lookup.
pub fn nodes_to_json(nodes: &[Node]) -> serde_json::Result<String> {
    serde_json::to_string(nodes)
}

/// Parse the position lookup's output.
pub fn nodes_with_position_from_json(json: &str) -> serde_json::Result<Vec<NodeWithPosition>> {
    serde_json::from_str(json)
}
