//! Turning LaTeX labels into node identifiers.

use crate::graph::NodeGraph;
use crate::node::NodePart;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Reference commands understood by the prose transcoder
pub const REF_COMMANDS: &[&str] = &["ref", "cref", "Cref", "vref", "eqref", "autoref"];

static REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\\(?:{})\s*\{{([^\}}]*)\}}",
        REF_COMMANDS.join("|")
    ))
    .expect("valid ref regex")
});

/// Rewrite reference commands in `source` so node references survive
/// transcoding.
///
/// A label of a known node becomes `\verb|identifier|`. An unknown label that
/// contains an underscore is assumed to be an identifier anyway and is wrapped
/// verbatim as well; any other label is kept as `\ref{label}`.
pub fn convert_refs_to_verbatim(source: &str, label_names: &HashMap<String, String>) -> String {
    REF.replace_all(source, |caps: &Captures| {
        caps[1]
            .split(',')
            .map(str::trim)
            .map(|label| match label_names.get(label) {
                Some(name) => format!("\\verb|{name}|"),
                None if label.contains('_') => format!("\\verb|{label}|"),
                None => format!("\\ref{{{label}}}"),
            })
            .collect::<Vec<_>>()
            .join(", ")
    })
    .trim()
    .to_string()
}

/// Move every raw use that names a known label into the resolved uses, and
/// rewrite the part's reference commands.
pub fn resolve_part(part: &mut NodePart, label_names: &HashMap<String, String>) {
    let raw: Vec<String> = part.uses_raw.iter().cloned().collect();
    for label in raw {
        if let Some(name) = label_names.get(&label) {
            part.uses_raw.shift_remove(&label);
            part.uses.insert(name.clone());
        }
    }
    part.text = convert_refs_to_verbatim(&part.text, label_names);
}

/// Resolve labels across every node of the graph.
pub fn resolve_labels(graph: &mut NodeGraph) {
    let label_names = graph.label_names();
    for node in graph.nodes_mut() {
        resolve_part(&mut node.statement, &label_names);
        if let Some(proof) = node.proof.as_mut() {
            resolve_part(proof, &label_names);
        }
    }
}
