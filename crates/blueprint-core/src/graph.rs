//! Building the blueprint dependency graph from the flattened document.
//!
//! Statements (`definition`, `lemma`, ... as configured by the `thms=` option
//! of `\usepackage[..]{blueprint}`) become nodes; each `proof` is attached to
//! the statement it proves. Nodes live in an arena with identifier and label
//! indices beside it.

use crate::diagnostics::{Diagnostics, WarningKind};
use crate::directive::{DirectiveRecord, extract_directives, find_end};
use crate::node::{Node, NodePart, quote};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Statement kinds used when the document does not configure any
pub const DEFAULT_STATEMENT_KINDS: &[&str] =
    &["definition", "lemma", "proposition", "theorem", "corollary"];

/// The environment holding proofs
pub const PROOF_KIND: &str = "proof";

static THMS_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\usepackage\s*\[[^\]]*\bthms\s*=\s*([^,\]\}]*)").expect("valid thms regex")
});

/// Statement kinds configured by the document, or the defaults.
pub fn statement_kinds(source: &str) -> Vec<String> {
    match THMS_OPTION.captures(source) {
        Some(caps) => caps[1].trim().split('+').map(str::to_string).collect(),
        None => DEFAULT_STATEMENT_KINDS.iter().map(|k| k.to_string()).collect(),
    }
}

/// One `\begin{kind}[title] .. \end{kind}` block of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub kind: String,
    pub title: Option<String>,
    /// Text between the title (or `\begin`) and `\end`
    pub content: String,
    /// The whole block as written
    pub raw: String,
    /// Byte offset of `\begin`
    pub start: usize,
    /// Whether a `%` precedes `\begin` on its line
    pub commented: bool,
}

/// Whether a `%` precedes `offset` on its line.
pub(crate) fn is_commented(source: &str, offset: usize) -> bool {
    source[..offset]
        .rsplit('\n')
        .next()
        .is_some_and(|prefix| prefix.contains('%'))
}

/// Find all non-overlapping blocks of the given kinds, left to right.
///
/// Each `\begin` is closed by the first `\end` of the same kind after it.
pub fn scan_environments(source: &str, kinds: &[String]) -> Vec<Occurrence> {
    if kinds.is_empty() {
        return Vec::new();
    }
    let alternatives: Vec<String> = kinds.iter().map(|k| regex::escape(k)).collect();
    let Ok(begin) = Regex::new(&format!(r"\\begin\s*\{{({})\}}", alternatives.join("|"))) else {
        return Vec::new();
    };

    let mut occurrences = Vec::new();
    let mut search_from = 0;
    while let Some(caps) = begin.captures_at(source, search_from) {
        let Some(whole) = caps.get(0) else { break };
        let kind = caps[1].to_string();
        let Some(end) = find_end(source, whole.end(), &kind) else {
            search_from = whole.end();
            continue;
        };

        let after_begin = &source[whole.end()..end.start()];
        let trimmed = after_begin.trim_start();
        let body_offset = after_begin.len() - trimmed.len();
        let (title, content) = match trimmed.strip_prefix('[').and_then(|t| t.split_once(']')) {
            Some((title, content)) => (Some(title.to_string()), content),
            None => (None, &after_begin[body_offset..]),
        };

        occurrences.push(Occurrence {
            kind,
            title,
            content: content.to_string(),
            raw: source[whole.start()..end.end()].to_string(),
            start: whole.start(),
            commented: is_commented(source, whole.start()),
        });
        search_from = end.end();
    }
    occurrences
}

/// Derive an identifier that is not yet `taken`.
///
/// A label contributes the part after its last `:`, with hyphens and spaces
/// turned into underscores; a random suffix is appended until the result is
/// free. Without a label the base is random.
pub fn generate_identifier(taken: impl Fn(&str) -> bool, label: Option<&str>) -> String {
    let base = match label {
        None => format!("node_{}", uuid::Uuid::new_v4().simple()),
        Some(label) => {
            let base = label
                .rsplit(':')
                .next()
                .unwrap_or_default()
                .replace(['-', ' '], "_");
            if base.starts_with(|c: char| c.is_ascii_digit()) {
                format!("_{base}")
            } else {
                base
            }
        }
    };
    if !base.is_empty() && !taken(&base) {
        return base;
    }
    let suffixed = format!("{base}_{}", uuid::Uuid::new_v4().simple());
    generate_identifier(taken, Some(&suffixed))
}

/// The extracted dependency graph.
#[derive(Debug, Default, Clone)]
pub struct NodeGraph {
    nodes: Vec<Node>,
    by_name: HashMap<String, usize>,
    by_label: HashMap<String, usize>,
    raw_sources: HashMap<String, Vec<String>>,
}

impl NodeGraph {
    /// Nodes in first-occurrence order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.by_name.get(name).map(|&i| &self.nodes[i])
    }

    pub fn node_for_label(&self, label: &str) -> Option<&Node> {
        self.by_label.get(label).map(|&i| &self.nodes[i])
    }

    /// Map from every known label to the identifier of its node
    pub fn label_names(&self) -> HashMap<String, String> {
        self.by_label
            .iter()
            .map(|(label, &i)| (label.clone(), self.nodes[i].name.clone()))
            .collect()
    }

    /// Every raw block of the document that contributed to `name`
    pub fn raw_sources(&self, name: &str) -> &[String] {
        self.raw_sources.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Split into the node list and the raw-source map
    pub fn into_parts(self) -> (Vec<Node>, HashMap<String, Vec<String>>) {
        (self.nodes, self.raw_sources)
    }

    fn insert_statement(
        &mut self,
        name: String,
        occurrence: &Occurrence,
        record: &DirectiveRecord,
        text: String,
        diagnostics: &mut Diagnostics,
    ) -> usize {
        self.raw_sources
            .entry(name.clone())
            .or_default()
            .push(occurrence.raw.clone());

        if let Some(&index) = self.by_name.get(&name) {
            diagnostics.warn(
                WarningKind::DuplicateIdentifier,
                format!(
                    "Lean name {} occurs in blueprint multiple times; only keeping the first.",
                    quote(&name)
                ),
            );
            return index;
        }

        let statement = NodePart::new(
            record.lean_ok,
            text,
            record.uses.iter().cloned(),
            occurrence.kind.clone(),
        );
        let index = self.nodes.len();
        self.nodes.push(Node {
            name: name.clone(),
            statement,
            proof: None,
            not_ready: record.not_ready,
            discussion: record.discussion,
            title: occurrence.title.clone(),
        });
        self.by_name.insert(name, index);
        index
    }
}

/// Where a scanned statement ended up
#[derive(Debug, Clone, Copy)]
enum Slot {
    Node(usize),
    /// Informal statement skipped because informal conversion is off
    Skipped,
}

/// Extract the node graph from a flattened document.
///
/// Statements without `\lean{..}` become nodes only when `convert_informal`
/// is set; their proofs are skipped along with them. Dependencies are left
/// as raw labels; see [`crate::labels::resolve_labels`].
pub fn build_graph(source: &str, convert_informal: bool, diagnostics: &mut Diagnostics) -> NodeGraph {
    let statement_kinds = statement_kinds(source);
    let mut kinds = statement_kinds.clone();
    kinds.push(PROOF_KIND.to_string());
    let occurrences = scan_environments(source, &kinds);
    tracing::debug!(
        occurrences = occurrences.len(),
        kinds = %statement_kinds.join("+"),
        "scanned blueprint environments"
    );

    let mut graph = NodeGraph::default();
    let mut slots: HashMap<usize, Slot> = HashMap::new();

    for (i, occurrence) in occurrences.iter().enumerate() {
        if !statement_kinds.contains(&occurrence.kind) || occurrence.commented {
            continue;
        }

        let (record, text) = extract_directives(&occurrence.content, diagnostics);
        let name = match &record.lean {
            Some(lean) => {
                if record.label.is_none() {
                    diagnostics.warn(
                        WarningKind::MissingLabel,
                        format!("Did not find a LaTeX label for {lean}"),
                    );
                }
                lean.clone()
            }
            None if !convert_informal => {
                slots.insert(i, Slot::Skipped);
                continue;
            }
            None => generate_identifier(|n| graph.by_name.contains_key(n), record.label.as_deref()),
        };

        let index = graph.insert_statement(name, occurrence, &record, text, diagnostics);
        slots.insert(i, Slot::Node(index));
        if let Some(label) = record.label {
            graph.by_label.insert(label, index);
        }
    }

    for (i, occurrence) in occurrences.iter().enumerate() {
        if occurrence.kind != PROOF_KIND || occurrence.commented {
            continue;
        }

        let (record, text) = extract_directives(&occurrence.content, diagnostics);
        let index = if let Some(proves) = &record.proves {
            match graph.by_label.get(proves) {
                Some(&index) => index,
                None => {
                    diagnostics.warn(
                        WarningKind::UnknownProvedLabel,
                        format!("\\proves{{{proves}}} does not name a known statement"),
                    );
                    continue;
                }
            }
        } else {
            match i.checked_sub(1).and_then(|prev| slots.get(&prev)) {
                Some(Slot::Node(index)) => *index,
                Some(Slot::Skipped) => continue,
                None => {
                    diagnostics.warn(
                        WarningKind::UnresolvedProof,
                        format!("Cannot determine the statement proved by: {text}"),
                    );
                    continue;
                }
            }
        };

        let node = &mut graph.nodes[index];
        node.proof = Some(NodePart::new(
            record.lean_ok,
            text,
            record.uses,
            occurrence.kind.clone(),
        ));
        graph
            .raw_sources
            .entry(node.name.clone())
            .or_default()
            .push(occurrence.raw.clone());
    }

    graph
}
