//! Rendering nodes as `@[blueprint]` attributes.
//!
//! The attribute is the word `blueprint` followed by one configuration line
//! per included field:
//!
//! ```text
//! blueprint
//!   "Title"
//!   (statement := /-- .. -/)
//!   (uses := [Foo.bar, "lem:raw"])
//!   (proof := /-- .. -/)
//!   (proofUses := [Foo.baz])
//!   (notReady := true)
//!   (discussion := 12)
//!   (latexEnv := "lemma")
//! ```
//!
//! Fields come from the fixed table [`FIELDS`]; each entry pairs an inclusion
//! predicate with a renderer, so ordering and inclusion can be tested apart.

use crate::node::{Node, NodePart, quote};

/// Environment implied by a node without a proof
pub const DEFAULT_DEFINITION_ENV: &str = "definition";
/// Environment implied by a node with a proof
pub const DEFAULT_THEOREM_ENV: &str = "theorem";

/// Render `text` as a Lean docstring.
///
/// Multi-line text goes on its own lines, with continuation lines indented by
/// `indent` spaces.
pub fn make_docstring(text: &str, indent: usize) -> String {
    let pad = " ".repeat(indent);
    let text = text.trim().replace('\n', &format!("\n{pad}"));
    if text.contains('\n') {
        format!("/--\n{pad}{text}\n{pad}-/")
    } else {
        format!("/-- {text} -/")
    }
}

/// Which optional parts of a node go into the attribute.
///
/// Title, not-ready, discussion and the environment override are always
/// included when set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeFlags {
    pub statement_text: bool,
    pub statement_uses: bool,
    pub statement_uses_raw: bool,
    pub proof_text: bool,
    pub proof_uses: bool,
    pub proof_uses_raw: bool,
}

impl AttributeFlags {
    /// Include everything
    pub const ALL: Self = Self {
        statement_text: true,
        statement_uses: true,
        statement_uses_raw: true,
        proof_text: true,
        proof_uses: true,
        proof_uses_raw: true,
    };
}

impl Default for AttributeFlags {
    fn default() -> Self {
        Self::ALL
    }
}

/// One configuration line of the attribute
pub struct Field {
    pub name: &'static str,
    pub include: fn(&Node, &AttributeFlags) -> bool,
    pub render: fn(&Node, &AttributeFlags) -> String,
}

fn has_text(part: &NodePart) -> bool {
    !part.text.trim().is_empty()
}

fn statement_uses_included(node: &Node, flags: &AttributeFlags) -> bool {
    flags.statement_uses && !node.statement.uses.is_empty()
}

fn statement_raw_included(node: &Node, flags: &AttributeFlags) -> bool {
    flags.statement_uses_raw && !node.statement.uses_raw.is_empty()
}

fn proof_uses_included(node: &Node, flags: &AttributeFlags) -> bool {
    flags.proof_uses && node.proof.as_ref().is_some_and(|p| !p.uses.is_empty())
}

fn proof_raw_included(node: &Node, flags: &AttributeFlags) -> bool {
    flags.proof_uses_raw && node.proof.as_ref().is_some_and(|p| !p.uses_raw.is_empty())
}

fn uses_list(part: &NodePart, resolved: bool, raw: bool) -> String {
    let mut items: Vec<String> = Vec::new();
    if resolved {
        items.extend(part.uses.iter().cloned());
    }
    if raw {
        items.extend(part.uses_raw.iter().map(|u| quote(u)));
    }
    format!("[{}]", items.join(", "))
}

fn proof_part(node: &Node) -> &NodePart {
    node.proof.as_ref().unwrap_or(&node.statement)
}

fn default_env(node: &Node) -> &'static str {
    if node.proof.is_some() {
        DEFAULT_THEOREM_ENV
    } else {
        DEFAULT_DEFINITION_ENV
    }
}

/// The attribute's configuration lines, in output order.
///
/// Raw uses join the resolved uses' list when both are included; the raw
/// entries only render on their own when the resolved ones are left out.
pub const FIELDS: &[Field] = &[
    Field {
        name: "title",
        include: |node, _| node.title.as_deref().is_some_and(|t| !t.is_empty()),
        render: |node, _| quote(node.title.as_deref().unwrap_or_default()),
    },
    Field {
        name: "statement",
        include: |node, flags| flags.statement_text && has_text(&node.statement),
        render: |node, _| format!("(statement := {})", make_docstring(&node.statement.text, 2)),
    },
    Field {
        name: "uses",
        include: statement_uses_included,
        render: |node, flags| {
            let raw = statement_raw_included(node, flags);
            format!("(uses := {})", uses_list(&node.statement, true, raw))
        },
    },
    Field {
        name: "usesRaw",
        include: |node, flags| {
            statement_raw_included(node, flags) && !statement_uses_included(node, flags)
        },
        render: |node, _| format!("(uses := {})", uses_list(&node.statement, false, true)),
    },
    Field {
        name: "proof",
        include: |node, flags| flags.proof_text && node.proof.as_ref().is_some_and(has_text),
        render: |node, _| format!("(proof := {})", make_docstring(&proof_part(node).text, 2)),
    },
    Field {
        name: "proofUses",
        include: proof_uses_included,
        render: |node, flags| {
            let raw = proof_raw_included(node, flags);
            format!("(proofUses := {})", uses_list(proof_part(node), true, raw))
        },
    },
    Field {
        name: "proofUsesRaw",
        include: |node, flags| proof_raw_included(node, flags) && !proof_uses_included(node, flags),
        render: |node, _| format!("(proofUses := {})", uses_list(proof_part(node), false, true)),
    },
    Field {
        name: "notReady",
        include: |node, _| node.not_ready,
        render: |_, _| "(notReady := true)".to_string(),
    },
    Field {
        name: "discussion",
        include: |node, _| node.discussion.is_some(),
        render: |node, _| format!("(discussion := {})", node.discussion.unwrap_or_default()),
    },
    Field {
        name: "latexEnv",
        include: |node, _| node.statement.latex_env != default_env(node),
        render: |node, _| format!("(latexEnv := {})", quote(&node.statement.latex_env)),
    },
];

/// Names of the fields that `flags` would include for `node`, in order.
pub fn included_fields(node: &Node, flags: &AttributeFlags) -> Vec<&'static str> {
    FIELDS
        .iter()
        .filter(|field| (field.include)(node, flags))
        .map(|field| field.name)
        .collect()
}

/// Render the `blueprint` attribute for `node`.
pub fn render_attribute(node: &Node, flags: &AttributeFlags) -> String {
    let mut attribute = String::from("blueprint");
    for field in FIELDS.iter().filter(|field| (field.include)(node, flags)) {
        attribute.push_str("\n  ");
        attribute.push_str(&(field.render)(node, flags));
    }
    attribute
}
