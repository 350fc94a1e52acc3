//! Deciding where nodes without a local declaration end up.
//!
//! A node is placeable when its declaration lives in one of the target
//! modules; it is then annotated in place. Every other node (declared
//! upstream, or not formalized at all) is rendered as a stub and prepended to
//! the first placeable node in topological order that depends on it. Stubs
//! nobody depends on go to the overflow file.
//!
//! The scan is a deterministic linear pass over the topological order. It
//! does not look for a globally best position.

use crate::annotate::{AttributeFlags, make_docstring, render_attribute};
use crate::node::NodeWithPosition;
use crate::sort::topological_order;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Whether `node` has a declaration inside one of the target `modules`
pub fn is_placeable(node: &NodeWithPosition, modules: &[String]) -> bool {
    node.location
        .as_ref()
        .is_some_and(|location| modules.iter().any(|m| location.root_module() == m))
}

/// Flags for placeholder declarations, whose uses are spelled out through
/// `sorry_using` instead
const PLACEHOLDER_FLAGS: AttributeFlags = AttributeFlags {
    statement_text: false,
    statement_uses: false,
    statement_uses_raw: true,
    proof_text: false,
    proof_uses: false,
    proof_uses_raw: true,
};

/// Render a stand-in for a non-placeable node.
///
/// A node declared elsewhere gets an `attribute [..] name` line. A node with
/// no declaration at all gets a placeholder `def`/`theorem` whose type and
/// body mention its dependencies through `sorry_using`.
pub fn render_stub(node: &NodeWithPosition) -> String {
    let name = node.name();
    if node.location.is_some() {
        return format!(
            "attribute [{}] {name}",
            render_attribute(&node.node, &AttributeFlags::ALL)
        );
    }

    let node = &node.node;
    let mut lean = String::new();
    if !node.statement.text.trim().is_empty() {
        lean.push_str(&make_docstring(&node.statement.text, 0));
        lean.push('\n');
    }
    lean.push_str(&format!("@[{}]\n", render_attribute(node, &PLACEHOLDER_FLAGS)));
    let statement_uses = node.statement.all_uses().join(", ");
    match &node.proof {
        None => {
            lean.push_str(&format!("def {name} : (sorry : Type) :=\n"));
            lean.push_str(&format!("  sorry_using [{statement_uses}]"));
        }
        Some(proof) => {
            lean.push_str(&format!(
                "theorem {name} : (sorry_using [{statement_uses}] : Prop) := by\n"
            ));
            if !proof.text.trim().is_empty() {
                lean.push_str(&format!("  {}\n", make_docstring(&proof.text, 2)));
            }
            lean.push_str(&format!("  sorry_using [{}]", proof.all_uses().join(", ")));
        }
    }
    lean
}

/// Where every node goes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlacementPlan {
    /// Stubs to prepend to each placeable node, by node name, in topological order
    pub prepends: HashMap<String, Vec<String>>,
    /// Stubs with no placeable dependent
    pub overflow: Vec<String>,
    /// Indices of placeable nodes, latest declaration first
    pub splice_order: Vec<usize>,
}

/// Plan the placement of `nodes` against the target `modules`.
pub fn plan_placement(nodes: &[NodeWithPosition], modules: &[String]) -> PlacementPlan {
    let placeable: Vec<bool> = nodes.iter().map(|n| is_placeable(n, modules)).collect();
    let order = topological_order(nodes);

    let mut plan = PlacementPlan::default();
    for (position, &index) in order.iter().enumerate() {
        if placeable[index] {
            continue;
        }
        let name = nodes[index].name();
        let stub = render_stub(&nodes[index]);
        let consumer = order[position..]
            .iter()
            .copied()
            .find(|&candidate| placeable[candidate] && nodes[candidate].node.depends_on(name));
        match consumer {
            Some(consumer) => plan
                .prepends
                .entry(nodes[consumer].name().to_string())
                .or_default()
                .push(stub),
            None => plan.overflow.push(stub),
        }
    }

    let mut splice_order: Vec<usize> = (0..nodes.len()).filter(|&i| placeable[i]).collect();
    splice_order.sort_by_key(|&i| {
        Reverse(
            nodes[i]
                .location
                .as_ref()
                .map(|location| (location.module.clone(), location.range.pos)),
        )
    });
    plan.splice_order = splice_order;
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{DeclarationLocation, DeclarationRange, Node, NodePart, Position};

    fn node(name: &str, uses: &[&str], proof: bool) -> Node {
        let mut statement = NodePart::new(false, format!("About {name}."), [], "definition");
        statement.uses.extend(uses.iter().map(|u| u.to_string()));
        Node {
            name: name.to_string(),
            statement,
            proof: proof.then(|| NodePart::new(false, "", [], "proof")),
            not_ready: false,
            discussion: None,
            title: None,
        }
    }

    fn at(node: Node, module: &str, line: usize) -> NodeWithPosition {
        NodeWithPosition::located(
            node,
            format!("{}.lean", module.replace('.', "/")),
            DeclarationLocation {
                module: module.to_string(),
                range: DeclarationRange {
                    pos: Position::new(line, 0),
                    end_pos: Position::new(line + 1, 0),
                },
            },
        )
    }

    fn modules() -> Vec<String> {
        vec!["Proj".to_string()]
    }

    #[test]
    fn placeable_requires_target_root_module() {
        assert!(is_placeable(&at(node("a", &[], false), "Proj.Basic", 1), &modules()));
        assert!(!is_placeable(&at(node("b", &[], false), "Mathlib.Order", 1), &modules()));
        assert!(!is_placeable(&at(node("c", &[], false), "Project.Basic", 1), &modules()));
        assert!(!is_placeable(&NodeWithPosition::unlocated(node("d", &[], false)), &modules()));
    }

    #[test]
    fn upstream_stub_is_attribute_line() {
        let stub = render_stub(&at(node("Mathlib.foo", &[], false), "Mathlib.Foo", 3));
        assert_eq!(
            stub,
            "attribute [blueprint\n  (statement := /-- About Mathlib.foo. -/)] Mathlib.foo"
        );
    }

    #[test]
    fn informal_definition_stub() {
        let mut informal = node("inf", &["a"], false);
        informal.statement.uses_raw.insert("lem:x".to_string());
        let stub = render_stub(&NodeWithPosition::unlocated(informal));
        assert_eq!(
            stub,
            "/-- About inf. -/\n@[blueprint\n  (uses := [\"lem:x\"])]\n\
             def inf : (sorry : Type) :=\n  sorry_using [a, \"lem:x\"]"
        );
    }

    #[test]
    fn informal_theorem_stub() {
        let mut informal = node("thm", &["a"], true);
        informal.statement.latex_env = "theorem".to_string();
        if let Some(proof) = informal.proof.as_mut() {
            proof.text = "By induction.".to_string();
            proof.uses.insert("b".to_string());
        }
        let stub = render_stub(&NodeWithPosition::unlocated(informal));
        assert_eq!(
            stub,
            "/-- About thm. -/\n@[blueprint]\n\
             theorem thm : (sorry_using [a] : Prop) := by\n  /-- By induction. -/\n  sorry_using [b]"
        );
    }

    #[test]
    fn stub_goes_to_first_dependent_in_topological_order() {
        let nodes = vec![
            at(node("late", &["up"], false), "Proj.B", 10),
            at(node("early", &["up"], false), "Proj.A", 5),
            NodeWithPosition::unlocated(node("up", &[], false)),
            NodeWithPosition::unlocated(node("orphan", &[], false)),
        ];
        let plan = plan_placement(&nodes, &modules());
        assert_eq!(plan.prepends.get("late").map(Vec::len), Some(1));
        assert!(!plan.prepends.contains_key("early"));
        assert_eq!(plan.overflow.len(), 1);
        assert!(plan.overflow[0].contains("def orphan"));
    }

    #[test]
    fn splice_order_is_reverse_source_order() {
        let nodes = vec![
            at(node("a1", &[], false), "Proj.A", 1),
            at(node("b", &[], false), "Proj.B", 7),
            at(node("a9", &[], false), "Proj.A", 9),
            NodeWithPosition::unlocated(node("x", &[], false)),
        ];
        let plan = plan_placement(&nodes, &modules());
        assert_eq!(plan.splice_order, vec![1, 2, 0]);
    }
}
