//! Integration tests for writing annotations into a Lean project on disk.
//!
//! Each test lays out a small Lean project in a temp directory, hands
//! position-augmented nodes to `annotate_project`, and inspects the files.

use std::fs;
use std::path::Path;

use blueprint_core::node::{DeclarationLocation, DeclarationRange, Position};
use blueprint_core::{
    AnnotateOptions, Diagnostics, Node, NodePart, NodeWithPosition, annotate_project,
};
use indoc::indoc;

// ============================================================================
// Helpers
// ============================================================================

const BASIC: &str = indoc! {"
    import Mathlib.Order.Basic

    namespace Proj

    def foo : Nat := 1

    theorem bar : foo = 1 := by
      sorry

    end Proj
"};

/// A node whose `uses` belong to the proof when there is one.
fn node(name: &str, text: &str, uses: &[&str], proof: Option<&str>) -> Node {
    let env = if proof.is_some() { "theorem" } else { "definition" };
    let mut node = Node {
        name: name.to_string(),
        statement: NodePart::new(true, text, [], env),
        proof: proof.map(|p| NodePart::new(false, p, [], "proof")),
        not_ready: false,
        discussion: None,
        title: None,
    };
    let part = node.proof.as_mut().unwrap_or(&mut node.statement);
    part.uses.extend(uses.iter().map(|u| u.to_string()));
    node
}

fn at(node: Node, file: &str, module: &str, start: (usize, usize), end: (usize, usize)) -> NodeWithPosition {
    NodeWithPosition::located(
        node,
        file,
        DeclarationLocation {
            module: module.to_string(),
            range: DeclarationRange {
                pos: Position::new(start.0, start.1),
                end_pos: Position::new(end.0, end.1),
            },
        },
    )
}

fn options(root: &Path) -> AnnotateOptions {
    AnnotateOptions {
        project_root: root.to_path_buf(),
        modules: vec!["Proj".to_string()],
        overflow_file: "extra_nodes.lean".into(),
        force_uses: false,
    }
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("Proj")).unwrap();
    fs::write(dir.path().join("Proj/Basic.lean"), BASIC).unwrap();
    dir
}

fn basic_nodes() -> Vec<NodeWithPosition> {
    vec![
        at(node("Proj.foo", "The foo.", &[], None), "Proj/Basic.lean", "Proj.Basic", (5, 0), (5, 18)),
        at(
            node("Proj.bar", "Foo is one.", &["Proj.foo"], Some("Unfold.")),
            "Proj/Basic.lean",
            "Proj.Basic",
            (7, 0),
            (8, 7),
        ),
    ]
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn annotates_declarations_and_adds_import_once() {
    let dir = project();
    let mut diagnostics = Diagnostics::new();
    let summary = annotate_project(&basic_nodes(), &options(dir.path()), &mut diagnostics).unwrap();

    assert_eq!(summary.annotated, 2);
    assert_eq!(summary.modified_files.len(), 1);
    assert_eq!(summary.overflow, 0);

    let written = fs::read_to_string(dir.path().join("Proj/Basic.lean")).unwrap();
    assert_eq!(
        written,
        indoc! {"
            import Mathlib.Order.Basic
            import Architect

            namespace Proj

            /-- The foo. -/
            @[blueprint]
            def foo : Nat := 1

            /-- Foo is one. -/
            @[blueprint
              (proof := /-- Unfold. -/)
              (proofUses := [Proj.foo])]
            theorem bar : foo = 1 := by
              sorry

            end Proj
        "}
    );
    assert!(!dir.path().join("extra_nodes.lean").exists());
}

#[test]
fn stubs_attach_to_dependents_or_overflow() {
    let dir = project();
    fs::write(dir.path().join("extra_nodes.lean"), "-- existing content\n").unwrap();

    let mut nodes = basic_nodes();
    nodes[0].node.statement.uses.insert("Mathlib.le_refl".to_string());
    nodes.push(at(
        node("Mathlib.le_refl", "Reflexivity.", &[], None),
        "Mathlib/Order/Basic.lean",
        "Mathlib.Order.Basic",
        (1, 0),
        (1, 10),
    ));
    nodes.push(NodeWithPosition::unlocated(node("informal", "", &[], None)));

    let mut diagnostics = Diagnostics::new();
    let summary = annotate_project(&nodes, &options(dir.path()), &mut diagnostics).unwrap();
    assert_eq!(summary.overflow, 1);

    let written = fs::read_to_string(dir.path().join("Proj/Basic.lean")).unwrap();
    assert!(written.contains(
        "attribute [blueprint\n  (statement := /-- Reflexivity. -/)] Mathlib.le_refl\n\n/-- The foo. -/\n@[blueprint]\ndef foo"
    ));

    let overflow = fs::read_to_string(dir.path().join("extra_nodes.lean")).unwrap();
    assert_eq!(
        overflow,
        "-- existing content\nimport Architect\n\n@[blueprint]\ndef informal : (sorry : Type) :=\n  sorry_using []\n"
    );
    assert_eq!(overflow.matches("def informal").count(), 1);
}

#[test]
fn placeable_node_without_file_is_fatal() {
    let dir = project();
    let mut nodes = basic_nodes();
    nodes[1].file = None;

    let mut diagnostics = Diagnostics::new();
    let error = annotate_project(&nodes, &options(dir.path()), &mut diagnostics).unwrap_err();
    assert!(error.to_string().contains("Proj.bar"));
}

#[test]
fn force_uses_lists_every_dependency() {
    let dir = project();
    let mut opts = options(dir.path());
    opts.force_uses = true;

    let mut nodes = basic_nodes();
    nodes.truncate(1);
    nodes[0].node.statement.uses.insert("Proj.other".to_string());

    let mut diagnostics = Diagnostics::new();
    annotate_project(&nodes, &opts, &mut diagnostics).unwrap();

    let written = fs::read_to_string(dir.path().join("Proj/Basic.lean")).unwrap();
    assert!(written.contains("/-- The foo. -/\n@[blueprint\n  (uses := [Proj.other])]\ndef foo : Nat := 1\n"));
}
