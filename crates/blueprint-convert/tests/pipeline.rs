//! End-to-end runs of the conversion pipeline against a project on disk,
//! with Pandoc and Lake replaced by in-process fakes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use blueprint_convert::config::discover_blueprint_root;
use blueprint_convert::{Collaborators, Config, Outcome, PositionLookup, run};
use blueprint_core::node::{DeclarationLocation, DeclarationRange, Position};
use blueprint_core::{Node, NodeWithPosition, PathDocuments, Transcoder};
use eyre::Result;
use indoc::indoc;

// ============================================================================
// Fakes
// ============================================================================

struct Identity;

impl Transcoder for Identity {
    fn transcode(&self, latex: &str) -> Result<String> {
        Ok(latex.to_string())
    }
}

struct Failing;

impl Transcoder for Failing {
    fn transcode(&self, _latex: &str) -> Result<String> {
        eyre::bail!("pandoc failed with exit status: 64")
    }
}

/// Answers from a fixed table of declarations and records what it was asked.
struct FakePositions {
    declarations: HashMap<&'static str, (&'static str, (usize, usize), (usize, usize))>,
    requested: RefCell<Vec<String>>,
}

impl FakePositions {
    fn new() -> Self {
        let mut declarations = HashMap::new();
        declarations.insert("Proj.foo", ("Proj.Basic", (5, 0), (5, 18)));
        declarations.insert("Proj.bar", ("Proj.Basic", (7, 0), (8, 7)));
        Self {
            declarations,
            requested: RefCell::new(Vec::new()),
        }
    }
}

impl PositionLookup for FakePositions {
    fn lookup(&self, nodes_json: &str, modules: &[String]) -> Result<String> {
        assert_eq!(modules, ["Proj".to_string()]);
        let nodes: Vec<Node> = serde_json::from_str(nodes_json)?;
        let positioned: Vec<NodeWithPosition> = nodes
            .into_iter()
            .map(|node| {
                self.requested.borrow_mut().push(node.name.clone());
                match self.declarations.get(node.name.as_str()) {
                    Some(&(module, start, end)) => NodeWithPosition::located(
                        node,
                        format!("{}.lean", module.replace('.', "/")),
                        DeclarationLocation {
                            module: module.to_string(),
                            range: DeclarationRange {
                                pos: Position::new(start.0, start.1),
                                end_pos: Position::new(end.0, end.1),
                            },
                        },
                    ),
                    None => NodeWithPosition::unlocated(node),
                }
            })
            .collect();
        Ok(serde_json::to_string(&positioned)?)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

const WEB: &str = indoc! {r"
    \documentclass{report}
    \usepackage{blueprint}
    \begin{document}
    \input{chapter}
    \end{document}
"};

const CHAPTER: &str = indoc! {r"
    \begin{definition}\label{def:foo}\lean{Proj.foo}\leanok
      The foo.
    \end{definition}

    \begin{theorem}\label{thm:bar}\lean{Proj.bar}
      Foo is one.
    \end{theorem}
    \begin{proof}\uses{def:foo}
      Unfold.
    \end{proof}

    \begin{lemma}\label{lem:informal}
      Only on paper.
    \end{lemma}
"};

const BASIC: &str = indoc! {"
    import Mathlib.Order.Basic

    namespace Proj

    def foo : Nat := 1

    theorem bar : foo = 1 := by
      sorry

    end Proj
"};

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("blueprint/src")).unwrap();
    fs::create_dir_all(dir.path().join("Proj")).unwrap();
    fs::write(dir.path().join("blueprint/src/web.tex"), WEB).unwrap();
    fs::write(dir.path().join("blueprint/src/chapter.tex"), CHAPTER).unwrap();
    fs::write(dir.path().join("Proj/Basic.lean"), BASIC).unwrap();
    dir
}

fn config(root: &Path) -> Config {
    Config {
        modules: vec!["Proj".to_string()],
        nodes: Vec::new(),
        blueprint_root: discover_blueprint_root(root).unwrap(),
        project_root: root.to_path_buf(),
        root_file: PathBuf::from("extra_nodes.lean"),
        extract_only: false,
        convert_informal: false,
        add_uses: false,
        lake_command: "lake".to_string(),
        pandoc_command: "pandoc".to_string(),
    }
}

fn read(root: &Path, path: &str) -> String {
    fs::read_to_string(root.join(path)).unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn converts_blueprint_into_attributes() {
    let dir = project();
    let positions = FakePositions::new();
    let outcome = run(
        &config(dir.path()),
        &PathDocuments,
        Collaborators {
            transcoder: &Identity,
            positions: &positions,
        },
    )
    .unwrap();

    let Outcome::Converted(summary) = outcome else {
        panic!("expected a conversion");
    };
    assert_eq!(summary.nodes, 2);
    assert_eq!(summary.annotated, 2);
    assert_eq!(summary.overflow, 0);
    assert!(summary.diagnostics.is_empty());

    assert_eq!(
        read(dir.path(), "Proj/Basic.lean"),
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

    let chapter = read(dir.path(), "blueprint/src/chapter.tex");
    assert!(chapter.starts_with("\\inputleannode{Proj.foo}\n\n\\inputleannode{Proj.bar}\n"));
    assert!(!chapter.contains("\\begin{proof}"));
    assert!(chapter.contains("\\begin{lemma}\\label{lem:informal}"));
    assert_eq!(read(dir.path(), "blueprint/src/web.tex"), WEB);
    assert_eq!(summary.latex_files.len(), 1);
}

#[test]
fn informal_nodes_go_to_overflow_file() {
    let dir = project();
    let mut config = config(dir.path());
    config.convert_informal = true;

    let positions = FakePositions::new();
    let outcome = run(
        &config,
        &PathDocuments,
        Collaborators {
            transcoder: &Identity,
            positions: &positions,
        },
    )
    .unwrap();
    let Outcome::Converted(summary) = outcome else {
        panic!("expected a conversion");
    };
    assert_eq!(summary.overflow, 1);

    let overflow = read(dir.path(), "extra_nodes.lean");
    assert!(overflow.starts_with("import Architect\n\n/-- Only on paper. -/\n@[blueprint"));
    assert!(overflow.contains("(latexEnv := \"lemma\")"));
    assert!(overflow.contains("sorry_using []"));

    let chapter = read(dir.path(), "blueprint/src/chapter.tex");
    assert!(!chapter.contains("\\begin{lemma}"));
}

#[test]
fn node_filter_limits_lookup_and_rewrite() {
    let dir = project();
    let mut config = config(dir.path());
    config.nodes = vec!["Proj.bar".to_string()];

    let positions = FakePositions::new();
    run(
        &config,
        &PathDocuments,
        Collaborators {
            transcoder: &Identity,
            positions: &positions,
        },
    )
    .unwrap();

    assert_eq!(*positions.requested.borrow(), vec!["Proj.bar".to_string()]);
    let chapter = read(dir.path(), "blueprint/src/chapter.tex");
    assert!(chapter.contains("\\begin{definition}"));
    assert!(chapter.contains("\\inputleannode{Proj.bar}"));
    assert!(read(dir.path(), "Proj/Basic.lean").contains("def foo : Nat := 1\n\n/-- Foo is one. -/"));
}

#[test]
fn extract_only_touches_nothing() {
    let dir = project();
    let mut config = config(dir.path());
    config.extract_only = true;

    let positions = FakePositions::new();
    let outcome = run(
        &config,
        &PathDocuments,
        Collaborators {
            transcoder: &Failing,
            positions: &positions,
        },
    )
    .unwrap();

    let Outcome::Extracted(json) = outcome else {
        panic!("expected extracted JSON");
    };
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(2));
    assert_eq!(value[0]["name"], "Proj.foo");
    assert_eq!(value[0]["hasLean"], true);
    assert_eq!(value[1]["proof"]["uses"], serde_json::json!(["Proj.foo"]));

    assert_eq!(read(dir.path(), "Proj/Basic.lean"), BASIC);
    assert_eq!(read(dir.path(), "blueprint/src/chapter.tex"), CHAPTER);
}

#[test]
fn transcoder_failure_aborts_before_writing() {
    let dir = project();
    let positions = FakePositions::new();
    let error = run(
        &config(dir.path()),
        &PathDocuments,
        Collaborators {
            transcoder: &Failing,
            positions: &positions,
        },
    )
    .unwrap_err();

    assert!(format!("{error:#}").contains("exit status: 64"));
    assert_eq!(read(dir.path(), "Proj/Basic.lean"), BASIC);
}

#[test]
fn missing_root_document_is_fatal() {
    let dir = project();
    let mut config = config(dir.path());
    config.blueprint_root = dir.path().join("nowhere");

    let positions = FakePositions::new();
    assert!(
        run(
            &config,
            &PathDocuments,
            Collaborators {
                transcoder: &Identity,
                positions: &positions,
            },
        )
        .is_err()
    );
}
