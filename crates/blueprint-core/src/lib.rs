//! blueprint-core - Core library for converting LaTeX blueprints
//!
//! This crate provides the building blocks for:
//! - Assembling a blueprint document from its `\input` tree
//! - Extracting statement and proof environments into a dependency graph
//! - Resolving `\uses{..}` and `\ref{..}` labels into Lean identifiers
//! - Ordering nodes and deciding where nodes without a declaration go
//! - Splicing `@[blueprint]` attributes into Lean declarations at exact ranges
//!
//! # Blueprint Syntax
//!
//! Nodes are theorem-like LaTeX environments carrying directives:
//!
//! ```latex
//! \begin{theorem}[Main result]
//!   \label{thm:main} \lean{Proj.main} \leanok
//!   \uses{def:foo}
//!   Every foo is a bar.
//! \end{theorem}
//! \begin{proof}
//!   \uses{lem:aux} By \cref{lem:aux}.
//! \end{proof}
//! ```
//!
//! # Example
//!
//! ```
//! use blueprint_core::{Diagnostics, build_graph, resolve_labels};
//!
//! let source = r"
//! \begin{definition}\label{def:foo}\lean{Foo} A foo. \end{definition}
//! \begin{lemma}\label{lem:bar}\lean{bar}\uses{def:foo} Bars are foos. \end{lemma}
//! ";
//!
//! let mut diagnostics = Diagnostics::new();
//! let mut graph = build_graph(source, false, &mut diagnostics);
//! resolve_labels(&mut graph);
//!
//! let bar = graph.node("bar").unwrap();
//! assert!(bar.statement.uses.contains("Foo"));
//! assert!(diagnostics.is_empty());
//! ```

pub mod annotate;
pub mod apply;
pub mod diagnostics;
pub mod directive;
pub mod graph;
pub mod include;
pub mod labels;
pub mod node;
pub mod placement;
pub mod rewrite;
pub mod sort;
pub mod splice;
pub mod transcode;

pub use annotate::{AttributeFlags, make_docstring, render_attribute};
pub use apply::{AnnotateOptions, AnnotateSummary, annotate_project};
pub use diagnostics::{Diagnostics, Warning, WarningKind};
pub use directive::{DirectiveRecord, extract_directives};
pub use graph::{NodeGraph, build_graph};
pub use include::{AssembledDocument, Documents, MemoryDocuments, PathDocuments, resolve_includes};
pub use labels::resolve_labels;
pub use node::{
    DeclarationLocation, DeclarationRange, Node, NodePart, NodeWithPosition, Position,
};
pub use placement::{PlacementPlan, plan_placement};
pub use rewrite::{RewrittenFile, rewrite_document};
pub use sort::{Dependent, topological_sort};
pub use splice::splice_declaration;
pub use transcode::{Transcoder, transcode_node};
