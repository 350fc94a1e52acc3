//! Writing `@[blueprint]` attributes into the Lean project.
//!
//! Edits are applied latest-declaration-first within each file so that
//! earlier declaration ranges stay valid. Files are written one at a time; a
//! failure part-way leaves earlier files modified.

use crate::annotate::render_attribute;
use crate::diagnostics::Diagnostics;
use crate::node::NodeWithPosition;
use crate::placement::{PlacementPlan, plan_placement};
use crate::splice::{IMPORT_LINE, add_import, splice_declaration, split_declaration, splice_flags};
use eyre::{Result, WrapErr, eyre};
use indexmap::IndexSet;
use std::path::{Path, PathBuf};

/// Options for annotating the Lean project
#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    /// Directory that node `file` paths are relative to
    pub project_root: PathBuf,
    /// Root modules whose declarations may be edited
    pub modules: Vec<String>,
    /// File receiving stubs that have no dependent to attach to
    pub overflow_file: PathBuf,
    /// List `uses`/`proofUses` on every node, not only where inference falls short
    pub force_uses: bool,
}

/// What [`annotate_project`] changed
#[derive(Debug, Default, Clone)]
pub struct AnnotateSummary {
    /// Number of declarations annotated in place
    pub annotated: usize,
    /// Files that were rewritten, in first-modified order
    pub modified_files: Vec<PathBuf>,
    /// Number of stubs appended to the overflow file
    pub overflow: usize,
}

/// Annotate one placeable node in its file, with `prepend` stubs before it.
fn annotate_node(
    node: &NodeWithPosition,
    path: &Path,
    prepend: &[String],
    force_uses: bool,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let name = node.name();
    let location = node
        .location
        .as_ref()
        .ok_or_else(|| eyre!("node {name} is placeable but has no declaration location"))?;

    let source = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {} for node {name}", path.display()))?;
    let (_, decl, _) = split_declaration(&source, location.range)
        .wrap_err_with(|| format!("Invalid declaration range for node {name} in {}", path.display()))?;

    let flags = splice_flags(&node.node, decl, force_uses);
    let attribute = render_attribute(&node.node, &flags);
    let rewritten = splice_declaration(
        &source,
        location.range,
        &node.node.statement.text,
        &attribute,
        prepend,
        diagnostics,
    )?;

    std::fs::write(path, rewritten)
        .wrap_err_with(|| format!("Failed to write {}", path.display()))
}

/// Append overflow stubs after the existing content of `path`.
pub fn write_overflow(path: &Path, stubs: &[String]) -> Result<()> {
    let mut existing = if path.exists() {
        std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?
    } else {
        String::new()
    };
    if !existing.is_empty() && !existing.ends_with('\n') {
        existing.push('\n');
    }
    let content = format!("{existing}{IMPORT_LINE}\n\n{}\n", stubs.join("\n\n"));
    std::fs::write(path, content).wrap_err_with(|| format!("Failed to write {}", path.display()))
}

/// Apply an already computed plan.
pub fn apply_plan(
    nodes: &[NodeWithPosition],
    plan: &PlacementPlan,
    options: &AnnotateOptions,
    diagnostics: &mut Diagnostics,
) -> Result<AnnotateSummary> {
    let mut summary = AnnotateSummary::default();
    let mut modified: IndexSet<PathBuf> = IndexSet::new();

    for &index in &plan.splice_order {
        let node = &nodes[index];
        let name = node.name();
        let file = node
            .file
            .as_deref()
            .ok_or_else(|| eyre!("node {name} is placeable but has no file"))?;
        let path = options.project_root.join(file);
        let prepend = plan.prepends.get(name).map(Vec::as_slice).unwrap_or_default();

        tracing::debug!(node = %name, file = %path.display(), stubs = prepend.len(), "annotating");
        annotate_node(node, &path, prepend, options.force_uses, diagnostics)?;
        summary.annotated += 1;
        modified.insert(path);
    }

    for path in &modified {
        let source = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        std::fs::write(path, add_import(&source))
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    }
    summary.modified_files = modified.into_iter().collect();

    if !plan.overflow.is_empty() {
        let path = options.project_root.join(&options.overflow_file);
        tracing::warn!(
            "Outputting {} node(s) to {}; you may want to move them to appropriate locations.",
            plan.overflow.len(),
            path.display()
        );
        write_overflow(&path, &plan.overflow)?;
        summary.overflow = plan.overflow.len();
    }

    Ok(summary)
}

/// Plan placement for `nodes` and write every annotation and stub.
pub fn annotate_project(
    nodes: &[NodeWithPosition],
    options: &AnnotateOptions,
    diagnostics: &mut Diagnostics,
) -> Result<AnnotateSummary> {
    let plan = plan_placement(nodes, &options.modules);
    apply_plan(nodes, &plan, options, diagnostics)
}
