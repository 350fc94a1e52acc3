//! End-of-run summary printed to stderr.

use crate::pipeline::RunSummary;
use blueprint_core::WarningKind;
use indexmap::IndexMap;
use owo_colors::OwoColorize;
use std::fmt::Write;

/// Render the summary of a completed run.
pub fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} Converted {} node(s): {} annotated in place, {} sent to the overflow file",
        "OK".green().bold(),
        summary.nodes,
        summary.annotated.to_string().green(),
        summary.overflow.to_string().yellow(),
    );
    let _ = writeln!(
        out,
        "   {} Lean file(s) and {} LaTeX file(s) modified",
        summary.lean_files.len(),
        summary.latex_files.len()
    );

    let diagnostics = &summary.diagnostics;
    if diagnostics.is_empty() {
        return out;
    }

    let mut by_kind: IndexMap<WarningKind, usize> = IndexMap::new();
    for warning in diagnostics.warnings() {
        *by_kind.entry(warning.kind).or_default() += 1;
    }
    let _ = writeln!(
        out,
        "{} {} warning(s):",
        "!".yellow().bold(),
        diagnostics.len()
    );
    for (kind, count) in by_kind {
        let _ = writeln!(out, "   {count} {}", kind.yellow());
    }
    out
}
