//! One conversion run, from `web.tex` to annotated Lean files.
//!
//! Stages, in order: assemble the document, extract the node graph, resolve
//! labels, filter nodes, look up declaration positions, convert prose,
//! write attributes and stubs, and replace converted environments in the
//! LaTeX sources. The run is sequential; the first fatal error stops it and
//! files already written stay written.

use crate::config::Config;
use crate::positions::PositionLookup;
use blueprint_core::node::{nodes_to_json, nodes_with_position_from_json};
use blueprint_core::{
    AnnotateOptions, Diagnostics, Documents, Transcoder, annotate_project, build_graph,
    resolve_includes, resolve_labels, rewrite_document, transcode_node,
};
use eyre::{Result, WrapErr};
use std::path::PathBuf;

/// The external programs a run talks to
pub struct Collaborators<'a, T: Transcoder, P: PositionLookup> {
    pub transcoder: &'a T,
    pub positions: &'a P,
}

/// What a completed run did
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Nodes extracted from the blueprint after filtering
    pub nodes: usize,
    /// Declarations annotated in place
    pub annotated: usize,
    /// Stubs written to the overflow file
    pub overflow: usize,
    /// Lean files modified
    pub lean_files: Vec<PathBuf>,
    /// LaTeX files rewritten
    pub latex_files: Vec<PathBuf>,
    pub diagnostics: Diagnostics,
}

/// Result of [`run`]
#[derive(Debug)]
pub enum Outcome {
    /// `extract_only` was set; the position-augmented JSON, nothing written
    Extracted(String),
    Converted(RunSummary),
}

/// Run the whole conversion described by `config`.
pub fn run<T: Transcoder, P: PositionLookup>(
    config: &Config,
    documents: &impl Documents,
    collaborators: Collaborators<'_, T, P>,
) -> Result<Outcome> {
    let mut diagnostics = Diagnostics::new();

    let root = config.root_document();
    tracing::info!("Reading blueprint LaTeX file {}", root.display());
    let assembled = resolve_includes(documents, &root, &mut diagnostics)?;

    tracing::info!("Parsing nodes in blueprint LaTeX");
    let mut graph = build_graph(&assembled.text, config.convert_informal, &mut diagnostics);
    resolve_labels(&mut graph);
    let (nodes, raw_sources) = graph.into_parts();
    let nodes: Vec<_> = nodes
        .into_iter()
        .filter(|node| config.selects(&node.name))
        .collect();
    tracing::info!(nodes = nodes.len(), "extracted nodes");

    let nodes_json = nodes_to_json(&nodes).wrap_err("Failed to serialize nodes")?;

    tracing::info!("Adding position information to nodes");
    let positioned_json = collaborators
        .positions
        .lookup(&nodes_json, &config.modules)
        .wrap_err("Position lookup failed")?;
    if config.extract_only {
        return Ok(Outcome::Extracted(positioned_json));
    }

    let mut positioned = nodes_with_position_from_json(&positioned_json)
        .wrap_err("Failed to parse the position lookup's output")?;

    tracing::info!("Converting LaTeX to Markdown");
    for node in &mut positioned {
        transcode_node(collaborators.transcoder, &mut node.node)?;
    }

    tracing::info!("Writing @[blueprint] attributes to Lean files");
    let options = AnnotateOptions {
        project_root: config.project_root.clone(),
        modules: config.modules.clone(),
        overflow_file: config.root_file.clone(),
        force_uses: config.add_uses,
    };
    let annotated = annotate_project(&positioned, &options, &mut diagnostics)?;

    tracing::info!("Replacing LaTeX environments with \\inputleannode");
    let rewritten = rewrite_document(
        documents,
        &assembled.files,
        positioned.iter().map(|node| node.name()),
        &raw_sources,
    )?;
    for file in &rewritten {
        tracing::debug!(file = %file.path.display(), "rewriting");
        file.write()?;
    }

    Ok(Outcome::Converted(RunSummary {
        nodes: positioned.len(),
        annotated: annotated.annotated,
        overflow: annotated.overflow,
        lean_files: annotated.modified_files,
        latex_files: rewritten.into_iter().map(|file| file.path).collect(),
        diagnostics,
    }))
}
