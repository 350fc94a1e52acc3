//! Replacing converted environments in the LaTeX sources.
//!
//! Once a node's statement and proof live in the Lean project, the blueprint
//! only needs a reference to it. The first block that contributed to a node
//! becomes `\inputleannode{name}` and every further block (duplicate
//! statements, the proof) is removed.

use crate::graph::is_commented;
use crate::include::Documents;
use eyre::{Result, WrapErr};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The command standing in for a converted node
pub fn node_marker(name: &str) -> String {
    format!("\\inputleannode{{{name}}}")
}

/// New content for one LaTeX file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenFile {
    pub path: PathBuf,
    pub content: String,
}

impl RewrittenFile {
    pub fn write(&self) -> Result<()> {
        std::fs::write(&self.path, &self.content)
            .wrap_err_with(|| format!("Failed to write {}", self.path.display()))
    }
}

/// Compute the rewritten content of every file in `files` that contains a
/// block of one of `names`.
///
/// Each raw block is replaced at its first uncommented occurrence in the
/// first file containing one. Blocks that span several files are left alone.
pub fn rewrite_document<'a>(
    documents: &impl Documents,
    files: &[PathBuf],
    names: impl IntoIterator<Item = &'a str>,
    raw_sources: &HashMap<String, Vec<String>>,
) -> Result<Vec<RewrittenFile>> {
    let mut contents: Vec<(&Path, String, bool)> = Vec::with_capacity(files.len());
    for path in files {
        contents.push((path.as_path(), documents.read(path)?, false));
    }

    for name in names {
        let Some(blocks) = raw_sources.get(name) else {
            continue;
        };
        for (i, block) in blocks.iter().enumerate() {
            let replacement = if i == 0 { node_marker(name) } else { String::new() };
            let found = contents.iter_mut().find_map(|(_, content, changed)| {
                live_occurrence(content, block).map(|start| (content, changed, start))
            });
            match found {
                Some((content, changed, start)) => {
                    content.replace_range(start..start + block.len(), &replacement);
                    *changed = true;
                }
                None => tracing::debug!(node = %name, "block not found in a single file, leaving it"),
            }
        }
    }

    Ok(contents
        .into_iter()
        .filter(|(_, _, changed)| *changed)
        .map(|(path, content, _)| RewrittenFile {
            path: path.to_path_buf(),
            content,
        })
        .collect())
}

/// Offset of the first occurrence of `block` that is not commented out.
fn live_occurrence(content: &str, block: &str) -> Option<usize> {
    content
        .match_indices(block)
        .map(|(start, _)| start)
        .find(|&start| !is_commented(content, start))
}
