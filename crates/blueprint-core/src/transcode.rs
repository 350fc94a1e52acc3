//! LaTeX-to-Markdown conversion of node prose.
//!
//! The conversion itself is delegated to a [`Transcoder`] (Pandoc in the CLI).
//! Around that call, citation commands are normalized beforehand, and known
//! artefacts of the transcoder are repaired afterwards.

use crate::node::Node;
use eyre::{Result, WrapErr};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Citation commands recognized by Pandoc's LaTeX reader
pub const CITE_COMMANDS: &[&str] = &[
    "cite", "Cite", "citep", "citep*", "citeal", "citealp", "citealp*", "autocite", "smartcite",
    "footcite", "parencite", "supercite", "footcitetext", "citeyearpar", "citeyear", "autocite*",
    "cite*", "parencite*", "textcite", "citet", "citet*", "citealt", "citealt*", "textcites",
    "cites", "autocites", "footcites", "parencites", "supercites", "footcitetexts", "Autocite",
    "Smartcite", "Footcite", "Parencite", "Supercite", "Footcitetext", "Citeyearpar", "Citeyear",
    "Autocite*", "Cite*", "Parencite*", "Textcite", "Textcites", "Cites", "Autocites", "Footcites",
    "Parencites", "Supercites", "Footcitetexts", "citetext", "citeauthor", "nocite",
];

static CITE: LazyLock<Regex> = LazyLock::new(|| {
    let commands: Vec<String> = CITE_COMMANDS.iter().map(|c| regex::escape(c)).collect();
    Regex::new(&format!(
        r"\\(?:{})\s*(\[.*?\])?\s*\{{(.*?)\}}",
        commands.join("|")
    ))
    .expect("valid cite regex")
});
static BREAK_BEFORE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\n\s*\\end\s*\{(.*?)\}").expect("valid end regex"));
static REF_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\\\[(.*?)\\\]\]\(#(.*?)\)").expect("valid ref link regex")
});
static CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[((?:@[^\s;]+)(?:;\s*@[^\s;]+)*)(.*?)\]").expect("valid citation regex")
});

/// Column width requested from the transcoder
pub const OUTPUT_COLUMNS: usize = 100;

/// Converts one block of LaTeX prose to Markdown
pub trait Transcoder {
    fn transcode(&self, latex: &str) -> Result<String>;
}

/// Rewrite every citation command to plain `\cite[..]{..}`.
pub fn normalize_citations(latex: &str) -> String {
    CITE.replace_all(latex, r"\cite${1}{${2}}").into_owned()
}

/// Repair the transcoder's output.
///
/// - a paragraph break before `\end{..}` collapses to a single newline
/// - `[\[label\]](#label)` links left by unresolved references turn back into
///   `\ref{label}`
/// - `[@a; @b text]` citations become `[a] [b], text`
pub fn postprocess(markdown: &str) -> String {
    let markdown = BREAK_BEFORE_END.replace_all(markdown, "\n\\end{${1}}");
    let markdown = REF_LINK.replace_all(&markdown, |caps: &Captures| {
        if caps[1] == caps[2] {
            format!("\\ref{{{}}}", &caps[1])
        } else {
            caps[0].to_string()
        }
    });
    let markdown = CITATION.replace_all(&markdown, |caps: &Captures| {
        let tags: Vec<String> = caps[1]
            .split(';')
            .map(|part| format!("[{}]", part.trim().trim_start_matches('@')))
            .collect();
        let tags = tags.join(" ");
        let rest = caps[2].trim();
        if rest.is_empty() {
            tags
        } else {
            format!("{tags}, {rest}")
        }
    });
    markdown.trim().to_string()
}

/// Convert a block of LaTeX prose to Markdown through `transcoder`.
pub fn latex_to_markdown(transcoder: &impl Transcoder, latex: &str) -> Result<String> {
    let converted = transcoder.transcode(&normalize_citations(latex))?;
    Ok(postprocess(&converted))
}

/// Convert the statement and proof text of `node` in place.
pub fn transcode_node(transcoder: &impl Transcoder, node: &mut Node) -> Result<()> {
    node.statement.text = latex_to_markdown(transcoder, &node.statement.text)
        .wrap_err_with(|| format!("Failed to convert the statement of {}", node.name))?;
    if let Some(proof) = node.proof.as_mut() {
        proof.text = latex_to_markdown(transcoder, &proof.text)
            .wrap_err_with(|| format!("Failed to convert the proof of {}", node.name))?;
    }
    Ok(())
}
