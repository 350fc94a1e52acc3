//! Prose conversion through Pandoc.

use crate::process::capture;
use blueprint_core::Transcoder;
use blueprint_core::transcode::OUTPUT_COLUMNS;
use eyre::Result;

/// Markdown flavour requested from Pandoc: plain Markdown without raw HTML,
/// spans, divs or link attributes
pub const MARKDOWN_FORMAT: &str =
    "markdown-raw_html-raw_attribute-bracketed_spans-native_divs-native_spans-link_attributes";

/// [`Transcoder`] that runs one Pandoc process per block of prose
#[derive(Debug, Clone)]
pub struct PandocTranscoder {
    command: String,
}

impl PandocTranscoder {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn arguments() -> [String; 5] {
        [
            "-f".to_string(),
            "latex".to_string(),
            "-t".to_string(),
            MARKDOWN_FORMAT.to_string(),
            format!("--columns={OUTPUT_COLUMNS}"),
        ]
    }
}

impl Default for PandocTranscoder {
    fn default() -> Self {
        Self::new("pandoc")
    }
}

impl Transcoder for PandocTranscoder {
    fn transcode(&self, latex: &str) -> Result<String> {
        let arguments = Self::arguments();
        let arguments: Vec<&str> = arguments.iter().map(String::as_str).collect();
        capture(&self.command, &arguments, latex)
    }
}
