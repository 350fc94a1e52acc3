//! Directive extraction for blueprint environments.
//!
//! A directive is a LaTeX command that carries graph metadata instead of
//! renderable prose:
//!
//! ```text
//! \begin{theorem}[Title]
//!   \label{thm:main} \lean{Main.theorem} \leanok
//!   \uses{def:foo, lem:bar}
//!   Every foo is a bar.
//! \end{theorem}
//! ```
//!
//! This is not a LaTeX parser. Arguments are matched up to the first closing
//! brace, and the label lookup skips nested environments with a non-reentrant
//! scan that does not handle nested environments of the same name. Only the
//! first label found is used.

use crate::diagnostics::{Diagnostics, WarningKind};
use regex::{Match, Regex};
use std::sync::LazyLock;

static BEGIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\begin\s*\{(.*?)\}").expect("valid begin regex"));
static END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\end\s*\{(.*?)\}").expect("valid end regex"));

/// How many occurrences of an argument directive to strip from the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Strip only the first occurrence
    First,
    /// Strip every occurrence
    All,
}

/// Metadata carried by the directives of one environment block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveRecord {
    /// `\label{..}` of the outermost environment
    pub label: Option<String>,
    /// `\uses{..}`, as raw labels
    pub uses: Vec<String>,
    /// `\alsoIn{..}`
    pub also_in: Vec<String>,
    /// `\proves{..}`
    pub proves: Option<String>,
    /// `\leanok`
    pub lean_ok: bool,
    /// `\notready`
    pub not_ready: bool,
    /// `\mathlibok`
    pub mathlib_ok: bool,
    /// `\lean{..}`, the explicit identifier
    pub lean: Option<String>,
    /// `\discussion{..}`, when it parses as an integer
    pub discussion: Option<u64>,
}

fn flag_pattern(command: &str) -> Regex {
    Regex::new(&format!(r"\\{}\b", regex::escape(command))).expect("escaped command is a valid regex")
}

fn argument_pattern(command: &str) -> Regex {
    Regex::new(&format!(r"\\{}\s*\{{([^\}}]*)\}}", regex::escape(command)))
        .expect("escaped command is a valid regex")
}

/// A directive command with its pattern, compiled on first use
pub struct Directive {
    name: &'static str,
    pattern: LazyLock<Regex>,
}

pub static LABEL: Directive = Directive {
    name: "label",
    pattern: LazyLock::new(|| argument_pattern("label")),
};
pub static USES: Directive = Directive {
    name: "uses",
    pattern: LazyLock::new(|| argument_pattern("uses")),
};
pub static ALSO_IN: Directive = Directive {
    name: "alsoIn",
    pattern: LazyLock::new(|| argument_pattern("alsoIn")),
};
pub static PROVES: Directive = Directive {
    name: "proves",
    pattern: LazyLock::new(|| argument_pattern("proves")),
};
pub static LEAN: Directive = Directive {
    name: "lean",
    pattern: LazyLock::new(|| argument_pattern("lean")),
};
pub static DISCUSSION: Directive = Directive {
    name: "discussion",
    pattern: LazyLock::new(|| argument_pattern("discussion")),
};
pub static LEAN_OK: Directive = Directive {
    name: "leanok",
    pattern: LazyLock::new(|| flag_pattern("leanok")),
};
pub static NOT_READY: Directive = Directive {
    name: "notready",
    pattern: LazyLock::new(|| flag_pattern("notready")),
};
pub static MATHLIB_OK: Directive = Directive {
    name: "mathlibok",
    pattern: LazyLock::new(|| flag_pattern("mathlibok")),
};

impl Directive {
    /// Whether the boolean directive occurs, and the text with every
    /// occurrence removed.
    pub fn find_and_remove_flag(&self, source: &str) -> (bool, String) {
        let found = self.pattern.is_match(source);
        (found, self.pattern.replace_all(source, "").into_owned())
    }

    /// Comma-separated arguments of every occurrence, and the text with the
    /// directive removed according to `removal`.
    pub fn find_and_remove_arguments(&self, source: &str, removal: Removal) -> (Vec<String>, String) {
        let values = self
            .pattern
            .captures_iter(source)
            .flat_map(|caps| {
                caps[1]
                    .split(',')
                    .map(|item| item.trim().to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|item| !item.is_empty())
            .collect();
        let stripped = match removal {
            Removal::First => self.pattern.replacen(source, 1, ""),
            Removal::All => self.pattern.replace_all(source, ""),
        };
        (values, stripped.into_owned())
    }

    /// The single argument, with its first occurrence removed.
    ///
    /// Only the first value is kept when several are present.
    pub fn find_and_remove_argument(
        &self,
        source: &str,
        diagnostics: &mut Diagnostics,
    ) -> (Option<String>, String) {
        let (values, stripped) = self.find_and_remove_arguments(source, Removal::First);
        if values.len() > 1 {
            diagnostics.warn(
                WarningKind::AmbiguousDirective,
                format!(
                    "Multiple \\{} arguments found: {}; only using the first one.",
                    self.name,
                    values.join(", ")
                ),
            );
        }
        (values.into_iter().next(), stripped)
    }
}

/// The first `\end{name}` at or after `from`.
pub(crate) fn find_end<'s>(source: &'s str, from: usize, name: &str) -> Option<Match<'s>> {
    let mut search_from = from;
    while let Some(caps) = END.captures_at(source, search_from) {
        let end = caps.get(0)?;
        if &caps[1] == name {
            return Some(end);
        }
        search_from = end.end();
    }
    None
}

/// Remove every `\begin{env} .. \end{env}` span, matching each begin with the
/// first end of the same name after it.
pub fn strip_environments(source: &str) -> String {
    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;
    let mut search_from = 0;
    while let Some(caps) = BEGIN.captures_at(source, search_from) {
        let Some(begin) = caps.get(0) else { break };
        match find_end(source, begin.end(), &caps[1]) {
            Some(end) => {
                output.push_str(&source[cursor..begin.start()]);
                cursor = end.end();
                search_from = end.end();
            }
            None => search_from = begin.end(),
        }
    }
    output.push_str(&source[cursor..]);
    output
}

/// Replace every `~` that is not escaped as `\~` with a plain space, then trim.
pub fn normalize_nonbreaking_spaces(source: &str) -> String {
    let mut output = String::with_capacity(source.len());
    let mut previous = None;
    for ch in source.chars() {
        if ch == '~' && previous != Some('\\') {
            output.push(' ');
        } else {
            output.push(ch);
        }
        previous = Some(ch);
    }
    output.trim().to_string()
}

/// Extract every directive from an environment body.
///
/// Returns the record and the remaining prose, trimmed.
pub fn extract_directives(source: &str, diagnostics: &mut Diagnostics) -> (DirectiveRecord, String) {
    let source = normalize_nonbreaking_spaces(source);

    let (label, _) = LABEL.find_and_remove_argument(&strip_environments(&source), diagnostics);
    let source = match &label {
        Some(label) => source.replace(&format!("\\label{{{label}}}"), ""),
        None => source,
    };

    let (uses, source) = USES.find_and_remove_arguments(&source, Removal::All);
    let (also_in, source) = ALSO_IN.find_and_remove_arguments(&source, Removal::All);
    let (proves, source) = PROVES.find_and_remove_argument(&source, diagnostics);

    let (lean_ok, source) = LEAN_OK.find_and_remove_flag(&source);
    let (not_ready, source) = NOT_READY.find_and_remove_flag(&source);
    let (mathlib_ok, source) = MATHLIB_OK.find_and_remove_flag(&source);
    let (lean, source) = LEAN.find_and_remove_argument(&source, diagnostics);
    let (discussion, source) = DISCUSSION.find_and_remove_argument(&source, diagnostics);

    let record = DirectiveRecord {
        label,
        uses,
        also_in,
        proves,
        lean_ok,
        not_ready,
        mathlib_ok,
        lean,
        discussion: discussion.and_then(|d| d.parse().ok()),
    };
    (record, source.trim().to_string())
}
