//! Exact-range edits of Lean source files.
//!
//! A declaration range comes from the Lean side as 1-indexed lines and byte
//! columns. Only the text inside that range is rewritten; everything before
//! and after is preserved byte for byte.
//!
//! The declaration is assumed to be written in a conventional style. Command
//! modifiers (`open .. in`, `omit .. in`) must each sit on their own line with
//! no comments in between; anything more exotic needs fixing by hand.

use crate::annotate::{AttributeFlags, make_docstring};
use crate::diagnostics::{Diagnostics, WarningKind};
use crate::node::{DeclarationRange, Node, Position};
use eyre::{Result, bail};
use regex::Regex;
use std::sync::LazyLock;

/// Import added to every modified file
pub const IMPORT_LINE: &str = "import Architect";

/// Attribute whose generated twin declarations do not receive annotations
pub const MACRO_MARKER: &str = "to_additive";

static COMMAND_MODIFIERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[a-zA-Z_]+.*?in\n)+").expect("valid modifier regex"));
static DOCSTRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*/--(.*?)-/\s*").expect("valid docstring regex"));
static ATTRIBUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*@\[(.*?)\]\s*").expect("valid attribute regex"));

fn byte_offset(source: &str, pos: Position) -> Result<usize> {
    if pos.line == 0 {
        bail!("line numbers are 1-indexed, got line 0");
    }
    let mut lines = source.split_inclusive('\n');
    let mut offset = 0;
    for _ in 1..pos.line {
        match lines.next() {
            Some(line) => offset += line.len(),
            None => bail!("line {} is past the end of the file", pos.line),
        }
    }
    let offset = offset + pos.column;
    if offset > source.len() || !source.is_char_boundary(offset) {
        bail!(
            "position {}:{} is not a valid offset in the file",
            pos.line,
            pos.column
        );
    }
    Ok(offset)
}

/// Split `source` into the text before, inside and after `range`.
pub fn split_declaration(source: &str, range: DeclarationRange) -> Result<(&str, &str, &str)> {
    let start = byte_offset(source, range.pos)?;
    let end = byte_offset(source, range.end_pos)?;
    if start > end {
        bail!("declaration range ends before it starts");
    }
    Ok((&source[..start], &source[start..end], &source[end..]))
}

/// Add `new_docstring` and `new_attribute` to a declaration, merging with the
/// docstring and attribute list it already has.
///
/// The new docstring goes before the existing one; the new attribute goes
/// after the existing ones. An empty docstring is left out.
pub fn insert_docstring_and_attribute(
    decl: &str,
    new_docstring: &str,
    new_attribute: &str,
    diagnostics: &mut Diagnostics,
) -> String {
    let (modifiers, decl) = match COMMAND_MODIFIERS.find(decl) {
        Some(m) => (m.as_str(), &decl[m.end()..]),
        None => ("", decl),
    };

    let (docstring, decl) = match DOCSTRING.captures(decl) {
        Some(caps) => {
            let end = caps.get(0).map_or(0, |m| m.end());
            (format!("{new_docstring}\n\n{}", caps[1].trim()), &decl[end..])
        }
        None => (new_docstring.to_string(), decl),
    };

    let (attributes, decl) = match ATTRIBUTES.captures(decl) {
        Some(caps) => {
            let end = caps.get(0).map_or(0, |m| m.end());
            (format!("{}, {new_attribute}", &caps[1]), &decl[end..])
        }
        None => (new_attribute.to_string(), decl),
    };

    let docstring = if docstring.trim().is_empty() {
        String::new()
    } else {
        make_docstring(&docstring, 0)
    };

    if let Some(rest) = decl.strip_prefix(MACRO_MARKER) {
        diagnostics.warn_once(
            WarningKind::MacroExpansion,
            "Encountered additive declaration(s) generated from @[to_additive]. \
             The attribute is added through `to_additive (attr := ..)`, so both the \
             multiplicative and the additive declaration end up in the blueprint. \
             Alternatives:\n\
             - Add only the additive declaration by `attribute [blueprint] additive_name`\n\
             - Add only the multiplicative declaration by `@[to_additive, blueprint]`",
        );
        let rest = rest.trim();
        let rest = if rest.is_empty() {
            String::new()
        } else {
            format!("{rest} ")
        };
        return format!("{modifiers}{MACRO_MARKER} (attr := {attributes}) {rest}{docstring}");
    }

    if docstring.is_empty() {
        format!("{modifiers}@[{attributes}]\n{decl}")
    } else {
        format!("{modifiers}{docstring}\n@[{attributes}]\n{decl}")
    }
}

/// Rewrite the declaration at `range` in `source`, optionally preceded by
/// whole `prepend` declarations.
pub fn splice_declaration(
    source: &str,
    range: DeclarationRange,
    new_docstring: &str,
    new_attribute: &str,
    prepend: &[String],
    diagnostics: &mut Diagnostics,
) -> Result<String> {
    let (before, decl, after) = split_declaration(source, range)?;
    let decl = insert_docstring_and_attribute(decl, new_docstring, new_attribute, diagnostics);

    let mut output = String::with_capacity(source.len() + decl.len());
    output.push_str(before);
    for declaration in prepend {
        output.push_str(declaration);
        output.push_str("\n\n");
    }
    output.push_str(&decl);
    output.push_str(after);
    Ok(output)
}

/// Attribute flags for a node whose declaration text is `decl`.
///
/// Without `force_uses`, dependencies are only listed where the inferred ones
/// would be incomplete: the declaration still contains `sorry`, or there are
/// raw uses that Lean cannot infer. The statement text becomes the docstring,
/// never part of the attribute.
pub fn splice_flags(node: &Node, decl: &str, force_uses: bool) -> AttributeFlags {
    let has_sorry = decl.contains("sorry");
    let uses = force_uses || (node.proof.is_none() && has_sorry);
    let proof_uses = force_uses || (node.proof.is_some() && has_sorry);
    AttributeFlags {
        statement_text: false,
        statement_uses: uses,
        statement_uses_raw: uses || !node.statement.uses_raw.is_empty(),
        proof_text: true,
        proof_uses,
        proof_uses_raw: force_uses || node.proof.as_ref().is_some_and(|p| !p.uses_raw.is_empty()),
    }
}

fn is_import(line: &str) -> bool {
    line.starts_with("import ") || line.starts_with("public import ")
}

/// Nesting depth of `/- .. -/` block comments after `line`, starting from `depth`.
fn block_comment_depth(line: &str, mut depth: usize) -> usize {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'/', b'-') => {
                depth += 1;
                i += 2;
            }
            (b'-', b'/') => {
                depth = depth.saturating_sub(1);
                i += 2;
            }
            _ => i += 1,
        }
    }
    depth
}

/// Insert [`IMPORT_LINE`] right after the leading import block.
///
/// Without imports, it goes after a `module`/`prelude` header, or at the top.
/// Block comments (copyright headers, `/-! .. -/` module docs) in the header
/// are skipped over. A file that already imports it is returned unchanged.
pub fn add_import(source: &str) -> String {
    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    let mut insert_at = 0;
    let mut seen_import = false;
    let mut comment_depth = 0;
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if comment_depth > 0 || trimmed.starts_with("/-") {
            comment_depth = block_comment_depth(trimmed, comment_depth);
            continue;
        }
        if is_import(trimmed) {
            if trimmed.trim_start_matches("public ") == IMPORT_LINE {
                return source.to_string();
            }
            insert_at = i + 1;
            seen_import = true;
        } else if trimmed == "module" || trimmed == "prelude" {
            if !seen_import {
                insert_at = i + 1;
            }
        } else if !(trimmed.is_empty() || trimmed.starts_with("--")) {
            break;
        }
    }

    let mut output = String::with_capacity(source.len() + IMPORT_LINE.len() + 2);
    for line in &lines[..insert_at] {
        output.push_str(line);
    }
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
    output.push_str(IMPORT_LINE);
    output.push('\n');
    for line in &lines[insert_at..] {
        output.push_str(line);
    }
    output
}
