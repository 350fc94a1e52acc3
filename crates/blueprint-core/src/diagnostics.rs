//! Structural warnings collected during a conversion run.
//!
//! Nothing here is fatal: every warning corresponds to a locally degraded
//! result (an empty include, a dropped proof, a first-wins duplicate) and the
//! run carries on.

use std::collections::HashSet;
use std::fmt;

/// Types of structural warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// A file includes itself through its own ancestor chain
    CircularInclude,
    /// An included file does not exist
    MissingInclude,
    /// Two statements map to the same identifier; the first one is kept
    DuplicateIdentifier,
    /// A statement has an explicit identifier but no label
    MissingLabel,
    /// A single-value directive was given more than one value
    AmbiguousDirective,
    /// A proof with no statement to attach to
    UnresolvedProof,
    /// `\proves{..}` names a label that is not a known node
    UnknownProvedLabel,
    /// A declaration generated by macro expansion was annotated
    MacroExpansion,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::CircularInclude => "circular-include",
            WarningKind::MissingInclude => "missing-include",
            WarningKind::DuplicateIdentifier => "duplicate-identifier",
            WarningKind::MissingLabel => "missing-label",
            WarningKind::AmbiguousDirective => "ambiguous-directive",
            WarningKind::UnresolvedProof => "unresolved-proof",
            WarningKind::UnknownProvedLabel => "unknown-proved-label",
            WarningKind::MacroExpansion => "macro-expansion",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single structural warning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

/// Warnings gathered over one run.
///
/// Every warning is also forwarded to `tracing` as it is recorded.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
    latched: HashSet<WarningKind>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning.
    pub fn warn(&mut self, kind: WarningKind, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(kind = %kind, "{message}");
        self.warnings.push(Warning { kind, message });
    }

    /// Record a warning only if no warning of this kind went through
    /// `warn_once` before.
    pub fn warn_once(&mut self, kind: WarningKind, message: impl Into<String>) {
        if self.latched.insert(kind) {
            self.warn(kind, message);
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Number of warnings of the given kind
    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}
