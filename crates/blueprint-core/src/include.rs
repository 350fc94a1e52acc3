//! Document assembly: inlining `\input{..}` recursively into one buffer.

use crate::diagnostics::{Diagnostics, WarningKind};
use eyre::{Result, WrapErr};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static INPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\input\s*\{([^\}]*)\}").expect("valid input regex"));

/// Default extension appended to `\input` targets that carry none
pub const DEFAULT_EXTENSION: &str = ".tex";

/// Trait for providing the files a document is assembled from
pub trait Documents {
    /// Whether the file exists
    fn exists(&self, path: &Path) -> bool;

    /// Read a file's full content
    fn read(&self, path: &Path) -> Result<String>;
}

/// Documents read straight from the filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct PathDocuments;

impl Documents for PathDocuments {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))
    }
}

/// In-memory documents (useful for testing)
#[derive(Debug, Default, Clone)]
pub struct MemoryDocuments(HashMap<PathBuf, String>);

impl MemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with content
    pub fn add(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.0.insert(path.into(), content.into());
        self
    }
}

impl Documents for MemoryDocuments {
    fn exists(&self, path: &Path) -> bool {
        self.0.contains_key(path)
    }

    fn read(&self, path: &Path) -> Result<String> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| eyre::eyre!("No such document: {}", path.display()))
    }
}

/// A document with every `\input` inlined
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    /// The flattened text
    pub text: String,
    /// Every file that contributed text, in first-read order
    pub files: Vec<PathBuf>,
}

/// Read `root` and recursively inline each `\input{..}` it contains.
///
/// Targets resolve relative to the directory of `root`. A target that is
/// missing, or that is already being expanded further up the chain, is
/// replaced by empty text with a warning.
pub fn resolve_includes(
    documents: &impl Documents,
    root: &Path,
    diagnostics: &mut Diagnostics,
) -> Result<AssembledDocument> {
    let root_dir = root.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut resolver = Resolver {
        documents,
        root_dir,
        chain: Vec::new(),
        files: Vec::new(),
        diagnostics,
    };
    let text = resolver.expand(root)?;
    Ok(AssembledDocument {
        text,
        files: resolver.files,
    })
}

struct Resolver<'a, D: Documents> {
    documents: &'a D,
    root_dir: PathBuf,
    chain: Vec<PathBuf>,
    files: Vec<PathBuf>,
    diagnostics: &'a mut Diagnostics,
}

impl<D: Documents> Resolver<'_, D> {
    fn expand(&mut self, file: &Path) -> Result<String> {
        let source = self.documents.read(file)?;
        if !self.files.iter().any(|f| f == file) {
            self.files.push(file.to_path_buf());
        }
        self.chain.push(file.to_path_buf());

        let mut output = String::with_capacity(source.len());
        let mut last = 0;
        for caps in INPUT.captures_iter(&source) {
            let whole = caps.get(0).expect("group 0 always present");
            output.push_str(&source[last..whole.start()]);
            last = whole.end();

            let target = self.target_path(&caps[1]);
            if self.chain.contains(&target) {
                self.diagnostics.warn(
                    WarningKind::CircularInclude,
                    format!("Circular \\input detected for file: {}", target.display()),
                );
                continue;
            }
            if !self.documents.exists(&target) {
                self.diagnostics.warn(
                    WarningKind::MissingInclude,
                    format!("\\input file not found: {}", target.display()),
                );
                continue;
            }
            let inlined = self.expand(&target)?;
            output.push_str(&inlined);
        }
        output.push_str(&source[last..]);

        self.chain.pop();
        Ok(output)
    }

    fn target_path(&self, argument: &str) -> PathBuf {
        let mut name = argument.trim().to_string();
        if !name.ends_with(DEFAULT_EXTENSION) {
            name.push_str(DEFAULT_EXTENSION);
        }
        self.root_dir.join(name)
    }
}
