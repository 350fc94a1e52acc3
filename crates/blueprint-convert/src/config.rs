//! Command-line arguments and the resolved run configuration.
//!
//! Flag names are kebab-case; the underscore spellings (`--blueprint_root`,
//! `--extract_only`, ...) are accepted as aliases.

use clap::Parser;
use eyre::{Result, bail};
use std::path::{Path, PathBuf};

/// Root document of every blueprint
pub const ROOT_DOCUMENT: &str = "web.tex";

/// Blueprint roots tried in order when none is given
pub const BLUEPRINT_ROOT_CANDIDATES: &[&str] = &["blueprint/src", "blueprint"];

/// Convert an existing LaTeX blueprint into `@[blueprint]` attributes on Lean declarations.
#[derive(Debug, Clone, Parser)]
#[command(name = "blueprint-convert", version)]
pub struct Args {
    /// Lean modules to convert; their (sub)modules receive the attributes
    #[arg(long, required = true, num_args = 1..)]
    pub modules: Vec<String>,

    /// Lean names of the nodes to convert (default: every node)
    #[arg(long, num_args = 0..)]
    pub nodes: Vec<String>,

    /// Directory containing web.tex (default: blueprint/src or blueprint)
    #[arg(long, alias = "blueprint_root")]
    pub blueprint_root: Option<PathBuf>,

    /// Lean file receiving nodes that have nowhere else to go
    #[arg(long, alias = "root_file", default_value = "extra_nodes.lean")]
    pub root_file: PathBuf,

    /// Root of the Lean project; declaration files are relative to it
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,

    /// Print the position-augmented nodes as JSON and stop
    #[arg(long, alias = "extract_only")]
    pub extract_only: bool,

    /// Also convert nodes that have no `\lean{..}`
    #[arg(long, alias = "convert_informal")]
    pub convert_informal: bool,

    /// Add `uses` and `proofUses` to every node, not only to those with `sorry`
    #[arg(long, alias = "add_uses")]
    pub add_uses: bool,

    /// Executable used for the position lookup
    #[arg(long, env = "BLUEPRINT_LAKE", default_value = "lake")]
    pub lake: String,

    /// Executable used to convert LaTeX prose to Markdown
    #[arg(long, env = "BLUEPRINT_PANDOC", default_value = "pandoc")]
    pub pandoc: String,
}

/// Everything one run needs to know
#[derive(Debug, Clone)]
pub struct Config {
    pub modules: Vec<String>,
    /// Node filter; empty means every node
    pub nodes: Vec<String>,
    pub blueprint_root: PathBuf,
    pub project_root: PathBuf,
    /// Overflow file, relative to `project_root`
    pub root_file: PathBuf,
    pub extract_only: bool,
    pub convert_informal: bool,
    pub add_uses: bool,
    pub lake_command: String,
    pub pandoc_command: String,
}

impl Config {
    /// Resolve `args`, discovering the blueprint root under the project root
    /// when it was not given.
    pub fn from_args(args: Args) -> Result<Self> {
        let blueprint_root = match args.blueprint_root {
            Some(root) => root,
            None => discover_blueprint_root(&args.project_root)?,
        };
        Ok(Self {
            modules: args.modules,
            nodes: args.nodes,
            blueprint_root,
            project_root: args.project_root,
            root_file: args.root_file,
            extract_only: args.extract_only,
            convert_informal: args.convert_informal,
            add_uses: args.add_uses,
            lake_command: args.lake,
            pandoc_command: args.pandoc,
        })
    }

    /// Path of the blueprint's root document
    pub fn root_document(&self) -> PathBuf {
        self.blueprint_root.join(ROOT_DOCUMENT)
    }

    /// Whether `name` passes the node filter
    pub fn selects(&self, name: &str) -> bool {
        self.nodes.is_empty() || self.nodes.iter().any(|n| n == name)
    }
}

/// Find the first candidate directory under `project_root` holding `web.tex`.
pub fn discover_blueprint_root(project_root: &Path) -> Result<PathBuf> {
    for candidate in BLUEPRINT_ROOT_CANDIDATES {
        let root = project_root.join(candidate);
        if root.join(ROOT_DOCUMENT).is_file() {
            return Ok(root);
        }
    }
    bail!(
        "{ROOT_DOCUMENT} not found in {} under {}",
        BLUEPRINT_ROOT_CANDIDATES.join(" or "),
        project_root.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("blueprint-convert").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn modules_are_required() {
        assert!(Args::try_parse_from(["blueprint-convert"]).is_err());
        assert!(Args::try_parse_from(["blueprint-convert", "--modules"]).is_err());
    }

    #[test]
    fn underscore_aliases_and_defaults() {
        let args = parse(&[
            "--modules",
            "Proj",
            "Other",
            "--extract_only",
            "--blueprint_root",
            "bp",
            "--nodes",
            "Proj.a",
        ]);
        assert_eq!(args.modules, vec!["Proj", "Other"]);
        assert_eq!(args.nodes, vec!["Proj.a"]);
        assert!(args.extract_only);
        assert!(!args.add_uses);
        assert_eq!(args.root_file, PathBuf::from("extra_nodes.lean"));

        let config = Config::from_args(args).unwrap();
        assert_eq!(config.root_document(), PathBuf::from("bp/web.tex"));
        assert!(config.selects("Proj.a"));
        assert!(!config.selects("Proj.b"));
    }

    #[test]
    fn blueprint_root_prefers_src() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_blueprint_root(dir.path()).is_err());

        std::fs::create_dir_all(dir.path().join("blueprint/src")).unwrap();
        std::fs::write(dir.path().join("blueprint/web.tex"), "").unwrap();
        assert_eq!(
            discover_blueprint_root(dir.path()).unwrap(),
            dir.path().join("blueprint")
        );

        std::fs::write(dir.path().join("blueprint/src/web.tex"), "").unwrap();
        assert_eq!(
            discover_blueprint_root(dir.path()).unwrap(),
            dir.path().join("blueprint/src")
        );
    }
}
