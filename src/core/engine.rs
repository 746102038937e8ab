use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::MakedocPaths;
use crate::error::{MakedocError, Result};

use super::context::Context;
use super::node::DirectoryNode;
use super::report::Message;

/// Orchestrates one CLI command: resolves the project, builds the node
/// tree, runs the operation and always writes the run's log file.
pub struct Engine;

impl Engine {
    pub fn new() -> Self {
        Self
    }

    /// Scaffold the `.makedoc` folder at `dir` and register every
    /// non-ignored directory in the packed doc store. Idempotent.
    pub fn init(&self, dir: Option<PathBuf>) -> Result<()> {
        let root = resolve_dir(dir)?;
        MakedocPaths::new(&root).scaffold()?;

        let ctx = Context::load(root)?;
        ctx.reporter.record(Message::parsing_starts(""));
        let result = DirectoryNode::build_root(&ctx).map(|_| ());
        self.finish(&ctx, result)
    }

    /// Write the full generated document for `dir` to its autodoc file.
    pub fn generate(&self, dir: Option<PathBuf>) -> Result<()> {
        self.run(dir, |node, ctx| node.save_readme(false, None, ctx))
    }

    /// Pack the directory doc back into the store, optionally rewriting
    /// existing autodoc files afterwards.
    pub fn pack(&self, dir: Option<PathBuf>, recurse: bool, update: bool) -> Result<()> {
        self.run(dir, |node, ctx| {
            node.pack(recurse, ctx)?;
            if update {
                node.update_doc(recurse, ctx)?;
            }
            Ok(())
        })
    }

    /// Unpack the directory doc into an editable file.
    pub fn unpack(&self, dir: Option<PathBuf>, recurse: bool) -> Result<()> {
        self.run(dir, |node, ctx| node.unpack(recurse, ctx))
    }

    /// Rewrite autodoc files that already exist, optionally packing the
    /// directory docs afterwards.
    pub fn update(&self, dir: Option<PathBuf>, recurse: bool, pack: bool) -> Result<()> {
        self.run(dir, |node, ctx| {
            node.update_doc(recurse, ctx)?;
            if pack {
                node.pack(recurse, ctx)?;
            }
            Ok(())
        })
    }

    /// Dry audit: compute every doc and record the warnings, writing
    /// nothing but the log file.
    pub fn check(&self, dir: Option<PathBuf>, recurse: bool) -> Result<()> {
        self.run(dir, |node, ctx| node.check(recurse, ctx))
    }

    fn run<F>(&self, dir: Option<PathBuf>, operation: F) -> Result<()>
    where
        F: FnOnce(&DirectoryNode, &Context) -> Result<()>,
    {
        let target = resolve_dir(dir)?;
        let root = find_project_root(&target)?;
        debug!("project root resolved to {}", root.display());

        let ctx = Context::load(root)?;
        ctx.reporter.record(Message::parsing_starts(""));
        let result = DirectoryNode::build(&target, &ctx).and_then(|node| operation(&node, &ctx));
        self.finish(&ctx, result)
    }

    /// The log file is written whether or not the command succeeded.
    fn finish(&self, ctx: &Context, result: Result<()>) -> Result<()> {
        if result.is_ok() {
            ctx.reporter.record(Message::parsing_finished(""));
        }
        let log_path = ctx.reporter.save(&ctx.paths.logs)?;
        debug!("run log written to {}", log_path.display());
        result
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonicalised target directory; defaults to the current directory.
fn resolve_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    Ok(dir.canonicalize()?)
}

/// Walk upward from `dir` until a directory containing `.makedoc` is found.
pub fn find_project_root(dir: &Path) -> Result<PathBuf> {
    let mut current = dir.to_path_buf();
    loop {
        if current.join(".makedoc").is_dir() {
            return Ok(current);
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return Err(MakedocError::ProjectNotFound(dir.to_path_buf())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use predicates::prelude::*;

    fn some(path: &Path) -> Option<PathBuf> {
        Some(path.to_path_buf())
    }

    #[test]
    fn commands_outside_a_project_fail_before_touching_the_tree() {
        let temp = TempDir::new().unwrap();
        temp.child("lib/a.py").write_str("\"\"\"hello\"\"\"\n").unwrap();

        let result = Engine::new().generate(some(temp.path()));

        assert!(matches!(result, Err(MakedocError::ProjectNotFound(_))));
        assert!(!temp.path().join("README.md").exists());
    }

    #[test]
    fn init_scaffolds_and_registers_the_tree() {
        let temp = TempDir::new().unwrap();
        temp.child("lib").create_dir_all().unwrap();

        Engine::new().init(some(temp.path())).unwrap();

        let packed = std::fs::read_to_string(temp.path().join(".makedoc/packed_doc.json")).unwrap();
        assert!(packed.contains("\"lib\""));
        // One log file per run.
        assert_eq!(
            std::fs::read_dir(temp.path().join(".makedoc/logs")).unwrap().count(),
            1
        );
    }

    #[test]
    fn generate_writes_the_readme_with_structure_and_docs() {
        let temp = TempDir::new().unwrap();
        temp.child("lib/a.py").write_str("\"\"\"hello\"\"\"\n").unwrap();
        let engine = Engine::new();
        engine.init(some(temp.path())).unwrap();

        engine.generate(some(temp.path())).unwrap();
        let root_readme = std::fs::read_to_string(temp.path().join("README.md")).unwrap();

        assert!(predicate::str::contains("└── lib/").eval(&root_readme));
        assert!(predicate::str::contains("    └── a.py").eval(&root_readme));
        assert!(predicate::str::contains("# Structure").eval(&root_readme));

        engine.generate(some(&temp.path().join("lib"))).unwrap();
        let lib_readme = std::fs::read_to_string(temp.path().join("lib/README.md")).unwrap();

        assert!(lib_readme.starts_with("# lib\n"));
        assert!(predicate::str::contains("## a.py\n>hello\n").eval(&lib_readme));
        assert!(predicate::str::contains("└── a.py").eval(&lib_readme));
    }

    #[test]
    fn root_is_resolved_upward_from_nested_directories() {
        let temp = TempDir::new().unwrap();
        temp.child("lib/a.py").write_str("\"\"\"hello\"\"\"\n").unwrap();
        let engine = Engine::new();
        engine.init(some(temp.path())).unwrap();

        // Run from the subdirectory: the store keys stay rooted at temp.
        engine.unpack(some(&temp.path().join("lib")), false).unwrap();

        let dirdoc = temp.path().join("lib/dirdoc.makedoc.md");
        assert_eq!(std::fs::read_to_string(dirdoc).unwrap(), "# lib\n");
    }

    #[test]
    fn failed_commands_still_write_a_log_file() {
        let temp = TempDir::new().unwrap();
        temp.child("lib").create_dir_all().unwrap();
        let engine = Engine::new();
        engine.init(some(temp.path())).unwrap();
        let logs = temp.path().join(".makedoc/logs");
        let before = std::fs::read_dir(&logs).unwrap().count();

        // Packing an already-packed directory is fatal for the command...
        let result = engine.pack(some(&temp.path().join("lib")), false, false);
        assert!(matches!(result, Err(MakedocError::NotUnpacked(_))));

        // ...but the run is still auditable.
        assert!(std::fs::read_dir(&logs).unwrap().count() >= before);
        let newest = std::fs::read_dir(&logs)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .max()
            .unwrap();
        let log = std::fs::read_to_string(newest).unwrap();
        assert!(log.contains("MESSAGE REPORT"));
    }

    #[test]
    fn pack_with_update_rewrites_existing_readmes() {
        let temp = TempDir::new().unwrap();
        temp.child("lib").create_dir_all().unwrap();
        let engine = Engine::new();
        engine.init(some(temp.path())).unwrap();
        engine.generate(some(temp.path())).unwrap();

        engine.unpack(some(temp.path()), false).unwrap();
        std::fs::write(
            temp.path().join("dirdoc.makedoc.md"),
            "# project\n\nFresh description.\n",
        )
        .unwrap();
        engine.pack(some(temp.path()), false, true).unwrap();

        assert!(!temp.path().join("dirdoc.makedoc.md").exists());
        let readme = std::fs::read_to_string(temp.path().join("README.md")).unwrap();
        assert!(readme.starts_with("# project\n\nFresh description.\n"));
    }

    #[test]
    fn check_writes_only_the_log() {
        let temp = TempDir::new().unwrap();
        temp.child("lib/bare.py").write_str("x = 1\n").unwrap();
        let engine = Engine::new();
        engine.init(some(temp.path())).unwrap();

        engine.check(some(temp.path()), true).unwrap();

        assert!(!temp.path().join("README.md").exists());
        let logs = temp.path().join(".makedoc/logs");
        let newest = std::fs::read_dir(&logs)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .max()
            .unwrap();
        let log = std::fs::read_to_string(newest).unwrap();
        assert!(log.contains("Empty file-level docstring"));
        assert!(log.contains("lib/bare.py"));
    }
}
