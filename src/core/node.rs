use std::cell::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::{MakedocError, Result};

use super::context::Context;
use super::report::Message;

const LAST_CONNECTOR: &str = "└── ";
const CONNECTOR: &str = "├── ";
const CONTINUATION: &str = "│   ";
const BLANK_CONTINUATION: &str = "    ";

const HORIZONTAL_RULE: &str = "<hr style=\"border:2px solid gray\"> </hr>\n";

/// A documented non-directory entry. Its doc text is derived from file
/// content on first request and memoised for the rest of the run.
pub struct FileNode {
    path: PathBuf,
    partial_path: String,
    name: String,
    doc: OnceCell<String>,
}

impl FileNode {
    fn new(path: PathBuf, partial_path: String) -> Self {
        let name = file_name_of(&path);
        Self {
            path,
            partial_path,
            name,
            doc: OnceCell::new(),
        }
    }

    /// The doc for this file: empty by default, `# <name>` plus the
    /// extracted comment for extensions with a registered extractor.
    pub fn doc(&self, ctx: &Context) -> Result<String> {
        if let Some(doc) = self.doc.get() {
            return Ok(doc.clone());
        }

        let extension = self.name.rsplit('.').next().unwrap_or("");
        let doc = match ctx.extractors.for_extension(extension) {
            Some(extractor) => {
                let content =
                    fs::read_to_string(&self.path).map_err(|source| MakedocError::ReadFile {
                        path: self.path.clone(),
                        source,
                    })?;
                format!(
                    "# {}\n{}",
                    self.name,
                    extractor.extract(&content, &self.partial_path, ctx)?
                )
            }
            None => String::new(),
        };
        Ok(self.doc.get_or_init(|| doc).clone())
    }
}

/// A documented directory: owns its kept children and drives pack/unpack,
/// tree rendering and full document assembly.
///
/// An ignored directory is a stub: no children, no store entry, and it is
/// dropped from its parent's child lists.
pub struct DirectoryNode {
    path: PathBuf,
    partial_path: String,
    name: String,
    ignored: bool,
    dirs: Vec<DirectoryNode>,
    files: Vec<FileNode>,
}

impl DirectoryNode {
    /// Build the node for `path`, classifying it first.
    pub fn build(path: &Path, ctx: &Context) -> Result<Self> {
        Self::build_inner(path, ctx, false)
    }

    /// Build the node for the project root itself, which is never ignored.
    pub fn build_root(ctx: &Context) -> Result<Self> {
        let root = ctx.root.clone();
        Self::build_inner(&root, ctx, true)
    }

    fn build_inner(path: &Path, ctx: &Context, never_ignored: bool) -> Result<Self> {
        let partial_path = ctx.partial_path(path)?;
        let name = file_name_of(path);
        let ignored = !never_ignored && ctx.is_ignored(path, &partial_path, &name, false);

        let mut node = Self {
            path: path.to_path_buf(),
            partial_path,
            name,
            ignored,
            dirs: Vec::new(),
            files: Vec::new(),
        };
        if node.ignored {
            return Ok(node);
        }

        ctx.store
            .ensure_entry(&node.partial_path, &format!("# {}\n", node.name))?;
        node.enumerate_children(ctx)?;
        Ok(node)
    }

    fn enumerate_children(&mut self, ctx: &Context) -> Result<()> {
        let entries = fs::read_dir(&self.path).map_err(|source| MakedocError::ReadFile {
            path: self.path.clone(),
            source,
        })?;
        for entry in entries {
            let child_path = entry?.path();
            if child_path.is_dir() {
                let child = Self::build_inner(&child_path, ctx, false)?;
                if !child.ignored {
                    self.dirs.push(child);
                }
            } else {
                let partial = ctx.partial_path(&child_path)?;
                let name = file_name_of(&child_path);
                if !ctx.is_ignored(&child_path, &partial, &name, true) {
                    self.files.push(FileNode::new(child_path, partial));
                }
            }
        }
        self.dirs.sort_by(|a, b| a.name.cmp(&b.name));
        self.files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(())
    }

    /// The directory's own free-text doc. The unpacked file on disk wins
    /// over the packed store entry.
    pub fn doc(&self, ctx: &Context) -> Result<String> {
        let unpacked = self.path.join(&ctx.naming.unpacked_doc_file_name);
        if unpacked.is_file() {
            return fs::read_to_string(&unpacked).map_err(|source| MakedocError::ReadFile {
                path: unpacked,
                source,
            });
        }
        ctx.store
            .get(&self.partial_path)?
            .ok_or_else(|| MakedocError::MissingDocEntry(self.partial_path.clone()))
    }

    /// Box-drawing rendering of the subtree: directories first, then files,
    /// both name-sorted. No trailing newline.
    pub fn render_tree(&self) -> String {
        let mut output = format!("{}/\n", self.name);
        let total = self.dirs.len() + self.files.len();
        let mut index = 0;

        for dir in &self.dirs {
            index += 1;
            let last = index == total;
            let mut prefix = if last { LAST_CONNECTOR } else { CONNECTOR };
            for line in dir.render_tree().split('\n') {
                output.push_str(prefix);
                output.push_str(line);
                output.push('\n');
                prefix = if last { BLANK_CONTINUATION } else { CONTINUATION };
            }
        }
        for file in &self.files {
            index += 1;
            let connector = if index == total { LAST_CONNECTOR } else { CONNECTOR };
            output.push_str(connector);
            output.push_str(&file.name);
            output.push('\n');
        }

        output.pop();
        output
    }

    /// Assemble the full generated document: own doc, the structure block,
    /// one re-prefixed block per child, and the generated footer.
    pub fn render_full_document(&self, ctx: &Context) -> Result<String> {
        let mut content = self.doc(ctx)?;

        content.push('\n');
        content.push_str(HORIZONTAL_RULE);
        content.push_str("\n# Structure\n\n```\n");
        content.push_str(&self.render_tree());
        content.push_str("\n```\n");
        content.push_str(HORIZONTAL_RULE);
        content.push('\n');

        for dir in &self.dirs {
            push_quoted(&mut content, &dir.doc(ctx)?);
            content.push_str("\n---\n\n");
        }
        for file in &self.files {
            let doc = file.doc(ctx)?;
            if !doc.is_empty() {
                push_quoted(&mut content, &doc);
                content.push_str("\n---\n\n");
            }
        }

        content.push_str(&format!(
            "\n\n\n\n<sub>This doc was automatically generated with makedoc v{} on{}",
            env!("CARGO_PKG_VERSION"),
            Local::now().format(" %m/%d/%y %H:%M:%S ")
        ));
        Ok(content)
    }

    /// Move the on-disk unpacked doc back into the packed store and delete
    /// the file. Without `recurse`, a directory already packed is a fatal
    /// error; with it, the directory is silently skipped.
    pub fn pack(&self, recurse: bool, ctx: &Context) -> Result<()> {
        let unpacked = self.path.join(&ctx.naming.unpacked_doc_file_name);
        if !unpacked.is_file() {
            if !recurse {
                return Err(MakedocError::NotUnpacked(self.path.clone()));
            }
        } else {
            let doc = fs::read_to_string(&unpacked).map_err(|source| MakedocError::ReadFile {
                path: unpacked.clone(),
                source,
            })?;
            ctx.store.insert(&self.partial_path, doc)?;
            fs::remove_file(&unpacked)?;
        }

        if recurse {
            for dir in &self.dirs {
                dir.pack(true, ctx)?;
            }
        }
        Ok(())
    }

    /// Write the packed doc entry into an editable file inside the
    /// directory. Mirror image of [`DirectoryNode::pack`].
    pub fn unpack(&self, recurse: bool, ctx: &Context) -> Result<()> {
        let unpacked = self.path.join(&ctx.naming.unpacked_doc_file_name);
        if unpacked.is_file() {
            if !recurse {
                return Err(MakedocError::AlreadyUnpacked(self.path.clone()));
            }
        } else {
            let doc = ctx
                .store
                .get(&self.partial_path)?
                .ok_or_else(|| MakedocError::MissingDocEntry(self.partial_path.clone()))?;
            fs::write(&unpacked, doc).map_err(|source| MakedocError::WriteFile {
                path: unpacked.clone(),
                source,
            })?;
        }

        if recurse {
            for dir in &self.dirs {
                dir.unpack(true, ctx)?;
            }
        }
        Ok(())
    }

    /// Write the full document to `save_path`, or to the directory's
    /// configured autodoc file when none is given.
    ///
    /// When recursing, the path resolved here is handed to every descendant
    /// unchanged, so they all write to the same file and the last writer
    /// wins. Long-standing behaviour, kept as is.
    pub fn save_readme(&self, recurse: bool, save_path: Option<&Path>, ctx: &Context) -> Result<()> {
        let save_path = match save_path {
            Some(path) => path.to_path_buf(),
            None => self.path.join(&ctx.naming.autodoc_file_name),
        };
        fs::write(&save_path, self.render_full_document(ctx)?).map_err(|source| {
            MakedocError::WriteFile {
                path: save_path.clone(),
                source,
            }
        })?;

        if recurse {
            for dir in &self.dirs {
                dir.save_readme(true, Some(&save_path), ctx)?;
            }
        }
        Ok(())
    }

    /// Rewrite the directory's autodoc file only when it already exists.
    /// Recursion does not depend on whether this directory had one.
    pub fn update_doc(&self, recurse: bool, ctx: &Context) -> Result<()> {
        let autodoc = self.path.join(&ctx.naming.autodoc_file_name);
        if autodoc.is_file() {
            fs::write(&autodoc, self.render_full_document(ctx)?).map_err(|source| {
                MakedocError::WriteFile {
                    path: autodoc.clone(),
                    source,
                }
            })?;
        }

        if recurse {
            for dir in &self.dirs {
                dir.update_doc(true, ctx)?;
            }
        }
        Ok(())
    }

    /// Compute every doc in the subtree without writing anything, so the
    /// run's log captures all parsing warnings.
    pub fn check(&self, recurse: bool, ctx: &Context) -> Result<()> {
        let doc = self.doc(ctx)?;
        if doc == format!("# {}\n", self.name) {
            ctx.reporter.record(Message::empty_dirdoc(&self.partial_path));
        }
        for file in &self.files {
            file.doc(ctx)?;
        }

        if recurse {
            for dir in &self.dirs {
                dir.check(true, ctx)?;
            }
        }
        Ok(())
    }
}

/// Re-prefix a child doc for inclusion in the parent document: heading
/// lines get one more `#`, everything else becomes a blockquote line.
fn push_quoted(content: &mut String, doc: &str) {
    for line in doc.split('\n') {
        if line.starts_with('#') {
            content.push('#');
        } else {
            content.push('>');
        }
        content.push_str(line);
        content.push('\n');
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
