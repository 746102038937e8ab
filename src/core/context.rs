use std::path::{Path, PathBuf};

use crate::config::{FilesNaming, MakedocPaths, ProjectConfig};
use crate::error::{MakedocError, Result};

use super::ignore_rules::{IgnoreRules, PathProbe};
use super::languages::ExtractorSet;
use super::report::Reporter;
use super::store::PackedDocStore;

/// Everything a doc node needs from its project, loaded once per command
/// and threaded by reference through construction and queries.
pub struct Context {
    pub root: PathBuf,
    pub paths: MakedocPaths,
    pub naming: FilesNaming,
    pub config: ProjectConfig,
    pub rules: IgnoreRules,
    pub store: PackedDocStore,
    pub extractors: ExtractorSet,
    pub reporter: Reporter,
}

impl Context {
    pub fn load(root: PathBuf) -> Result<Self> {
        let paths = MakedocPaths::new(&root);
        let naming = FilesNaming::load(&paths.files_naming)?;
        let config = ProjectConfig::load_or_default(&paths.config_json)?;
        let rules = IgnoreRules::load(&paths)?;
        let store = PackedDocStore::new(paths.packed_doc.clone());
        let reporter = Reporter::new(config.verbosity.clone());
        Ok(Self {
            extractors: ExtractorSet::new(),
            root,
            paths,
            naming,
            config,
            rules,
            store,
            reporter,
        })
    }

    /// A node's path relative to the project root, forward-slash separated
    /// on every platform, empty for the root itself.
    pub fn partial_path(&self, path: &Path) -> Result<String> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| MakedocError::OutsideRoot(path.to_path_buf()))?;
        let parts: Vec<_> = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect();
        Ok(parts.join("/"))
    }

    /// Classify one entry against the loaded rule lists.
    pub fn is_ignored(&self, path: &Path, partial: &str, name: &str, is_file: bool) -> bool {
        self.rules.is_ignored(
            &PathProbe {
                absolute: path,
                partial,
                name,
                is_file,
            },
            &self.naming.unpacked_doc_file_name,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_path_is_posix_and_empty_for_the_root() {
        let temp = TempDir::new().unwrap();
        MakedocPaths::new(temp.path()).scaffold().unwrap();
        let ctx = Context::load(temp.path().to_path_buf()).unwrap();

        assert_eq!(ctx.partial_path(temp.path()).unwrap(), "");
        assert_eq!(
            ctx.partial_path(&temp.path().join("lib").join("a.py")).unwrap(),
            "lib/a.py"
        );
    }

    #[test]
    fn paths_outside_the_root_are_rejected() {
        let temp = TempDir::new().unwrap();
        MakedocPaths::new(temp.path()).scaffold().unwrap();
        let ctx = Context::load(temp.path().to_path_buf()).unwrap();

        let outside = Path::new("/somewhere/else");
        assert!(matches!(
            ctx.partial_path(outside),
            Err(MakedocError::OutsideRoot(_))
        ));
    }
}
