use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};

use crate::error::{MakedocError, Result};

/// Default body of `.makedoc/config/makedoc.ignored_paths`.
const DEFAULT_IGNORED_PATHS: &str = "\
###################################################
# This file shall contain all ignored directories
# and files for this project.
#
# Every path that matches those relative or absolute
# paths are to be ignored in both structure representation
# and README documentation.
###################################################

.git
.idea
.makedoc
.venv
.vscode
doc/imgs/
sandbox
tmp
venv

###################################################
# AUTO ADDED:
";

/// Default body of `.makedoc/config/makedoc.ignore_every`.
const DEFAULT_IGNORE_EVERY: &str = "\
###################################################
# This file shall contain all ignored directories
# and files for this project.
#
# Every location or directory which name matches one
# that is provided here shall be ignored
###################################################

README.md
__pycache__
.pytest_cache

###################################################
# AUTO ADDED:
";

/// Default body of `.makedoc/config/makedoc.ignored_extensions`.
const DEFAULT_IGNORED_EXTENSIONS: &str = "\
###################################################
# This file shall contain all ignored file
# extensions for this project.
#
# Every file the extension of which matches one
# that is provided here shall be ignored
###################################################

pdf
txt
";

/// All the on-disk locations that make up a project's `.makedoc` folder.
#[derive(Debug, Clone)]
pub struct MakedocPaths {
    /// The `.makedoc` folder itself, the project marker.
    pub makedoc: PathBuf,
    pub config: PathBuf,
    pub logs: PathBuf,
    /// The packed doc store, `.makedoc/packed_doc.json`.
    pub packed_doc: PathBuf,
    pub ignored_paths: PathBuf,
    pub ignore_every: PathBuf,
    pub ignored_extensions: PathBuf,
    pub files_naming: PathBuf,
    pub config_json: PathBuf,
}

impl MakedocPaths {
    pub fn new(root: &Path) -> Self {
        let makedoc = root.join(".makedoc");
        let config = makedoc.join("config");
        Self {
            logs: makedoc.join("logs"),
            packed_doc: makedoc.join("packed_doc.json"),
            ignored_paths: config.join("makedoc.ignored_paths"),
            ignore_every: config.join("makedoc.ignore_every"),
            ignored_extensions: config.join("makedoc.ignored_extensions"),
            files_naming: config.join("makedoc.files_naming.json"),
            config_json: config.join("config.json"),
            makedoc,
            config,
        }
    }

    /// Create the `.makedoc` folder with default contents.
    ///
    /// Files that already exist are left untouched, so running `init` on an
    /// initialised project never loses anything.
    pub fn scaffold(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config)?;
        std::fs::create_dir_all(&self.logs)?;

        if !self.packed_doc.exists() {
            write_file(&self.packed_doc, "{\n}")?;
        }
        if !self.files_naming.exists() {
            FilesNaming::default().save(&self.files_naming)?;
        }
        if !self.ignored_paths.exists() {
            write_file(&self.ignored_paths, DEFAULT_IGNORED_PATHS)?;
        }
        if !self.ignore_every.exists() {
            write_file(&self.ignore_every, DEFAULT_IGNORE_EVERY)?;
        }
        if !self.ignored_extensions.exists() {
            write_file(&self.ignored_extensions, DEFAULT_IGNORED_EXTENSIONS)?;
        }
        if !self.config_json.exists() {
            ProjectConfig::default().save(&self.config_json)?;
        }
        Ok(())
    }
}

/// Names of the files the tool writes into documented directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesNaming {
    /// Name of the generated doc file
    pub autodoc_file_name: String,

    /// Name of the editable doc file dropped into a directory by `unpack`
    pub unpacked_doc_file_name: String,
}

impl Default for FilesNaming {
    fn default() -> Self {
        Self {
            autodoc_file_name: "README.md".to_string(),
            unpacked_doc_file_name: "dirdoc.makedoc.md".to_string(),
        }
    }
}

impl FilesNaming {
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_file(path)?;
        serde_json::from_str(&content).map_err(|source| MakedocError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = to_pretty_json(self).map_err(|source| MakedocError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        write_file(path, &json)
    }
}

/// Per-project configuration, `.makedoc/config/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub parsing: ParsingConfig,
    pub verbosity: VerbosityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    pub python: PythonParsingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PythonParsingConfig {
    /// Suppress the empty-docstring warning for `__init__.py` files
    pub ignore_init_file_level_docstrings: bool,
}

/// Booleans gating console echo per message severity. The log file is
/// written regardless.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VerbosityConfig {
    pub print_error: bool,
    pub print_info: bool,
    pub print_success: bool,
    pub print_warning: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            parsing: ParsingConfig {
                python: PythonParsingConfig {
                    ignore_init_file_level_docstrings: true,
                },
            },
            verbosity: VerbosityConfig {
                print_error: true,
                print_info: true,
                print_success: true,
                print_warning: true,
            },
        }
    }
}

impl ProjectConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_file(path)?;
        serde_json::from_str(&content).map_err(|source| MakedocError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = to_pretty_json(self).map_err(|source| MakedocError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        write_file(path, &json)
    }

    /// Load configuration with fallback to default
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Serialize a value the way every JSON file in the project is written:
/// four-space indentation.
pub fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8(buf).expect("serde_json output is valid UTF-8"))
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| MakedocError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|source| MakedocError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_uses_kebab_case_keys() {
        let json = to_pretty_json(&ProjectConfig::default()).unwrap();

        assert!(json.contains("\"print-error\": true"));
        assert!(json.contains("\"print-warning\": true"));
        assert!(json.contains("\"ignore-init-file-level-docstrings\": true"));
        // Four-space indentation, not two.
        assert!(json.contains("\n    \"parsing\""));
    }

    #[test]
    fn files_naming_round_trips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("makedoc.files_naming.json");

        FilesNaming::default().save(&path).unwrap();
        let loaded = FilesNaming::load(&path).unwrap();

        assert_eq!(loaded.autodoc_file_name, "README.md");
        assert_eq!(loaded.unpacked_doc_file_name, "dirdoc.makedoc.md");
    }

    #[test]
    fn scaffold_creates_the_full_layout() {
        let temp = TempDir::new().unwrap();
        let paths = MakedocPaths::new(temp.path());

        paths.scaffold().unwrap();

        assert_eq!(std::fs::read_to_string(&paths.packed_doc).unwrap(), "{\n}");
        assert!(paths.logs.is_dir());
        assert!(paths.ignored_paths.is_file());
        assert!(paths.ignore_every.is_file());
        assert!(paths.ignored_extensions.is_file());
        assert!(paths.files_naming.is_file());
        assert!(paths.config_json.is_file());
    }

    #[test]
    fn scaffold_never_overwrites_existing_files() {
        let temp = TempDir::new().unwrap();
        let paths = MakedocPaths::new(temp.path());
        paths.scaffold().unwrap();

        std::fs::write(&paths.packed_doc, "{\n    \"\": \"# custom\\n\"\n}").unwrap();
        std::fs::write(&paths.ignored_extensions, "zip\n").unwrap();
        paths.scaffold().unwrap();

        assert!(std::fs::read_to_string(&paths.packed_doc)
            .unwrap()
            .contains("custom"));
        assert_eq!(
            std::fs::read_to_string(&paths.ignored_extensions).unwrap(),
            "zip\n"
        );
    }
}
