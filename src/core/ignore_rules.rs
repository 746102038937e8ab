use std::path::Path;

use crate::config::MakedocPaths;
use crate::error::{MakedocError, Result};

/// The three exclusion rule lists, loaded once per run.
///
/// Rule files are newline-delimited; `#`-prefixed lines are comments and
/// blank lines are inert, so neither can ever match an entry.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    /// Exact absolute paths, exact relative paths, or relative directory
    /// prefixes ending in `/`.
    path_rules: Vec<String>,

    /// Bare file or directory names, matched regardless of location.
    name_rules: Vec<String>,

    /// Dotted suffixes after the first `.` in a file name.
    extension_rules: Vec<String>,
}

/// Everything `is_ignored` needs to know about one filesystem entry.
pub struct PathProbe<'a> {
    pub absolute: &'a Path,
    pub partial: &'a str,
    pub name: &'a str,
    pub is_file: bool,
}

impl IgnoreRules {
    pub fn load(paths: &MakedocPaths) -> Result<Self> {
        Ok(Self {
            path_rules: read_rule_lines(&paths.ignored_paths)?,
            name_rules: read_rule_lines(&paths.ignore_every)?,
            extension_rules: read_rule_lines(&paths.ignored_extensions)?,
        })
    }

    /// Decide whether an entry is excluded from traversal and documentation.
    ///
    /// Checks run in order and short-circuit on the first match: the
    /// unpacked doc file name, then path rules (the parent directory of a
    /// non-root entry also matches as `parent/`), then name rules, then,
    /// for files only, extension rules.
    pub fn is_ignored(&self, probe: &PathProbe<'_>, unpacked_doc_file_name: &str) -> bool {
        if probe.name == unpacked_doc_file_name {
            return true;
        }

        let absolute = probe.absolute.to_string_lossy();
        let parent = probe.partial.rsplit_once('/').map(|(p, _)| p).unwrap_or("");
        let parent_prefix = format!("{parent}/");
        for rule in &self.path_rules {
            if rule == absolute.as_ref() {
                return true;
            }
            if !probe.partial.is_empty() && (rule == probe.partial || *rule == parent_prefix) {
                return true;
            }
        }

        if self.name_rules.iter().any(|rule| rule == probe.name) {
            return true;
        }

        if probe.is_file {
            // Everything after the first dot; a name with no dot yields an
            // empty string, which no surviving rule line can equal.
            let extension = probe.name.split_once('.').map(|(_, rest)| rest).unwrap_or("");
            if self.extension_rules.iter().any(|rule| rule == extension) {
                return true;
            }
        }

        false
    }
}

fn read_rule_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|source| MakedocError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}
