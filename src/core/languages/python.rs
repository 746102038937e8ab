use crate::core::context::Context;
use crate::core::report::Message;
use crate::core::snippets::SnippetEngine;
use crate::error::Result;

use super::DocExtractor;

/// Extracts the leading triple-quoted comment of a Python file and resolves
/// the dynamic snippet references it contains.
pub struct PythonExtractor {
    snippets: SnippetEngine,
}

impl PythonExtractor {
    pub fn new() -> Self {
        Self {
            snippets: SnippetEngine::new(),
        }
    }

    /// Scan for the leading triple-quoted block and return its lines.
    ///
    /// `None` means the comment is absent: either no opener was found or
    /// the file ended before the closing marker.
    fn leading_comment(&self, lines: &[&str]) -> Option<Vec<String>> {
        let mut collected: Vec<String> = Vec::new();
        let mut marker: Option<&str> = None;

        for line in lines {
            match marker {
                None => {
                    let stripped = line.trim_start();
                    let opener = if stripped.starts_with("'''") {
                        "'''"
                    } else if stripped.starts_with("\"\"\"") {
                        "\"\"\""
                    } else {
                        continue;
                    };
                    marker = Some(opener);

                    let rest = stripped[3..].trim_end();
                    if rest.ends_with(opener) {
                        // Single-line comment: the whole block shares the
                        // opener's line.
                        let inner = line.trim();
                        return Some(vec![inner[3..inner.len() - 3].to_string()]);
                    } else if !rest.is_empty() {
                        collected.push(rest.to_string());
                    }
                }
                Some(marker) => {
                    let from_start = line.trim_start();
                    let to_end = line.trim_end();
                    if from_start.starts_with(marker) {
                        // Closer alone on its own line.
                        return Some(collected);
                    } else if to_end.ends_with(marker) {
                        // Closer shares a line with content.
                        collected.push(to_end[..to_end.len() - 3].to_string());
                        return Some(collected);
                    } else {
                        collected.push(to_end.to_string());
                    }
                }
            }
        }

        None
    }
}

impl DocExtractor for PythonExtractor {
    fn extensions(&self) -> &[&str] {
        &["py"]
    }

    fn language_name(&self) -> &str {
        "python"
    }

    fn extract(&self, content: &str, partial_path: &str, ctx: &Context) -> Result<String> {
        let lines: Vec<&str> = content.lines().collect();

        let comment = match self.leading_comment(&lines) {
            Some(comment) => comment,
            None => {
                let name = partial_path.rsplit('/').next().unwrap_or(partial_path);
                let suppress = name == "__init__.py"
                    && ctx.config.parsing.python.ignore_init_file_level_docstrings;
                if !suppress {
                    ctx.reporter.record(Message::empty_docstring(partial_path));
                }
                return Ok(String::new());
            }
        };

        let snippets = self
            .snippets
            .extract_snippets(&lines, partial_path, &ctx.reporter);
        Ok(self.snippets.resolve_snippet_references(
            &comment,
            &snippets,
            self.language_name(),
            partial_path,
            &ctx.reporter,
        ))
    }
}
