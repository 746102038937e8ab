use std::collections::{HashMap, HashSet};

use regex::Regex;

use super::report::{Message, Reporter};

/// Finds named `begin:`/`end:` regions in source text and inlines them at
/// `makedoc-snippet:` reference points inside a doc comment.
///
/// Markers are detected by regex search, not exact match, so they may sit
/// anywhere on a line, typically trailing a comment token.
pub struct SnippetEngine {
    begin_regex: Regex,
    end_regex: Regex,
    reference_regex: Regex,
}

impl SnippetEngine {
    pub fn new() -> Self {
        Self {
            begin_regex: Regex::new(r"begin:([\w-]+)").expect("invalid snippet begin regex"),
            end_regex: Regex::new(r"end:([\w-]+)").expect("invalid snippet end regex"),
            reference_regex: Regex::new(r"makedoc-snippet:([\w-]+)")
                .expect("invalid snippet reference regex"),
        }
    }

    /// Capture every named region in `lines`.
    ///
    /// A region opens on the line after its `begin:<name>` marker; the line
    /// carrying `end:<name>` is the last line captured for it. A line inside
    /// several open regions is captured by each of them. A second `begin`
    /// for an open name keeps the first region open; a name still open at
    /// end of input is reported once, and its partial capture is kept.
    pub fn extract_snippets(
        &self,
        lines: &[&str],
        path: &str,
        reporter: &Reporter,
    ) -> HashMap<String, Vec<String>> {
        let mut snippets: HashMap<String, Vec<String>> = HashMap::new();
        let mut open: Vec<String> = Vec::new();

        for line in lines {
            let mut closing: Vec<String> = Vec::new();
            for caps in self.end_regex.captures_iter(line) {
                let name = caps[1].to_string();
                if open.contains(&name) {
                    closing.push(name);
                }
            }

            // The end line itself still belongs to every region open on it,
            // including the ones it closes.
            for name in &open {
                snippets.entry(name.clone()).or_default().push((*line).to_string());
            }
            open.retain(|name| !closing.contains(name));

            for caps in self.begin_regex.captures_iter(line) {
                let name = &caps[1];
                if open.iter().any(|n| n == name) {
                    reporter.record(Message::snippet_already_began(path, name));
                } else {
                    open.push(name.to_string());
                }
            }
        }

        if let Some(name) = open.last() {
            reporter.record(Message::snippet_unclosed(path, name));
        }

        snippets
    }

    /// Rewrite a doc comment, replacing each `makedoc-snippet:<name>` line
    /// with a fenced code block holding the captured region.
    ///
    /// A reference to an unknown name is reported and the line dropped; a
    /// captured region that is never referenced is reported too.
    pub fn resolve_snippet_references(
        &self,
        comment_lines: &[String],
        snippets: &HashMap<String, Vec<String>>,
        language: &str,
        path: &str,
        reporter: &Reporter,
    ) -> String {
        let mut referenced: HashSet<String> = HashSet::new();
        let mut out = String::new();

        for line in comment_lines {
            let caps = match self.reference_regex.captures(line) {
                None => {
                    out.push_str(line);
                    out.push('\n');
                    continue;
                }
                Some(caps) => caps,
            };
            let name = &caps[1];
            match snippets.get(name) {
                Some(captured) => {
                    referenced.insert(name.to_string());
                    out.push_str("```");
                    out.push_str(language);
                    out.push('\n');
                    for snippet_line in captured {
                        out.push_str(snippet_line);
                        out.push('\n');
                    }
                    out.push_str("```\n");
                }
                None => reporter.record(Message::snippet_undefined(path, name)),
            }
        }

        // Sorted so the warning order does not depend on map iteration.
        let mut unreferenced: Vec<&String> = snippets
            .keys()
            .filter(|name| !referenced.contains(name.as_str()))
            .collect();
        unreferenced.sort();
        for name in unreferenced {
            reporter.record(Message::snippet_unreferenced(path, name));
        }

        out
    }
}

impl Default for SnippetEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VerbosityConfig;
    use crate::core::report::Severity;

    fn reporter() -> Reporter {
        Reporter::new(VerbosityConfig {
            print_error: false,
            print_info: false,
            print_success: false,
            print_warning: false,
        })
    }

    fn warnings_with_code(reporter: &Reporter, code: u16) -> Vec<Message> {
        reporter
            .messages()
            .into_iter()
            .filter(|m| m.severity == Severity::Warning && m.code == code)
            .collect()
    }

    #[test]
    fn extract_captures_end_marker_line() {
        let engine = SnippetEngine::new();
        let reporter = reporter();
        let lines = ["# begin:x", "a = 1", "b = 2", "c = 3", "# end:x"];

        let snippets = engine.extract_snippets(&lines, "lib/a.py", &reporter);

        assert_eq!(snippets.len(), 1);
        assert_eq!(
            snippets["x"],
            vec![
                "a = 1".to_string(),
                "b = 2".to_string(),
                "c = 3".to_string(),
                "# end:x".to_string(),
            ]
        );
        assert!(reporter.messages().is_empty());
    }

    #[test]
    fn markers_are_found_anywhere_on_a_line() {
        let engine = SnippetEngine::new();
        let reporter = reporter();
        let lines = ["setup()  # begin:mid setup code", "y = 2", "teardown()  # end:mid"];

        let snippets = engine.extract_snippets(&lines, "lib/a.py", &reporter);

        assert_eq!(
            snippets["mid"],
            vec!["y = 2".to_string(), "teardown()  # end:mid".to_string()]
        );
    }

    #[test]
    fn overlapping_regions_each_capture_shared_lines() {
        let engine = SnippetEngine::new();
        let reporter = reporter();
        let lines = [
            "# begin:outer",
            "a",
            "# begin:inner",
            "b",
            "# end:inner",
            "c",
            "# end:outer",
        ];

        let snippets = engine.extract_snippets(&lines, "lib/a.py", &reporter);

        assert_eq!(snippets["inner"], vec!["b".to_string(), "# end:inner".to_string()]);
        assert_eq!(
            snippets["outer"],
            vec![
                "a".to_string(),
                "# begin:inner".to_string(),
                "b".to_string(),
                "# end:inner".to_string(),
                "c".to_string(),
                "# end:outer".to_string(),
            ]
        );
    }

    #[test]
    fn reopening_an_open_snippet_warns_and_keeps_the_first() {
        let engine = SnippetEngine::new();
        let reporter = reporter();
        let lines = ["# begin:x", "first", "# begin:x", "second", "# end:x"];

        let snippets = engine.extract_snippets(&lines, "lib/a.py", &reporter);

        assert_eq!(
            snippets["x"],
            vec![
                "first".to_string(),
                "# begin:x".to_string(),
                "second".to_string(),
                "# end:x".to_string(),
            ]
        );
        let warnings = warnings_with_code(&reporter, 102);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].content.contains("'x'"));
    }

    #[test]
    fn unclosed_snippet_warns_exactly_once() {
        let engine = SnippetEngine::new();
        let reporter = reporter();
        let lines = ["# begin:y", "kept anyway"];

        let snippets = engine.extract_snippets(&lines, "lib/a.py", &reporter);

        // The partial capture is still surfaced.
        assert_eq!(snippets["y"], vec!["kept anyway".to_string()]);
        let warnings = warnings_with_code(&reporter, 103);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].content.contains("'y'"));
    }

    #[test]
    fn resolve_inlines_known_references_as_fenced_blocks() {
        let engine = SnippetEngine::new();
        let reporter = reporter();
        let mut snippets = HashMap::new();
        snippets.insert("x".to_string(), vec!["l1".to_string(), "l2".to_string()]);
        let comment = vec![
            "intro".to_string(),
            "see makedoc-snippet:x".to_string(),
            "outro".to_string(),
        ];

        let resolved =
            engine.resolve_snippet_references(&comment, &snippets, "python", "lib/a.py", &reporter);

        assert_eq!(resolved, "intro\n```python\nl1\nl2\n```\noutro\n");
        assert!(reporter.messages().is_empty());
    }

    #[test]
    fn unknown_reference_warns_and_drops_the_line() {
        let engine = SnippetEngine::new();
        let reporter = reporter();
        let comment = vec!["makedoc-snippet:ghost".to_string(), "rest".to_string()];

        let resolved = engine.resolve_snippet_references(
            &comment,
            &HashMap::new(),
            "python",
            "lib/a.py",
            &reporter,
        );

        assert_eq!(resolved, "rest\n");
        let warnings = warnings_with_code(&reporter, 105);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].content.contains("'ghost'"));
    }

    #[test]
    fn unreferenced_definition_warns_once_and_is_not_inlined() {
        let engine = SnippetEngine::new();
        let reporter = reporter();
        let mut snippets = HashMap::new();
        snippets.insert("used".to_string(), vec!["u".to_string()]);
        snippets.insert("orphan".to_string(), vec!["o".to_string()]);
        let comment = vec!["makedoc-snippet:used".to_string()];

        let resolved =
            engine.resolve_snippet_references(&comment, &snippets, "python", "lib/a.py", &reporter);

        assert_eq!(resolved, "```python\nu\n```\n");
        let warnings = warnings_with_code(&reporter, 104);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].content.contains("'orphan'"));
    }
}
