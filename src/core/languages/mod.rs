//! Doc extractors for recognised source file types.
//!
//! Each extractor turns one file's text into the documentation text for
//! that file; files with no matching extractor contribute nothing but
//! their name to the tree diagram.

mod python;

pub use python::PythonExtractor;

use crate::error::Result;

use super::context::Context;

/// Trait implemented by every language-specific doc extractor.
pub trait DocExtractor {
    /// File extensions (after the last dot) this extractor handles.
    fn extensions(&self) -> &[&str];

    /// Language name, used as the fence tag for inlined snippets.
    fn language_name(&self) -> &str;

    /// Extract the documentation text for one file. Parsing problems are
    /// recorded through the context's reporter, never raised.
    fn extract(&self, content: &str, partial_path: &str, ctx: &Context) -> Result<String>;
}

/// The registered extractors, looked up by file extension.
pub struct ExtractorSet {
    extractors: Vec<Box<dyn DocExtractor>>,
}

impl ExtractorSet {
    pub fn new() -> Self {
        Self {
            extractors: vec![Box::new(PythonExtractor::new())],
        }
    }

    pub fn for_extension(&self, extension: &str) -> Option<&dyn DocExtractor> {
        self.extractors
            .iter()
            .find(|extractor| extractor.extensions().contains(&extension))
            .map(|boxed| boxed.as_ref())
    }
}

impl Default for ExtractorSet {
    fn default() -> Self {
        Self::new()
    }
}
