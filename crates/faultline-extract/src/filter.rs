//! In-scope filtering for extracted files.

use faultline_parse::Language;

/// Decides which paths participate in extraction.
///
/// A path is in scope when its extension maps to a recognized source
/// language and it matches none of the configured exclusion globs.
///
/// # Examples
///
/// ```
/// use faultline_extract::ScopeFilter;
///
/// let filter = ScopeFilter::new(&["**/generated/**".to_string()]);
/// assert!(filter.in_scope("src/Api.java"));
/// assert!(!filter.in_scope("src/generated/Stub.java"));
/// assert!(!filter.in_scope("README.md"));
/// ```
pub struct ScopeFilter {
    patterns: Vec<glob::Pattern>,
}

impl ScopeFilter {
    /// Build a filter from exclusion glob patterns. Invalid patterns are
    /// ignored.
    pub fn new(patterns: &[String]) -> Self {
        let mut compiled = Vec::new();
        for pattern in patterns {
            if let Ok(p) = glob::Pattern::new(pattern) {
                compiled.push(p);
            }
        }
        Self { patterns: compiled }
    }

    /// Whether `path` participates in extraction.
    pub fn in_scope(&self, path: &str) -> bool {
        Language::from_path(path).is_source() && !self.patterns.iter().any(|p| p.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_extensions_are_in_scope() {
        let filter = ScopeFilter::new(&[]);
        assert!(filter.in_scope("Api.java"));
        assert!(filter.in_scope("deep/path/app.py"));
        assert!(!filter.in_scope("image.png"));
        assert!(!filter.in_scope("Makefile"));
    }

    #[test]
    fn exclusion_globs_remove_matches() {
        let filter = ScopeFilter::new(&["test/**".to_string(), "**/*Test.java".to_string()]);
        assert!(!filter.in_scope("test/Fixture.java"));
        assert!(!filter.in_scope("src/ApiTest.java"));
        assert!(filter.in_scope("src/Api.java"));
    }

    #[test]
    fn invalid_patterns_are_ignored() {
        let filter = ScopeFilter::new(&["[".to_string()]);
        assert!(filter.in_scope("src/Api.java"));
    }
}
