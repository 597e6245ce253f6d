//! Source-type classification and parser-strategy resolution.
//!
//! An explicit registry maps recognized file extensions to a language and a
//! language to its configured parser strategy, resolved once per file.

use std::path::Path;

use faultline_core::{ParseStrategy, ParsingConfig};

use crate::{GrammarJavaParser, HeuristicJavaParser, StructureParser};

/// Programming language detected from a file extension.
///
/// Every recognized language is in scope for file-level change tracking;
/// only languages with a structural parser (currently Java) contribute
/// class/method-level changes.
///
/// # Examples
///
/// ```
/// use faultline_parse::Language;
///
/// assert_eq!(Language::from_path("src/Api.java"), Language::Java);
/// assert_eq!(Language::from_path("app.py"), Language::Python);
/// assert_eq!(Language::from_path("README.md"), Language::Unknown);
/// assert!(Language::Java.is_source());
/// assert!(!Language::Unknown.is_source());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Java,
    Python,
    Rust,
    TypeScript,
    JavaScript,
    Go,
    C,
    Cpp,
    Ruby,
    Unknown,
}

impl Language {
    /// Detect the language from a path's extension.
    pub fn from_path(path: &str) -> Self {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        match ext {
            "java" => Language::Java,
            "py" => Language::Python,
            "rs" => Language::Rust,
            "ts" | "tsx" => Language::TypeScript,
            "js" | "jsx" => Language::JavaScript,
            "go" => Language::Go,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hxx" | "hh" => Language::Cpp,
            "rb" => Language::Ruby,
            _ => Language::Unknown,
        }
    }

    /// Whether files of this language are in scope for extraction at all.
    pub fn is_source(self) -> bool {
        self != Language::Unknown
    }

    /// Lowercase language name used as the configuration key.
    pub fn name(self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::Python => "python",
            Language::Rust => "rust",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Go => "go",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Ruby => "ruby",
            Language::Unknown => "unknown",
        }
    }
}

/// Registry resolving a path to the structural parser configured for its
/// language, if one exists.
///
/// Built once per extraction run; the change correlator never depends on
/// which strategy is behind the returned parser.
///
/// # Examples
///
/// ```
/// use faultline_core::ParsingConfig;
/// use faultline_parse::ParserRegistry;
///
/// let registry = ParserRegistry::from_config(&ParsingConfig::default());
/// assert!(registry.resolve("src/Api.java").is_some());
/// assert!(registry.resolve("src/lib.rs").is_none());
/// ```
pub struct ParserRegistry {
    java: Box<dyn StructureParser>,
}

impl ParserRegistry {
    /// Build a registry with the strategies selected by `config`.
    pub fn from_config(config: &ParsingConfig) -> Self {
        let java: Box<dyn StructureParser> = match config.strategy_for(Language::Java.name()) {
            ParseStrategy::Grammar => Box::new(GrammarJavaParser),
            ParseStrategy::Heuristic => Box::new(HeuristicJavaParser::new()),
        };
        Self { java }
    }

    /// The structural parser for `path`, or `None` when the file is
    /// tracked at file granularity only.
    pub fn resolve(&self, path: &str) -> Option<&dyn StructureParser> {
        match Language::from_path(path) {
            Language::Java => Some(self.java.as_ref()),
            _ => None,
        }
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::from_config(&ParsingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultline_core::FaultlineConfig;

    #[test]
    fn extension_mapping_covers_common_languages() {
        assert_eq!(Language::from_path("A.java"), Language::Java);
        assert_eq!(Language::from_path("dir/b.py"), Language::Python);
        assert_eq!(Language::from_path("c.ts"), Language::TypeScript);
        assert_eq!(Language::from_path("d.cc"), Language::Cpp);
        assert_eq!(Language::from_path("noext"), Language::Unknown);
        assert_eq!(Language::from_path("archive.tar.gz"), Language::Unknown);
    }

    #[test]
    fn only_java_resolves_to_a_structural_parser() {
        let registry = ParserRegistry::default();
        assert!(registry.resolve("Api.java").is_some());
        assert!(registry.resolve("script.py").is_none());
        assert!(registry.resolve("notes.txt").is_none());
    }

    #[test]
    fn configured_strategy_is_honored() {
        let config = FaultlineConfig::from_toml("[parsing.strategies]\njava = \"heuristic\"\n")
            .unwrap();
        let registry = ParserRegistry::from_config(&config.parsing);
        let source = "\
public class Api {
    public void run() {
    }
}
";
        let parser = registry.resolve("Api.java").unwrap();
        let components = parser.parse(source);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].method, "run");
    }
}
