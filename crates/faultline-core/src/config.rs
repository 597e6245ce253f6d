use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FaultlineError;

/// Top-level configuration loaded from `faultline.toml`.
///
/// # Examples
///
/// ```
/// use faultline_core::FaultlineConfig;
///
/// let config = FaultlineConfig::default();
/// assert!(config.extraction.method_granularity);
/// assert!(config.extraction.parallel);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaultlineConfig {
    /// History extraction settings.
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Structural parser settings.
    #[serde(default)]
    pub parsing: ParsingConfig,
}

impl FaultlineConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FaultlineError::Io`] if the file cannot be read, or
    /// [`FaultlineError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use faultline_core::FaultlineConfig;
    /// use std::path::Path;
    ///
    /// let config = FaultlineConfig::from_file(Path::new("faultline.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, FaultlineError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`FaultlineError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use faultline_core::{FaultlineConfig, ParseStrategy};
    ///
    /// let toml = r#"
    /// [extraction]
    /// max_commits = 200
    ///
    /// [parsing.strategies]
    /// java = "heuristic"
    /// "#;
    /// let config = FaultlineConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.extraction.max_commits, Some(200));
    /// assert_eq!(config.parsing.strategy_for("java"), ParseStrategy::Heuristic);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, FaultlineError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// The default configuration file template written by `faultline init`.
    pub fn default_template() -> &'static str {
        r#"# faultline configuration

[extraction]
# Glob patterns for files to exclude from extraction.
ignore_patterns = []
# Cap on the number of commits to extract (unset = full history).
# max_commits = 500
# Also extract class/method-level changes, not just file-level ones.
method_granularity = true
# Extract commits across a worker pool sized to the host CPU count.
parallel = true

[parsing.strategies]
# Structural parser per language: "grammar" or "heuristic".
java = "grammar"
"#
    }
}

/// History extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Glob patterns for files excluded from extraction.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    /// Cap on the number of commits to extract; `None` means full history.
    #[serde(default)]
    pub max_commits: Option<usize>,
    /// Whether to extract class/method-level changes.
    #[serde(default = "default_true")]
    pub method_granularity: bool,
    /// Whether to extract commits concurrently.
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            max_commits: None,
            method_granularity: true,
            parallel: true,
        }
    }
}

/// Structural parser settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Strategy per language name (lowercase), e.g. `java = "heuristic"`.
    #[serde(default)]
    pub strategies: HashMap<String, ParseStrategy>,
}

impl ParsingConfig {
    /// The configured strategy for `language`, defaulting to the grammar
    /// parser when unset.
    pub fn strategy_for(&self, language: &str) -> ParseStrategy {
        self.strategies
            .get(language)
            .copied()
            .unwrap_or(ParseStrategy::Grammar)
    }
}

/// Which structural parser implementation to use for a language.
///
/// Both strategies produce the same output schema; they are interchangeable
/// per language via configuration.
///
/// # Examples
///
/// ```
/// use faultline_core::ParseStrategy;
///
/// let s: ParseStrategy = "heuristic".parse().unwrap();
/// assert_eq!(s, ParseStrategy::Heuristic);
/// assert_eq!(ParseStrategy::default(), ParseStrategy::Grammar);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseStrategy {
    /// Full-grammar syntax-tree parser.
    #[default]
    Grammar,
    /// Error-tolerant single-pass line scanner.
    Heuristic,
}

impl fmt::Display for ParseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseStrategy::Grammar => write!(f, "grammar"),
            ParseStrategy::Heuristic => write!(f, "heuristic"),
        }
    }
}

impl FromStr for ParseStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "grammar" => Ok(ParseStrategy::Grammar),
            "heuristic" => Ok(ParseStrategy::Heuristic),
            other => Err(format!("unknown parse strategy: {other}")),
        }
    }
}

fn default_true() -> bool {
    true
}
