//! Structural source parsing: class/method boundary location in raw text.
//!
//! Two interchangeable strategies implement [`StructureParser`] with an
//! identical output schema: an error-tolerant single-pass line scanner
//! ([`heuristic::HeuristicJavaParser`]) and a full-grammar tree-sitter
//! parser ([`grammar::GrammarJavaParser`]). The active strategy per
//! language is chosen through [`registry::ParserRegistry`], resolved once
//! per file.

pub mod grammar;
pub mod heuristic;
pub mod registry;

use faultline_core::Component;

pub use grammar::GrammarJavaParser;
pub use heuristic::HeuristicJavaParser;
pub use registry::{Language, ParserRegistry};

/// A structural parser locating class/method boundaries in source text.
///
/// Implementations never fail: unparseable input degrades to a partial or
/// empty component list. Each call produces fresh components.
pub trait StructureParser: Send + Sync {
    /// Parse `source` into ordered method/constructor components.
    fn parse(&self, source: &str) -> Vec<Component>;
}
