//! Commit history extraction via git2.
//!
//! Walks a repository newest-first, extracts each commit's structural
//! change-set (file, class, and method granularity) independently across a
//! worker pool, and assembles the results into a chronologically ascending
//! [`faultline_core::Repository`]. A sequential path produces results
//! identical to the concurrent one.

pub mod filter;
pub mod pipeline;

pub use filter::ScopeFilter;
pub use pipeline::extract_repository;
