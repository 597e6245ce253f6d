//! Structural change correlation between two file versions.
//!
//! [`edits::edit_runs`] classifies line-level changes into ordered runs of
//! purely-added or purely-removed lines; [`correlate::correlate`] maps
//! those runs onto parsed class/method ranges to classify each entity as
//! added, removed, or modified.

pub mod correlate;
pub mod edits;

pub use correlate::{correlate, FileVersion};
pub use edits::edit_runs;
