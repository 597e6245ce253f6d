//! Core types, configuration, and error handling for faultline.
//!
//! This crate provides the shared foundation used by all other faultline
//! crates:
//! - [`FaultlineError`]: unified error type using `thiserror`
//! - [`FaultlineConfig`]: configuration loaded from `faultline.toml`
//! - The change model: [`Component`], [`EditRun`], [`Change`], [`Commit`],
//!   [`Repository`]

mod config;
mod error;
mod types;

pub use config::{ExtractionConfig, FaultlineConfig, ParseStrategy, ParsingConfig};
pub use error::FaultlineError;
pub use types::{
    Change, ChangeOp, ClassChange, Commit, Component, EditKind, EditRun, FileChange, MethodChange,
    Repository,
};

/// A convenience `Result` type for faultline operations.
pub type Result<T> = std::result::Result<T, FaultlineError>;
