//! Embeddable core library for locpatch.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking
//! into a build script, an editor plugin, or the `locpatch` binary.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits:
//! - [`RuleSetSource`](ports::RuleSetSource) loads rule documents and the skip list
//! - [`WritePort`](ports::WritePort) writes report artifacts
//! - [`SourceTree`] reads and writes the files being translated
//!
//! The [`adapters`] module provides default filesystem-backed implementations.
//!
//! # Entry points
//!
//! - [`run_apply`](pipeline::run_apply) applies every rule set (or simulates it)
//! - [`run_verify`](pipeline::run_verify) checks rule documents, placeholders and coverage
//! - [`run_coverage`](pipeline::run_coverage) measures translation coverage
//! - [`run_stats`](pipeline::run_stats) counts documents and rules per category

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

// Re-export so embedders don't need locpatch-edit or locpatch-rules directly.
pub use locpatch_edit::{FsSourceTree, InMemorySourceTree, SourceTree};
pub use locpatch_rules::{LoadedRuleSet, RuleSetLoadError, SkipList};
