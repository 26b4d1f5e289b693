//! Preview and commit batches of filesystem mutations confined to one root.
//!
//! A plan is an ordered list of [`Operation`]s run against a root directory.
//! Every path is resolved through [`sandbox::RootDir`] before the filesystem
//! is touched, and each operation succeeds or fails on its own.
//!
//! Commits against the same root are serialized within one [`PlanExecutor`];
//! nothing coordinates separate processes working on overlapping roots.

pub mod commands;
pub mod config;
pub mod core;
pub mod executor;
pub mod logging;
pub mod mcp;
pub mod sandbox;
pub mod substitute;
pub mod walker;

pub use crate::config::Settings;
pub use crate::core::{
    Entry, EntryKind, ListRequest, Operation, PlanRequest, PlanResult, PlanStep, PreviewLine,
    ReplaceMode, RootPlanError,
};
pub use crate::executor::{CancelFlag, ExecutionMode, ExecutorConfig, PlanExecutor};
pub use crate::sandbox::RootDir;
pub use crate::walker::list_entries;
