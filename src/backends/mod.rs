//! Backends module - External process integrations
//!
//! Provides:
//! - command: linter execution
//! - lint: per-file orchestration of configured linters
//! - git: changed files and lines

pub mod command;
pub mod git;
pub mod lint;
