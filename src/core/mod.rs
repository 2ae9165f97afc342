//! Core module - data model, configuration and output filtering
//!
//! This module provides:
//! - Linter and configuration model, lint outcomes
//! - Configuration loading (YAML)
//! - Line filtering of linter output
//! - Rendering of reports (text/json)
//! - Error types and path helpers

pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod paths;
pub mod render;
