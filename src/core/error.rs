//! Error types shared by the linting core, the config loader and git helpers

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LintError {
    /// The linter program could not be started at all.
    /// A linter that runs and exits non-zero is never reported here.
    #[error("failed to execute '{program}': {source}")]
    Execution {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid line filter '{template}': {source}")]
    Pattern {
        template: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to read config file '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("git {command} failed: {message}")]
    Git { command: String, message: String },

    #[error("Not a git repository")]
    NotARepository,
}

impl LintError {
    /// Process exit code the CLI uses when this error aborts a run
    pub fn exit_code(&self) -> u8 {
        match self {
            LintError::Config(_) | LintError::ConfigRead { .. } | LintError::ConfigParse(_) => 3,
            LintError::Pattern { .. } => 3,
            LintError::Execution { .. } => 4,
            LintError::Git { .. } | LintError::NotARepository => 128,
        }
    }
}

pub type Result<T> = std::result::Result<T, LintError>;
