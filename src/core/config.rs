//! Linter configuration loading
//!
//! The configuration is a YAML document mapping linter names to their
//! command line and filter. It is flattened into extension -> linters,
//! keeping the order in which linters appear in the document.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::error::{LintError, Result};
use crate::core::filter::build_line_pattern;
use crate::core::model::{LintConfig, Linter, LINES_PLACEHOLDER};

/// Name of the per-repository configuration file
pub const CONFIG_FILE_NAME: &str = ".gitlint.yaml";

const DEFAULT_CONFIG: &str = include_str!("default_config.yaml");

#[derive(Debug, Deserialize)]
struct LinterEntry {
    extensions: Vec<String>,
    command: String,
    #[serde(default)]
    arguments: Vec<String>,
    filter: String,
    #[serde(default)]
    installation: Option<String>,
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Default,
}

/// Parse a YAML configuration document
pub fn parse_config(text: &str) -> Result<LintConfig> {
    let mut config = LintConfig::new();
    if text.trim().is_empty() {
        return Ok(config);
    }

    let document: serde_yaml::Mapping = serde_yaml::from_str(text)?;

    for (key, value) in document {
        let name = key
            .as_str()
            .ok_or_else(|| LintError::Config(format!("linter name must be a string: {:?}", key)))?
            .to_string();
        let entry: LinterEntry = serde_yaml::from_value(value)?;
        validate_entry(&name, &entry)?;

        let mut linter = Linter::new(&name, entry.command, entry.arguments, entry.filter);
        if let Some(installation) = entry.installation {
            linter = linter.with_installation(installation);
        }
        for extension in entry.extensions {
            config.add(extension, linter.clone());
        }
    }

    Ok(config)
}

fn validate_entry(name: &str, entry: &LinterEntry) -> Result<()> {
    if entry.command.trim().is_empty() {
        return Err(LintError::Config(format!("{}: command is empty", name)));
    }

    if entry.extensions.is_empty() {
        return Err(LintError::Config(format!("{}: no extensions listed", name)));
    }
    if let Some(ext) = entry.extensions.iter().find(|ext| !ext.starts_with('.')) {
        return Err(LintError::Config(format!(
            "{}: extension '{}' must start with '.'",
            name, ext
        )));
    }

    let placeholders = entry.filter.matches(LINES_PLACEHOLDER).count();
    if placeholders != 1 {
        return Err(LintError::Config(format!(
            "{}: filter must contain {} exactly once, found {}",
            name, LINES_PLACEHOLDER, placeholders
        )));
    }
    build_line_pattern(&entry.filter, &[1, 2])?;

    Ok(())
}

/// Read and parse a configuration file
pub fn read_config(path: &Path) -> Result<LintConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| LintError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text)
}

/// The configuration shipped with the binary
pub fn default_config() -> Result<LintConfig> {
    parse_config(DEFAULT_CONFIG)
}

/// Resolve the active configuration.
///
/// An explicit path wins, then `.gitlint.yaml` at the repository root,
/// then the built-in defaults.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<(LintConfig, ConfigSource)> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(root.join(CONFIG_FILE_NAME)).filter(|p| p.is_file()),
    };

    match path {
        Some(path) => {
            debug!("loading config from {}", path.display());
            let config = read_config(&path)?;
            Ok((config, ConfigSource::File(path)))
        }
        None => {
            debug!("no {} found, using default config", CONFIG_FILE_NAME);
            Ok((default_config()?, ConfigSource::Default))
        }
    }
}
