//! Lint data model
//!
//! Linter invocations, the extension -> linters mapping, and the tagged
//! outcome returned for every linted file.

use std::collections::HashMap;
use std::fmt;

/// Line separator used both to split linter output and to join results
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Placeholder replaced by the alternation of allowed line numbers
pub const LINES_PLACEHOLDER: &str = "%(lines)s";

/// One configured linter: a command template plus its line filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Linter {
    pub name: String,
    pub program: String,
    pub arguments: Vec<String>,
    pub filter: String,
    /// Hint shown when the program cannot be executed
    pub installation: Option<String>,
}

impl Linter {
    pub fn new(
        name: impl Into<String>,
        program: impl Into<String>,
        arguments: Vec<String>,
        filter: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            arguments,
            filter: filter.into(),
            installation: None,
        }
    }

    pub fn with_installation(mut self, installation: impl Into<String>) -> Self {
        self.installation = Some(installation.into());
        self
    }
}

/// Extension (with leading dot) -> ordered linters
#[derive(Debug, Clone, Default)]
pub struct LintConfig {
    linters: HashMap<String, Vec<Linter>>,
}

impl LintConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a linter for an extension, after any already registered
    pub fn add(&mut self, extension: impl Into<String>, linter: Linter) {
        self.linters.entry(extension.into()).or_default().push(linter);
    }

    pub fn linters_for(&self, extension: &str) -> Option<&[Linter]> {
        self.linters.get(extension).map(Vec::as_slice)
    }

    /// Configured extensions, sorted
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<_> = self.linters.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }

    /// First linter running `program`, for error hints
    pub fn find_by_program(&self, program: &str) -> Option<&Linter> {
        self.extensions()
            .into_iter()
            .filter_map(|ext| self.linters_for(ext))
            .flatten()
            .find(|linter| linter.program == program)
    }

    pub fn is_empty(&self) -> bool {
        self.linters.is_empty()
    }
}

impl FromIterator<(String, Linter)> for LintConfig {
    fn from_iter<T: IntoIterator<Item = (String, Linter)>>(iter: T) -> Self {
        let mut config = LintConfig::new();
        for (extension, linter) in iter {
            config.add(extension, linter);
        }
        config
    }
}

/// Result of linting one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintOutcome {
    /// Every configured linter ran and nothing matched the line filter
    Ok,
    /// No linter is configured for this extension
    Skipped { extension: String },
    /// Filtered linter output, one block per linter that reported something
    Issues { comments: String },
}

impl LintOutcome {
    pub fn has_issues(&self) -> bool {
        matches!(self, LintOutcome::Issues { .. })
    }
}

impl fmt::Display for LintOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintOutcome::Ok => f.write_str("OK"),
            LintOutcome::Skipped { extension } => {
                write!(f, "SKIPPED: no linters configured for extension '{}'", extension)
            }
            LintOutcome::Issues { comments } => f.write_str(comments),
        }
    }
}
