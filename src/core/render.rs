//! Renderer module
//!
//! Renders lint reports either as coloured text, one block per file, or as a
//! single JSON document keyed by path.

use colored::Colorize;
use serde_json::{json, Map, Value};

use crate::core::model::{LintOutcome, LINE_SEPARATOR};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    pub fn new(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Outcome of linting one file, with the path as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: String,
    pub outcome: LintOutcome,
}

impl FileReport {
    pub fn new(path: impl Into<String>, outcome: LintOutcome) -> Self {
        Self {
            path: path.into(),
            outcome,
        }
    }
}

/// Renderer for lint reports
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn format(&self) -> OutputFormat {
        self.config.format
    }

    /// Line announcing the file about to be linted
    pub fn file_header(&self, path: &str) -> String {
        format!("Linting file: {}", path.bold())
    }

    /// Status block printed after a file was linted
    pub fn file_status(&self, outcome: &LintOutcome) -> String {
        match outcome {
            LintOutcome::Ok => "OK".green().to_string(),
            LintOutcome::Skipped { .. } => outcome.to_string().yellow().to_string(),
            LintOutcome::Issues { comments } => {
                format!("{}{}{}", "ERROR".red(), LINE_SEPARATOR, comments)
            }
        }
    }

    /// Render every report as one JSON object keyed by path
    pub fn render_json(&self, reports: &[FileReport]) -> String {
        let mut document = Map::new();
        for report in reports {
            document.insert(report.path.clone(), outcome_to_json(&report.outcome));
        }

        let document = Value::Object(document);
        if self.config.pretty {
            serde_json::to_string_pretty(&document).unwrap_or_else(|_| "{}".to_string())
        } else {
            document.to_string()
        }
    }
}

fn outcome_to_json(outcome: &LintOutcome) -> Value {
    match outcome {
        LintOutcome::Ok => json!({ "status": "ok" }),
        LintOutcome::Skipped { extension } => json!({
            "status": "skipped",
            "extension": extension,
        }),
        LintOutcome::Issues { comments } => json!({
            "status": "issues",
            "comments": comments.split(LINE_SEPARATOR).collect::<Vec<_>>(),
        }),
    }
}
