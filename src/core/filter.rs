//! Line filtering of linter output
//!
//! Each linter declares a regex template with a `%(lines)s` placeholder.
//! The placeholder becomes an alternation of the line numbers we care about
//! and only output lines matching at their start are kept.

use regex::Regex;

use crate::core::error::{LintError, Result};
use crate::core::model::{LINES_PLACEHOLDER, LINE_SEPARATOR};

/// Substitute the placeholder with `n1|n2|...` in the given order
pub fn expand_template(line_filter: &str, lines: &[u32]) -> String {
    let alternation = lines
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join("|");
    line_filter.replace(LINES_PLACEHOLDER, &alternation)
}

/// Compile a line filter template for a concrete set of lines
pub fn build_line_pattern(line_filter: &str, lines: &[u32]) -> Result<Regex> {
    Regex::new(&expand_template(line_filter, lines)).map_err(|source| LintError::Pattern {
        template: line_filter.to_string(),
        source,
    })
}

/// Keep the lines of `output` that `pattern` matches at their first byte
pub fn filter_lines(output: &str, pattern: &Regex) -> String {
    output
        .split(LINE_SEPARATOR)
        .filter(|line| pattern.find(line).is_some_and(|m| m.start() == 0))
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

/// Restrict linter output to the given line numbers.
///
/// `None` or an empty set returns `output` untouched.
pub fn filter_output(output: &str, line_filter: &str, lines: Option<&[u32]>) -> Result<String> {
    let lines = match lines {
        Some(lines) if !lines.is_empty() => lines,
        _ => return Ok(output.to_string()),
    };

    let pattern = build_line_pattern(line_filter, lines)?;
    Ok(filter_lines(output, &pattern))
}
