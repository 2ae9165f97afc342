//! Lint orchestration
//!
//! Runs every linter configured for a file's extension, in configuration
//! order, and merges their filtered output into one outcome.

use tracing::debug;

use crate::backends::command::{run_linter, ProcessRunner};
use crate::core::error::Result;
use crate::core::model::{LintConfig, LintOutcome, LINE_SEPARATOR};
use crate::core::paths::extension_of;

/// Lint `filename`, reporting only output for `lines` (`None`: everything)
pub fn lint(
    runner: &dyn ProcessRunner,
    filename: &str,
    lines: Option<&[u32]>,
    config: &LintConfig,
) -> Result<LintOutcome> {
    let extension = extension_of(filename);
    let linters = match config.linters_for(&extension) {
        Some(linters) => linters,
        None => {
            debug!("no linters for '{}' ({})", extension, filename);
            return Ok(LintOutcome::Skipped { extension });
        }
    };

    let mut reports = Vec::new();
    for linter in linters {
        let output = run_linter(runner, linter, filename, lines)?;
        if output.is_empty() {
            debug!("{}: nothing to report for {}", linter.name, filename);
        } else {
            reports.push(output);
        }
    }

    if reports.is_empty() {
        Ok(LintOutcome::Ok)
    } else {
        Ok(LintOutcome::Issues {
            comments: reports.join(LINE_SEPARATOR),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::command::testing::FakeRunner;
    use crate::core::error::LintError;
    use crate::core::model::Linter;
    use std::io;

    fn txt_config() -> LintConfig {
        let mut config = LintConfig::new();
        config.add(
            ".txt",
            Linter::new("linter1", "linter1", vec!["-f".to_string()], "^Line (%(lines)s):"),
        );
        config.add(
            ".txt",
            Linter::new("linter2", "linter2", vec![], "^ line (%(lines)s):"),
        );
        config
    }

    fn expected_calls() -> Vec<Vec<String>> {
        vec![
            vec!["linter1".into(), "-f".into(), "foo.txt".into()],
            vec!["linter2".into(), "foo.txt".into()],
        ]
    }

    #[test]
    fn test_lint_concatenates_in_config_order() {
        let runner = FakeRunner::new()
            .respond(&["Line 1: 1", "Line 5: 5"].join(LINE_SEPARATOR), 1)
            .respond(" line 4: 4", 1);

        let outcome = lint(&runner, "foo.txt", Some(&[4, 5]), &txt_config()).unwrap();
        assert_eq!(
            outcome.to_string(),
            ["Line 5: 5", " line 4: 4"].join(LINE_SEPARATOR)
        );
        assert!(outcome.has_issues());
        assert_eq!(runner.calls(), expected_calls());
    }

    #[test]
    fn test_lint_one_empty_linter() {
        let runner = FakeRunner::new().respond("", 0).respond(" line 4: 4", 1);

        let outcome = lint(&runner, "foo.txt", Some(&[4, 5]), &txt_config()).unwrap();
        assert_eq!(
            outcome,
            LintOutcome::Issues {
                comments: " line 4: 4".to_string()
            }
        );
        assert_eq!(runner.calls(), expected_calls());
    }

    #[test]
    fn test_lint_all_empty_is_ok() {
        let runner = FakeRunner::new().respond("", 0).respond("", 0);

        let outcome = lint(&runner, "foo.txt", Some(&[4, 5]), &txt_config()).unwrap();
        assert_eq!(outcome, LintOutcome::Ok);
        assert_eq!(outcome.to_string(), "OK");
        assert_eq!(runner.calls(), expected_calls());
    }

    #[test]
    fn test_lint_output_outside_lines_is_ok() {
        let runner = FakeRunner::new()
            .respond("Line 1: 1", 1)
            .respond(" line 9: 9", 1);

        let outcome = lint(&runner, "foo.txt", Some(&[4, 5]), &txt_config()).unwrap();
        assert_eq!(outcome, LintOutcome::Ok);
    }

    #[test]
    fn test_lint_without_lines_reports_everything() {
        let runner = FakeRunner::new()
            .respond("Line 1: 1", 1)
            .respond("", 0);

        let outcome = lint(&runner, "foo.txt", None, &txt_config()).unwrap();
        assert_eq!(outcome.to_string(), "Line 1: 1");
    }

    #[test]
    fn test_lint_extension_not_defined() {
        let runner = FakeRunner::new();
        let outcome = lint(&runner, "foo.txt", Some(&[4, 5]), &LintConfig::new()).unwrap();

        let text = outcome.to_string();
        assert!(text.starts_with("SKIPPED"));
        assert!(text.contains(".txt"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_lint_extension_is_case_sensitive() {
        let runner = FakeRunner::new();
        let outcome = lint(&runner, "FOO.TXT", None, &txt_config()).unwrap();
        assert_eq!(
            outcome,
            LintOutcome::Skipped {
                extension: ".TXT".to_string()
            }
        );
    }

    #[test]
    fn test_lint_stops_on_execution_failure() {
        let runner = FakeRunner::new().fail(io::ErrorKind::NotFound);

        let err = lint(&runner, "foo.txt", None, &txt_config()).unwrap_err();
        assert!(matches!(err, LintError::Execution { ref program, .. } if program == "linter1"));
        assert_eq!(runner.calls().len(), 1);
    }
}
