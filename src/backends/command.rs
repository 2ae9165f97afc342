//! Linter process execution
//!
//! Runs one external linter and hands its captured output to the line filter.
//! The exit status of the linter is informational: most linters exit non-zero
//! exactly when they found something, so the output is used either way.

use std::io::{self, Read};
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

use crate::core::error::{LintError, Result};
use crate::core::filter::filter_output;
use crate::core::model::Linter;

/// Text captured from a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    /// stdout and stderr, interleaved as the process wrote them
    pub text: String,
    /// Exit code, `None` when killed by a signal
    pub exit_code: Option<i32>,
}

impl CapturedOutput {
    pub fn new(text: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self {
            text: text.into(),
            exit_code,
        }
    }

    pub fn from_status(combined: &[u8], status: ExitStatus) -> Self {
        Self::new(String::from_utf8_lossy(combined), status.code())
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Spawns processes and waits for them.
///
/// `Err` means the process never ran; a process that ran and failed is `Ok`.
pub trait ProcessRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CapturedOutput>;
}

/// Runs real processes through `std::process::Command`.
///
/// stdout and stderr share one pipe so the captured text keeps the order
/// in which the linter wrote it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CapturedOutput> {
        let (mut reader, writer) = io::pipe()?;

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer);
        let mut child = command.spawn()?;
        // The command keeps the write ends open until dropped.
        drop(command);

        let mut combined = Vec::new();
        let read = reader.read_to_end(&mut combined);
        let status = child.wait()?;
        read?;

        Ok(CapturedOutput::from_status(&combined, status))
    }
}

/// Run `program args... filename` and keep the output lines for `lines`
pub fn lint_command(
    runner: &dyn ProcessRunner,
    program: &str,
    arguments: &[String],
    line_filter: &str,
    filename: &str,
    lines: Option<&[u32]>,
) -> Result<String> {
    let mut args = arguments.to_vec();
    args.push(filename.to_string());

    debug!("running {} {}", program, args.join(" "));
    let captured = runner
        .run(program, &args)
        .map_err(|source| LintError::Execution {
            program: program.to_string(),
            source,
        })?;

    if !captured.success() {
        debug!("{} exited with {:?}", program, captured.exit_code);
    }

    filter_output(&captured.text, line_filter, lines)
}

/// `lint_command` bound to a configured linter
pub fn run_linter(
    runner: &dyn ProcessRunner,
    linter: &Linter,
    filename: &str,
    lines: Option<&[u32]>,
) -> Result<String> {
    lint_command(
        runner,
        &linter.program,
        &linter.arguments,
        &linter.filter,
        filename,
        lines,
    )
}
