//! CLI module - Command-line interface definitions and handlers

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backends::command::SystemRunner;
use crate::backends::git::{self, FileStatus};
use crate::backends::lint::lint;
use crate::core::config::{load_config, ConfigSource};
use crate::core::error::LintError;
use crate::core::model::{LintConfig, LintOutcome};
use crate::core::paths::{display_relative, extension_of};
use crate::core::render::{FileReport, OutputFormat, RenderConfig, Renderer};

/// git-lint - run linters on changed files, reporting only the changed lines.
#[derive(Parser, Debug)]
#[command(name = "git-lint")]
#[command(
    author,
    version,
    about,
    long_about = r#"git-lint runs the linters configured for each modified file and reports
only the problems found on lines that were modified.

Without FILENAME arguments, every file reported by `git status` (modified,
added and untracked) is linted. Files given explicitly are linted even when
unchanged; in that case every line is reported.

Linters are read from .gitlint.yaml at the repository root, falling back to
a built-in configuration.

Exit status:
    0    no problems found
    1    problems found in at least one file
    2    invalid arguments
    3    invalid configuration
    4    a linter could not be executed
    5    any other failure
    128  not a git repository, or git failed

Examples:
    git lint
    git lint --force src/app.py
    git lint --last-commit --json
"#
)]
pub struct Cli {
    /// Files to lint (default: all modified files).
    #[arg(value_name = "FILENAME")]
    pub filenames: Vec<PathBuf>,

    /// Report problems on every line, not only the modified ones.
    #[arg(short, long)]
    pub force: bool,

    /// Only lint files tracked by git.
    #[arg(
        short,
        long,
        long_help = "Only lint files tracked by git; untracked files are ignored.\n\n\
Has no effect when FILENAME arguments are given."
    )]
    pub tracked: bool,

    /// Lint the files changed by the last commit instead of the working tree.
    #[arg(
        long,
        long_help = "Lint the files changed by HEAD and report only the lines HEAD introduced.\n\n\
Useful after `git checkout <rev>`."
    )]
    pub last_commit: bool,

    /// Print the results as a JSON object keyed by file.
    #[arg(long)]
    pub json: bool,

    /// Pretty-print JSON output.
    #[arg(long, requires = "json")]
    pub pretty: bool,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,

    /// Verbose mode (debug logging on stderr).
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file (default: .gitlint.yaml at the repository root).
    #[arg(long, value_name = "PATH", env = "GIT_LINT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Errors caused by the command line itself
#[derive(Debug, Error)]
pub enum CliError {
    #[error("file not found: {}", .0.join(", "))]
    FileNotFound(Vec<String>),

    #[error("--last-commit requires a repository with at least one commit")]
    NoCommits,
}

/// Exit status for failures that are neither usage nor lint errors
pub const EXIT_FAILURE: u8 = 5;

/// Exit status for an error that aborted the run
pub fn exit_code_for(error: &anyhow::Error) -> u8 {
    if let Some(lint_error) = error.downcast_ref::<LintError>() {
        return lint_error.exit_code();
    }
    if error.downcast_ref::<CliError>().is_some() {
        return 2;
    }
    EXIT_FAILURE
}

/// Files to lint, with their git status when they are changed
type LintTargets = BTreeMap<PathBuf, Option<FileStatus>>;

fn lint_targets(
    cwd: &Path,
    filenames: &[PathBuf],
    changed: git::ModifiedFiles,
) -> Result<LintTargets> {
    if filenames.is_empty() {
        return Ok(changed
            .into_iter()
            .map(|(path, status)| (path, Some(status)))
            .collect());
    }

    let missing: Vec<String> = filenames
        .iter()
        .filter(|f| !cwd.join(f).is_file())
        .map(|f| f.display().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CliError::FileNotFound(missing).into());
    }

    filenames
        .iter()
        .map(|f| {
            let path = cwd
                .join(f)
                .canonicalize()
                .with_context(|| format!("cannot resolve {}", f.display()))?;
            let status = changed.get(&path).copied();
            Ok((path, status))
        })
        .collect()
}

/// Outcome for a changed file whose changes only removed lines
fn nothing_to_lint(path: &Path, config: &LintConfig) -> LintOutcome {
    let extension = extension_of(&path.to_string_lossy());
    match config.linters_for(&extension) {
        Some(_) => LintOutcome::Ok,
        None => LintOutcome::Skipped { extension },
    }
}

/// Run the CLI with parsed arguments, returning the exit status
pub fn run(cli: Cli) -> Result<u8> {
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let renderer = Renderer::with_config(RenderConfig::new(format, cli.pretty));

    let cwd = std::env::current_dir().context("cannot determine the current directory")?;
    let root = git::repository_root(&cwd)?.ok_or(LintError::NotARepository)?;
    let root = root.canonicalize().unwrap_or(root);

    let (config, source) = load_config(&root, cli.config.as_deref())?;
    match &source {
        ConfigSource::File(path) => debug!("using config {}", path.display()),
        ConfigSource::Default => debug!("using built-in config"),
    }
    if config.is_empty() {
        warn!("the configuration defines no linters");
    }

    let commit = if cli.last_commit {
        Some(git::last_commit(&root).ok_or(CliError::NoCommits)?)
    } else {
        None
    };

    let changed = git::modified_files(&root, cli.tracked, commit.as_deref())?;
    let targets = lint_targets(&cwd, &cli.filenames, changed)?;
    info!("linting {} file(s)", targets.len());

    let runner = SystemRunner;
    let mut reports = Vec::with_capacity(targets.len());

    for (path, status) in targets {
        let shown = display_relative(&path, &cwd);
        if renderer.format() == OutputFormat::Text {
            println!("{}", renderer.file_header(&shown));
        }

        let lines = if cli.force {
            None
        } else {
            git::modified_lines(&root, &path, status, commit.as_deref())?
        };

        let outcome = match lines.as_deref() {
            Some([]) => {
                debug!("{}: no added or modified lines", shown);
                nothing_to_lint(&path, &config)
            }
            lines => lint(&runner, &path.to_string_lossy(), lines, &config)
                .map_err(|e| with_installation_hint(e, &config))?,
        };

        if renderer.format() == OutputFormat::Text {
            println!("{}", renderer.file_status(&outcome));
        }
        reports.push(FileReport::new(shown, outcome));
    }

    if renderer.format() == OutputFormat::Json {
        println!("{}", renderer.render_json(&reports));
    }

    let with_issues = reports.iter().filter(|r| r.outcome.has_issues()).count();
    debug!("{} file(s) with problems", with_issues);
    Ok(if with_issues > 0 { 1 } else { 0 })
}

/// Attach the configured installation instructions to a failed execution
fn with_installation_hint(error: LintError, config: &LintConfig) -> anyhow::Error {
    let hint = match &error {
        LintError::Execution { program, .. } => config
            .find_by_program(program)
            .and_then(|linter| linter.installation.clone()),
        _ => None,
    };

    match hint {
        Some(hint) => anyhow::Error::new(error).context(hint),
        None => error.into(),
    }
}
