//! git integration
//!
//! Finds the repository root, the files with uncommitted (or last-commit)
//! changes, and the line numbers those changes touched.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::core::error::{LintError, Result};

static STATUS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(M |\sM|MM|A |AM|\?\?) (.+)$").expect("Invalid STATUS_RE regex")
});

static DIFF_TREE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(A|M)\s(.+)$").expect("Invalid DIFF_TREE_RE regex"));

static BLAME_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9a-f]{40,64}) (\d+) (\d+)").expect("Invalid BLAME_HEADER_RE regex")
});

/// How a file differs from the index/HEAD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// Tracked file with modified content
    Modified,
    /// Newly added to the index (or by the commit)
    Added,
    /// Not tracked by git
    Untracked,
}

impl FileStatus {
    fn from_porcelain(code: &str) -> Option<Self> {
        match code {
            "M " | " M" | "MM" => Some(FileStatus::Modified),
            "A " | "AM" => Some(FileStatus::Added),
            "??" => Some(FileStatus::Untracked),
            _ => None,
        }
    }
}

/// Changed files keyed by absolute path
pub type ModifiedFiles = BTreeMap<PathBuf, FileStatus>;

/// Run git in `root` and return its stdout
fn git(root: &Path, args: &[&str]) -> Result<String> {
    debug!("git {}", args.join(" "));
    let output = Command::new("git")
        .current_dir(root)
        .args(args)
        .output()
        .map_err(|e| LintError::Git {
            command: args.join(" "),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(LintError::Git {
            command: args.join(" "),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Top-level directory of the repository containing `cwd`
pub fn repository_root(cwd: &Path) -> Result<Option<PathBuf>> {
    match git(cwd, &["rev-parse", "--show-toplevel"]) {
        Ok(stdout) => {
            let root = stdout.trim();
            Ok((!root.is_empty()).then(|| PathBuf::from(root)))
        }
        Err(LintError::Git { message, .. }) if message.contains("not a git repository") => {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Hash of HEAD, `None` in a repository without commits
pub fn last_commit(root: &Path) -> Option<String> {
    git(root, &["rev-parse", "HEAD"])
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Files changed in the working tree, or by `commit` when given
pub fn modified_files(
    root: &Path,
    tracked_only: bool,
    commit: Option<&str>,
) -> Result<ModifiedFiles> {
    let files = match commit {
        Some(commit) => {
            let stdout = git(
                root,
                &["diff-tree", "-r", "--root", "--no-commit-id", "--name-status", commit],
            )?;
            parse_diff_tree(&stdout)
        }
        None => {
            let stdout = git(
                root,
                &[
                    "status",
                    "--porcelain",
                    "--untracked-files=all",
                    "--ignore-submodules=all",
                ],
            )?;
            parse_status(&stdout, tracked_only)
        }
    };

    Ok(files
        .into_iter()
        .map(|(name, status)| (root.join(name), status))
        .collect())
}

/// Line numbers of `path` touched by the change.
///
/// `None` means the whole file is relevant: it is new, or it was named on
/// the command line without being changed.
pub fn modified_lines(
    root: &Path,
    path: &Path,
    status: Option<FileStatus>,
    commit: Option<&str>,
) -> Result<Option<Vec<u32>>> {
    match status {
        Some(FileStatus::Modified) => {}
        _ => return Ok(None),
    }

    let path_arg = path.to_string_lossy();
    let stdout = git(root, &["blame", "--porcelain", "--", &*path_arg])?;
    Ok(Some(parse_blame(&stdout, commit)))
}

/// Parse `git status --porcelain` output into relative paths
pub fn parse_status(stdout: &str, tracked_only: bool) -> Vec<(String, FileStatus)> {
    stdout
        .lines()
        .filter_map(|line| {
            let caps = STATUS_RE.captures(line)?;
            let status = FileStatus::from_porcelain(&caps[1])?;
            if tracked_only && status == FileStatus::Untracked {
                return None;
            }
            Some((unquote_path(&caps[2]), status))
        })
        .collect()
}

/// Parse `git diff-tree --name-status` output into relative paths
pub fn parse_diff_tree(stdout: &str) -> Vec<(String, FileStatus)> {
    stdout
        .lines()
        .filter_map(|line| {
            let caps = DIFF_TREE_RE.captures(line)?;
            let status = match &caps[1] {
                "A" => FileStatus::Added,
                _ => FileStatus::Modified,
            };
            Some((unquote_path(&caps[2]), status))
        })
        .collect()
}

/// Final line numbers attributed to `commit` (uncommitted lines when `None`)
pub fn parse_blame(stdout: &str, commit: Option<&str>) -> Vec<u32> {
    let mut lines: Vec<u32> = stdout
        .lines()
        .filter_map(|line| BLAME_HEADER_RE.captures(line))
        .filter(|caps| match commit {
            Some(commit) => &caps[1] == commit,
            None => caps[1].bytes().all(|b| b == b'0'),
        })
        .filter_map(|caps| caps[3].parse().ok())
        .collect();

    lines.sort_unstable();
    lines.dedup();
    lines
}

/// Undo git's C-style quoting of unusual file names
fn unquote_path(raw: &str) -> String {
    let inner = match raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => inner,
        None => return raw.to_string(),
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.bytes().peekable();
    while let Some(b) = chars.next() {
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        match chars.next() {
            Some(b'n') => bytes.push(b'\n'),
            Some(b't') => bytes.push(b'\t'),
            Some(d @ b'0'..=b'7') => {
                let mut value = u32::from(d - b'0');
                for _ in 0..2 {
                    match chars.peek() {
                        Some(&o @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(o - b'0');
                            chars.next();
                        }
                        _ => break,
                    }
                }
                bytes.push(value as u8);
            }
            Some(other) => bytes.push(other),
            None => bytes.push(b'\\'),
        }
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO: &str = "0000000000000000000000000000000000000000";
    const SHA: &str = "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3";

    #[test]
    fn test_parse_status() {
        let stdout = " M src/a.py\nM  src/b.py\nMM c.py\nA  new.py\nAM new2.py\n D gone.py\nR  old.py -> renamed.py\n?? scratch.py\n";
        let files = parse_status(stdout, false);
        assert_eq!(
            files,
            vec![
                ("src/a.py".to_string(), FileStatus::Modified),
                ("src/b.py".to_string(), FileStatus::Modified),
                ("c.py".to_string(), FileStatus::Modified),
                ("new.py".to_string(), FileStatus::Added),
                ("new2.py".to_string(), FileStatus::Added),
                ("scratch.py".to_string(), FileStatus::Untracked),
            ]
        );
    }

    #[test]
    fn test_parse_status_tracked_only() {
        let files = parse_status(" M a.py\n?? b.py\n", true);
        assert_eq!(files, vec![("a.py".to_string(), FileStatus::Modified)]);
    }

    #[test]
    fn test_parse_status_quoted_names() {
        let files = parse_status("?? \"with space.py\"\n?? \"caf\\303\\251.py\"\n", false);
        assert_eq!(files[0].0, "with space.py");
        assert_eq!(files[1].0, "café.py");
    }

    #[test]
    fn test_parse_diff_tree() {
        let files = parse_diff_tree("M\tsrc/a.py\nA\tb.py\nD\tc.py\n");
        assert_eq!(
            files,
            vec![
                ("src/a.py".to_string(), FileStatus::Modified),
                ("b.py".to_string(), FileStatus::Added),
            ]
        );
    }

    #[test]
    fn test_parse_blame_uncommitted() {
        let stdout = format!(
            "{SHA} 1 1 2\nauthor A\n\tline one\n{SHA} 2 2\n\tline two\n\
             {ZERO} 3 3 1\nauthor Not Committed Yet\n\tnew line\n\
             {SHA} 3 4 1\n\tline four\n{ZERO} 5 5 1\n\tanother\n"
        );
        assert_eq!(parse_blame(&stdout, None), vec![3, 5]);
    }

    #[test]
    fn test_parse_blame_for_commit() {
        let stdout = format!("{SHA} 1 1 1\n\ta\n{ZERO} 2 2 1\n\tb\n{SHA} 7 3 1\n\tc\n");
        assert_eq!(parse_blame(&stdout, Some(SHA)), vec![1, 3]);
    }

    #[test]
    fn test_parse_blame_ignores_content_lines() {
        // content lines are tab-prefixed even when they look like headers
        let stdout = format!("{SHA} 1 1 1\n\t{ZERO} 9 9\n");
        assert!(parse_blame(&stdout, None).is_empty());
    }

    #[test]
    fn test_unquote_path() {
        assert_eq!(unquote_path("plain.py"), "plain.py");
        assert_eq!(unquote_path("\"a\\\"b.py\""), "a\"b.py");
        assert_eq!(unquote_path("\"tab\\there\""), "tab\there");
    }

    #[test]
    fn test_modified_lines_without_status_is_whole_file() {
        let root = Path::new("/nonexistent");
        assert_eq!(modified_lines(root, Path::new("a.py"), None, None).unwrap(), None);
        assert_eq!(
            modified_lines(root, Path::new("a.py"), Some(FileStatus::Untracked), None).unwrap(),
            None
        );
        assert_eq!(
            modified_lines(root, Path::new("a.py"), Some(FileStatus::Added), None).unwrap(),
            None
        );
    }

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn run_git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .current_dir(dir)
            .args(["-c", "user.name=test", "-c", "user.email=test@example.com"])
            .args(args)
            .output()
            .unwrap()
            .status;
        assert!(status.success(), "git {:?} failed", args);
    }

    #[test]
    fn test_repository_workflow() {
        if !git_available() {
            return;
        }
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().canonicalize().unwrap();
        run_git(&root, &["init", "-q"]);

        std::fs::write(root.join("a.py"), "one\ntwo\nthree\n").unwrap();
        run_git(&root, &["add", "a.py"]);
        run_git(&root, &["commit", "-q", "-m", "init"]);

        std::fs::write(root.join("a.py"), "one\nTWO\nthree\nfour\n").unwrap();
        std::fs::write(root.join("b.py"), "new\n").unwrap();

        let found = repository_root(&root).unwrap().unwrap();
        assert_eq!(found.canonicalize().unwrap(), root);
        assert!(last_commit(&root).is_some());

        let files = modified_files(&root, false, None).unwrap();
        assert_eq!(files.get(&root.join("a.py")), Some(&FileStatus::Modified));
        assert_eq!(files.get(&root.join("b.py")), Some(&FileStatus::Untracked));

        let tracked = modified_files(&root, true, None).unwrap();
        assert!(!tracked.contains_key(&root.join("b.py")));

        let lines =
            modified_lines(&root, &root.join("a.py"), Some(FileStatus::Modified), None).unwrap();
        assert_eq!(lines, Some(vec![2, 4]));
    }

    #[test]
    fn test_repository_root_outside_repository() {
        if !git_available() {
            return;
        }
        let temp = tempfile::tempdir().unwrap();
        // /tmp may itself live inside a repository on some machines
        if let Ok(Some(_)) = repository_root(temp.path()) {
            return;
        }
        assert_eq!(repository_root(temp.path()).unwrap(), None);
    }
}
