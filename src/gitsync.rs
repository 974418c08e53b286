//! Version-control sync for the central skill repository.
//!
//! Every operation shells out to the `git` binary and blocks until it
//! finishes. Failures carry git's stderr verbatim so the operator can
//! diagnose network or auth problems; nothing is retried.

use std::path::Path;
use std::process::Command;

use crate::error::{Result, SpError};
use crate::utils::fs::ensure_dir;

/// Run one git subcommand, capturing output.
fn run_git(repo_dir: Option<&Path>, args: &[&str]) -> Result<String> {
    let mut cmd = Command::new("git");
    cmd.args(args);
    if let Some(dir) = repo_dir {
        cmd.current_dir(dir);
    }

    let output = cmd.output().map_err(|err| SpError::Git {
        operation: args.join(" "),
        stderr: format!("failed to spawn git: {err}"),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(SpError::Git {
            operation: args.join(" "),
            stderr: if stderr.is_empty() {
                format!("git {} failed", args.join(" "))
            } else {
                stderr
            },
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Check if a directory is a git working copy.
#[must_use]
pub fn is_repo(path: impl AsRef<Path>) -> bool {
    path.as_ref().join(".git").exists()
}

/// Clone the remote into `local` unless a working copy is already there.
pub fn ensure_cloned(remote: &str, local: &Path) -> Result<()> {
    if is_repo(local) {
        tracing::debug!(path = %local.display(), "central repo already cloned");
        return Ok(());
    }

    if let Some(parent) = local.parent() {
        ensure_dir(parent)?;
    }

    tracing::info!(remote, path = %local.display(), "cloning central repo");
    run_git(
        None,
        &["clone", remote, &local.display().to_string()],
    )?;
    Ok(())
}

/// Porcelain status of the working tree; empty means clean.
pub fn status_porcelain(local: &Path) -> Result<String> {
    let out = run_git(Some(local), &["status", "--porcelain"])?;
    Ok(out.trim().to_string())
}

/// Whether the working tree has any uncommitted change.
pub fn is_dirty(local: &Path) -> Result<bool> {
    Ok(!status_porcelain(local)?.is_empty())
}

/// Check out a ref. Fails loudly when the ref does not exist or the
/// checkout is rejected.
pub fn checkout_ref(local: &Path, gitref: &str) -> Result<()> {
    tracing::debug!(gitref, path = %local.display(), "checking out ref");
    run_git(Some(local), &["checkout", gitref])?;
    Ok(())
}

/// Fetch all remotes with pruning, then pull with fast-forward-only
/// semantics. Divergent history is a hard error, never a silent merge.
pub fn fast_forward_update(local: &Path) -> Result<()> {
    tracing::debug!(path = %local.display(), "fetching remotes");
    run_git(Some(local), &["fetch", "--all", "--prune"])?;
    tracing::debug!(path = %local.display(), "fast-forward pull");
    run_git(Some(local), &["pull", "--ff-only"])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git_available() -> bool {
        which::which("git").is_ok()
    }

    fn init_repo(dir: &Path) {
        let run = |args: &[&str]| {
            let status = Command::new("git")
                .args(args)
                .current_dir(dir)
                .output()
                .unwrap();
            assert!(status.status.success(), "git {args:?} failed");
        };
        run(&["init", "--initial-branch=main"]);
        run(&["config", "user.email", "test@example.com"]);
        run(&["config", "user.name", "Test"]);
        std::fs::write(dir.join("README.md"), "# fixture\n").unwrap();
        run(&["add", "."]);
        run(&["commit", "-m", "initial"]);
    }

    // =========================================================================
    // is_repo tests
    // =========================================================================

    #[test]
    fn is_repo_with_git_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        assert!(is_repo(temp.path()));
    }

    #[test]
    fn is_repo_without_git_directory() {
        let temp = TempDir::new().unwrap();
        assert!(!is_repo(temp.path()));
    }

    // =========================================================================
    // subprocess tests (require a git binary)
    // =========================================================================

    #[test]
    fn status_porcelain_clean_then_dirty() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        init_repo(temp.path());

        assert!(!is_dirty(temp.path()).unwrap());

        std::fs::write(temp.path().join("README.md"), "# changed\n").unwrap();
        assert!(is_dirty(temp.path()).unwrap());
        assert!(
            status_porcelain(temp.path())
                .unwrap()
                .contains("README.md")
        );
    }

    #[test]
    fn checkout_missing_ref_propagates_stderr() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        init_repo(temp.path());

        let err = checkout_ref(temp.path(), "no-such-ref").unwrap_err();
        match err {
            SpError::Git { stderr, .. } => assert!(!stderr.is_empty()),
            other => panic!("expected Git error, got {other:?}"),
        }
    }

    #[test]
    fn ensure_cloned_noop_when_repo_exists() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        init_repo(temp.path());

        // Remote is bogus; this only succeeds because the clone is skipped.
        ensure_cloned("https://invalid.example/nope.git", temp.path()).unwrap();
    }

    #[test]
    fn ensure_cloned_from_local_fixture() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let origin = temp.path().join("origin");
        std::fs::create_dir(&origin).unwrap();
        init_repo(&origin);

        let local = temp.path().join("nested").join("clone");
        ensure_cloned(&origin.display().to_string(), &local).unwrap();
        assert!(is_repo(&local));
        assert!(local.join("README.md").exists());
    }
}
