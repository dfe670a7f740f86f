// ABOUTME: Thin async wrappers around the git binary.
// ABOUTME: Network operations are bounded by a caller-supplied timeout.

use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use super::SyncError;

/// Whether `dir` is a version-controlled checkout.
pub fn is_repo(dir: &Path) -> bool {
    dir.join(".git").is_dir()
}

pub(super) async fn run(
    op: &'static str,
    cwd: Option<&Path>,
    args: &[&str],
) -> Result<Output, SyncError> {
    let mut cmd = Command::new("git");
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    tracing::debug!(op, ?args, "running git");
    let output = cmd.output().await.map_err(SyncError::Io)?;

    if !output.status.success() {
        return Err(SyncError::Git {
            op,
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

pub(super) async fn run_bounded(
    op: &'static str,
    cwd: Option<&Path>,
    args: &[&str],
    limit: Duration,
) -> Result<Output, SyncError> {
    match tokio::time::timeout(limit, run(op, cwd, args)).await {
        Ok(result) => result,
        Err(_) => Err(SyncError::Timeout {
            op,
            secs: limit.as_secs(),
        }),
    }
}

/// Best-effort git environment fixes: mark the target safe for a
/// root-invoked git, and force HTTP/1.1 with a large post buffer for flaky
/// HTTPS remotes. Failures are logged and swallowed.
///
/// When `config_global` is set, the tweaks land in that file instead of the
/// invoking user's global config (git's `GIT_CONFIG_GLOBAL` override).
pub async fn prepare_environment(target: &Path, config_global: Option<&Path>) {
    let target_str = target.display().to_string();
    let tweaks: [&[&str]; 3] = [
        &["config", "--global", "--add", "safe.directory", &target_str],
        &["config", "--global", "http.version", "HTTP/1.1"],
        &["config", "--global", "http.postBuffer", "524288000"],
    ];

    for args in tweaks {
        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(file) = config_global {
            cmd.env("GIT_CONFIG_GLOBAL", file);
        }
        match cmd.output().await {
            Ok(output) if !output.status.success() => {
                tracing::debug!(?args, "git config tweak failed (ignored)");
            }
            Err(e) => {
                tracing::debug!(error = %e, "git config tweak failed (ignored)");
            }
            Ok(_) => {}
        }
    }
}

/// Whether the checkout has uncommitted changes (`status --porcelain`).
pub async fn is_dirty(dir: &Path) -> Result<bool, SyncError> {
    let output = run("status", Some(dir), &["status", "--porcelain"]).await?;
    Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

/// Short hash of HEAD, if `dir` is a checkout with any history.
pub async fn short_head(dir: &Path) -> Option<String> {
    let output = run("rev-parse", Some(dir), &["rev-parse", "--short", "HEAD"])
        .await
        .ok()?;
    let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!hash.is_empty()).then_some(hash)
}
