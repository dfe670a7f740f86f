// ABOUTME: Source tree synchronization: fast path (fetch + reset) for
// ABOUTME: checkouts, clone-and-merge with preserve protection otherwise.

pub mod git;
mod preserve;

pub use preserve::PreserveSet;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{Config, LocalChangesPolicy};
use crate::fsops;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("git {op} failed: {detail}")]
    Git { op: &'static str, detail: String },

    #[error("git {op} timed out after {secs}s")]
    Timeout { op: &'static str, secs: u64 },

    #[error("uncommitted local changes in {0} and on_local_changes is 'fail'")]
    DirtyTree(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which update path a successful sync took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// In-place fetch + hard reset of an existing checkout.
    FastForward,
    /// Shallow clone to staging, then delete/copy reconciliation.
    CloneMerge,
}

impl SyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMode::FastForward => "fast-forward",
            SyncMode::CloneMerge => "clone-merge",
        }
    }
}

/// Updates the deployment's source tree to the latest remote revision.
#[derive(Debug)]
pub struct SourceSynchronizer {
    repo: String,
    remote: String,
    branch: String,
    on_local_changes: LocalChangesPolicy,
    network_timeout: Duration,
    staging_root: Option<PathBuf>,
    git_config_global: Option<PathBuf>,
}

impl SourceSynchronizer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            repo: config.repo.clone(),
            remote: config.remote.clone(),
            branch: config.branch.clone(),
            on_local_changes: config.on_local_changes,
            network_timeout: config.network_timeout,
            staging_root: None,
            git_config_global: config.git_config_global.clone(),
        }
    }

    /// Place merge-path staging directories under `root` instead of the
    /// system temp directory.
    pub fn with_staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(root.into());
        self
    }

    /// Write the best-effort git environment tweaks to `file` instead of
    /// the invoking user's global config.
    pub fn with_git_config_global(mut self, file: impl Into<PathBuf>) -> Self {
        self.git_config_global = Some(file.into());
        self
    }

    /// Bring `target` up to date with the remote. Any failure leaves the
    /// tree in an undefined state; the caller restores from backup.
    pub async fn sync(&self, target: &Path, preserve: &PreserveSet) -> Result<SyncMode, SyncError> {
        git::prepare_environment(target, self.git_config_global.as_deref()).await;

        if git::is_repo(target) {
            self.fast_path(target).await?;
            Ok(SyncMode::FastForward)
        } else {
            tracing::info!("target is not a checkout, updating via clone and merge");
            self.merge_path(target, preserve).await?;
            Ok(SyncMode::CloneMerge)
        }
    }

    /// Fetch the remote branch and force the working tree to match it.
    async fn fast_path(&self, target: &Path) -> Result<(), SyncError> {
        if git::is_dirty(target).await? {
            self.handle_local_changes(target).await?;
        }

        git::run_bounded(
            "fetch",
            Some(target),
            &["fetch", &self.remote],
            self.network_timeout,
        )
        .await?;

        let upstream = format!("{}/{}", self.remote, self.branch);
        git::run("reset", Some(target), &["reset", "--hard", &upstream]).await?;
        Ok(())
    }

    /// Park uncommitted changes according to policy. The commit/stash is a
    /// best-effort safety net; its own failure does not abort the sync.
    async fn handle_local_changes(&self, target: &Path) -> Result<(), SyncError> {
        match self.on_local_changes {
            LocalChangesPolicy::Fail => Err(SyncError::DirtyTree(target.to_path_buf())),
            LocalChangesPolicy::Commit => {
                tracing::warn!("local changes detected, auto-committing before update");
                let _ = git::run("add", Some(target), &["add", "-A"]).await;
                let commit = git::run(
                    "commit",
                    Some(target),
                    &["commit", "-m", "wip: auto-commit before update"],
                )
                .await;
                if commit.is_err() {
                    let _ = git::run("stash", Some(target), &["stash"]).await;
                }
                Ok(())
            }
            LocalChangesPolicy::Stash => {
                tracing::warn!("local changes detected, stashing before update");
                let _ = git::run("stash", Some(target), &["stash"]).await;
                Ok(())
            }
        }
    }

    /// Clone the remote into a staging directory, then reconcile: delete
    /// every non-preserved, non-hidden top-level entry of `target`, and copy
    /// the staged entries in. Preserved entries are never overwritten.
    /// Ordering matters: the delete pass runs to completion before the copy
    /// pass so stale and fresh content cannot collide.
    async fn merge_path(&self, target: &Path, preserve: &PreserveSet) -> Result<(), SyncError> {
        // TempDir removes the staging tree on drop, success or failure.
        let mut builder = tempfile::Builder::new();
        builder.prefix("renova-stage-");
        let staging = match &self.staging_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };

        let staging_path = staging.path().display().to_string();
        git::run_bounded(
            "clone",
            None,
            &[
                "clone",
                "--depth",
                "1",
                "--branch",
                &self.branch,
                &self.repo,
                &staging_path,
            ],
            self.network_timeout,
        )
        .await?;

        // Only members that actually exist are protected. A preserve-set
        // name the remote introduces later follows remote content.
        let kept = preserve.present_in(target)?;
        for entry in &kept {
            tracing::info!(entry = %entry, "preserving");
        }
        let is_kept = |name: &str| kept.iter().any(|k| k == name);

        // Delete pass. On a name collision between delete and preserve,
        // preserve wins.
        for entry in fs::read_dir(target)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if is_kept(name) || name.starts_with('.') {
                continue;
            }
            fsops::remove_entry(&entry.path())?;
        }

        // Copy pass. Preserved entries are never overwritten; dotfiles in
        // the staging checkout (.git above all) stay behind.
        for entry in fs::read_dir(staging.path())? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if is_kept(name) || name.starts_with('.') {
                continue;
            }
            fsops::copy_entry(&entry.path(), &target.join(name))?;
        }

        staging.close()?;
        Ok(())
    }
}
