// ABOUTME: Timestamped full-tree snapshots of the deployment directory.
// ABOUTME: Snapshots are staged under a .partial name and renamed when complete.

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

use crate::fsops;

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("deployment target does not exist: {0}")]
    TargetMissing(PathBuf),

    #[error("snapshot already exists: {0}")]
    SnapshotExists(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A completed snapshot. Never mutated after creation; read only during
/// rollback. Retention is the operator's concern, nothing here deletes one.
#[derive(Debug, Clone)]
pub struct BackupSnapshot {
    pub source: PathBuf,
    pub path: PathBuf,
    pub created_at: DateTime<Local>,
}

/// Creates and restores snapshots under a fixed backup root.
#[derive(Debug)]
pub struct BackupManager {
    root: PathBuf,
    prefix: String,
}

impl BackupManager {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    /// Snapshot `target` to `<root>/<prefix>-<YYYYmmdd-HHMMSS>`.
    ///
    /// The copy lands in a `.partial` directory first and is renamed into
    /// place once complete, so a snapshot either exists fully or not at all.
    pub fn snapshot(&self, target: &Path) -> Result<BackupSnapshot, BackupError> {
        if !target.exists() {
            return Err(BackupError::TargetMissing(target.to_path_buf()));
        }

        fs::create_dir_all(&self.root)?;

        let created_at = Local::now();
        let name = format!("{}-{}", self.prefix, created_at.format("%Y%m%d-%H%M%S"));
        let dest = self.root.join(&name);
        if dest.exists() {
            return Err(BackupError::SnapshotExists(dest));
        }

        let partial = self.root.join(format!("{}.partial", name));
        if partial.exists() {
            // Leftover from a crashed run; not trustworthy.
            fs::remove_dir_all(&partial)?;
        }

        if let Err(e) = fsops::copy_tree(target, &partial) {
            let _ = fs::remove_dir_all(&partial);
            return Err(e.into());
        }

        fs::rename(&partial, &dest)?;
        tracing::info!(snapshot = %dest.display(), "backup complete");

        Ok(BackupSnapshot {
            source: target.to_path_buf(),
            path: dest,
            created_at,
        })
    }

    /// Replace the contents of `target` with the snapshot's contents.
    pub fn restore(&self, snapshot: &BackupSnapshot, target: &Path) -> Result<(), BackupError> {
        if target.exists() {
            fs::remove_dir_all(target)?;
        }
        fsops::copy_tree(&snapshot.path, target)?;
        tracing::info!(
            snapshot = %snapshot.path.display(),
            target = %target.display(),
            "restored from backup"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_tree(root: &Path) {
        fs::create_dir_all(root.join("backend")).unwrap();
        fs::write(root.join("backend/server.js"), b"console.log('hi')").unwrap();
        fs::write(root.join(".env"), b"PORT=3001").unwrap();
    }

    #[test]
    fn snapshot_copies_full_tree() {
        let work = tempfile::tempdir().unwrap();
        let target = work.path().join("app");
        write_tree(&target);

        let manager = BackupManager::new(work.path().join("backups"), "app");
        let snap = manager.snapshot(&target).unwrap();

        assert!(snap.path.starts_with(work.path().join("backups")));
        assert_eq!(
            fs::read(snap.path.join("backend/server.js")).unwrap(),
            b"console.log('hi')"
        );
        assert_eq!(fs::read(snap.path.join(".env")).unwrap(), b"PORT=3001");
    }

    #[test]
    fn snapshot_of_missing_target_fails() {
        let work = tempfile::tempdir().unwrap();
        let manager = BackupManager::new(work.path().join("backups"), "app");

        let err = manager.snapshot(&work.path().join("gone")).unwrap_err();
        assert!(matches!(err, BackupError::TargetMissing(_)));
        assert!(!work.path().join("backups").exists() || fs::read_dir(work.path().join("backups")).unwrap().count() == 0);
    }

    #[test]
    fn restore_after_corruption_reproduces_original() {
        let work = tempfile::tempdir().unwrap();
        let target = work.path().join("app");
        write_tree(&target);

        let manager = BackupManager::new(work.path().join("backups"), "app");
        let snap = manager.snapshot(&target).unwrap();

        // Corrupt the tree: truncate one file, delete another, add junk.
        fs::write(target.join(".env"), b"").unwrap();
        fs::remove_file(target.join("backend/server.js")).unwrap();
        fs::write(target.join("junk.tmp"), b"junk").unwrap();

        manager.restore(&snap, &target).unwrap();

        assert_eq!(
            fs::read(target.join("backend/server.js")).unwrap(),
            b"console.log('hi')"
        );
        assert_eq!(fs::read(target.join(".env")).unwrap(), b"PORT=3001");
        assert!(!target.join("junk.tmp").exists());
    }

    #[test]
    fn failed_snapshot_leaves_no_partial() {
        let work = tempfile::tempdir().unwrap();
        let manager = BackupManager::new(work.path().join("backups"), "app");

        let _ = manager.snapshot(&work.path().join("missing"));

        if let Ok(entries) = fs::read_dir(work.path().join("backups")) {
            assert_eq!(entries.count(), 0);
        }
    }
}
