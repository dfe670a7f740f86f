// ABOUTME: Recursive filesystem helpers shared by backup, sync, and frontend.
// ABOUTME: Plain std::fs; metadata (permissions) is preserved where feasible.

use std::fs;
use std::io;
use std::path::Path;

/// Recursively copy `src` into `dst`. `dst` is created if missing. Symlinks
/// are followed (the deployment trees this runs on do not use them).
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    copy_permissions(src, dst)
}

/// Copy a single entry (file or directory) to `dst`.
pub fn copy_entry(src: &Path, dst: &Path) -> io::Result<()> {
    if src.is_dir() {
        copy_tree(src, dst)
    } else {
        fs::copy(src, dst).map(|_| ())
    }
}

/// Remove a single entry (file or directory), whichever it is.
pub fn remove_entry(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Delete everything inside `dir` without removing `dir` itself.
pub fn clear_dir(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        remove_entry(&entry?.path())?;
    }
    Ok(())
}

fn copy_permissions(src: &Path, dst: &Path) -> io::Result<()> {
    let perms = fs::metadata(src)?.permissions();
    fs::set_permissions(dst, perms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn copy_tree_copies_nested_structure() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();

        fs::create_dir_all(src.path().join("a/b")).unwrap();
        fs::write(src.path().join("a/b/file.txt"), b"hello").unwrap();
        fs::write(src.path().join("top.txt"), b"top").unwrap();

        let dest = dst.path().join("copy");
        copy_tree(src.path(), &dest).unwrap();

        assert_eq!(fs::read(dest.join("a/b/file.txt")).unwrap(), b"hello");
        assert_eq!(fs::read(dest.join("top.txt")).unwrap(), b"top");
    }

    #[test]
    fn clear_dir_leaves_directory_in_place() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x"), b"x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        clear_dir(dir.path()).unwrap();

        assert!(dir.path().exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn remove_entry_handles_files_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        let sub = dir.path().join("d");
        fs::write(&file, b"f").unwrap();
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("inner"), b"i").unwrap();

        remove_entry(&file).unwrap();
        remove_entry(&sub).unwrap();

        assert!(!file.exists());
        assert!(!sub.exists());
    }
}
