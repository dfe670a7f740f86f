// ABOUTME: Shared helpers for integration tests.
// ABOUTME: Builds throwaway local git repositories with the real git binary.
#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::process::Command;

/// Run git with a fixed test identity; panic on failure.
pub fn git(cwd: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args([
            "-c",
            "user.email=test@example.com",
            "-c",
            "user.name=Test",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("git should be runnable");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Initialize a repository with a `main` branch at `dir`.
pub fn init_repo(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    git(dir, &["init", "-b", "main"]);
}

/// Stage and commit everything in `dir`.
pub fn commit_all(dir: &Path, message: &str) {
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-m", message]);
}

/// Create the "remote" repository the tests sync from: a `backend/`
/// directory with an entrypoint, and a top-level `config.json`.
pub fn seed_remote(dir: &Path) {
    init_repo(dir);
    fs::create_dir_all(dir.join("backend")).unwrap();
    fs::write(dir.join("backend/server.js"), b"// v2\n").unwrap();
    fs::write(dir.join("config.json"), b"{\"version\":2}\n").unwrap();
    commit_all(dir, "initial");
}

/// Collect every file under `root` as (relative path, contents), sorted.
pub fn file_map(root: &Path) -> Vec<(String, Vec<u8>)> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<(String, Vec<u8>)>) {
        for entry in fs::read_dir(dir).unwrap() {
            let entry = entry.unwrap();
            let path = entry.path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap().display().to_string();
                out.push((rel, fs::read(&path).unwrap()));
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}
