// ABOUTME: Exact-name set of deployment entries that survive a resync.
// ABOUTME: Membership is whole-name equality, never prefix or glob matching.

use std::io;
use std::path::Path;

/// Top-level entries (files or directories, relative to the deployment
/// root) protected during a merge-path resync.
#[derive(Debug, Clone)]
pub struct PreserveSet {
    names: Vec<String>,
}

impl PreserveSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact-name membership. `uploads` does not match `uploads-old`.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Members actually present as entries of `dir`, in set order.
    pub fn present_in(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut present = Vec::new();
        for name in &self.names {
            if dir.join(name).exists() {
                present.push(name.clone());
            }
        }
        Ok(present)
    }
}
