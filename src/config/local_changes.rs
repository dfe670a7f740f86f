// ABOUTME: Policy for uncommitted changes found in a fast-path checkout.
// ABOUTME: Supports commit (auto-commit/stash), stash, and fail.

use serde::de::{self, Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// What to do when the deployment checkout has uncommitted local changes
/// before a fast-path update. The hard reset that follows discards the
/// working tree either way; `commit` and `stash` keep the edits reachable
/// in git, `fail` refuses to proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalChangesPolicy {
    /// Auto-commit the changes, falling back to a stash when the commit
    /// itself fails (e.g. no author configured).
    #[default]
    Commit,
    /// Stash the changes.
    Stash,
    /// Treat a dirty tree as a sync failure.
    Fail,
}

impl FromStr for LocalChangesPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commit" => Ok(LocalChangesPolicy::Commit),
            "stash" => Ok(LocalChangesPolicy::Stash),
            "fail" => Ok(LocalChangesPolicy::Fail),
            _ => Err(format!("unknown local-changes policy: {}", s)),
        }
    }
}

impl fmt::Display for LocalChangesPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalChangesPolicy::Commit => write!(f, "commit"),
            LocalChangesPolicy::Stash => write!(f, "stash"),
            LocalChangesPolicy::Fail => write!(f, "fail"),
        }
    }
}

impl<'de> Deserialize<'de> for LocalChangesPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
