// ABOUTME: Mirrors built frontend assets into the served directory.
// ABOUTME: Optionally stamps index.html with the deployed revision and time.

use chrono::Local;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::FrontendConfig;
use crate::fsops;
use crate::sync::git;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontendOutcome {
    /// Assets copied; whether index.html was stamped.
    Synced { stamped: bool },
    /// Build output directory not found; nothing to do.
    SourceMissing,
}

/// Copies `<target>/<src>` into `<target>/<dest>`, clearing the destination
/// first so stale assets never survive an update.
#[derive(Debug)]
pub struct FrontendSync {
    src: PathBuf,
    dest: PathBuf,
    stamp: bool,
}

impl FrontendSync {
    pub fn from_config(config: &FrontendConfig) -> Self {
        Self {
            src: config.src.clone(),
            dest: config.dest.clone(),
            stamp: config.stamp,
        }
    }

    pub async fn sync(&self, target: &Path) -> io::Result<FrontendOutcome> {
        let src = target.join(&self.src);
        if !src.is_dir() {
            tracing::warn!(src = %src.display(), "frontend build output missing, skipping");
            return Ok(FrontendOutcome::SourceMissing);
        }

        let dest = target.join(&self.dest);
        fs::create_dir_all(&dest)?;
        fsops::clear_dir(&dest)?;

        for entry in fs::read_dir(&src)? {
            let entry = entry?;
            fsops::copy_entry(&entry.path(), &dest.join(entry.file_name()))?;
        }

        let stamped = if self.stamp {
            stamp_index(target, &dest.join("index.html")).await?
        } else {
            false
        };

        Ok(FrontendOutcome::Synced { stamped })
    }
}

/// Insert a version comment right after the `<body>` tag. The hash comes
/// from the deployment checkout; `unknown` when the target has no history.
async fn stamp_index(target: &Path, index: &Path) -> io::Result<bool> {
    if !index.is_file() {
        tracing::warn!(index = %index.display(), "index.html not found, skipping stamp");
        return Ok(false);
    }

    let revision = git::short_head(target)
        .await
        .unwrap_or_else(|| "unknown".to_string());
    let marker = format!(
        "<!-- renova {} @ {} -->",
        revision,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let content = fs::read_to_string(index)?;
    let Some(open) = content.find("<body") else {
        tracing::warn!(index = %index.display(), "no <body> tag, skipping stamp");
        return Ok(false);
    };
    let Some(close) = content[open..].find('>') else {
        return Ok(false);
    };

    let insert_at = open + close + 1;
    let mut stamped = String::with_capacity(content.len() + marker.len() + 1);
    stamped.push_str(&content[..insert_at]);
    stamped.push('\n');
    stamped.push_str(&marker);
    stamped.push_str(&content[insert_at..]);

    fs::write(index, stamped)?;
    Ok(true)
}
