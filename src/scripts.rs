// ABOUTME: Line-ending normalization and re-permissioning of control scripts.
// ABOUTME: CRLF becomes LF; shell-invoked scripts also get their exec bit back.

use std::fs;
use std::io;
use std::path::Path;

use crate::config::Config;

/// Normalizes a fixed list of known scripts under the deployment root.
/// Control scripts are shell-invoked and get the executable bit restored;
/// support scripts only get their line endings fixed.
#[derive(Debug)]
pub struct ScriptNormalizer {
    control: Vec<String>,
    support: Vec<String>,
}

impl ScriptNormalizer {
    pub fn new<I, J, S>(control: I, support: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            control: control.into_iter().map(Into::into).collect(),
            support: support.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.control_scripts.clone(), config.support_scripts.clone())
    }

    /// Normalize every configured script present under `target`. Missing
    /// names are skipped silently; per-file failures are logged and skipped.
    /// Returns the number of files actually modified.
    pub fn normalize(&self, target: &Path) -> usize {
        let mut modified = 0;

        for name in &self.control {
            modified += self.normalize_one(&target.join(name), true);
        }
        for name in &self.support {
            modified += self.normalize_one(&target.join(name), false);
        }

        modified
    }

    fn normalize_one(&self, path: &Path, executable: bool) -> usize {
        if !path.is_file() {
            return 0;
        }

        match normalize_file(path, executable) {
            Ok(true) => {
                tracing::info!(script = %path.display(), "normalized");
                1
            }
            Ok(false) => 0,
            Err(e) => {
                tracing::warn!(script = %path.display(), error = %e, "could not normalize");
                0
            }
        }
    }
}

/// Rewrite CRLF to LF and (optionally) restore the exec bit. Returns whether
/// the file was changed. A file already in LF form with the right mode is
/// left byte-identical and untouched on disk.
fn normalize_file(path: &Path, executable: bool) -> io::Result<bool> {
    let mut changed = false;

    let content = fs::read(path)?;
    if content.windows(2).any(|w| w == b"\r\n") {
        fs::write(path, crlf_to_lf(&content))?;
        changed = true;
    }

    if executable && ensure_executable(path)? {
        changed = true;
    }

    Ok(changed)
}

fn crlf_to_lf(content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len());
    let mut i = 0;
    while i < content.len() {
        if content[i] == b'\r' && content.get(i + 1) == Some(&b'\n') {
            out.push(b'\n');
            i += 2;
        } else {
            out.push(content[i]);
            i += 1;
        }
    }
    out
}

#[cfg(unix)]
fn ensure_executable(path: &Path) -> io::Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path)?;
    let mode = metadata.permissions().mode();
    if mode & 0o111 == 0o111 {
        return Ok(false);
    }
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(true)
}

#[cfg(not(unix))]
fn ensure_executable(_path: &Path) -> io::Result<bool> {
    Ok(false)
}
