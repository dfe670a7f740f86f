// ABOUTME: Runs the dependency manager for the backend in production mode.
// ABOUTME: First-time install failure is fatal, refresh failure only warns.

use std::path::PathBuf;
use tokio::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum DependencyError {
    #[error("first-time dependency install failed: {0}")]
    FirstInstallFailed(String),

    #[error("backend directory does not exist: {0}")]
    BackendMissing(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Install command exited zero.
    Installed,
    /// Refresh of an existing dependency tree failed; the previous tree is
    /// still in place, so the run continues with a warning.
    RefreshFailed(String),
}

/// Invokes the external dependency manager with the backend directory as
/// working directory. The exit code is the success signal.
#[derive(Debug)]
pub struct DependencyInstaller {
    backend_dir: PathBuf,
    program: String,
    args: Vec<String>,
}

impl DependencyInstaller {
    pub fn new(backend_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend_dir: backend_dir.into(),
            program: "npm".to_string(),
            args: vec!["install".to_string(), "--production".to_string()],
        }
    }

    /// Override the install command. Used by tests; also handy for yarn/pnpm
    /// setups.
    pub fn with_command<I, S>(mut self, program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.program = program.to_string();
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub async fn install(&self) -> Result<InstallOutcome, DependencyError> {
        if !self.backend_dir.is_dir() {
            return Err(DependencyError::BackendMissing(self.backend_dir.clone()));
        }

        // Whether a dependency tree pre-existed decides failure severity.
        let refresh = self.backend_dir.join("node_modules").is_dir();

        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.backend_dir)
            .output()
            .await?;

        if output.status.success() {
            return Ok(InstallOutcome::Installed);
        }

        let detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if refresh {
            tracing::warn!(detail = %detail, "dependency refresh failed, keeping existing tree");
            Ok(InstallOutcome::RefreshFailed(detail))
        } else {
            Err(DependencyError::FirstInstallFailed(detail))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn successful_install_reports_installed() {
        let backend = tempfile::tempdir().unwrap();
        let installer =
            DependencyInstaller::new(backend.path()).with_command("true", Vec::<String>::new());

        assert_eq!(installer.install().await.unwrap(), InstallOutcome::Installed);
    }

    #[tokio::test]
    async fn refresh_failure_is_a_warning() {
        let backend = tempfile::tempdir().unwrap();
        fs::create_dir(backend.path().join("node_modules")).unwrap();
        let installer =
            DependencyInstaller::new(backend.path()).with_command("false", Vec::<String>::new());

        assert!(matches!(
            installer.install().await.unwrap(),
            InstallOutcome::RefreshFailed(_)
        ));
    }

    #[tokio::test]
    async fn first_install_failure_is_fatal() {
        let backend = tempfile::tempdir().unwrap();
        let installer =
            DependencyInstaller::new(backend.path()).with_command("false", Vec::<String>::new());

        assert!(matches!(
            installer.install().await,
            Err(DependencyError::FirstInstallFailed(_))
        ));
    }

    #[tokio::test]
    async fn missing_backend_dir_is_fatal() {
        let work = tempfile::tempdir().unwrap();
        let installer = DependencyInstaller::new(work.path().join("gone"));

        assert!(matches!(
            installer.install().await,
            Err(DependencyError::BackendMissing(_))
        ));
    }
}
