// ABOUTME: Hooks system for update lifecycle events.
// ABOUTME: Discovers and executes scripts at pre-update, post-update, and on-error points.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::types::ServiceName;

/// Hook execution points in the update lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// Before the run starts. Failure aborts the update.
    PreUpdate,
    /// After a successful run. Failure logs a warning.
    PostUpdate,
    /// On run failure. Failure logs a warning.
    OnError,
}

impl HookPoint {
    /// Get the hook filename for this point.
    pub fn filename(&self) -> &'static str {
        match self {
            HookPoint::PreUpdate => "pre-update",
            HookPoint::PostUpdate => "post-update",
            HookPoint::OnError => "on-error",
        }
    }

    /// Whether failure at this hook point should abort the update.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HookPoint::PreUpdate)
    }
}

/// Context passed to hooks via environment variables.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub service: ServiceName,
    pub target: PathBuf,
    pub branch: String,
    pub backup: Option<PathBuf>,
}

impl HookContext {
    /// Convert context to environment variables.
    pub fn to_env(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert("RENOVA_SERVICE".to_string(), self.service.to_string());
        env.insert(
            "RENOVA_TARGET".to_string(),
            self.target.display().to_string(),
        );
        env.insert("RENOVA_BRANCH".to_string(), self.branch.clone());
        if let Some(ref backup) = self.backup {
            env.insert("RENOVA_BACKUP".to_string(), backup.display().to_string());
        }
        env
    }
}

/// Result of running a hook.
#[derive(Debug)]
pub struct HookResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Discovers and runs hooks from a project directory.
pub struct HookRunner {
    hooks_dir: PathBuf,
}

impl HookRunner {
    /// Create a new hook runner looking for hooks in the given project directory.
    pub fn new(project_dir: &Path) -> Self {
        Self {
            hooks_dir: project_dir.join(".renova").join("hooks"),
        }
    }

    /// Check if a hook exists for the given point.
    pub fn hook_exists(&self, point: HookPoint) -> bool {
        self.hook_path(point).is_file()
    }

    fn hook_path(&self, point: HookPoint) -> PathBuf {
        self.hooks_dir.join(point.filename())
    }

    /// Run a hook if it exists.
    ///
    /// Returns None if the hook doesn't exist, or Some(HookResult) if it was run.
    pub async fn run(&self, point: HookPoint, context: &HookContext) -> Option<HookResult> {
        let hook_path = self.hook_path(point);

        if !hook_path.is_file() {
            return None;
        }

        tracing::info!("Running {} hook: {}", point.filename(), hook_path.display());

        let env_vars = context.to_env();

        let output = Command::new(&hook_path)
            .envs(&env_vars)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Ok(output) => {
                let result = HookResult {
                    success: output.status.success(),
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                };

                if result.success {
                    tracing::info!("{} hook completed successfully", point.filename());
                } else {
                    tracing::warn!(
                        "{} hook failed with exit code {:?}",
                        point.filename(),
                        result.exit_code
                    );
                }

                Some(result)
            }
            Err(e) => {
                tracing::error!("Failed to execute {} hook: {}", point.filename(), e);
                Some(HookResult {
                    success: false,
                    exit_code: None,
                    stdout: String::new(),
                    stderr: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_point_filenames() {
        assert_eq!(HookPoint::PreUpdate.filename(), "pre-update");
        assert_eq!(HookPoint::PostUpdate.filename(), "post-update");
        assert_eq!(HookPoint::OnError.filename(), "on-error");
    }

    #[test]
    fn pre_update_is_fatal() {
        assert!(HookPoint::PreUpdate.is_fatal());
        assert!(!HookPoint::PostUpdate.is_fatal());
        assert!(!HookPoint::OnError.is_fatal());
    }

    #[test]
    fn hook_context_to_env() {
        let context = HookContext {
            service: ServiceName::new("myapp").unwrap(),
            target: PathBuf::from("/var/www/myapp"),
            branch: "main".to_string(),
            backup: Some(PathBuf::from("/var/www/backups/myapp-20250101-120000")),
        };

        let env = context.to_env();
        assert_eq!(env.get("RENOVA_SERVICE"), Some(&"myapp".to_string()));
        assert_eq!(env.get("RENOVA_TARGET"), Some(&"/var/www/myapp".to_string()));
        assert_eq!(env.get("RENOVA_BRANCH"), Some(&"main".to_string()));
        assert_eq!(
            env.get("RENOVA_BACKUP"),
            Some(&"/var/www/backups/myapp-20250101-120000".to_string())
        );
    }

    #[test]
    fn hook_context_without_backup() {
        let context = HookContext {
            service: ServiceName::new("myapp").unwrap(),
            target: PathBuf::from("/srv/app"),
            branch: "main".to_string(),
            backup: None,
        };

        let env = context.to_env();
        assert!(!env.contains_key("RENOVA_BACKUP"));
    }

    #[test]
    fn hook_runner_checks_hooks_dir() {
        let runner = HookRunner::new(Path::new("/nonexistent"));
        assert!(!runner.hook_exists(HookPoint::PreUpdate));
    }
}
