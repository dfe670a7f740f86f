// ABOUTME: Concrete restart strategies: pm2, systemd, raw detached process.
// ABOUTME: Tool availability is probed via `which` on the execution path.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use crate::config::Config;
use crate::types::ServiceName;

use super::RestartStrategy;

/// Whether `tool` resolves on the execution path.
async fn tool_on_path(tool: &str) -> bool {
    Command::new("which")
        .arg(tool)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run a command, mapping spawn errors and non-zero exits to a detail string.
async fn run_checked(program: &str, args: &[&str], cwd: Option<&PathBuf>) -> Result<(), String> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().await.map_err(|e| e.to_string())?;
    if output.status.success() {
        Ok(())
    } else {
        Err(String::from_utf8_lossy(&output.stderr).trim().to_string())
    }
}

/// Process-manager strategy: `pm2 restart`, or `pm2 start` when the process
/// is not yet known to pm2.
pub struct Pm2Strategy {
    service: ServiceName,
    target: PathBuf,
    entrypoint: String,
}

impl Pm2Strategy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            service: config.service.clone(),
            target: config.target.clone(),
            entrypoint: config
                .backend_dir
                .join(&config.entrypoint)
                .display()
                .to_string(),
        }
    }
}

#[async_trait]
impl RestartStrategy for Pm2Strategy {
    fn name(&self) -> &'static str {
        "process-manager"
    }

    async fn available(&self) -> bool {
        tool_on_path("pm2").await
    }

    async fn attempt(&self) -> Result<(), String> {
        let restart = run_checked(
            "pm2",
            &["restart", self.service.as_str()],
            Some(&self.target),
        )
        .await;

        match restart {
            Ok(()) => Ok(()),
            Err(_) => {
                // Unknown to pm2 yet; register and start it.
                run_checked(
                    "pm2",
                    &["start", &self.entrypoint, "--name", self.service.as_str()],
                    Some(&self.target),
                )
                .await
            }
        }
    }
}

/// Init-system strategy: restart the service unit, falling back to the
/// reverse-proxy unit when the primary unit is not registered.
pub struct SystemdStrategy {
    unit: ServiceName,
    fallback_unit: String,
}

impl SystemdStrategy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            unit: config.service.clone(),
            fallback_unit: "nginx".to_string(),
        }
    }
}

#[async_trait]
impl RestartStrategy for SystemdStrategy {
    fn name(&self) -> &'static str {
        "init-system"
    }

    async fn available(&self) -> bool {
        tool_on_path("systemctl").await
    }

    async fn attempt(&self) -> Result<(), String> {
        match run_checked("systemctl", &["restart", self.unit.as_str()], None).await {
            Ok(()) => Ok(()),
            Err(_) => run_checked("systemctl", &["restart", &self.fallback_unit], None).await,
        }
    }
}

/// Last resort: kill any process matching the service invocation pattern and
/// launch a fresh detached one. The child is placed in its own process group
/// with output sunk to null so it survives this orchestrator's exit.
pub struct RawProcessStrategy {
    backend_dir: PathBuf,
    entrypoint: String,
}

impl RawProcessStrategy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            backend_dir: config.backend_path(),
            entrypoint: config.entrypoint.clone(),
        }
    }

    fn kill_pattern(&self) -> String {
        format!("node.*{}", self.entrypoint)
    }
}

#[async_trait]
impl RestartStrategy for RawProcessStrategy {
    fn name(&self) -> &'static str {
        "raw-process"
    }

    async fn available(&self) -> bool {
        // Always applicable as the end of the cascade.
        true
    }

    async fn attempt(&self) -> Result<(), String> {
        // pkill exits non-zero when nothing matched; that is fine.
        let _ = Command::new("pkill")
            .args(["-f", &self.kill_pattern()])
            .status()
            .await;

        let mut cmd = std::process::Command::new("node");
        cmd.arg(&self.entrypoint)
            .current_dir(&self.backend_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        cmd.spawn().map(|_| ()).map_err(|e| e.to_string())
    }
}
