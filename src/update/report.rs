// ABOUTME: Structured end-of-run report: one entry per stage plus run metadata.
// ABOUTME: Serializable so the CLI can emit it as JSON for scripting.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Backup,
    Sync,
    Scripts,
    Frontend,
    Dependencies,
    Restart,
    Health,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Backup,
        Stage::Sync,
        Stage::Scripts,
        Stage::Frontend,
        Stage::Dependencies,
        Stage::Restart,
        Stage::Health,
    ];

    /// 1-based position in the pipeline, for progress output.
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0) + 1
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Backup => "backup",
            Stage::Sync => "sync",
            Stage::Scripts => "scripts",
            Stage::Frontend => "frontend",
            Stage::Dependencies => "dependencies",
            Stage::Restart => "restart",
            Stage::Health => "health",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of a single stage. Warnings do not fail the run; failures do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum StageStatus {
    Ok,
    Warned(String),
    Failed(String),
    Skipped(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    #[serde(flatten)]
    pub status: StageStatus,
}

/// Everything an operator needs to judge a run after the fact.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub service: String,
    pub host: String,
    pub started_at: DateTime<Local>,
    pub stages: Vec<StageReport>,
    pub backup: Option<PathBuf>,
    pub sync_mode: Option<String>,
    pub restart_strategy: Option<String>,
}

impl RunReport {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
            host: gethostname::gethostname().to_string_lossy().into_owned(),
            started_at: Local::now(),
            stages: Vec::new(),
            backup: None,
            sync_mode: None,
            restart_strategy: None,
        }
    }

    pub fn record(&mut self, stage: Stage, status: StageStatus) {
        match &status {
            StageStatus::Ok => tracing::info!(%stage, "stage ok"),
            StageStatus::Warned(d) => tracing::warn!(%stage, detail = %d, "stage warned"),
            StageStatus::Failed(d) => tracing::error!(%stage, detail = %d, "stage failed"),
            StageStatus::Skipped(d) => tracing::debug!(%stage, detail = %d, "stage skipped"),
        }
        self.stages.push(StageReport { stage, status });
    }

    /// A run succeeds when no stage failed. Warnings and skips are fine.
    pub fn success(&self) -> bool {
        !self
            .stages
            .iter()
            .any(|s| matches!(s.status, StageStatus::Failed(_)))
    }

    /// Human-readable summary, printed at the end of a run.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "\nUpdate report for {} on {}\n",
            self.service, self.host
        ));

        for entry in &self.stages {
            let line = match &entry.status {
                StageStatus::Ok => format!("  ok      {}\n", entry.stage),
                StageStatus::Warned(d) => format!("  warn    {} - {}\n", entry.stage, d),
                StageStatus::Failed(d) => format!("  FAILED  {} - {}\n", entry.stage, d),
                StageStatus::Skipped(d) => format!("  skip    {} - {}\n", entry.stage, d),
            };
            out.push_str(&line);
        }

        if let Some(ref backup) = self.backup {
            out.push_str(&format!("\nBackup: {}\n", backup.display()));
        }
        if let Some(ref mode) = self.sync_mode {
            out.push_str(&format!("Sync: {}\n", mode));
        }
        if let Some(ref strategy) = self.restart_strategy {
            out.push_str(&format!("Restart strategy: {}\n", strategy));
        }

        if self.success() {
            out.push_str("\nResult: success\n");
        } else {
            out.push_str("\nResult: FAILURE\n");
            if self
                .stages
                .iter()
                .any(|s| s.stage == Stage::Health && matches!(s.status, StageStatus::Failed(_)))
            {
                out.push_str(&format!(
                    "The service may not have started. Check the logs:\n  pm2 logs {}\n  journalctl -u {}\n",
                    self.service, self.service
                ));
            }
        }
        out
    }
}
