// ABOUTME: Drives the update stages in fixed order with one rollback point.
// ABOUTME: Only a sync failure restores the pre-sync backup and aborts.

use std::path::Path;

use crate::backup::{BackupManager, BackupSnapshot};
use crate::config::Config;
use crate::deps::{DependencyInstaller, InstallOutcome};
use crate::error::{Error, Result};
use crate::frontend::{FrontendOutcome, FrontendSync};
use crate::health::{HealthChecker, HealthStatus};
use crate::hooks::{HookContext, HookPoint, HookRunner};
use crate::output::Output;
use crate::scripts::ScriptNormalizer;
use crate::service::ServiceController;
use crate::sync::{PreserveSet, SourceSynchronizer};

use super::report::{RunReport, Stage, StageStatus};

/// Sequences backup, sync, normalize, frontend, dependencies, restart, and
/// health probe against a single deployment target.
///
/// The deployment directory is treated as exclusively owned for the whole
/// run. Nothing enforces that; running two orchestrators against the same
/// target concurrently is an operational error.
pub struct Orchestrator {
    config: Config,
    output: Output,
    hooks: HookRunner,
}

impl Orchestrator {
    pub fn new(config: Config, output: Output, project_dir: &Path) -> Self {
        Self {
            config,
            output,
            hooks: HookRunner::new(project_dir),
        }
    }

    /// Run the pipeline to completion. Err is reserved for preconditions
    /// (missing target, failing pre-update hook); everything past that is
    /// captured in the returned report.
    pub async fn run(&self) -> Result<RunReport> {
        let target = &self.config.target;
        if !target.exists() {
            // Fatal precondition: abort before any backup is attempted.
            return Err(Error::TargetMissing(target.clone()));
        }

        let mut context = HookContext {
            service: self.config.service.clone(),
            target: target.clone(),
            branch: self.config.branch.clone(),
            backup: None,
        };

        if let Some(result) = self.hooks.run(HookPoint::PreUpdate, &context).await
            && !result.success
        {
            return Err(Error::UpdateFailed(format!(
                "pre-update hook failed: {}",
                result.stderr.trim()
            )));
        }

        let mut report = RunReport::new(self.config.service.as_str());

        // Stage 1: backup. Without a rollback point the rest is unsafe.
        self.progress(Stage::Backup, "backing up current version");
        let backups = BackupManager::new(self.config.backup_dir(), self.config.backup_prefix());
        let snapshot = match backups.snapshot(target) {
            Ok(snapshot) => {
                self.output
                    .progress(&format!("  backup: {}", snapshot.path.display()));
                report.backup = Some(snapshot.path.clone());
                context.backup = Some(snapshot.path.clone());
                report.record(Stage::Backup, StageStatus::Ok);
                snapshot
            }
            Err(e) => {
                report.record(Stage::Backup, StageStatus::Failed(e.to_string()));
                self.finish(&report, &context).await;
                return Ok(report);
            }
        };

        // Stage 2: sync. The only stage whose failure rolls back.
        self.progress(Stage::Sync, "pulling latest source");
        if !self.sync_stage(&mut report, &backups, &snapshot).await {
            self.finish(&report, &context).await;
            return Ok(report);
        }

        // Stage 3: normalize control scripts. Per-file errors are logged
        // inside the normalizer and never abort the run.
        self.progress(Stage::Scripts, "normalizing control scripts");
        let fixed = ScriptNormalizer::from_config(&self.config).normalize(target);
        self.output.progress(&format!("  fixed {} script(s)", fixed));
        report.record(Stage::Scripts, StageStatus::Ok);

        // Stage 4: frontend assets.
        self.progress(Stage::Frontend, "syncing frontend assets");
        self.frontend_stage(&mut report).await;

        // Stage 5: backend dependencies. Fatal only on first install.
        self.progress(Stage::Dependencies, "installing backend dependencies");
        if !self.dependencies_stage(&mut report).await {
            self.finish(&report, &context).await;
            return Ok(report);
        }

        // Stage 6: restart cascade. Exhaustion is a warning; the health
        // probe is the authoritative verdict.
        self.progress(Stage::Restart, "restarting service");
        match ServiceController::from_config(&self.config).restart().await {
            Ok(strategy) => {
                self.output.progress(&format!("  restarted via {}", strategy));
                report.restart_strategy = Some(strategy.to_string());
                report.record(Stage::Restart, StageStatus::Ok);
            }
            Err(e) => {
                report.record(Stage::Restart, StageStatus::Warned(e.to_string()));
            }
        }

        // Stage 7: health probe. No rollback this late; the report carries
        // the verdict and where to look.
        self.progress(Stage::Health, "probing service health");
        match HealthChecker::from_config(&self.config.healthcheck)
            .probe()
            .await
        {
            HealthStatus::Healthy => report.record(Stage::Health, StageStatus::Ok),
            HealthStatus::Unhealthy(detail) => {
                report.record(Stage::Health, StageStatus::Failed(detail));
            }
        }

        self.finish(&report, &context).await;
        Ok(report)
    }

    /// Returns false when the run must abort (sync failed, tree restored).
    async fn sync_stage(
        &self,
        report: &mut RunReport,
        backups: &BackupManager,
        snapshot: &BackupSnapshot,
    ) -> bool {
        let synchronizer = SourceSynchronizer::from_config(&self.config);
        let preserve = PreserveSet::new(self.config.preserve.clone());

        match synchronizer.sync(&self.config.target, &preserve).await {
            Ok(mode) => {
                self.output.progress(&format!("  updated ({})", mode.as_str()));
                report.sync_mode = Some(mode.as_str().to_string());
                report.record(Stage::Sync, StageStatus::Ok);
                true
            }
            Err(e) => {
                self.output.progress("  sync failed, restoring from backup");
                let status = match backups.restore(snapshot, &self.config.target) {
                    Ok(()) => StageStatus::Failed(format!("sync failed, rolled back: {}", e)),
                    Err(restore_err) => StageStatus::Failed(format!(
                        "sync failed ({}) and restore also failed: {}",
                        e, restore_err
                    )),
                };
                report.record(Stage::Sync, status);
                false
            }
        }
    }

    async fn frontend_stage(&self, report: &mut RunReport) {
        let Some(ref frontend_config) = self.config.frontend else {
            report.record(
                Stage::Frontend,
                StageStatus::Skipped("not configured".to_string()),
            );
            return;
        };

        match FrontendSync::from_config(frontend_config)
            .sync(&self.config.target)
            .await
        {
            Ok(FrontendOutcome::Synced { stamped }) => {
                if stamped {
                    self.output.progress("  assets synced and stamped");
                }
                report.record(Stage::Frontend, StageStatus::Ok);
            }
            Ok(FrontendOutcome::SourceMissing) => {
                report.record(
                    Stage::Frontend,
                    StageStatus::Warned("frontend build output missing".to_string()),
                );
            }
            Err(e) => {
                report.record(
                    Stage::Frontend,
                    StageStatus::Warned(format!("frontend sync failed: {}", e)),
                );
            }
        }
    }

    /// Returns false when the run must abort (first install failed).
    async fn dependencies_stage(&self, report: &mut RunReport) -> bool {
        match DependencyInstaller::new(self.config.backend_path())
            .install()
            .await
        {
            Ok(InstallOutcome::Installed) => {
                report.record(Stage::Dependencies, StageStatus::Ok);
                true
            }
            Ok(InstallOutcome::RefreshFailed(detail)) => {
                report.record(
                    Stage::Dependencies,
                    StageStatus::Warned(format!("dependency refresh failed: {}", detail)),
                );
                true
            }
            Err(e) => {
                report.record(Stage::Dependencies, StageStatus::Failed(e.to_string()));
                false
            }
        }
    }

    fn progress(&self, stage: Stage, message: &str) {
        self.output.progress(&format!(
            "\n[{}/{}] {}",
            stage.index(),
            Stage::ALL.len(),
            message
        ));
    }

    async fn finish(&self, report: &RunReport, context: &HookContext) {
        let point = if report.success() {
            HookPoint::PostUpdate
        } else {
            HookPoint::OnError
        };
        if let Some(result) = self.hooks.run(point, context).await
            && !result.success
        {
            tracing::warn!(hook = point.filename(), "lifecycle hook failed");
        }
    }
}
