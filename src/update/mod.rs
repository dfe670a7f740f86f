// ABOUTME: Update pipeline: stage sequencing, rollback decision, run report.
// ABOUTME: Exports the Orchestrator and the report types it produces.

mod orchestrator;
mod report;

pub use orchestrator::Orchestrator;
pub use report::{RunReport, Stage, StageReport, StageStatus};
