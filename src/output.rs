// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use crate::update::RunReport;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only the final result)
    Quiet,
    /// JSON report for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print the end-of-run report.
    pub fn report(&self, report: &RunReport) {
        match self.mode {
            OutputMode::Normal => print!("{}", report.render_text()),
            OutputMode::Quiet => {
                if report.success() {
                    println!("success");
                } else {
                    println!("failure");
                }
            }
            OutputMode::Json => {
                if let Ok(json) = serde_json::to_string_pretty(report) {
                    println!("{json}");
                }
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        eprintln!("Error: {message}");
    }
}
