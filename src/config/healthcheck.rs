// ABOUTME: Post-restart health probe configuration.
// ABOUTME: Defines the liveness endpoint, marker token, and timing knobs.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthcheckConfig {
    /// Path of the liveness endpoint on the local service.
    pub path: String,

    /// Port the service listens on.
    pub port: u16,

    /// Token the response body must contain for the probe to pass.
    pub marker: String,

    /// Wait after restart before probing, to let the process start up.
    #[serde(with = "humantime_serde")]
    pub settle: Duration,

    /// Timeout for the single probe request.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for HealthcheckConfig {
    fn default() -> Self {
        Self {
            path: "/api/health".to_string(),
            port: 3001,
            marker: "ok".to_string(),
            settle: Duration::from_secs(2),
            timeout: Duration::from_secs(5),
        }
    }
}

impl HealthcheckConfig {
    /// Full URL of the probe endpoint.
    pub fn url(&self) -> String {
        format!("http://localhost:{}{}", self.port, self.path)
    }
}
