// ABOUTME: Single-shot HTTP liveness probe for the restarted service.
// ABOUTME: Waits a settle delay, then checks the body for a marker token.

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::{Request, StatusCode};
use hyper_util::rt::TokioIo;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::config::HealthcheckConfig;

/// Verdict of a single probe. Any transport error, non-success status, or
/// missing marker is Unhealthy; there is no retry loop here, callers
/// needing retries compose this primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

#[derive(Debug)]
pub struct HealthChecker {
    host: String,
    port: u16,
    path: String,
    marker: String,
    settle: Duration,
    timeout: Duration,
}

impl HealthChecker {
    pub fn from_config(config: &HealthcheckConfig) -> Self {
        Self {
            host: "localhost".to_string(),
            port: config.port,
            path: config.path.clone(),
            marker: config.marker.clone(),
            settle: config.settle,
            timeout: config.timeout,
        }
    }

    #[cfg(test)]
    fn for_endpoint(port: u16, path: &str, marker: &str) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port,
            path: path.to_string(),
            marker: marker.to_string(),
            settle: Duration::ZERO,
            timeout: Duration::from_secs(2),
        }
    }

    /// Wait the settle delay, then issue one GET against the endpoint.
    pub async fn probe(&self) -> HealthStatus {
        tokio::time::sleep(self.settle).await;

        match tokio::time::timeout(self.timeout, self.request()).await {
            Ok(Ok((status, body))) => {
                if !status.is_success() {
                    HealthStatus::Unhealthy(format!("endpoint returned {}", status))
                } else if body.contains(&self.marker) {
                    HealthStatus::Healthy
                } else {
                    HealthStatus::Unhealthy(format!(
                        "response did not contain marker '{}'",
                        self.marker
                    ))
                }
            }
            Ok(Err(detail)) => HealthStatus::Unhealthy(detail),
            Err(_) => HealthStatus::Unhealthy(format!(
                "probe timed out after {}s",
                self.timeout.as_secs()
            )),
        }
    }

    async fn request(&self) -> Result<(StatusCode, String), String> {
        let stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| format!("connect failed: {}", e))?;
        let io = TokioIo::new(stream);

        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| format!("handshake failed: {}", e))?;
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(error = %e, "probe connection error");
            }
        });

        let request = Request::builder()
            .uri(&self.path)
            .header(hyper::header::HOST, format!("{}:{}", self.host, self.port))
            .body(Empty::<Bytes>::new())
            .map_err(|e| format!("bad probe request: {}", e))?;

        let response = sender
            .send_request(request)
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| format!("body read failed: {}", e))?
            .to_bytes();

        Ok((status, String::from_utf8_lossy(&body).to_string()))
    }
}
