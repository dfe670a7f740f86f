// ABOUTME: Service restart via an ordered strategy cascade.
// ABOUTME: Each strategy exposes detect-availability and attempt; first success wins.

mod strategies;

pub use strategies::{Pm2Strategy, RawProcessStrategy, SystemdStrategy};

use async_trait::async_trait;
use std::time::Duration;

use crate::config::Config;

/// Bound on a single restart attempt. A wedged tool counts as a failed
/// attempt and the cascade moves on.
const ATTEMPT_LIMIT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum RestartError {
    #[error("all restart strategies exhausted")]
    Exhausted,
}

/// One way of restarting the service. Strategies are tried in priority
/// order; an unavailable or failed strategy passes control to the next.
#[async_trait]
pub trait RestartStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the underlying tool is present on this host.
    async fn available(&self) -> bool;

    /// Try to restart the service. Err carries a human-readable detail.
    async fn attempt(&self) -> Result<(), String>;
}

/// Tries restart strategies in fixed priority order and stops at the first
/// success. New strategies slot in without touching the orchestrator.
pub struct ServiceController {
    strategies: Vec<Box<dyn RestartStrategy>>,
}

impl ServiceController {
    pub fn new(strategies: Vec<Box<dyn RestartStrategy>>) -> Self {
        Self { strategies }
    }

    /// Default cascade: process manager, then init system, then a raw
    /// detached process as last resort.
    pub fn from_config(config: &Config) -> Self {
        Self::new(vec![
            Box::new(Pm2Strategy::from_config(config)),
            Box::new(SystemdStrategy::from_config(config)),
            Box::new(RawProcessStrategy::from_config(config)),
        ])
    }

    /// Returns the name of the strategy that succeeded.
    pub async fn restart(&self) -> Result<&'static str, RestartError> {
        for strategy in &self.strategies {
            if !strategy.available().await {
                tracing::debug!(strategy = strategy.name(), "unavailable, skipping");
                continue;
            }
            match tokio::time::timeout(ATTEMPT_LIMIT, strategy.attempt()).await {
                Ok(Ok(())) => {
                    tracing::info!(strategy = strategy.name(), "service restarted");
                    return Ok(strategy.name());
                }
                Ok(Err(detail)) => {
                    tracing::warn!(strategy = strategy.name(), detail = %detail, "restart attempt failed");
                }
                Err(_) => {
                    tracing::warn!(strategy = strategy.name(), "restart attempt timed out");
                }
            }
        }
        Err(RestartError::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Scripted {
        name: &'static str,
        available: bool,
        succeeds: bool,
        invoked: AtomicBool,
    }

    impl Scripted {
        fn new(name: &'static str, available: bool, succeeds: bool) -> Self {
            Self {
                name,
                available,
                succeeds,
                invoked: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl RestartStrategy for &'static Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn available(&self) -> bool {
            self.available
        }

        async fn attempt(&self) -> Result<(), String> {
            self.invoked.store(true, Ordering::SeqCst);
            if self.succeeds {
                Ok(())
            } else {
                Err("scripted failure".to_string())
            }
        }
    }

    fn leak(s: Scripted) -> &'static Scripted {
        Box::leak(Box::new(s))
    }

    #[tokio::test]
    async fn first_available_success_short_circuits() {
        let first = leak(Scripted::new("process-manager", false, true));
        let second = leak(Scripted::new("init-system", true, true));
        let third = leak(Scripted::new("raw-process", true, true));

        let controller = ServiceController::new(vec![
            Box::new(first),
            Box::new(second),
            Box::new(third),
        ]);

        assert_eq!(controller.restart().await.unwrap(), "init-system");
        assert!(!first.invoked.load(Ordering::SeqCst));
        assert!(second.invoked.load(Ordering::SeqCst));
        assert!(!third.invoked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn failed_strategy_falls_through_to_next() {
        let first = leak(Scripted::new("process-manager", true, false));
        let second = leak(Scripted::new("init-system", true, true));

        let controller = ServiceController::new(vec![Box::new(first), Box::new(second)]);

        assert_eq!(controller.restart().await.unwrap(), "init-system");
        assert!(first.invoked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn last_resort_wins_when_everything_else_fails() {
        let first = leak(Scripted::new("process-manager", false, true));
        let second = leak(Scripted::new("init-system", true, false));
        let third = leak(Scripted::new("raw-process", true, true));

        let controller = ServiceController::new(vec![
            Box::new(first),
            Box::new(second),
            Box::new(third),
        ]);

        assert_eq!(controller.restart().await.unwrap(), "raw-process");
    }

    #[tokio::test]
    async fn all_exhausted_is_an_error() {
        let first = leak(Scripted::new("process-manager", false, true));
        let second = leak(Scripted::new("init-system", true, false));

        let controller = ServiceController::new(vec![Box::new(first), Box::new(second)]);

        assert!(matches!(
            controller.restart().await,
            Err(RestartError::Exhausted)
        ));
    }

    struct Ordered {
        name: &'static str,
        log: &'static Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl RestartStrategy for Ordered {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn available(&self) -> bool {
            true
        }

        async fn attempt(&self) -> Result<(), String> {
            self.log.lock().unwrap().push(self.name);
            Err("keep going".to_string())
        }
    }

    #[tokio::test]
    async fn strategies_run_strictly_in_priority_order() {
        let log: &'static Mutex<Vec<&'static str>> = Box::leak(Box::new(Mutex::new(Vec::new())));

        let controller = ServiceController::new(vec![
            Box::new(Ordered { name: "a", log }),
            Box::new(Ordered { name: "b", log }),
            Box::new(Ordered { name: "c", log }),
        ]);

        let _ = controller.restart().await;
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }
}
