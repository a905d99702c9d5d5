// Executor configuration
use std::collections::HashMap;
use std::time::Duration;

use super::executor::constants::{DEFAULT_COMMAND_TIMEOUT, DEFAULT_GRACE_PERIOD};
use crate::error::{AppError, Result};

/// Explicit run configuration handed to the Executor
///
/// Built once before the run and discarded after; nothing here is global.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of probes running at the same time
    pub concurrency_limit: usize,
    /// Command timeout for categories without their own entry
    pub default_timeout: Duration,
    /// Per-category command timeouts
    pub category_timeouts: HashMap<String, Duration>,
    /// Whole-run deadline; reaching it cancels the run gracefully
    pub run_deadline: Option<Duration>,
    /// Time in-flight probes get after cancellation before they are dropped
    pub grace_period: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: default_concurrency(),
            default_timeout: DEFAULT_COMMAND_TIMEOUT,
            category_timeouts: HashMap::new(),
            run_deadline: None,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }
}

/// Number of available processing units (at least 1)
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl ExecutorConfig {
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_category_timeout(mut self, category: impl Into<String>, timeout: Duration) -> Self {
        self.category_timeouts.insert(category.into(), timeout);
        self
    }

    pub fn with_run_deadline(mut self, deadline: Duration) -> Self {
        self.run_deadline = Some(deadline);
        self
    }

    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }

    /// Command timeout for probes of `category`
    pub fn timeout_for(&self, category: &str) -> Duration {
        self.category_timeouts
            .get(category)
            .copied()
            .unwrap_or(self.default_timeout)
    }

    /// Reject configurations the executor cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.concurrency_limit == 0 {
            return Err(AppError::Config(
                "concurrency_limit must be at least 1".to_string(),
            ));
        }
        if self.default_timeout.is_zero() {
            return Err(AppError::Config("default_timeout must be positive".to_string()));
        }
        if let Some((category, _)) = self.category_timeouts.iter().find(|(_, t)| t.is_zero()) {
            return Err(AppError::Config(format!(
                "timeout for category '{}' must be positive",
                category
            )));
        }
        Ok(())
    }
}
