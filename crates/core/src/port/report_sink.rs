// Report Sink Port
// Consumers of a finished report (JSON file, console table, ...)

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::Report;

/// Sink errors
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Report Sink trait
///
/// Receives the report read-only. Returns the location written to, if the
/// sink persists anything.
#[async_trait]
pub trait ReportSink: Send + Sync {
    fn name(&self) -> &str;

    async fn write(&self, report: &Report) -> Result<Option<PathBuf>, SinkError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every report it receives
    #[derive(Default)]
    pub struct MemorySink {
        reports: Mutex<Vec<Report>>,
    }

    impl MemorySink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reports(&self) -> Vec<Report> {
            self.reports.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReportSink for MemorySink {
        fn name(&self) -> &str {
            "memory"
        }

        async fn write(&self, report: &Report) -> Result<Option<PathBuf>, SinkError> {
            self.reports.lock().unwrap().push(report.clone());
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::MemorySink;
    use super::*;
    use crate::application::{Executor, ExecutorConfig, ProbeContext, ProbeRegistry};
    use crate::domain::{ProbeError, ProbeValue};
    use crate::port::command_runner::mocks::MockCommandRunner;
    use crate::port::time_provider::mocks::FixedTimeProvider;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    #[test]
    fn test_sinks_receive_the_executor_report() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut registry = ProbeRegistry::new();
        registry
            .register_fn("net", "dns", |_ctx: ProbeContext| async move {
                Ok::<_, ProbeError>(ProbeValue::text("8.8.8.8"))
            })
            .unwrap();

        let executor = Executor::new(
            Arc::new(MockCommandRunner::new()),
            ExecutorConfig::default().with_concurrency(1),
            Arc::new(FixedTimeProvider(now)),
        );
        let sink = MemorySink::new();

        tokio_test::block_on(async {
            let report = executor.run_to_completion(&registry).await;
            assert_eq!(sink.write(&report).await.unwrap(), None);
        });

        let reports = sink.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].generated_at(), now);
        assert_eq!(reports[0].finished_at(), now);
        assert_eq!(sink.name(), "memory");
    }
}
