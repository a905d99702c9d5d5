// JSON file report sink
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use hostaudit_core::domain::Report;
use hostaudit_core::port::{ReportSink, SinkError};

/// Writes each report as pretty JSON into a directory
///
/// File name: `report_<YYYY-MM-DD_HH-MM-SS>.json`, taken from the report's
/// generation time (UTC). The directory is created on first write.
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Target path for a report
    pub fn path_for(&self, report: &Report) -> PathBuf {
        let stamp = report.generated_at().format("%Y-%m-%d_%H-%M-%S");
        self.dir.join(format!("report_{}.json", stamp))
    }
}

#[async_trait]
impl ReportSink for JsonFileSink {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn write(&self, report: &Report) -> Result<Option<PathBuf>, SinkError> {
        let json = serde_json::to_string_pretty(report)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(report);
        tokio::fs::write(&path, json).await?;

        info!(path = %path.display(), "Report saved");
        Ok(Some(path))
    }
}
