// Console rendering of reports and the probe catalogue
use async_trait::async_trait;
use clap::ValueEnum;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;
use tabled::{Table, Tabled};

use hostaudit_core::application::ExecutorConfig;
use hostaudit_core::domain::{ProbeOutcome, ProbeValue, Report};
use hostaudit_core::port::{ReportSink, SinkError};
use hostaudit_probes::Entry;

/// Longest probe result shown in a table cell
const MAX_CELL_CHARS: usize = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Per-category tables and a summary
    Table,
    /// The full report as pretty JSON
    Json,
}

/// Prints the report to stdout
pub struct ConsoleSink {
    format: OutputFormat,
}

impl ConsoleSink {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

#[async_trait]
impl ReportSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    async fn write(&self, report: &Report) -> Result<Option<PathBuf>, SinkError> {
        match self.format {
            OutputFormat::Json => println!("{}", report.to_json_pretty()?),
            OutputFormat::Table => print_report(report),
        }
        Ok(None)
    }
}

#[derive(Tabled)]
struct ProbeRow {
    #[tabled(rename = "Probe")]
    probe: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Time (ms)")]
    duration_ms: i64,
}

impl ProbeRow {
    fn new(name: &str, outcome: &ProbeOutcome) -> Self {
        let result = match (outcome.value(), outcome.error_message()) {
            (Some(value), _) => summarize(value),
            (None, Some(message)) => truncate(message),
            (None, None) => String::new(),
        };
        Self {
            probe: name.to_string(),
            status: outcome.status().to_string(),
            result,
            duration_ms: outcome.duration_ms(),
        }
    }
}

fn print_report(report: &Report) {
    for section in report.sections() {
        println!();
        println!("{}", format!("[{}]", section.category()).cyan().bold());

        let rows: Vec<ProbeRow> = section
            .iter()
            .map(|(name, outcome)| ProbeRow::new(name, outcome))
            .collect();
        println!("{}", Table::new(rows));
    }

    let summary = report.summary();
    println!();
    println!(
        "{} {} probes: {} succeeded, {} failed, {} timed out",
        "Summary:".bold(),
        summary.total,
        summary.succeeded.to_string().green(),
        summary.failed.to_string().red(),
        summary.timed_out.to_string().yellow()
    );

    if report.is_cancelled() {
        println!("{}", "Run cancelled: unfinished probes are marked as did not complete".yellow().bold());
    } else if !summary.has_problems() {
        println!("{}", "✓ All probes succeeded".green().bold());
    }
}

/// One-line rendering of a probe value
fn summarize(value: &ProbeValue) -> String {
    let text = match value {
        ProbeValue::Text(text) => {
            let mut lines = text.lines();
            let first = lines.next().unwrap_or_default().to_string();
            match lines.count() {
                0 => first,
                more => format!("{} (+{} lines)", first, more),
            }
        }
        ProbeValue::List(items) if items.is_empty() => "(none)".to_string(),
        ProbeValue::List(items) => format!("{} item(s): {}", items.len(), items.join(", ")),
        ProbeValue::Map(map) => map
            .iter()
            .map(|(k, v)| format!("{}={}", k, summarize(v)))
            .collect::<Vec<_>>()
            .join(", "),
    };
    truncate(&text)
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_CELL_CHARS - 1).collect();
    format!("{}…", cut)
}

#[derive(Tabled)]
struct CatalogueRow {
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Probe")]
    name: &'static str,
    #[tabled(rename = "Timeout")]
    timeout: String,
    #[tabled(rename = "Description")]
    description: &'static str,
}

/// Print the probe catalogue with each probe's effective timeout
pub fn print_catalogue(entries: &[Entry], config: &ExecutorConfig) {
    let rows: Vec<CatalogueRow> = entries
        .iter()
        .map(|e| CatalogueRow {
            category: e.category,
            name: e.name,
            timeout: format_secs(config.timeout_for(e.category)),
            description: e.description,
        })
        .collect();

    println!("{}", Table::new(rows));
    println!("{} {} probes", "Total:".bold(), entries.len());
}

fn format_secs(duration: Duration) -> String {
    format!("{}s", duration.as_secs_f64())
}
