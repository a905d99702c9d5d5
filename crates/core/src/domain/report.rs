// Report Domain Model

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::outcome::{OutcomeStatus, ProbeOutcome};

/// Whole-run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Completed,
    Cancelled,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Completed => write!(f, "COMPLETED"),
            RunStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Run metadata recorded by the executor and stamped onto the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetadata {
    pub generated_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: RunStatus,
}

/// Counts for quick triage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: usize,
}

impl ReportSummary {
    fn record(&mut self, status: OutcomeStatus) {
        self.total += 1;
        match status {
            OutcomeStatus::Success => self.succeeded += 1,
            OutcomeStatus::Failure => self.failed += 1,
            OutcomeStatus::Timeout => self.timed_out += 1,
        }
    }

    pub fn has_problems(&self) -> bool {
        self.failed > 0 || self.timed_out > 0
    }
}

/// One category of the report, probes in registry order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    category: String,
    probes: Vec<(String, ProbeOutcome)>,
}

impl ReportSection {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            probes: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, outcome: ProbeOutcome) {
        self.probes.push((name.into(), outcome));
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn get(&self, name: &str) -> Option<&ProbeOutcome> {
        self.probes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, outcome)| outcome)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.probes.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProbeOutcome)> {
        self.probes.iter().map(|(n, o)| (n.as_str(), o))
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

impl Serialize for ReportSection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.probes.len()))?;
        for (name, outcome) in &self.probes {
            map.serialize_entry(name, outcome)?;
        }
        map.end()
    }
}

/// Final, immutable report of one audit run
///
/// Sections follow registry declaration order; serializes as
/// `{"generated_at", "finished_at", "status", "summary", "sections": {category: {probe: outcome}}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    generated_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    status: RunStatus,
    summary: ReportSummary,
    #[serde(serialize_with = "serialize_sections")]
    sections: Vec<ReportSection>,
}

fn serialize_sections<S: Serializer>(
    sections: &[ReportSection],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(sections.len()))?;
    for section in sections {
        map.serialize_entry(section.category(), section)?;
    }
    map.end()
}

impl Report {
    pub fn new(metadata: RunMetadata, sections: Vec<ReportSection>) -> Self {
        let mut summary = ReportSummary::default();
        for section in &sections {
            for (_, outcome) in section.iter() {
                summary.record(outcome.status());
            }
        }

        Self {
            generated_at: metadata.generated_at,
            finished_at: metadata.finished_at,
            status: metadata.status,
            summary,
            sections,
        }
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == RunStatus::Cancelled
    }

    pub fn summary(&self) -> ReportSummary {
        self.summary
    }

    pub fn sections(&self) -> &[ReportSection] {
        &self.sections
    }

    pub fn section(&self, category: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.category() == category)
    }

    /// Look up one probe outcome
    pub fn get(&self, category: &str, name: &str) -> Option<&ProbeOutcome> {
        self.section(category).and_then(|s| s.get(name))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.category())
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
