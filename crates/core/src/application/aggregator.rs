// Report Aggregator - pure merge of outcomes into registry order
use std::collections::HashMap;
use tracing::debug;

use super::registry::ProbeRegistry;
use crate::domain::{ProbeKey, ProbeOutcome, Report, ReportSection, RunMetadata};

/// Outcomes collected during a run, in no particular order
pub type OutcomeMap = HashMap<ProbeKey, ProbeOutcome>;

/// Merge outcomes into a report ordered like the registry
///
/// - Categories appear in first-registration order, probes in registration order
/// - Probes without an outcome get `ProbeOutcome::did_not_complete()`
/// - Outcomes for probes the registry does not know are ignored
///
/// No side effects: the same inputs always produce the same report.
pub fn aggregate(registry: &ProbeRegistry, outcomes: &OutcomeMap, metadata: RunMetadata) -> Report {
    let mut sections: Vec<ReportSection> = Vec::new();
    let mut section_index: HashMap<&str, usize> = HashMap::new();
    let mut missing = 0usize;

    for probe in registry.all() {
        let idx = *section_index.entry(probe.category()).or_insert_with(|| {
            sections.push(ReportSection::new(probe.category()));
            sections.len() - 1
        });

        let outcome = match outcomes.get(probe.key()) {
            Some(outcome) => outcome.clone(),
            None => {
                missing += 1;
                ProbeOutcome::did_not_complete()
            }
        };
        sections[idx].push(probe.name(), outcome);
    }

    let ignored = outcomes
        .keys()
        .filter(|key| !registry.contains(key))
        .count();

    debug!(
        probes = registry.len(),
        missing = missing,
        ignored = ignored,
        "Aggregated probe outcomes"
    );

    Report::new(metadata, sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OutcomeStatus, ProbeError, ProbeValue, RunStatus, DID_NOT_COMPLETE};
    use crate::application::registry::ProbeContext;
    use chrono::{TimeZone, Utc};

    fn noop(_ctx: ProbeContext) -> std::future::Ready<Result<ProbeValue, ProbeError>> {
        std::future::ready(Ok(ProbeValue::text("unused")))
    }

    fn registry() -> ProbeRegistry {
        let mut registry = ProbeRegistry::new();
        registry.register_fn("net", "a", noop).unwrap();
        registry.register_fn("net", "b", noop).unwrap();
        registry.register_fn("kernel", "x", noop).unwrap();
        registry.register_fn("net", "c", noop).unwrap();
        registry
    }

    fn metadata() -> RunMetadata {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        RunMetadata {
            generated_at: at,
            finished_at: at,
            status: RunStatus::Completed,
        }
    }

    #[test]
    fn test_orders_by_registry_not_by_insertion() {
        let mut outcomes = OutcomeMap::new();
        outcomes.insert(ProbeKey::new("net", "c"), ProbeOutcome::success("3", 1));
        outcomes.insert(ProbeKey::new("kernel", "x"), ProbeOutcome::success("x", 1));
        outcomes.insert(ProbeKey::new("net", "b"), ProbeOutcome::success("2", 1));
        outcomes.insert(ProbeKey::new("net", "a"), ProbeOutcome::success("1", 1));

        let report = aggregate(&registry(), &outcomes, metadata());

        let categories: Vec<&str> = report.categories().collect();
        assert_eq!(categories, vec!["net", "kernel"]);
        let net: Vec<&str> = report.section("net").unwrap().names().collect();
        assert_eq!(net, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_missing_outcomes_are_filled() {
        let mut outcomes = OutcomeMap::new();
        outcomes.insert(ProbeKey::new("net", "a"), ProbeOutcome::success("1", 1));

        let report = aggregate(&registry(), &outcomes, metadata());

        assert_eq!(report.summary().total, 4);
        let missing = report.get("kernel", "x").unwrap();
        assert_eq!(missing.status(), OutcomeStatus::Failure);
        assert_eq!(missing.error_message(), Some(DID_NOT_COMPLETE));
    }

    #[test]
    fn test_unknown_outcomes_are_ignored() {
        let mut outcomes = OutcomeMap::new();
        outcomes.insert(ProbeKey::new("ghost", "probe"), ProbeOutcome::success("?", 1));

        let report = aggregate(&registry(), &outcomes, metadata());

        assert!(report.section("ghost").is_none());
        assert_eq!(report.summary().total, 4);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let mut outcomes = OutcomeMap::new();
        outcomes.insert(ProbeKey::new("net", "b"), ProbeOutcome::failure("boom", 2));
        outcomes.insert(ProbeKey::new("net", "a"), ProbeOutcome::success("1", 1));

        let registry = registry();
        let first = aggregate(&registry, &outcomes, metadata());
        let second = aggregate(&registry, &outcomes, metadata());

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_empty_registry_gives_empty_report() {
        let report = aggregate(&ProbeRegistry::new(), &OutcomeMap::new(), metadata());
        assert!(report.sections().is_empty());
        assert_eq!(report.summary().total, 0);
    }
}
