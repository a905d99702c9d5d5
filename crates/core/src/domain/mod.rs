// Domain Layer - Probe identity, outcomes and the report model

pub mod error;
pub mod outcome;
pub mod report;

// Re-exports
pub use error::RegistryError;
pub use outcome::{
    OutcomeStatus, ProbeError, ProbeKey, ProbeOutcome, ProbeValue, ValueMap, DID_NOT_COMPLETE,
};
pub use report::{Report, ReportSection, ReportSummary, RunMetadata, RunStatus};
