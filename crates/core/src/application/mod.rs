// Application Layer - Registry, Executor and Aggregator

pub mod aggregator;
pub mod config;
pub mod executor;
pub mod registry;

// Re-exports
pub use aggregator::{aggregate, OutcomeMap};
pub use config::ExecutorConfig;
pub use executor::{cancel_channel, CancelSender, CancelToken, Executor};
pub use registry::{Capability, Probe, ProbeContext, ProbeRegistry};
