// HostAudit Probes - built-in audit catalogue
// Declarative rows feed the core registry; no probe knows about any other

pub mod catalogue;
pub mod checks;
pub mod classifier;
pub mod command_probe;

pub use catalogue::{category, Entry, Source, CATALOGUE, CATEGORIES, SECURITY_SCAN_CATEGORIES};
pub use classifier::Classifier;
pub use command_probe::CommandProbe;

use hostaudit_core::application::executor::constants::SECURITY_SCAN_TIMEOUT;
use hostaudit_core::application::{ExecutorConfig, ProbeRegistry};
use hostaudit_core::domain::RegistryError;
use hostaudit_infra_system::HostInfoProbe;
use tracing::debug;

/// Build the registry of every built-in probe, in catalogue order
///
/// # Errors
/// RegistryError if the catalogue declares the same (category, name) twice
pub fn builtin_registry() -> Result<ProbeRegistry, RegistryError> {
    let mut registry = ProbeRegistry::new();

    for entry in CATALOGUE {
        match entry.source {
            Source::Host => registry.register(entry.category, entry.name, HostInfoProbe::new())?,
            Source::Command(probe) => registry.register(entry.category, entry.name, probe)?,
            Source::Check(f) => registry.register_fn(entry.category, entry.name, f)?,
        }
    }

    debug!(
        probes = registry.len(),
        categories = registry.categories().len(),
        "Built-in registry ready"
    );
    Ok(registry)
}

/// Give security-scanning categories their longer command timeout
///
/// Never shortens a timeout: a default above `SECURITY_SCAN_TIMEOUT` applies
/// to these categories too.
pub fn with_scan_timeouts(config: ExecutorConfig) -> ExecutorConfig {
    let timeout = config.default_timeout.max(SECURITY_SCAN_TIMEOUT);
    SECURITY_SCAN_CATEGORIES
        .iter()
        .fold(config, |config, category| {
            config.with_category_timeout(*category, timeout)
        })
}
