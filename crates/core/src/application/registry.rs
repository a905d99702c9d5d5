// Probe Registry - static, ordered catalogue of probes
use async_trait::async_trait;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{ProbeError, ProbeKey, ProbeValue, RegistryError};
use crate::port::{CommandLine, CommandResult, CommandRunner};

/// What a probe does when it runs
///
/// Implementations hold no state between runs; every call produces a fresh
/// value or error.
#[async_trait]
pub trait Capability: Send + Sync {
    async fn run(&self, ctx: ProbeContext) -> Result<ProbeValue, ProbeError>;
}

/// Capability backed by an async closure (see `ProbeRegistry::register_fn`)
pub struct FnCapability<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Capability for FnCapability<F>
where
    F: Fn(ProbeContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ProbeValue, ProbeError>> + Send + 'static,
{
    async fn run(&self, ctx: ProbeContext) -> Result<ProbeValue, ProbeError> {
        (self.f)(ctx).await
    }
}

/// Everything a probe gets to see while running
///
/// Commands issued through the context use the probe's category timeout.
#[derive(Clone)]
pub struct ProbeContext {
    key: ProbeKey,
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl ProbeContext {
    pub fn new(key: ProbeKey, runner: Arc<dyn CommandRunner>, timeout: Duration) -> Self {
        Self {
            key,
            runner,
            timeout,
        }
    }

    pub fn key(&self) -> &ProbeKey {
        &self.key
    }

    /// Command timeout assigned to this probe
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a command and return the raw result
    pub async fn command(&self, command: &CommandLine) -> CommandResult {
        self.runner.execute(command, self.timeout).await
    }

    /// Stdout of a command, whatever its exit code
    pub async fn output(&self, command: &CommandLine) -> Result<String, ProbeError> {
        Ok(self.command(command).await.into_output()?)
    }

    /// Stdout of a command that must exit 0
    pub async fn checked_output(&self, command: &CommandLine) -> Result<String, ProbeError> {
        Ok(self.command(command).await.into_checked_output()?)
    }

    /// Stdout of a `sh -c` script, whatever its exit code
    pub async fn shell(&self, script: &str) -> Result<String, ProbeError> {
        self.output(&CommandLine::shell(script)).await
    }
}

/// A registered probe
#[derive(Clone)]
pub struct Probe {
    key: ProbeKey,
    capability: Arc<dyn Capability>,
}

impl Probe {
    pub fn key(&self) -> &ProbeKey {
        &self.key
    }

    pub fn category(&self) -> &str {
        &self.key.category
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn capability(&self) -> &Arc<dyn Capability> {
        &self.capability
    }
}

impl std::fmt::Debug for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Probe").field("key", &self.key).finish()
    }
}

/// Ordered probe catalogue
///
/// Registration order is the report order. The registry never executes
/// anything; it is built once at startup and only read afterwards.
#[derive(Clone, Default)]
pub struct ProbeRegistry {
    probes: Vec<Probe>,
    keys: HashSet<ProbeKey>,
}

impl std::fmt::Debug for ProbeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.probes.iter().map(|p| p.key()))
            .finish()
    }
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a probe
    ///
    /// # Errors
    /// - RegistryError::DuplicateProbe if (category, name) is already taken
    /// - RegistryError::InvalidProbe if category or name is blank
    pub fn register(
        &mut self,
        category: impl Into<String>,
        name: impl Into<String>,
        capability: impl Capability + 'static,
    ) -> Result<(), RegistryError> {
        self.register_arc(category, name, Arc::new(capability))
    }

    /// Register a probe from an async closure
    ///
    /// # Example
    /// ```text
    /// registry.register_fn("net", "dns", |ctx: ProbeContext| async move {
    ///     Ok(ProbeValue::text(ctx.shell("grep nameserver /etc/resolv.conf").await?))
    /// })?;
    /// ```
    pub fn register_fn<F, Fut>(
        &mut self,
        category: impl Into<String>,
        name: impl Into<String>,
        f: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(ProbeContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ProbeValue, ProbeError>> + Send + 'static,
    {
        self.register(category, name, FnCapability { f })
    }

    /// Register a shared capability
    pub fn register_arc(
        &mut self,
        category: impl Into<String>,
        name: impl Into<String>,
        capability: Arc<dyn Capability>,
    ) -> Result<(), RegistryError> {
        let key = ProbeKey::new(category, name);

        if key.category.trim().is_empty() {
            return Err(RegistryError::InvalidProbe(format!(
                "probe '{}' has an empty category",
                key.name
            )));
        }
        if key.name.trim().is_empty() {
            return Err(RegistryError::InvalidProbe(format!(
                "probe in category '{}' has an empty name",
                key.category
            )));
        }
        if !self.keys.insert(key.clone()) {
            return Err(RegistryError::DuplicateProbe {
                category: key.category,
                name: key.name,
            });
        }

        self.probes.push(Probe { key, capability });
        Ok(())
    }

    /// All probes in registration order
    pub fn all(&self) -> &[Probe] {
        &self.probes
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub fn contains(&self, key: &ProbeKey) -> bool {
        self.keys.contains(key)
    }

    /// Distinct categories in first-appearance order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.probes
            .iter()
            .map(|p| p.category())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Sub-registry with only the given categories, order preserved
    pub fn filter_categories<S: AsRef<str>>(&self, categories: &[S]) -> ProbeRegistry {
        let wanted: HashSet<&str> = categories.iter().map(|c| c.as_ref()).collect();
        let probes: Vec<Probe> = self
            .probes
            .iter()
            .filter(|p| wanted.contains(p.category()))
            .cloned()
            .collect();
        let keys = probes.iter().map(|p| p.key.clone()).collect();
        ProbeRegistry { probes, keys }
    }
}
