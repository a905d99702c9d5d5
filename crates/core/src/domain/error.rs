// Domain Error Types

use thiserror::Error;

/// Registration errors (raised while the registry is being built)
///
/// These are programmer errors in the probe catalogue; they abort startup,
/// never a running audit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate probe: {category}/{name}")]
    DuplicateProbe { category: String, name: String },

    #[error("Invalid probe: {0}")]
    InvalidProbe(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
