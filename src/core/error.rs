//! Registry lookup errors

use thiserror::Error;

/// Failure to resolve a name through one of the registries
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("action not found: {0}")]
    ActionNotFound(String),

    #[error("pipeline not found: {0}")]
    PipelineNotFound(String),
}
