//! Actions - the named units of work a pipeline is composed of
//!
//! An action receives the run's [`Context`] and the arguments configured for
//! its step. It either lets the pipeline continue, asks it to stop early
//! through [`Decision::Skip`], or fails with an [`ActionError`].

pub mod error;
pub mod issue_certificate;
pub mod run_pipeline;
pub mod save_certificate;
pub mod shell;
pub mod should_renew;
pub mod store;

pub use error::ActionError;
pub use issue_certificate::IssueCertificateAction;
pub use run_pipeline::RunPipelineAction;
pub use save_certificate::SaveCertificateAction;
pub use shell::ShellAction;
pub use should_renew::ShouldRenewCertificateAction;
pub use store::ActionStore;

use crate::core::Context;
use async_trait::async_trait;
use std::collections::HashMap;
use std::str::FromStr;

/// What the pipeline should do after an action returns successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Run the next step
    Continue,
    /// Stop the run here; the remaining steps are not needed
    Skip { reason: String },
}

impl Decision {
    pub fn skip(reason: impl Into<String>) -> Self {
        Decision::Skip {
            reason: reason.into(),
        }
    }
}

/// Core trait for pipeline actions
#[async_trait]
pub trait Action: Send + Sync {
    /// Name the action is registered under by default
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Execute the action against one run's context
    async fn run(&self, ctx: &mut Context, args: &ActionArgs) -> Result<Decision, ActionError>;
}

/// Arguments bound to one pipeline step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionArgs {
    values: HashMap<String, String>,
}

impl ActionArgs {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Get an argument that must be present
    pub fn required(&self, name: &str) -> Result<&str, ActionError> {
        self.values
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ActionError::MissingArgument(name.to_string()))
    }

    /// Get an argument that may be absent; empty values count as absent
    pub fn optional(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Parse an optional argument into `T`
    pub fn parse_optional<T>(&self, name: &str) -> Result<Option<T>, ActionError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| ActionError::InvalidArgument {
                    name: name.to_string(),
                    reason: format!("'{}': {}", raw, e),
                }),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<HashMap<String, String>> for ActionArgs {
    fn from(values: HashMap<String, String>) -> Self {
        Self::new(values)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ActionArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
