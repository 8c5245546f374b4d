//! certflow - certificate issuance and renewal pipelines

pub mod action;
pub mod certificate;
pub mod cli;
pub mod core;
pub mod execution;
pub mod node;

// Re-export commonly used types
pub use action::{Action, ActionArgs, ActionError, ActionStore, Decision};
pub use certificate::{CertificateRequest, CertificateResponse, CertificateService, LocalCertificateService};
pub use core::{Context, ContextKey, Pipeline, PipelineStore, RegistryError, RunOutcome};
pub use execution::{DailyScheduler, PipelineJob, Scheduler, SchedulerError};
pub use node::{JobMode, Node};
