//! Error types for action execution

use crate::certificate::CertificateError;
use thiserror::Error;

/// Error returned by an action; aborts the pipeline run it belongs to
#[derive(Debug, Error)]
pub enum ActionError {
    /// A required argument was not configured for the step
    #[error("required argument: {0}")]
    MissingArgument(String),

    /// An argument was present but could not be interpreted
    #[error("invalid argument {name}: {reason}")]
    InvalidArgument { name: String, reason: String },

    /// A value an earlier step should have stored is missing
    #[error("required context object: {0}")]
    MissingContextObject(String),

    #[error("pipeline not found: {0}")]
    PipelineNotFound(String),

    /// A pipeline tried to run itself, directly or through others
    #[error("cycle detected in pipeline invocation: {}", chain.join(" -> "))]
    CycleDetected { chain: Vec<String> },

    #[error("command [{command}] failed, exit code: {code}")]
    CommandFailed { command: String, code: i32 },

    #[error(transparent)]
    Certificate(#[from] CertificateError),

    #[error("decoding {what} failed: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
