//! Certificate service contract
//!
//! The issue-certificate action talks to whatever implements
//! [`CertificateService`]. Responses carry base64-encoded PEM, the same shape
//! a remote certificate server returns over the wire.

pub mod local;

pub use local::LocalCertificateService;

use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use x509_parser::pem::parse_x509_pem;

/// Errors from issuing or reading certificates
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("issuer not found: {0}")]
    IssuerNotFound(String),

    #[error("invalid certificate request: {0}")]
    InvalidRequest(String),

    #[error("certificate generation failed: {0}")]
    Generation(#[from] rcgen::Error),

    #[error("parsing certificate failed: {0}")]
    Parse(String),

    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A request for a new certificate from a named issuer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRequest {
    /// Which issuer (backing CA profile) signs the certificate
    pub issuer: String,

    pub common_name: String,

    pub email: Option<String>,

    pub organization: Option<String>,

    /// Validity in days; the issuer's default applies when `None`
    pub expiration_days: Option<u32>,

    pub subject_alternative_names: Vec<String>,
}

/// An issued certificate and its private key, each base64 over PEM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateResponse {
    pub certificate: String,
    pub private_key: String,
}

impl CertificateResponse {
    /// Encode PEM blocks into the transport form
    pub fn from_pem(certificate_pem: &str, private_key_pem: &str) -> Self {
        let engine = base64::engine::general_purpose::STANDARD;
        Self {
            certificate: engine.encode(certificate_pem),
            private_key: engine.encode(private_key_pem),
        }
    }
}

/// Issues certificates on behalf of pipelines
#[async_trait]
pub trait CertificateService: Send + Sync {
    async fn issue_certificate(
        &self,
        request: CertificateRequest,
    ) -> Result<CertificateResponse, CertificateError>;
}

/// Read the `notAfter` timestamp of a PEM-encoded certificate
pub fn parse_certificate_expiry(pem_bytes: &[u8]) -> Result<DateTime<Utc>, CertificateError> {
    let (_, pem) = parse_x509_pem(pem_bytes)
        .map_err(|e| CertificateError::Parse(format!("decoding pem failed: {}", e)))?;
    let certificate = pem
        .parse_x509()
        .map_err(|e| CertificateError::Parse(e.to_string()))?;

    let timestamp = certificate.validity().not_after.timestamp();
    DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| CertificateError::Parse(format!("expiry out of range: {}", timestamp)))
}
