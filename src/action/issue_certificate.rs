//! Certificate issuance action

use crate::action::{Action, ActionArgs, ActionError, Decision};
use crate::certificate::{CertificateRequest, CertificateService};
use crate::core::{Context, ContextKey};
use async_trait::async_trait;
use base64::Engine;
use std::sync::Arc;
use tracing::{debug, error};

/// PEM certificate produced by [`IssueCertificateAction`]
pub const ISSUED_CERTIFICATE: ContextKey<Vec<u8>> = ContextKey::new("issued-certificate");

/// PEM private key produced by [`IssueCertificateAction`]
pub const ISSUED_PRIVATE_KEY: ContextKey<Vec<u8>> =
    ContextKey::new("issued-certificate-private-key");

pub const ARGS_ISSUER: &str = "issuer";
pub const ARGS_COMMON_NAME: &str = "common-name";
pub const ARGS_EMAIL: &str = "email";
pub const ARGS_ORGANIZATION: &str = "organization";
pub const ARGS_EXPIRATION_DAYS: &str = "expiration-days";
/// Semicolon-separated subject alternative names
pub const ARGS_SANS: &str = "sans";

/// Requests a certificate from the certificate service and stores the
/// decoded certificate and key in the context for later steps
pub struct IssueCertificateAction {
    service: Arc<dyn CertificateService>,
}

impl IssueCertificateAction {
    pub fn new(service: Arc<dyn CertificateService>) -> Self {
        Self { service }
    }

    fn build_request(args: &ActionArgs) -> Result<CertificateRequest, ActionError> {
        let issuer = args.required(ARGS_ISSUER)?;
        let common_name = args.required(ARGS_COMMON_NAME)?;
        let expiration_days = args.parse_optional::<u32>(ARGS_EXPIRATION_DAYS)?;

        let subject_alternative_names = args
            .optional(ARGS_SANS)
            .map(|sans| {
                sans.split(';')
                    .map(str::trim)
                    .filter(|san| !san.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(CertificateRequest {
            issuer: issuer.to_string(),
            common_name: common_name.to_string(),
            email: args.optional(ARGS_EMAIL).map(String::from),
            organization: args.optional(ARGS_ORGANIZATION).map(String::from),
            expiration_days,
            subject_alternative_names,
        })
    }
}

#[async_trait]
impl Action for IssueCertificateAction {
    fn name(&self) -> &str {
        "issue-certificate"
    }

    fn description(&self) -> &str {
        "Issue a certificate and keep it in the run context"
    }

    async fn run(&self, ctx: &mut Context, args: &ActionArgs) -> Result<Decision, ActionError> {
        let request = Self::build_request(args)?;
        let issuer = request.issuer.clone();

        debug!("Issuing certificate for issuer: [{}]", issuer);
        let response = self.service.issue_certificate(request).await.map_err(|e| {
            error!("Issuing certificate for issuer [{}] failed: {}", issuer, e);
            e
        })?;

        let engine = base64::engine::general_purpose::STANDARD;
        let certificate = engine
            .decode(&response.certificate)
            .map_err(|source| ActionError::Decode {
                what: "issued certificate",
                source,
            })?;
        let private_key = engine
            .decode(&response.private_key)
            .map_err(|source| ActionError::Decode {
                what: "issued certificate private key",
                source,
            })?;

        debug!("Storing issued certificate into context - [{}]", issuer);
        ctx.store_value(&ISSUED_CERTIFICATE, certificate);
        ctx.store_value(&ISSUED_PRIVATE_KEY, private_key);

        Ok(Decision::Continue)
    }
}
