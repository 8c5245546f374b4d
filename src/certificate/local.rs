//! In-process certificate issuers

use crate::certificate::{
    CertificateError, CertificateRequest, CertificateResponse, CertificateService,
};
use crate::core::config::{IssuerConfig, IssuerType};
use async_trait::async_trait;
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType,
    ExtendedKeyUsagePurpose, IsCa, KeyPair, KeyUsagePurpose, SanType,
};
use std::collections::HashMap;
use std::path::Path;
use time::OffsetDateTime;
use tracing::{debug, info};

/// Validity used when neither the request nor the issuer sets one
pub const DEFAULT_EXPIRATION_DAYS: u32 = 365;

enum Backend {
    /// Self-signed CA certificates
    CertificateAuthority,
    /// Leaf certificates signed by a CA loaded from disk
    Signing { ca: Certificate, ca_key: KeyPair },
}

struct Issuer {
    backend: Backend,
    expiration_days: u32,
}

/// Certificate service backed by issuers that live in this process
#[derive(Default)]
pub struct LocalCertificateService {
    issuers: HashMap<String, Issuer>,
}

impl LocalCertificateService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the issuer registry from configuration
    pub fn from_configs(configs: &[IssuerConfig]) -> Result<Self, CertificateError> {
        let mut service = Self::new();

        for config in configs {
            let expiration_days = config.expiration_days.unwrap_or(DEFAULT_EXPIRATION_DAYS);
            match config.issuer_type {
                IssuerType::CertificateAuthority => {
                    service.add_certificate_authority(&config.name, expiration_days);
                }
                IssuerType::Simple => {
                    let certificate = arg(config, "certificate")?;
                    let private_key = arg(config, "private-key")?;
                    let certificate_pem = read_pem(Path::new(certificate))?;
                    let private_key_pem = read_pem(Path::new(private_key))?;
                    service.add_signing_issuer(
                        &config.name,
                        &certificate_pem,
                        &private_key_pem,
                        expiration_days,
                    )?;
                }
            }
            info!("Issuer registered: [{}] ({:?})", config.name, config.issuer_type);
        }

        Ok(service)
    }

    /// Register an issuer producing self-signed CA certificates
    pub fn add_certificate_authority(&mut self, name: &str, expiration_days: u32) {
        self.issuers.insert(
            name.to_string(),
            Issuer {
                backend: Backend::CertificateAuthority,
                expiration_days,
            },
        );
    }

    /// Register an issuer signing with the given CA certificate and PKCS#8 key
    pub fn add_signing_issuer(
        &mut self,
        name: &str,
        ca_certificate_pem: &str,
        ca_private_key_pem: &str,
        expiration_days: u32,
    ) -> Result<(), CertificateError> {
        let ca_key = KeyPair::from_pem(ca_private_key_pem)?;
        let ca = CertificateParams::from_ca_cert_pem(ca_certificate_pem)?.self_signed(&ca_key)?;

        self.issuers.insert(
            name.to_string(),
            Issuer {
                backend: Backend::Signing { ca, ca_key },
                expiration_days,
            },
        );
        Ok(())
    }

    /// Registered issuer names, sorted
    pub fn issuer_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.issuers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn create(&self, issuer: &Issuer, request: &CertificateRequest) -> Result<CertificateResponse, CertificateError> {
        let days = request.expiration_days.unwrap_or(issuer.expiration_days);
        if days == 0 {
            return Err(CertificateError::InvalidRequest(
                "expiration days must be positive".to_string(),
            ));
        }

        let mut params = leaf_params(request, days)?;
        let key = KeyPair::generate()?;

        let certificate = match &issuer.backend {
            Backend::CertificateAuthority => {
                params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
                params.key_usages = vec![
                    KeyUsagePurpose::DigitalSignature,
                    KeyUsagePurpose::KeyCertSign,
                    KeyUsagePurpose::CrlSign,
                ];
                params.self_signed(&key)?
            }
            Backend::Signing { ca, ca_key } => params.signed_by(&key, ca, ca_key)?,
        };

        Ok(CertificateResponse::from_pem(
            &certificate.pem(),
            &key.serialize_pem(),
        ))
    }
}

#[async_trait]
impl CertificateService for LocalCertificateService {
    async fn issue_certificate(
        &self,
        request: CertificateRequest,
    ) -> Result<CertificateResponse, CertificateError> {
        let issuer = self
            .issuers
            .get(&request.issuer)
            .ok_or_else(|| CertificateError::IssuerNotFound(request.issuer.clone()))?;

        debug!(
            "Issuing certificate for [{}] with issuer [{}]",
            request.common_name, request.issuer
        );
        self.create(issuer, &request)
    }
}

fn leaf_params(request: &CertificateRequest, days: u32) -> Result<CertificateParams, CertificateError> {
    if request.common_name.trim().is_empty() {
        return Err(CertificateError::InvalidRequest(
            "common name is required".to_string(),
        ));
    }

    let mut params = CertificateParams::new(request.subject_alternative_names.clone())?;

    let mut name = DistinguishedName::new();
    name.push(DnType::CommonName, request.common_name.as_str());
    if let Some(organization) = &request.organization {
        name.push(DnType::OrganizationName, organization.as_str());
    }
    params.distinguished_name = name;

    if let Some(email) = &request.email {
        params
            .subject_alt_names
            .push(SanType::Rfc822Name(email.clone().try_into()?));
    }

    let now = OffsetDateTime::now_utc();
    params.not_before = now;
    params.not_after = now + time::Duration::days(i64::from(days));
    params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
    params.extended_key_usages = vec![
        ExtendedKeyUsagePurpose::ServerAuth,
        ExtendedKeyUsagePurpose::ClientAuth,
    ];

    Ok(params)
}

fn arg<'a>(config: &'a IssuerConfig, name: &str) -> Result<&'a str, CertificateError> {
    config.args.get(name).map(String::as_str).ok_or_else(|| {
        CertificateError::InvalidRequest(format!(
            "issuer '{}' requires arg '{}'",
            config.name, name
        ))
    })
}

fn read_pem(path: &Path) -> Result<String, CertificateError> {
    std::fs::read_to_string(path).map_err(|source| CertificateError::Io {
        path: path.to_path_buf(),
        source,
    })
}
