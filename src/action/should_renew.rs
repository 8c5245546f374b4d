//! Renewal decision action

use crate::action::{Action, ActionArgs, ActionError, Decision};
use crate::certificate::parse_certificate_expiry;
use crate::core::Context;
use crate::execution::scheduler::{wall_clock, TimeProvider};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

pub const ARGS_CERTIFICATE_PATH: &str = "certificate-path";
pub const ARGS_THRESHOLD_DAYS: &str = "threshold-days";

/// Renew when the certificate expires within this many days
pub const DEFAULT_THRESHOLD_DAYS: u32 = 25;

/// Lets the pipeline continue only when the certificate at
/// `certificate-path` is missing, unreadable, or close to expiry
///
/// When renewal is not due the action returns [`Decision::Skip`], so the
/// issuing and saving steps after it do not run.
pub struct ShouldRenewCertificateAction {
    clock: TimeProvider,
}

impl ShouldRenewCertificateAction {
    pub fn new() -> Self {
        Self {
            clock: wall_clock(),
        }
    }

    /// Use a custom clock instead of the wall clock
    pub fn with_clock(clock: TimeProvider) -> Self {
        Self { clock }
    }
}

impl Default for ShouldRenewCertificateAction {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a certificate expiring at `expiry` is due for renewal at `now`
///
/// The remaining validity is compared as a duration, so exactly
/// `threshold_days` left counts as due and anything longer does not.
pub fn renewal_due(expiry: DateTime<Utc>, now: DateTime<Utc>, threshold_days: u32) -> bool {
    expiry - now <= Duration::days(i64::from(threshold_days))
}

#[async_trait]
impl Action for ShouldRenewCertificateAction {
    fn name(&self) -> &str {
        "should-renew-certificate"
    }

    fn description(&self) -> &str {
        "Continue only if the certificate needs to be renewed"
    }

    async fn run(&self, _ctx: &mut Context, args: &ActionArgs) -> Result<Decision, ActionError> {
        let certificate_path = args.required(ARGS_CERTIFICATE_PATH)?;
        let threshold_days = args
            .parse_optional::<u32>(ARGS_THRESHOLD_DAYS)?
            .unwrap_or(DEFAULT_THRESHOLD_DAYS);

        let expiry = match tokio::fs::read(certificate_path).await {
            Ok(bytes) => match parse_certificate_expiry(&bytes) {
                Ok(expiry) => expiry,
                Err(e) => {
                    info!(
                        "Certificate [{}] is unreadable, it should be renewed: {}",
                        certificate_path, e
                    );
                    return Ok(Decision::Continue);
                }
            },
            Err(e) => {
                info!(
                    "Loading certificate [{}] failed, it should be renewed: {}",
                    certificate_path, e
                );
                return Ok(Decision::Continue);
            }
        };

        let now = (self.clock)();
        let remaining = expiry - now;
        info!(
            "Certificate [{}] expires in {} days (threshold {})",
            certificate_path,
            remaining.num_days(),
            threshold_days
        );

        if renewal_due(expiry, now, threshold_days) {
            info!("Certificate [{}] should be renewed", certificate_path);
            Ok(Decision::Continue)
        } else {
            Ok(Decision::skip(format!(
                "no need to renew certificate {}, expires in {} days",
                certificate_path,
                remaining.num_days()
            )))
        }
    }
}
