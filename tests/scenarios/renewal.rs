//! Test: Renewal - the should-renew / issue / save pipeline

use crate::helpers::*;
use certflow::action::ActionStore;
use certflow::certificate::parse_certificate_expiry;
use certflow::core::{Pipeline, RunOutcome};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn renew_pipeline(certificate: &Path, key: &Path, actions: &ActionStore) -> Pipeline {
    let yaml = format!(
        r#"
name: renew
actions:
  - name: should-renew-certificate
    args:
      certificate-path: {cert}
      threshold-days: 10
  - name: issue-certificate
    args:
      issuer: ca1
      common-name: host1
  - name: save-certificate
    args:
      certificate-target-path: {cert}
      certificate-key-target-path: {key}
"#,
        cert = certificate.display(),
        key = key.display(),
    );
    pipeline_from_yaml(&yaml, actions)
}

/// Certificate close to expiry is replaced
#[tokio::test]
async fn test_expiring_certificate_is_renewed() {
    let dir = TempDir::new().unwrap();
    let certificate = dir.path().join("tls.crt");
    let key = dir.path().join("tls.key");
    write_certificate(&certificate, 3);
    let before = std::fs::read(&certificate).unwrap();

    let service = Arc::new(CountingCertificateService::new());
    let (actions, _) = builtin_store(service.clone());
    let pipeline = renew_pipeline(&certificate, &key, &actions);

    let outcome = pipeline.run().await.unwrap();

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(service.requests(), 1);

    let after = std::fs::read(&certificate).unwrap();
    assert_ne!(before, after);
    let days_left = (parse_certificate_expiry(&after).unwrap() - Utc::now()).num_days();
    assert!(days_left >= 29, "new certificate expires in {} days", days_left);

    let key_pem = std::fs::read_to_string(&key).unwrap();
    assert!(key_pem.contains("PRIVATE KEY"));
}

/// Certificate far from expiry is left alone and the rest of the pipeline is skipped
#[tokio::test]
async fn test_valid_certificate_skips_renewal() {
    let dir = TempDir::new().unwrap();
    let certificate = dir.path().join("tls.crt");
    let key = dir.path().join("tls.key");
    write_certificate(&certificate, 100);
    let before = std::fs::read(&certificate).unwrap();

    let service = Arc::new(CountingCertificateService::new());
    let (actions, _) = builtin_store(service.clone());
    let pipeline = renew_pipeline(&certificate, &key, &actions);

    let outcome = pipeline.run().await.unwrap();

    match outcome {
        RunOutcome::Skipped { action, reason } => {
            assert_eq!(action, "should-renew-certificate");
            assert!(reason.contains("no need to renew"), "reason: {}", reason);
        }
        other => panic!("expected skip, got {:?}", other),
    }
    assert_eq!(service.requests(), 0);
    assert_eq!(std::fs::read(&certificate).unwrap(), before);
    assert!(!key.exists());
}

/// No certificate on disk yet: the first run issues one
#[tokio::test]
async fn test_missing_certificate_is_issued() {
    let dir = TempDir::new().unwrap();
    let certificate = dir.path().join("certs/tls.crt");
    let key = dir.path().join("certs/tls.key");

    let service = Arc::new(CountingCertificateService::new());
    let (actions, _) = builtin_store(service.clone());
    let pipeline = renew_pipeline(&certificate, &key, &actions);

    assert_eq!(pipeline.run().await.unwrap(), RunOutcome::Completed);
    assert!(certificate.exists());
    assert!(key.exists());

    // the certificate just written is valid for 30 days
    let outcome = pipeline.run().await.unwrap();
    assert!(outcome.is_skipped());
    assert_eq!(service.requests(), 1);
}
