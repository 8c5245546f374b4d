//! Test: Failure Handling - fail-fast runs and startup errors

use crate::helpers::*;
use certflow::action::{ActionError, ActionStore};
use certflow::core::config::PipelineConfig;
use certflow::core::{Pipeline, RegistryError};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_failing_step_stops_the_run() {
    let log = run_log();
    let mut actions = ActionStore::new();
    actions.register(RecordingAction::new("first", &log, Behavior::Continue));
    actions.register(RecordingAction::new("broken", &log, Behavior::Fail));
    actions.register(RecordingAction::new("never", &log, Behavior::Continue));

    let pipeline = pipeline_from_yaml(
        r#"
name: fail-fast
actions:
  - name: first
  - name: broken
  - name: never
"#,
        &actions,
    );

    let err = pipeline.run().await.unwrap_err();

    assert_eq!(err.to_string(), "required argument: broken-input");
    assert_eq!(entries(&log), vec!["first", "broken"]);
}

#[tokio::test]
async fn test_shell_failure_stops_before_issuing() {
    let dir = TempDir::new().unwrap();
    let service = Arc::new(CountingCertificateService::new());
    let (actions, _) = builtin_store(service.clone());

    let yaml = format!(
        r#"
name: guarded
actions:
  - name: sh
    args:
      command: "false"
  - name: issue-certificate
    args:
      issuer: ca1
      common-name: host1
  - name: save-certificate
    args:
      certificate-target-path: {dir}/tls.crt
      certificate-key-target-path: {dir}/tls.key
"#,
        dir = dir.path().display()
    );
    let pipeline = pipeline_from_yaml(&yaml, &actions);

    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, ActionError::CommandFailed { code: 1, .. }));
    assert_eq!(service.requests(), 0);
    assert!(!dir.path().join("tls.crt").exists());
}

#[tokio::test]
async fn test_unknown_issuer_leaves_nothing_on_disk() {
    let dir = TempDir::new().unwrap();
    let (actions, _) = builtin_store(Arc::new(CountingCertificateService::new()));

    let yaml = format!(
        r#"
name: misconfigured
actions:
  - name: issue-certificate
    args:
      issuer: nope
      common-name: host1
  - name: save-certificate
    args:
      certificate-target-path: {dir}/tls.crt
      certificate-key-target-path: {dir}/tls.key
"#,
        dir = dir.path().display()
    );
    let pipeline = pipeline_from_yaml(&yaml, &actions);

    let err = pipeline.run().await.unwrap_err();

    assert_eq!(err.to_string(), "issuer not found: nope");
    assert!(!dir.path().join("tls.key").exists());
}

#[tokio::test]
async fn test_save_without_issue_is_a_context_error() {
    let dir = TempDir::new().unwrap();
    let (actions, _) = builtin_store(Arc::new(CountingCertificateService::new()));

    let yaml = format!(
        r#"
name: out-of-order
actions:
  - name: save-certificate
    args:
      certificate-target-path: {dir}/tls.crt
      certificate-key-target-path: {dir}/tls.key
"#,
        dir = dir.path().display()
    );
    let pipeline = pipeline_from_yaml(&yaml, &actions);

    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, ActionError::MissingContextObject(_)));
    assert_eq!(err.to_string(), "required context object: issued-certificate");
    assert!(!dir.path().join("tls.crt").exists());
}

#[test]
fn test_unknown_action_name_is_not_found() {
    let (actions, _) = builtin_store(Arc::new(CountingCertificateService::new()));

    let err = actions.get("nonexistent").err().unwrap();
    assert!(err.to_string().contains("not found"));

    let config = PipelineConfig::from_yaml(
        r#"
name: typo
actions:
  - name: sh
    args:
      command: "true"
  - name: issue-certficate
"#,
    )
    .unwrap();
    let err = Pipeline::from_config(&config, &actions).unwrap_err();
    assert_eq!(err, RegistryError::ActionNotFound("issue-certficate".to_string()));
}
