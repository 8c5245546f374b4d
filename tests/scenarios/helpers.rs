//! Test utility functions for certflow scenarios

use async_trait::async_trait;
use certflow::action::{Action, ActionArgs, ActionError, ActionStore, Decision};
use certflow::certificate::{
    CertificateError, CertificateRequest, CertificateResponse, CertificateService,
    LocalCertificateService,
};
use certflow::core::config::PipelineConfig;
use certflow::core::{Context, Pipeline, PipelineStore};
use rcgen::{CertificateParams, KeyPair};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Certificate service issuing real certificates from an in-process CA and
/// counting every request
pub struct CountingCertificateService {
    inner: LocalCertificateService,
    requests: AtomicUsize,
}

impl CountingCertificateService {
    /// Serves issuer `ca1`, 30 days validity
    pub fn new() -> Self {
        let mut inner = LocalCertificateService::new();
        inner.add_certificate_authority("ca1", 30);
        Self {
            inner,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CertificateService for CountingCertificateService {
    async fn issue_certificate(
        &self,
        request: CertificateRequest,
    ) -> Result<CertificateResponse, CertificateError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.inner.issue_certificate(request).await
    }
}

/// Shared log of which test actions ran, in order
pub type RunLog = Arc<Mutex<Vec<String>>>;

pub fn run_log() -> RunLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &RunLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// What a [`RecordingAction`] does after logging its label
#[derive(Clone, Copy)]
pub enum Behavior {
    Continue,
    Skip,
    Fail,
}

/// Action that records its label and then behaves as configured
pub struct RecordingAction {
    label: String,
    log: RunLog,
    behavior: Behavior,
}

impl RecordingAction {
    pub fn new(label: &str, log: &RunLog, behavior: Behavior) -> Self {
        Self {
            label: label.to_string(),
            log: log.clone(),
            behavior,
        }
    }
}

#[async_trait]
impl Action for RecordingAction {
    fn name(&self) -> &str {
        &self.label
    }

    fn description(&self) -> &str {
        "records its invocation"
    }

    async fn run(&self, _ctx: &mut Context, _args: &ActionArgs) -> Result<Decision, ActionError> {
        self.log.lock().unwrap().push(self.label.clone());
        match self.behavior {
            Behavior::Continue => Ok(Decision::Continue),
            Behavior::Skip => Ok(Decision::skip(format!("{} says stop", self.label))),
            Behavior::Fail => Err(ActionError::MissingArgument(format!("{}-input", self.label))),
        }
    }
}

/// Built-in actions wired to `service` and a fresh pipeline store
pub fn builtin_store(service: Arc<dyn CertificateService>) -> (ActionStore, Arc<PipelineStore>) {
    let pipelines = Arc::new(PipelineStore::new());
    let actions = ActionStore::with_builtins(service, pipelines.clone());
    (actions, pipelines)
}

/// Parse a pipeline definition and resolve it against `actions`
pub fn pipeline_from_yaml(yaml: &str, actions: &ActionStore) -> Pipeline {
    let config = PipelineConfig::from_yaml(yaml).unwrap();
    Pipeline::from_config(&config, actions).unwrap()
}

/// Write a self-signed certificate expiring `days` days from now
pub fn write_certificate(path: &Path, days: i64) {
    let mut params = CertificateParams::new(vec!["host1".to_string()]).unwrap();
    params.not_after = time::OffsetDateTime::now_utc() + time::Duration::days(days);
    let key = KeyPair::generate().unwrap();
    let cert = params.self_signed(&key).unwrap();
    std::fs::write(path, cert.pem()).unwrap();
}
