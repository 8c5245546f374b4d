//! Action registry

use crate::action::{
    Action, IssueCertificateAction, RunPipelineAction, SaveCertificateAction, ShellAction,
    ShouldRenewCertificateAction,
};
use crate::certificate::CertificateService;
use crate::core::{PipelineStore, RegistryError};
use std::collections::HashMap;
use std::sync::Arc;

/// Name-keyed registry of actions
///
/// Built once at startup and only read afterwards. Registering a name twice
/// keeps the last action.
#[derive(Default, Clone)]
pub struct ActionStore {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding every built-in action
    pub fn with_builtins(
        certificate_service: Arc<dyn CertificateService>,
        pipeline_store: Arc<PipelineStore>,
    ) -> Self {
        let mut store = Self::new();
        store.register(ShellAction::new());
        store.register(IssueCertificateAction::new(certificate_service));
        store.register(SaveCertificateAction::new());
        store.register(RunPipelineAction::new(pipeline_store));
        store.register(ShouldRenewCertificateAction::new());
        store
    }

    /// Register an action under an explicit name
    pub fn put(&mut self, name: impl Into<String>, action: Arc<dyn Action>) {
        self.actions.insert(name.into(), action);
    }

    /// Register an action under its own name
    pub fn register<A: Action + 'static>(&mut self, action: A) {
        let name = action.name().to_string();
        self.put(name, Arc::new(action));
    }

    /// Look up an action by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn Action>, RegistryError> {
        self.actions
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::ActionNotFound(name.to_string()))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl std::fmt::Debug for ActionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionStore")
            .field("actions", &self.names())
            .finish()
    }
}
