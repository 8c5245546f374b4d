//! Pipeline registry

use crate::core::Pipeline;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Name-keyed registry of pipelines
///
/// Shared between the node (on-demand runs, job setup) and the
/// `run-pipeline` action. Storing a pipeline under a name that is already
/// taken replaces the previous one.
#[derive(Debug, Default)]
pub struct PipelineStore {
    pipelines: RwLock<HashMap<String, Arc<Pipeline>>>,
}

impl PipelineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a pipeline by its name, replacing any previous entry
    pub async fn store_pipeline(&self, pipeline: Pipeline) -> Arc<Pipeline> {
        let pipeline = Arc::new(pipeline);
        self.pipelines
            .write()
            .await
            .insert(pipeline.name().to_string(), pipeline.clone());
        pipeline
    }

    /// Get a pipeline by name, or `None` if it was never stored
    pub async fn get_pipeline(&self, name: &str) -> Option<Arc<Pipeline>> {
        self.pipelines.read().await.get(name).cloned()
    }

    /// Stored pipeline names, sorted
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.pipelines.read().await.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub async fn len(&self) -> usize {
        self.pipelines.read().await.len()
    }
}
