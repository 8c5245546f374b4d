//! Node startup wiring
//!
//! A node owns the action store, the pipeline store and the scheduled jobs
//! built from one [`NodeConfig`]. Pipelines are built before any job is
//! armed, so a scheduled run always sees the complete store.

use crate::action::ActionStore;
use crate::certificate::{CertificateService, LocalCertificateService};
use crate::core::config::NodeConfig;
use crate::core::{Pipeline, PipelineStore, RegistryError, RunOutcome};
use crate::execution::{DailyScheduler, PipelineJob};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Whether jobs are set up when the node starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobMode {
    /// Build and arm every configured job
    Schedule,
    /// Leave jobs out, for one-shot runs
    Skip,
}

pub struct Node {
    actions: ActionStore,
    pipelines: Arc<PipelineStore>,
    jobs: Vec<PipelineJob>,
}

impl Node {
    /// Load configuration from `path` and build the node
    pub async fn from_file<P: AsRef<Path>>(path: P, mode: JobMode) -> Result<Self> {
        let config = NodeConfig::from_file(path)?;
        Self::from_config(config, mode).await
    }

    /// Build the node with issuers served in-process from `config.issuers`
    pub async fn from_config(config: NodeConfig, mode: JobMode) -> Result<Self> {
        let service = LocalCertificateService::from_configs(&config.issuers)
            .context("creating certificate issuers failed")?;
        Self::with_certificate_service(config, Arc::new(service), mode).await
    }

    /// Build the node around an existing certificate service
    pub async fn with_certificate_service(
        config: NodeConfig,
        certificates: Arc<dyn CertificateService>,
        mode: JobMode,
    ) -> Result<Self> {
        let pipelines = Arc::new(PipelineStore::new());
        let actions = ActionStore::with_builtins(certificates, pipelines.clone());
        debug!("Action store ready: {:?}", actions.names());

        for pipeline_config in &config.pipelines {
            let pipeline = Pipeline::from_config(pipeline_config, &actions)
                .with_context(|| format!("creating pipeline failed: {}", pipeline_config.name))?;
            info!(
                "Pipeline [{}] created with {} actions",
                pipeline.name(),
                pipeline.len()
            );
            pipelines.store_pipeline(pipeline).await;
        }

        let mut jobs = Vec::new();
        if mode == JobMode::Schedule {
            for job_config in &config.jobs {
                let pipeline = pipelines
                    .get_pipeline(&job_config.pipeline)
                    .await
                    .ok_or_else(|| RegistryError::PipelineNotFound(job_config.pipeline.clone()))
                    .with_context(|| format!("creating job failed: {}", job_config.name))?;

                let job = PipelineJob::new(&job_config.name, Box::new(DailyScheduler::new()), pipeline);
                job.execute()
                    .with_context(|| format!("scheduling job failed: {}", job_config.name))?;
                jobs.push(job);
            }
        } else {
            debug!("Skipping job initialisation");
        }

        Ok(Self {
            actions,
            pipelines,
            jobs,
        })
    }

    /// Run a stored pipeline once, right now
    pub async fn run_pipeline(&self, name: &str) -> Result<RunOutcome> {
        let pipeline = self
            .pipelines
            .get_pipeline(name)
            .await
            .ok_or_else(|| RegistryError::PipelineNotFound(name.to_string()))?;

        let outcome = pipeline
            .run()
            .await
            .with_context(|| format!("running pipeline failed: {}", name))?;
        Ok(outcome)
    }

    pub async fn pipeline_names(&self) -> Vec<String> {
        self.pipelines.names().await
    }

    pub fn job_names(&self) -> Vec<&str> {
        self.jobs.iter().map(PipelineJob::name).collect()
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("actions", &self.actions)
            .field("pipelines", &self.pipelines)
            .field("jobs", &self.jobs)
            .finish()
    }
}
