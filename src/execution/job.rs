//! Scheduled pipeline jobs

use crate::core::{Pipeline, RunOutcome};
use crate::execution::scheduler::{ScheduledTask, Scheduler, SchedulerError};
use std::sync::Arc;
use tracing::{error, info};

/// Binds a pipeline to a scheduler
pub struct PipelineJob {
    name: String,
    scheduler: Box<dyn Scheduler>,
    pipeline: Arc<Pipeline>,
}

impl PipelineJob {
    pub fn new(name: impl Into<String>, scheduler: Box<dyn Scheduler>, pipeline: Arc<Pipeline>) -> Self {
        Self {
            name: name.into(),
            scheduler,
            pipeline,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arm the scheduler with a run of the pipeline
    ///
    /// Only scheduling errors are returned. Run results are logged from the
    /// scheduled task and go nowhere else.
    pub fn execute(&self) -> Result<(), SchedulerError> {
        let job = self.name.clone();
        let pipeline = self.pipeline.clone();

        let task: ScheduledTask = Box::new(move || {
            let job = job.clone();
            let pipeline = pipeline.clone();
            Box::pin(async move {
                info!("Job [{}] running pipeline [{}]", job, pipeline.name());
                match pipeline.run().await {
                    Ok(RunOutcome::Completed) => {
                        info!("Job [{}] completed", job);
                    }
                    Ok(RunOutcome::Skipped { action, reason }) => {
                        info!("Job [{}] skipped at [{}]: {}", job, action, reason);
                    }
                    Err(e) => {
                        error!("Job [{}] failed running pipeline [{}]: {}", job, pipeline.name(), e);
                    }
                }
            })
        });

        self.scheduler.schedule(task)?;
        info!("Job [{}] scheduled for pipeline [{}]", self.name, self.pipeline.name());
        Ok(())
    }
}

impl std::fmt::Debug for PipelineJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineJob")
            .field("name", &self.name)
            .field("pipeline", &self.pipeline.name())
            .finish()
    }
}
