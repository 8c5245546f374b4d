//! Sub-pipeline invocation action

use crate::action::{Action, ActionArgs, ActionError, Decision};
use crate::core::{Context, PipelineStore, RunOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub const ARGS_PIPELINE_NAME: &str = "pipeline-name";

/// Runs another stored pipeline as a step of the current one
///
/// The sub-pipeline gets a context of its own. A pipeline that is already
/// running further up the invocation chain is rejected with
/// [`ActionError::CycleDetected`]. A skip inside the sub-pipeline also
/// stops the calling pipeline.
pub struct RunPipelineAction {
    pipelines: Arc<PipelineStore>,
}

impl RunPipelineAction {
    pub fn new(pipelines: Arc<PipelineStore>) -> Self {
        Self { pipelines }
    }
}

#[async_trait]
impl Action for RunPipelineAction {
    fn name(&self) -> &str {
        "run-pipeline"
    }

    fn description(&self) -> &str {
        "Run another pipeline by name"
    }

    async fn run(&self, ctx: &mut Context, args: &ActionArgs) -> Result<Decision, ActionError> {
        let pipeline_name = args.required(ARGS_PIPELINE_NAME)?;

        let pipeline = self
            .pipelines
            .get_pipeline(pipeline_name)
            .await
            .ok_or_else(|| ActionError::PipelineNotFound(pipeline_name.to_string()))?;

        debug!("Running sub-pipeline [{}]", pipeline_name);
        match pipeline.run_nested(ctx).await? {
            RunOutcome::Completed => Ok(Decision::Continue),
            RunOutcome::Skipped { reason, .. } => Ok(Decision::Skip { reason }),
        }
    }
}
