//! Pipeline domain model

use crate::action::{Action, ActionArgs, ActionError, ActionStore, Decision};
use crate::core::{config::PipelineConfig, context::Context, error::RegistryError};
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

/// One step of a pipeline: an action and the arguments bound to it
#[derive(Clone)]
pub struct ActionStep {
    /// Name the action was resolved from (or registered with)
    pub action_name: String,

    pub action: Arc<dyn Action>,

    pub args: ActionArgs,
}

impl std::fmt::Debug for ActionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionStep")
            .field("action_name", &self.action_name)
            .field("args", &self.args)
            .finish()
    }
}

/// How a run ended when no step failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every step ran
    Completed,
    /// A step asked to stop early; later steps did not run
    Skipped { action: String, reason: String },
}

impl RunOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, RunOutcome::Skipped { .. })
    }
}

/// A named, ordered list of action steps
#[derive(Debug, Clone)]
pub struct Pipeline {
    name: String,
    steps: Vec<ActionStep>,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Build a pipeline from configuration, resolving every action by name
    ///
    /// Fails on the first unknown action; nothing is returned in that case.
    pub fn from_config(config: &PipelineConfig, actions: &ActionStore) -> Result<Self, RegistryError> {
        let mut pipeline = Pipeline::new(&config.name);

        for action_config in &config.actions {
            let action = actions.get(&action_config.name)?;
            pipeline.push_step(ActionStep {
                action_name: action_config.name.clone(),
                action,
                args: ActionArgs::new(action_config.args.clone()),
            });
        }

        Ok(pipeline)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a step running `action` with `args`
    pub fn register_action(&mut self, action: Arc<dyn Action>, args: ActionArgs) {
        let action_name = action.name().to_string();
        self.push_step(ActionStep {
            action_name,
            action,
            args,
        });
    }

    fn push_step(&mut self, step: ActionStep) {
        debug!(
            "Adding action [{}] to pipeline [{}]",
            step.action_name, self.name
        );
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[ActionStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order against a fresh context
    ///
    /// Stops at the first error and returns it unchanged. Steps that already
    /// ran keep their effects.
    pub async fn run(&self) -> Result<RunOutcome, ActionError> {
        let mut ctx = Context::for_pipeline(&self.name);
        self.run_with(&mut ctx).await
    }

    /// Run as a sub-pipeline of the run owning `parent`
    pub async fn run_nested(&self, parent: &Context) -> Result<RunOutcome, ActionError> {
        let mut ctx = Context::nested(parent, &self.name)?;
        self.run_with(&mut ctx).await
    }

    async fn run_with(&self, ctx: &mut Context) -> Result<RunOutcome, ActionError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", name = %self.name, run = %run_id);

        async move {
            info!("Starting to run pipeline [{}]", self.name);

            for (index, step) in self.steps.iter().enumerate() {
                debug!("Running step {} [{}]", index + 1, step.action_name);

                match step.action.run(ctx, &step.args).await {
                    Ok(Decision::Continue) => {}
                    Ok(Decision::Skip { reason }) => {
                        info!(
                            "Pipeline [{}] stopped at [{}]: {}",
                            self.name, step.action_name, reason
                        );
                        return Ok(RunOutcome::Skipped {
                            action: step.action_name.clone(),
                            reason,
                        });
                    }
                    Err(e) => {
                        debug!(
                            "Error while running action [{}] in pipeline [{}]: {}",
                            step.action_name, self.name, e
                        );
                        return Err(e);
                    }
                }
            }

            info!("Pipeline [{}] completed", self.name);
            Ok(RunOutcome::Completed)
        }
        .instrument(span)
        .await
    }
}
