//! CLI command definitions

use clap::Args;

/// Start the node and keep scheduled jobs running until interrupted
#[derive(Debug, Args, Clone)]
pub struct StartCommand {}

/// Run a pipeline once
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Name of the pipeline to run
    #[arg(short, long)]
    pub pipeline: String,
}

/// Validate the node configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List configured pipelines and jobs
#[derive(Debug, Args, Clone)]
pub struct ListCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
