use anyhow::{Context, Result};
use certflow::cli::commands::{ListCommand, RunCommand, ValidateCommand};
use certflow::cli::output::*;
use certflow::cli::{Cli, Command};
use certflow::core::config::NodeConfig;
use certflow::{JobMode, Node};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; RUST_LOG wins over --verbose
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let config_path = cli.config_path()?;

    // Execute command
    match &cli.command {
        Command::Start(_) => start(&config_path).await?,
        Command::Run(cmd) => run_pipeline(cmd, &config_path).await?,
        Command::Validate(cmd) => validate_config(cmd, &config_path)?,
        Command::List(cmd) => list_config(cmd, &config_path)?,
    }

    Ok(())
}

async fn start(config_path: &Path) -> Result<()> {
    let node = Node::from_file(config_path, JobMode::Schedule)
        .await
        .context("Failed to start node")?;

    println!(
        "{} Node started with {} pipelines",
        ROCKET,
        style(node.pipeline_names().await.len()).cyan()
    );
    for job in node.job_names() {
        println!("  {} {}", INFO, style(job).bold());
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutting down");

    Ok(())
}

async fn run_pipeline(cmd: &RunCommand, config_path: &Path) -> Result<()> {
    let node = Node::from_file(config_path, JobMode::Skip)
        .await
        .context("Failed to load node")?;

    println!("{} Running pipeline {}", ROCKET, style(&cmd.pipeline).bold());

    match node.run_pipeline(&cmd.pipeline).await {
        Ok(outcome) => {
            println!("{}", format_outcome(&cmd.pipeline, &outcome));
            Ok(())
        }
        Err(e) => {
            println!("{}", format_failure(&cmd.pipeline, &e));
            std::process::exit(1);
        }
    }
}

fn validate_config(cmd: &ValidateCommand, config_path: &Path) -> Result<()> {
    println!("{} Validating {}...", INFO, style(config_path.display()).dim());

    match NodeConfig::from_file(config_path) {
        Ok(config) => {
            println!("{} Configuration is valid!", CHECK);
            println!("  Issuers: {}", style(config.issuers.len()).cyan());
            println!("  Pipelines: {}", style(config.pipelines.len()).cyan());
            println!("  Jobs: {}", style(config.jobs.len()).cyan());

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            for cause in e.chain() {
                println!("  {}", style(cause).red());
            }
            std::process::exit(1);
        }
    }
}

fn list_config(cmd: &ListCommand, config_path: &Path) -> Result<()> {
    let config = NodeConfig::from_file(config_path)?;

    if cmd.json {
        let data = serde_json::json!({
            "pipelines": config.pipelines.iter().map(|p| serde_json::json!({
                "name": p.name,
                "actions": p.actions.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
            })).collect::<Vec<_>>(),
            "jobs": config.jobs,
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        println!("{}", format_config_listing(&config));
    }

    Ok(())
}
