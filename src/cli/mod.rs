//! Command-line interface

pub mod commands;
pub mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{ListCommand, RunCommand, StartCommand, ValidateCommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Certificate issuance and renewal pipelines
#[derive(Debug, Parser, Clone)]
#[command(name = "certflow")]
#[command(version)]
#[command(about = "Certificate issuance and renewal pipelines", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to node configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Start the node with its scheduled jobs
    Start(StartCommand),

    /// Run a pipeline once
    Run(RunCommand),

    /// Validate the configuration
    Validate(ValidateCommand),

    /// List configured pipelines and jobs
    List(ListCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }

    /// The `--config` path, or the per-user default
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => default_config_path()
                .context("No --config given and no user config directory available"),
        }
    }
}

/// `<config dir>/certflow/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("certflow").join("config.yaml"))
}
