//! Node configuration from YAML

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Top-level configuration of an agent/worker node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeConfig {
    /// Certificate issuers served in-process
    #[serde(default)]
    pub issuers: Vec<IssuerConfig>,

    /// Named pipelines
    #[serde(default)]
    pub pipelines: Vec<PipelineConfig>,

    /// Pipelines to run on the daily schedule
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
}

/// A pipeline as declared in YAML
///
/// ```yaml
/// name: my-pipeline
/// actions:
///   - name: sh
///     args:
///       command: "echo hello world"
///   - name: run-pipeline
///     args:
///       pipeline-name: other
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,

    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

/// One step of a pipeline: a registered action name and its arguments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionConfig {
    pub name: String,

    /// Scalar YAML values (numbers, booleans) are accepted and kept as text
    #[serde(default, deserialize_with = "scalar_map")]
    pub args: HashMap<String, String>,
}

fn scalar_map<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<HashMap<String, Value>> = Option::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                other => {
                    return Err(serde::de::Error::custom(format!(
                        "argument '{}' must be a scalar, got {:?}",
                        key, other
                    )))
                }
            };
            Ok((key, text))
        })
        .collect()
}

/// Binds a pipeline to the daily scheduler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,

    /// Must match a pipeline name
    pub pipeline: String,
}

/// Kind of backend behind an issuer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssuerType {
    /// Signs leaf certificates with a CA loaded from disk
    Simple,
    /// Produces self-signed certificates
    CertificateAuthority,
}

/// A named certificate issuer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IssuerConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub issuer_type: IssuerType,

    /// Validity used when a request does not ask for one
    #[serde(default)]
    pub expiration_days: Option<u32>,

    /// Backend-specific settings (`certificate`, `private-key` for `simple`)
    #[serde(default)]
    pub args: HashMap<String, String>,
}

impl PipelineConfig {
    /// Parse a single pipeline definition from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig =
            serde_yaml::from_str(yaml).context("Failed to parse pipeline config")?;
        Ok(config)
    }
}

impl NodeConfig {
    /// Load node configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse node configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: NodeConfig = serde_yaml::from_str(yaml).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Action names are not checked here; they are resolved against the
    /// action store when the pipelines are built.
    pub fn validate(&self) -> Result<()> {
        let mut pipeline_names = HashSet::new();
        for pipeline in &self.pipelines {
            if pipeline.name.trim().is_empty() {
                anyhow::bail!("Pipeline name is empty, 'name' is required");
            }
            if !pipeline_names.insert(pipeline.name.as_str()) {
                anyhow::bail!("Duplicate pipeline name: {}", pipeline.name);
            }
            for (index, action) in pipeline.actions.iter().enumerate() {
                if action.name.trim().is_empty() {
                    anyhow::bail!(
                        "Pipeline '{}' action #{} has no name",
                        pipeline.name,
                        index + 1
                    );
                }
            }
        }

        let mut job_names = HashSet::new();
        for job in &self.jobs {
            if !job_names.insert(job.name.as_str()) {
                anyhow::bail!("Duplicate job name: {}", job.name);
            }
            if !pipeline_names.contains(job.pipeline.as_str()) {
                anyhow::bail!(
                    "Job '{}' references non-existent pipeline '{}'",
                    job.name,
                    job.pipeline
                );
            }
        }

        let mut issuer_names = HashSet::new();
        for issuer in &self.issuers {
            if issuer.name.trim().is_empty() {
                anyhow::bail!("Issuer name is empty, 'name' is required");
            }
            if !issuer_names.insert(issuer.name.as_str()) {
                anyhow::bail!("Duplicate issuer name: {}", issuer.name);
            }
            if issuer.issuer_type == IssuerType::Simple {
                for required in ["certificate", "private-key"] {
                    if !issuer.args.contains_key(required) {
                        anyhow::bail!(
                            "Issuer '{}' of type simple requires arg '{}'",
                            issuer.name,
                            required
                        );
                    }
                }
            }
        }

        Ok(())
    }

    pub fn pipeline(&self, name: &str) -> Option<&PipelineConfig> {
        self.pipelines.iter().find(|p| p.name == name)
    }
}
