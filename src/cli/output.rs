//! CLI output formatting

use crate::core::config::NodeConfig;
use crate::core::RunOutcome;
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "- ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Format the result of a pipeline run
pub fn format_outcome(pipeline: &str, outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Completed => format!(
            "{} {} completed {}",
            CHECK,
            style(pipeline).bold(),
            style("successfully").green()
        ),
        RunOutcome::Skipped { action, reason } => format!(
            "{} {} {} at {}: {}",
            SKIP,
            style(pipeline).bold(),
            style("skipped").yellow(),
            style(action).cyan(),
            style(reason).dim()
        ),
    }
}

/// Format a failed run, with the error and each of its causes
pub fn format_failure(pipeline: &str, error: &anyhow::Error) -> String {
    let mut lines = vec![format!(
        "{} {} {}",
        CROSS,
        style(pipeline).bold(),
        style("failed").red()
    )];
    for cause in error.chain() {
        lines.push(format!("  {}", style(cause).red()));
    }
    lines.join("\n")
}

/// Format the pipelines and jobs of a configuration
pub fn format_config_listing(config: &NodeConfig) -> String {
    let mut lines = Vec::new();

    if config.pipelines.is_empty() {
        lines.push(format!("{} No pipelines configured", INFO));
    } else {
        lines.push(format!("{} Pipelines:", INFO));
        for pipeline in &config.pipelines {
            let actions: Vec<_> = pipeline.actions.iter().map(|a| a.name.as_str()).collect();
            lines.push(format!(
                "  {} ({})",
                style(&pipeline.name).bold(),
                style(actions.join(" → ")).dim()
            ));
        }
    }

    if !config.jobs.is_empty() {
        lines.push(format!("{} Jobs:", INFO));
        for job in &config.jobs {
            lines.push(format!(
                "  {} → {}",
                style(&job.name).bold(),
                style(&job.pipeline).cyan()
            ));
        }
    }

    lines.join("\n")
}
