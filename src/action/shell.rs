//! Shell command action

use crate::action::{Action, ActionArgs, ActionError, Decision};
use crate::core::Context;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

pub const ARGS_COMMAND: &str = "command";

/// Runs a program and waits for it to exit
///
/// The `command` argument is split on whitespace into the program and its
/// arguments; there is no quoting or escaping.
#[derive(Debug, Clone, Default)]
pub struct ShellAction;

impl ShellAction {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Action for ShellAction {
    fn name(&self) -> &str {
        "sh"
    }

    fn description(&self) -> &str {
        "Execute a command and fail on non-zero exit"
    }

    async fn run(&self, _ctx: &mut Context, args: &ActionArgs) -> Result<Decision, ActionError> {
        let command = args.required(ARGS_COMMAND)?;

        let mut parts = command.split_whitespace();
        let program = parts.next().ok_or_else(|| ActionError::InvalidArgument {
            name: ARGS_COMMAND.to_string(),
            reason: "command is empty".to_string(),
        })?;
        let program_args: Vec<&str> = parts.collect();

        debug!("Executing command: [{}] {:?}", program, program_args);
        let output = Command::new(program)
            .args(&program_args)
            .kill_on_drop(true)
            .output()
            .await?;

        let exit_code = output.status.code().unwrap_or(-1);
        debug!(
            "Command output: [{}], stderr: [{}], exit code: {}",
            String::from_utf8_lossy(&output.stdout).trim(),
            String::from_utf8_lossy(&output.stderr).trim(),
            exit_code
        );

        if output.status.success() {
            Ok(Decision::Continue)
        } else {
            Err(ActionError::CommandFailed {
                command: program.to_string(),
                code: exit_code,
            })
        }
    }
}
