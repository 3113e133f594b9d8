//! Batch-pipe driver.
//!
//! Delivers the whole command list as one exec request that pipes the
//! configuration script into the management CLI. Used only after the
//! interactive driver broke. The merged output cannot be mapped back to
//! individual commands, so every failing line is reported against
//! [`UNKNOWN_COMMAND`].

use log::{debug, error, info};

use super::outcome::{CommandOutcome, EXECUTION_ERROR, SESSION_ERROR, UNKNOWN_COMMAND};
use crate::channel::Classifier;
use crate::platform::PlatformDefinition;
use crate::source::Command;
use crate::transport::SessionHandle;

/// Lines fed to the CLI: enter config, every command, leave, save, exit.
pub fn script_lines<'c>(platform: &'c PlatformDefinition, commands: &'c [Command]) -> Vec<&'c str> {
    let mut lines = Vec::with_capacity(commands.len() + 4);
    lines.push(platform.config_command.as_str());
    lines.extend(commands.iter().map(Command::as_str));
    lines.push(platform.end_command.as_str());
    lines.push(platform.save_command.as_str());
    lines.push(platform.exit_command.as_str());
    lines
}

/// The configuration script as newline-joined text.
pub fn build_payload(platform: &PlatformDefinition, commands: &[Command]) -> String {
    script_lines(platform, commands).join("\n")
}

/// The exec instruction that pipes the script into the CLI.
///
/// Each line is a single-quoted `printf` argument, so shell metacharacters
/// and backslashes in commands reach the CLI unchanged.
pub fn pipe_command(platform: &PlatformDefinition, commands: &[Command]) -> String {
    let args: Vec<String> = script_lines(platform, commands)
        .into_iter()
        .map(shell_quote)
        .collect();
    format!(r"printf '%s\n' {} | {}", args.join(" "), platform.cli_command)
}

fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

/// Fallback driver over the exec channel.
pub struct BatchPipeDriver<'a, S: SessionHandle> {
    session: &'a S,
    platform: &'a PlatformDefinition,
    classifier: Classifier,
    device: String,
}

impl<'a, S: SessionHandle> BatchPipeDriver<'a, S> {
    /// Create a driver. `device` labels every log record.
    pub fn new(session: &'a S, platform: &'a PlatformDefinition, device: impl Into<String>) -> Self {
        Self {
            session,
            platform,
            classifier: Classifier::for_platform(platform),
            device: device.into(),
        }
    }

    /// Submit `commands` in one request and return the failures found.
    ///
    /// An empty list means the output carried no failure token and the
    /// request exited with status zero.
    pub async fn run(&self, commands: &[Command]) -> Vec<CommandOutcome> {
        let instruction = pipe_command(self.platform, commands);
        info!(
            "[{}] Executing SONiC CLI with {} configuration commands",
            self.device,
            commands.len()
        );
        debug!("[{}] Full command: {}", self.device, instruction);

        let output = match self.session.exec(&instruction).await {
            Ok(output) => output,
            Err(e) => {
                error!("[{}] Error executing SONiC CLI batch: {}", self.device, e);
                return vec![CommandOutcome::structural(EXECUTION_ERROR, e.to_string())];
            }
        };

        debug!("[{}] SONiC CLI output: {}", self.device, output.stdout.trim());
        if !output.stderr.trim().is_empty() {
            debug!("[{}] SONiC CLI stderr: {}", self.device, output.stderr.trim());
        }

        let mut outcomes: Vec<CommandOutcome> = self
            .classifier
            .failing_lines(&output.stdout)
            .map(|line| {
                error!("[{}] Error in output: {}", self.device, line);
                CommandOutcome::failed(UNKNOWN_COMMAND, line)
            })
            .collect();

        if !output.is_success() {
            error!(
                "[{}] SONiC CLI session failed with exit status: {}",
                self.device, output.exit_status
            );
            let stderr = output.stderr.trim();
            let message = if stderr.is_empty() {
                format!("exit status {}", output.exit_status)
            } else {
                stderr.to_string()
            };
            outcomes.push(CommandOutcome::structural(SESSION_ERROR, message));
        }

        outcomes
    }
}
