//! Interactive shell driver.
//!
//! Drives one shell channel through the device's modes, strictly forward:
//!
//! ```text
//! Opened -> AwaitingBanner -> InCliShell -> EnteringConfig
//!        -> InConfigMode (one step per command) -> ExitingConfig
//!        -> Saving -> Closed
//! ```
//!
//! Every step transmits a line, waits the platform's settle interval and
//! drains the response. Each configuration command gets its own outcome;
//! a rejected command never stops the batch. Any channel fault aborts the
//! run and is reported as a single [`SESSION_ERROR`] outcome.

use std::time::Duration;

use log::{debug, error, info, warn};

use super::outcome::{CommandOutcome, PERSIST_CONFIGURATION, SESSION_ERROR};
use crate::channel::{Classifier, ReadMode, ResponseBuffer, drain};
use crate::error::{Error, Result};
use crate::platform::PlatformDefinition;
use crate::source::Command;
use crate::transport::{SessionHandle, ShellChannel};

/// Modal state of the device shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    /// Shell channel requested.
    Opened,
    /// Waiting for the login banner.
    AwaitingBanner,
    /// Management CLI launched.
    InCliShell,
    /// Configuration mode requested.
    EnteringConfig,
    /// Submitting configuration commands.
    InConfigMode,
    /// Configuration mode exit requested.
    ExitingConfig,
    /// Persist requested.
    Saving,
    /// CLI exited and channel closed.
    Closed,
}

/// Interactive driver for one push over one shell channel.
///
/// Borrows the session for the duration of the push; the caller keeps
/// ownership of the connection.
pub struct TerminalDriver<'a, S: SessionHandle> {
    session: &'a S,
    platform: &'a PlatformDefinition,
    classifier: Classifier,
    device: String,
    state: SessionState,
    buffer: ResponseBuffer,
}

impl<'a, S: SessionHandle> TerminalDriver<'a, S> {
    /// Create a driver. `device` labels every log record.
    pub fn new(session: &'a S, platform: &'a PlatformDefinition, device: impl Into<String>) -> Self {
        Self {
            session,
            platform,
            classifier: Classifier::for_platform(platform),
            device: device.into(),
            state: SessionState::Opened,
            buffer: ResponseBuffer::new(),
        }
    }

    /// The state reached by the last run. A run that aborted stays in the
    /// state where the fault happened.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Push `commands` and return one outcome per command, plus a
    /// [`PERSIST_CONFIGURATION`] outcome if the save was rejected.
    ///
    /// On a channel fault the result is a single [`SESSION_ERROR`] outcome.
    pub async fn run(&mut self, commands: &[Command]) -> Vec<CommandOutcome> {
        self.state = SessionState::Opened;
        self.buffer.clear();

        let mut shell = match self.session.open_shell().await {
            Ok(shell) => shell,
            Err(e) => return self.abort(e),
        };

        let mut outcomes = Vec::with_capacity(commands.len() + 1);
        match self.drive(&mut shell, commands, &mut outcomes).await {
            Ok(()) => outcomes,
            Err(e) => {
                if let Err(close_err) = shell.close().await {
                    debug!("[{}] closing broken shell: {}", self.device, close_err);
                }
                self.abort(e)
            }
        }
    }

    async fn drive<C: ShellChannel>(
        &mut self,
        shell: &mut C,
        commands: &[Command],
        outcomes: &mut Vec<CommandOutcome>,
    ) -> Result<()> {
        let platform = self.platform;
        let pacing = &platform.pacing;

        self.advance(SessionState::AwaitingBanner);
        tokio::time::sleep(pacing.banner_settle).await;
        drain(shell, &mut self.buffer, pacing, ReadMode::Mandatory).await?;
        debug!("[{}] Initial prompt: {:?}", self.device, self.buffer.take_string());

        self.advance(SessionState::InCliShell);
        info!("[{}] Starting SONiC CLI session", self.device);
        let startup = self
            .transmit(shell, &platform.cli_command, pacing.cli_settle, ReadMode::Discard)
            .await?;
        debug!("[{}] CLI startup: {:?}", self.device, startup);

        self.advance(SessionState::EnteringConfig);
        info!("[{}] Entering configuration mode", self.device);
        self.transmit(shell, &platform.config_command, pacing.config_settle, ReadMode::Discard)
            .await?;

        self.advance(SessionState::InConfigMode);
        let total = commands.len();
        for (i, command) in commands.iter().enumerate() {
            info!("[{}] [{}/{}] Executing: {}", self.device, i + 1, total, command);
            let response = self
                .transmit(shell, command.as_str(), pacing.command_settle, ReadMode::Mandatory)
                .await?;
            outcomes.push(self.classify(command.as_str(), &response));
        }

        self.advance(SessionState::ExitingConfig);
        info!("[{}] Exiting configuration mode", self.device);
        self.transmit(shell, &platform.end_command, pacing.end_settle, ReadMode::Discard)
            .await?;

        self.advance(SessionState::Saving);
        info!("[{}] Saving configuration", self.device);
        let response = self
            .transmit(shell, &platform.save_command, pacing.save_settle, ReadMode::Discard)
            .await?;
        if response.trim().is_empty() {
            warn!("[{}] Could not read final output", self.device);
        }
        let saved = self.classify(PERSIST_CONFIGURATION, &response);
        if saved.success {
            info!("[{}] Configuration saved successfully", self.device);
        } else {
            error!("[{}] Failed to save configuration", self.device);
            outcomes.push(saved);
        }

        shell.send(&line(&platform.exit_command)).await?;
        tokio::time::sleep(pacing.exit_settle).await;
        shell.close().await?;
        self.advance(SessionState::Closed);

        Ok(())
    }

    /// Send one line, wait for the device to settle, and collect its answer.
    async fn transmit<C: ShellChannel>(
        &mut self,
        shell: &mut C,
        input: &str,
        settle: Duration,
        mode: ReadMode,
    ) -> Result<String> {
        self.buffer.clear();
        shell.send(&line(input)).await?;
        tokio::time::sleep(settle).await;
        drain(shell, &mut self.buffer, &self.platform.pacing, mode).await?;
        let response = self.buffer.take_string();
        debug!("[{}] Response: {:?}", self.device, response);
        Ok(response)
    }

    fn classify(&self, command: &str, response: &str) -> CommandOutcome {
        let response = response.trim();
        if self.classifier.classify(response).is_failure() {
            error!("[{}] Command failed: {}", self.device, command);
            error!("[{}] Error response: {}", self.device, response);
            CommandOutcome::failed(command, response)
        } else {
            CommandOutcome::succeeded(command, response)
        }
    }

    fn advance(&mut self, next: SessionState) {
        debug_assert!(next > self.state, "{:?} -> {:?}", self.state, next);
        debug!("[{}] {:?} -> {:?}", self.device, self.state, next);
        self.state = next;
    }

    fn abort(&self, err: Error) -> Vec<CommandOutcome> {
        error!(
            "[{}] Error in SONiC CLI session ({:?}): {}",
            self.device, self.state, err
        );
        vec![CommandOutcome::structural(SESSION_ERROR, err.to_string())]
    }
}

fn line(input: &str) -> String {
    format!("{input}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::vendors::dell_sonic;
    use crate::source::extract_commands;
    use crate::transport::mock::{Fault, MockSession};

    #[tokio::test(start_paused = true)]
    async fn test_step_sequence() {
        let session = MockSession::new();
        let platform = dell_sonic::platform();
        let commands = extract_commands("interface Ethernet0\nno shutdown\n");

        let mut driver = TerminalDriver::new(&session, &platform, "esw1");
        let outcomes = driver.run(&commands).await;

        assert_eq!(
            session.shell_sent(),
            vec![
                "sonic-cli",
                "configure",
                "interface Ethernet0",
                "no shutdown",
                "end",
                "write memory",
                "exit"
            ]
        );
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.success));
        assert_eq!(outcomes[0].command, "interface Ethernet0");
        assert_eq!(driver.state(), SessionState::Closed);
        assert!(session.shell_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_command_does_not_stop_batch() {
        let session = MockSession::new().reply(
            "vlan 5000",
            "vlan 5000\r\n% Invalid input detected at '^' marker.\r\nsonic(config)# ",
        );
        let platform = dell_sonic::platform();
        let commands = extract_commands("vlan 10\nvlan 5000\nvlan 20\nvlan 30\n");

        let mut driver = TerminalDriver::new(&session, &platform, "esw1");
        let outcomes = driver.run(&commands).await;

        assert_eq!(outcomes.len(), 4);
        assert!(outcomes[0].success);
        assert!(!outcomes[1].success);
        assert!(outcomes[1].response.contains("% Invalid input detected"));
        assert_eq!(outcomes[2].command, "vlan 20");
        assert!(outcomes[2].success);
        assert_eq!(outcomes[3].command, "vlan 30");
        assert!(session.shell_sent().contains(&"write memory".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_mid_batch_is_single_session_error() {
        let session = MockSession::new()
            .reply("vlan 5000", "% Error: out of range\r\nsonic(config)# ")
            .fault_after("vlan 20", Fault::Timeout);
        let platform = dell_sonic::platform();
        let commands = extract_commands("vlan 5000\nvlan 20\nvlan 30\n");

        let mut driver = TerminalDriver::new(&session, &platform, "esw1");
        let outcomes = driver.run(&commands).await;

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].command, SESSION_ERROR);
        assert!(!outcomes[0].success);
        assert_eq!(driver.state(), SessionState::InConfigMode);
        assert!(!session.shell_sent().contains(&"vlan 30".to_string()));
        assert!(session.shell_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_channel_is_structural() {
        let session = MockSession::new().fault_after("configure", Fault::Closed);
        let platform = dell_sonic::platform();
        let commands = extract_commands("vlan 10\n");

        let outcomes = TerminalDriver::new(&session, &platform, "esw1")
            .run(&commands)
            .await;

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_structural());
        assert!(outcomes[0].response.contains("Channel closed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_failure_is_structural() {
        let session = MockSession::new().fault_after("vlan 10", Fault::WriteFailure);
        let platform = dell_sonic::platform();
        let commands = extract_commands("vlan 10\n");

        let outcomes = TerminalDriver::new(&session, &platform, "esw1")
            .run(&commands)
            .await;

        assert_eq!(outcomes, vec![CommandOutcome::structural(
            SESSION_ERROR,
            "Channel error: Write failed: broken pipe"
        )]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_device_times_out() {
        let session = MockSession::new().fault_after("vlan 10", Fault::Silent);
        let platform = dell_sonic::platform();
        let commands = extract_commands("vlan 10\n");

        let outcomes = TerminalDriver::new(&session, &platform, "esw1")
            .run(&commands)
            .await;

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].command, SESSION_ERROR);
        assert!(outcomes[0].response.contains("No response within"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_failure_is_structural() {
        let session = MockSession::new().fail_open();
        let platform = dell_sonic::platform();

        let outcomes = TerminalDriver::new(&session, &platform, "esw1")
            .run(&extract_commands("vlan 10\n"))
            .await;

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_structural());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_is_reported() {
        let session = MockSession::new().reply(
            "write memory",
            "write memory\r\n% Error: could not write startup config\r\nsonic# ",
        );
        let platform = dell_sonic::platform();

        let outcomes = TerminalDriver::new(&session, &platform, "esw1")
            .run(&extract_commands("vlan 10\n"))
            .await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].success);
        assert_eq!(outcomes[1].command, PERSIST_CONFIGURATION);
        assert!(!outcomes[1].success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_reads_classified_as_whole() {
        let session = MockSession::new()
            .chunk_size(2)
            .reply("vlan 5000", "vlan 5000\r\n% Error: VLAN id out of range\r\nsonic(config)# ");
        let platform = dell_sonic::platform();

        let outcomes = TerminalDriver::new(&session, &platform, "esw1")
            .run(&extract_commands("vlan 5000\nvlan 10\n"))
            .await;

        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes[0].success);
        assert_eq!(
            outcomes[0].response,
            "vlan 5000\n% Error: VLAN id out of range\nsonic(config)#"
        );
        assert!(outcomes[1].success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_coloured_unicode_reply_in_small_chunks() {
        for size in [1, 3] {
            let session = MockSession::new().chunk_size(size).reply(
                "description café",
                "description café\r\n\x1b[32mok\x1b[0m\r\nsonic(conf-if-Ethernet0)# ",
            );
            let platform = dell_sonic::platform();

            let outcomes = TerminalDriver::new(&session, &platform, "esw1")
                .run(&extract_commands("description café\n"))
                .await;

            assert_eq!(
                outcomes[0].response,
                "description café\nok\nsonic(conf-if-Ethernet0)#"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_save_completes_session() {
        let session = MockSession::new().fault_after("write memory", Fault::Silent);
        let platform = dell_sonic::platform();

        let mut driver = TerminalDriver::new(&session, &platform, "esw1");
        let outcomes = driver.run(&extract_commands("vlan 10\nvlan 20\n")).await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.success));
        assert_eq!(driver.state(), SessionState::Closed);
        assert_eq!(session.shell_sent().last().map(String::as_str), Some("exit"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_intervals_are_waited() {
        let session = MockSession::new();
        let platform = dell_sonic::platform();
        let pacing = platform.pacing.clone();
        let commands = extract_commands("vlan 10\nvlan 20\n");

        let start = tokio::time::Instant::now();
        TerminalDriver::new(&session, &platform, "esw1")
            .run(&commands)
            .await;
        let elapsed = start.elapsed();

        let expected = pacing.banner_settle
            + pacing.cli_settle
            + pacing.config_settle
            + pacing.command_settle * 2
            + pacing.end_settle
            + pacing.save_settle
            + pacing.exit_settle;
        assert!(elapsed >= expected, "{elapsed:?} < {expected:?}");
    }
}
