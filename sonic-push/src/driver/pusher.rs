//! Push orchestration: interactive first, batch-pipe once on a broken
//! channel.

use log::{info, warn};

use super::batch::BatchPipeDriver;
use super::outcome::{DeliveryStrategy, SessionResult, requires_fallback};
use super::terminal::TerminalDriver;
use crate::platform::PlatformDefinition;
use crate::source::Command;
use crate::transport::SessionHandle;

/// Pushes command batches to one device over a borrowed session.
///
/// # Example
///
/// ```rust,no_run
/// use sonic_push::driver::ConfigPusher;
/// use sonic_push::platform::vendors::dell_sonic;
/// use sonic_push::source::extract_commands;
/// use sonic_push::transport::SessionBuilder;
///
/// # async fn example() -> Result<(), sonic_push::Error> {
/// let transport = SessionBuilder::new("10.0.0.1")
///     .username("admin")
///     .password("secret")
///     .connect()
///     .await?;
/// let platform = dell_sonic::platform();
///
/// let commands = extract_commands("interface Ethernet0\nno shutdown\n");
/// let result = ConfigPusher::new(&transport, &platform, "esw1").push(&commands).await;
/// assert!(result.is_success());
///
/// transport.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct ConfigPusher<'a, S: SessionHandle> {
    session: &'a S,
    platform: &'a PlatformDefinition,
    device: String,
}

impl<'a, S: SessionHandle> ConfigPusher<'a, S> {
    /// Create a pusher. `device` labels every log record.
    pub fn new(session: &'a S, platform: &'a PlatformDefinition, device: impl Into<String>) -> Self {
        Self {
            session,
            platform,
            device: device.into(),
        }
    }

    /// Push `commands` and aggregate the outcome.
    ///
    /// The interactive driver runs first. If everything it reported is a
    /// broken channel, the same full command list is submitted once more
    /// through the batch-pipe driver. Rejected commands never trigger the
    /// fallback.
    pub async fn push(&self, commands: &[Command]) -> SessionResult {
        info!("[{}] Applying {} configuration commands", self.device, commands.len());

        info!("[{}] Attempting to use interactive SONiC CLI session", self.device);
        let outcomes = TerminalDriver::new(self.session, self.platform, self.device.as_str())
            .run(commands)
            .await;

        if !requires_fallback(&outcomes) {
            return SessionResult::from_outcomes(outcomes, DeliveryStrategy::Interactive);
        }

        warn!(
            "[{}] Interactive session failed, trying single command method",
            self.device
        );
        let outcomes = BatchPipeDriver::new(self.session, self.platform, self.device.as_str())
            .run(commands)
            .await;
        SessionResult::from_outcomes(outcomes, DeliveryStrategy::BatchPipe)
    }
}
