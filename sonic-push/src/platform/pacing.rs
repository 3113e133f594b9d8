//! Settle intervals and read bounds for the interactive shell.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing used by the terminal driver.
///
/// The device shell has no end-of-response marker, so every step waits a
/// fixed settle interval after transmitting and then drains whatever
/// arrived (see [`crate::channel::drain`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    /// Wait for the login banner after the shell opens.
    #[serde(with = "millis")]
    pub banner_settle: Duration,

    /// Wait after launching the management CLI.
    #[serde(with = "millis")]
    pub cli_settle: Duration,

    /// Wait after entering configuration mode.
    #[serde(with = "millis")]
    pub config_settle: Duration,

    /// Wait after each configuration command.
    #[serde(with = "millis")]
    pub command_settle: Duration,

    /// Wait after leaving configuration mode.
    #[serde(with = "millis")]
    pub end_settle: Duration,

    /// Wait after the persist command. Saves are slow.
    #[serde(with = "millis")]
    pub save_settle: Duration,

    /// Wait after leaving the management CLI.
    #[serde(with = "millis")]
    pub exit_settle: Duration,

    /// Upper bound on a single drain, and on the wait for the first byte
    /// of a mandatory response.
    #[serde(with = "millis")]
    pub read_timeout: Duration,

    /// A drain ends once no bytes arrive for this long.
    #[serde(with = "millis")]
    pub quiet_period: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            banner_settle: Duration::from_secs(1),
            cli_settle: Duration::from_secs(2),
            config_settle: Duration::from_secs(1),
            command_settle: Duration::from_millis(500),
            end_settle: Duration::from_secs(1),
            save_settle: Duration::from_secs(2),
            exit_settle: Duration::from_secs(1),
            read_timeout: Duration::from_secs(10),
            quiet_period: Duration::from_millis(250),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_waits_longer_than_commands() {
        let pacing = Pacing::default();
        assert!(pacing.save_settle > pacing.command_settle);
        assert!(pacing.quiet_period < pacing.read_timeout);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let pacing: Pacing = serde_json::from_str(r#"{"command_settle": 50}"#).unwrap();
        assert_eq!(pacing.command_settle, Duration::from_millis(50));
        assert_eq!(pacing.read_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_serializes_as_millis() {
        let json = serde_json::to_value(Pacing::default()).unwrap();
        assert_eq!(json["save_settle"], 2000);
    }
}
