//! Per-command outcomes and their aggregation into a session result.

use std::fmt;

use serde::Serialize;

/// Command field of the outcome recorded when the shell channel broke.
pub const SESSION_ERROR: &str = "session_error";

/// Command field of the outcome recorded when the exec request itself failed.
pub const EXECUTION_ERROR: &str = "execution_error";

/// Command field for failures found in merged batch output, where the
/// causing command cannot be identified.
pub const UNKNOWN_COMMAND: &str = "unknown_command";

/// Command field for a failed save.
pub const PERSIST_CONFIGURATION: &str = "persist configuration";

/// Result of submitting one command (or one synthetic step).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    /// The command text, or one of the reserved markers.
    pub command: String,

    /// Whether the response classified as success.
    pub success: bool,

    /// Captured response text (trimmed).
    pub response: String,
}

impl CommandOutcome {
    /// A command whose response carried no failure token.
    pub fn succeeded(command: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            success: true,
            response: response.into(),
        }
    }

    /// A command whose response carried a failure token.
    pub fn failed(command: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            success: false,
            response: response.into(),
        }
    }

    /// A channel-level failure, tagged with `marker`.
    pub fn structural(marker: &str, message: impl Into<String>) -> Self {
        Self::failed(marker, message)
    }

    /// Whether this outcome records a broken channel rather than a
    /// rejected command.
    pub fn is_structural(&self) -> bool {
        self.command == SESSION_ERROR || self.command == EXECUTION_ERROR
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.command, self.response)
    }
}

/// Which driver produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStrategy {
    /// The interactive shell driver.
    Interactive,
    /// The batch-pipe driver, after the interactive driver broke.
    BatchPipe,
}

impl fmt::Display for DeliveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStrategy::Interactive => write!(f, "interactive"),
            DeliveryStrategy::BatchPipe => write!(f, "batch-pipe"),
        }
    }
}

/// Final verdict of one configuration push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResult {
    success: bool,
    failed: Vec<CommandOutcome>,
    strategy: DeliveryStrategy,
}

impl SessionResult {
    /// Aggregate the outcomes of whichever driver ran.
    ///
    /// Successful outcomes are dropped; the push succeeded iff nothing failed.
    pub fn from_outcomes(outcomes: Vec<CommandOutcome>, strategy: DeliveryStrategy) -> Self {
        let failed: Vec<CommandOutcome> = outcomes.into_iter().filter(|o| !o.success).collect();
        Self {
            success: failed.is_empty(),
            failed,
            strategy,
        }
    }

    /// Whether every command was accepted.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Failed outcomes, in the order they occurred.
    pub fn failed(&self) -> &[CommandOutcome] {
        &self.failed
    }

    /// Consume the result, returning its failed outcomes.
    pub fn into_failed(self) -> Vec<CommandOutcome> {
        self.failed
    }

    /// Which driver produced this result.
    pub fn strategy(&self) -> DeliveryStrategy {
        self.strategy
    }
}

/// Whether the interactive driver's outcomes call for the batch-pipe
/// fallback: at least one failure, and every failure structural.
pub fn requires_fallback(outcomes: &[CommandOutcome]) -> bool {
    let mut failures = outcomes.iter().filter(|o| !o.success).peekable();
    failures.peek().is_some() && failures.all(CommandOutcome::is_structural)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_failure_list_is_success() {
        let result = SessionResult::from_outcomes(
            vec![
                CommandOutcome::succeeded("vlan 10", "sonic(conf-vlan10)#"),
                CommandOutcome::succeeded("exit", "sonic(config)#"),
            ],
            DeliveryStrategy::Interactive,
        );
        assert!(result.is_success());
        assert!(result.failed().is_empty());
    }

    #[test]
    fn test_failures_are_kept_in_order() {
        let result = SessionResult::from_outcomes(
            vec![
                CommandOutcome::failed("vlan 5000", "% Error: out of range"),
                CommandOutcome::succeeded("vlan 10", ""),
                CommandOutcome::failed("bogus", "% Invalid input"),
            ],
            DeliveryStrategy::Interactive,
        );
        assert!(!result.is_success());
        let commands: Vec<&str> = result.failed().iter().map(|o| o.command.as_str()).collect();
        assert_eq!(commands, vec!["vlan 5000", "bogus"]);
    }

    #[test]
    fn test_fallback_only_for_structural_failures() {
        let broken = vec![CommandOutcome::structural(SESSION_ERROR, "Channel closed")];
        assert!(requires_fallback(&broken));

        let exec_broken = vec![CommandOutcome::structural(EXECUTION_ERROR, "refused")];
        assert!(requires_fallback(&exec_broken));

        let rejected = vec![
            CommandOutcome::succeeded("vlan 10", ""),
            CommandOutcome::failed("bogus", "% Invalid input"),
        ];
        assert!(!requires_fallback(&rejected));

        let mixed = vec![
            CommandOutcome::failed("bogus", "% Invalid input"),
            CommandOutcome::structural(SESSION_ERROR, "Channel closed"),
        ];
        assert!(!requires_fallback(&mixed));

        let clean = vec![CommandOutcome::succeeded("vlan 10", "")];
        assert!(!requires_fallback(&clean));
        assert!(!requires_fallback(&[]));
    }

    #[test]
    fn test_reserved_markers() {
        assert!(CommandOutcome::structural(SESSION_ERROR, "x").is_structural());
        assert!(!CommandOutcome::failed(UNKNOWN_COMMAND, "x").is_structural());
        assert!(!CommandOutcome::failed(PERSIST_CONFIGURATION, "x").is_structural());
    }

    #[test]
    fn test_serializes_for_reports() {
        let result = SessionResult::from_outcomes(
            vec![CommandOutcome::failed("bogus", "% Invalid input")],
            DeliveryStrategy::BatchPipe,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["strategy"], "batch_pipe");
        assert_eq!(json["failed"][0]["command"], "bogus");
    }
}
