//! Platform definition for a device's management CLI.

use super::pacing::Pacing;

/// Everything the drivers need to know about a device CLI.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "dell_sonic").
    pub name: String,

    /// Command that launches the management CLI from the login shell.
    pub cli_command: String,

    /// Command that enters configuration mode.
    pub config_command: String,

    /// Command that leaves configuration mode.
    pub end_command: String,

    /// Command that persists the running configuration.
    pub save_command: String,

    /// Command that leaves the management CLI.
    pub exit_command: String,

    /// Read-only query whose output is the running configuration.
    pub backup_command: String,

    /// Substrings that mark a response as a failure.
    pub failed_when_contains: Vec<String>,

    /// Settle intervals and read bounds.
    pub pacing: Pacing,
}

impl PlatformDefinition {
    /// Create a new platform definition with conventional CLI commands.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cli_command: String::new(),
            config_command: "configure".to_string(),
            end_command: "end".to_string(),
            save_command: "write memory".to_string(),
            exit_command: "exit".to_string(),
            backup_command: "show running-configuration".to_string(),
            failed_when_contains: vec![],
            pacing: Pacing::default(),
        }
    }

    /// Set the command that launches the management CLI.
    pub fn with_cli_command(mut self, command: impl Into<String>) -> Self {
        self.cli_command = command.into();
        self
    }

    /// Set the configuration-mode entry command.
    pub fn with_config_command(mut self, command: impl Into<String>) -> Self {
        self.config_command = command.into();
        self
    }

    /// Set the persist command.
    pub fn with_save_command(mut self, command: impl Into<String>) -> Self {
        self.save_command = command.into();
        self
    }

    /// Set the backup query.
    pub fn with_backup_command(mut self, command: impl Into<String>) -> Self {
        self.backup_command = command.into();
        self
    }

    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Replace the pacing.
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }
}
