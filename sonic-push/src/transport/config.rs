//! Connection settings for one switch.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

/// SSH port used when none is given.
pub const DEFAULT_PORT: u16 = 22;

/// Connect timeout used when none is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// PTY size requested for the interactive shell. The wide terminal keeps
/// `sonic-cli` from wrapping long command echoes.
pub const DEFAULT_TERMINAL: (u32, u32) = (511, 24);

/// What to do with the switch's host key, as with OpenSSH's
/// `StrictHostKeyChecking`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostKeyVerification {
    /// Only hosts already in known_hosts are accepted.
    Strict,

    /// Unknown hosts are recorded in known_hosts; a changed key is refused.
    #[default]
    AcceptNew,

    /// No checking at all.
    Disabled,
}

impl HostKeyVerification {
    /// `Strict` when `strict` is set, otherwise `AcceptNew`.
    pub fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::AcceptNew }
    }
}

/// Credentials for the switch login.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    Password(SecretString),

    PrivateKey {
        path: PathBuf,
        passphrase: Option<SecretString>,
    },
}

/// Everything needed to open a session to one switch.
#[derive(Debug, Clone)]
pub struct SshConfig {
    /// Address or resolvable name.
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth: AuthMethod,

    /// Bounds the TCP connect plus handshake, and idle time afterwards.
    pub timeout: Duration,

    pub terminal_width: u32,
    pub terminal_height: u32,
    pub host_key_verification: HostKeyVerification,

    /// Defaults to `~/.ssh/known_hosts`.
    pub known_hosts_path: Option<PathBuf>,
}

impl fmt::Display for SshConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.username, self.host, self.port)
    }
}
