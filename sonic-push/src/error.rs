//! Error types for sonic-push.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for sonic-push operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Could not reach or log in to the switch
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Shell or exec channel errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// A push was set up wrongly
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Local file errors (configuration sources, hosts file, backups)
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

impl Error {
    /// Whether this error means the channel to the device broke, as opposed
    /// to a local or configuration problem.
    pub fn is_structural(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Channel(_))
    }
}

/// Errors reaching, verifying or logging in to a switch.
#[derive(Error, Debug)]
pub enum TransportError {
    /// TCP connect failed
    #[error("Cannot reach {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// The switch refused the credentials
    #[error("Login rejected for user '{user}'")]
    AuthenticationFailed { user: String },

    /// Private key could not be loaded
    #[error("Private key error: {0}")]
    Key(String),

    /// Host key does not match the known_hosts entry
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// Host is not in known_hosts and strict checking is enabled
    #[error("Host {host}:{port} not found in known_hosts")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// The switch dropped the connection
    #[error("Disconnected by remote host")]
    Disconnected,

    /// Connect or handshake took longer than the configured timeout
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Channel layer errors (shell reads/writes, exec requests).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Nothing arrived at a point where the device must answer
    #[error("No response within {0:?}")]
    ReadTimeout(Duration),

    /// Shell or exec channel ended (EOF, close or reset)
    #[error("Channel closed")]
    Closed,

    /// Writing to the channel failed
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Exec channel finished without reporting an exit status
    #[error("Command did not report an exit status")]
    NoExitStatus,

    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),
}

/// Driver layer errors.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Invalid configuration in a builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Local file errors.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Path does not exist
    #[error("Path not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// File could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type alias using sonic-push's Error.
pub type Result<T> = std::result::Result<T, Error>;
