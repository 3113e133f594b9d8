//! Fluent construction of [`SshConfig`].

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::config::{
    AuthMethod, DEFAULT_PORT, DEFAULT_TERMINAL, DEFAULT_TIMEOUT, HostKeyVerification, SshConfig,
};
use super::ssh::SshTransport;
use crate::error::{DriverError, Result};

/// Collects connection settings for a switch.
///
/// The runner keeps one builder as a credential template and stamps each
/// device's address onto it with [`SessionBuilder::with_host`].
///
/// # Example
///
/// ```rust,no_run
/// use sonic_push::transport::SessionBuilder;
///
/// # async fn example() -> Result<(), sonic_push::Error> {
/// let transport = SessionBuilder::new("10.0.0.1")
///     .username("admin")
///     .password("secret")
///     .connect()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: Option<AuthMethod>,
    timeout: Duration,
    terminal: (u32, u32),
    host_keys: HostKeyVerification,
    known_hosts: Option<PathBuf>,
}

impl SessionBuilder {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: None,
            auth: None,
            timeout: DEFAULT_TIMEOUT,
            terminal: DEFAULT_TERMINAL,
            host_keys: HostKeyVerification::default(),
            known_hosts: None,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Log in with a password.
    pub fn password(self, password: impl Into<String>) -> Self {
        let password: String = password.into();
        self.secret_password(SecretString::new(password.into_boxed_str()))
    }

    /// Log in with a password that is already wrapped.
    pub fn secret_password(mut self, password: SecretString) -> Self {
        self.auth = Some(AuthMethod::Password(password));
        self
    }

    /// Log in with an unencrypted private key file.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = Some(AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        });
        self
    }

    /// Connect timeout; also used as the session inactivity timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal = (width, height);
        self
    }

    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_keys = mode;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts = Some(path.into());
        self
    }

    /// Same settings, different switch.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Check that a host, a username and credentials were given.
    pub fn build(self) -> Result<SshConfig> {
        let invalid = |message: &str| DriverError::InvalidConfig {
            message: message.to_string(),
        };

        if self.host.trim().is_empty() {
            return Err(invalid("Host must not be empty").into());
        }
        let username = self.username.ok_or_else(|| invalid("Username is required"))?;
        let auth = self
            .auth
            .ok_or_else(|| invalid("Password or private key is required"))?;

        let (terminal_width, terminal_height) = self.terminal;
        Ok(SshConfig {
            host: self.host,
            port: self.port,
            username,
            auth,
            timeout: self.timeout,
            terminal_width,
            terminal_height,
            host_key_verification: self.host_keys,
            known_hosts_path: self.known_hosts,
        })
    }

    /// Build and open an authenticated session.
    pub async fn connect(self) -> Result<SshTransport> {
        SshTransport::connect(self.build()?).await
    }
}
