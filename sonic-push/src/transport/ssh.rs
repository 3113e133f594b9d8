//! SSH transport implementation using russh.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use log::{debug, warn};
use russh::client::{self, Handle, Msg};
use russh::keys::{PrivateKeyWithHashAlg, PublicKey, load_secret_key};
use russh::{Channel, ChannelMsg};
use secrecy::ExposeSecret;

use super::config::{AuthMethod, HostKeyVerification, SshConfig};
use super::session::{ExecOutput, SessionHandle, ShellChannel};
use crate::error::{ChannelError, Result, TransportError};

/// An authenticated SSH session to one switch.
///
/// Shell and exec channels are opened on demand through [`SessionHandle`].
pub struct SshTransport {
    handle: Handle<HostKeyGuard>,
    config: SshConfig,
}

impl SshTransport {
    /// Open the TCP connection, verify the host key and log in.
    pub async fn connect(config: SshConfig) -> Result<Self> {
        let client_config = Arc::new(client::Config {
            inactivity_timeout: Some(config.timeout),
            ..Default::default()
        });
        let (guard, rejection) = HostKeyGuard::new(&config);

        debug!("Connecting to {}", config);
        let connecting = client::connect(client_config, (config.host.as_str(), config.port), guard);
        let mut handle = match tokio::time::timeout(config.timeout, connecting).await {
            Err(_) => return Err(TransportError::Timeout(config.timeout).into()),
            Ok(Ok(handle)) => handle,
            Ok(Err(e)) => return Err(connect_error(&config, &rejection, e).into()),
        };

        login(&mut handle, &config).await?;
        debug!("Authenticated as {}", config);

        Ok(Self { handle, config })
    }

    /// Disconnect politely.
    pub async fn close(self) -> Result<()> {
        self.handle
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }
}

/// A refused host key surfaces as a generic russh error; report the guard's
/// reason instead when it recorded one.
fn connect_error(
    config: &SshConfig,
    rejection: &Mutex<Option<TransportError>>,
    error: russh::Error,
) -> TransportError {
    if let Some(reason) = rejection.lock().ok().and_then(|mut slot| slot.take()) {
        return reason;
    }
    match error {
        russh::Error::IO(source) => TransportError::ConnectionFailed {
            host: config.host.clone(),
            port: config.port,
            source,
        },
        other => TransportError::Ssh(other),
    }
}

async fn login(handle: &mut Handle<HostKeyGuard>, config: &SshConfig) -> Result<()> {
    let user = config.username.as_str();
    let outcome = match &config.auth {
        AuthMethod::Password(password) => {
            handle
                .authenticate_password(user, password.expose_secret())
                .await
        }
        AuthMethod::PrivateKey { path, passphrase } => {
            let key = load_secret_key(path, passphrase.as_ref().map(|p| p.expose_secret()))
                .map_err(|e| TransportError::Key(format!("{}: {}", path.display(), e)))?;
            let rsa_hash = handle
                .best_supported_rsa_hash()
                .await
                .map_err(TransportError::Ssh)?
                .flatten();
            handle
                .authenticate_publickey(user, PrivateKeyWithHashAlg::new(Arc::new(key), rsa_hash))
                .await
        }
    }
    .map_err(TransportError::Ssh)?;

    if outcome.success() {
        Ok(())
    } else {
        Err(TransportError::AuthenticationFailed {
            user: user.to_string(),
        }
        .into())
    }
}

impl SessionHandle for SshTransport {
    type Shell = SshShell;

    async fn open_shell(&self) -> Result<SshShell> {
        let channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(TransportError::Ssh)?;

        channel
            .request_pty(
                true,
                "xterm",
                self.config.terminal_width,
                self.config.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(TransportError::Ssh)?;

        channel
            .request_shell(true)
            .await
            .map_err(TransportError::Ssh)?;

        Ok(SshShell {
            channel,
            closed: false,
        })
    }

    async fn exec(&self, command: &str) -> Result<ExecOutput> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(TransportError::Ssh)?;

        channel
            .exec(true, command)
            .await
            .map_err(ChannelError::Ssh)?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut exit_status = None;

        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => stdout.extend_from_slice(data),
                ChannelMsg::ExtendedData { ref data, ext } if ext == 1 => {
                    stderr.extend_from_slice(data)
                }
                // Exit status may arrive before the last data packet, so keep
                // reading until the channel closes.
                ChannelMsg::ExitStatus { exit_status: status } => exit_status = Some(status),
                _ => {}
            }
        }

        let exit_status = exit_status.ok_or(ChannelError::NoExitStatus)?;

        Ok(ExecOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_status,
        })
    }
}

/// Interactive shell channel over SSH with a PTY.
pub struct SshShell {
    channel: Channel<Msg>,
    closed: bool,
}

impl ShellChannel for SshShell {
    async fn send(&mut self, data: &str) -> Result<()> {
        if self.closed {
            return Err(ChannelError::Closed.into());
        }
        self.channel
            .data(data.as_bytes())
            .await
            .map_err(|e| ChannelError::WriteFailed(e.to_string()))?;
        Ok(())
    }

    async fn read_chunk(&mut self, timeout: Duration) -> Result<Option<Bytes>> {
        if self.closed {
            return Err(ChannelError::Closed.into());
        }

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let msg = match tokio::time::timeout_at(deadline, self.channel.wait()).await {
                Ok(msg) => msg,
                Err(_) => return Ok(None),
            };

            match msg {
                Some(ChannelMsg::Data { data }) => return Ok(Some(Bytes::copy_from_slice(&data))),
                Some(ChannelMsg::ExtendedData { data, .. }) => {
                    return Ok(Some(Bytes::copy_from_slice(&data)));
                }
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    self.closed = true;
                    return Err(ChannelError::Closed.into());
                }
                Some(_) => continue,
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.channel.close().await.map_err(ChannelError::Ssh)?;
        Ok(())
    }
}

/// Host key policy for one connection.
struct HostKeyGuard {
    host: String,
    port: u16,
    mode: HostKeyVerification,
    known_hosts: Option<PathBuf>,
    rejection: Arc<Mutex<Option<TransportError>>>,
}

impl HostKeyGuard {
    fn new(config: &SshConfig) -> (Self, Arc<Mutex<Option<TransportError>>>) {
        let rejection = Arc::new(Mutex::new(None));
        let guard = Self {
            host: config.host.clone(),
            port: config.port,
            mode: config.host_key_verification,
            known_hosts: config.known_hosts_path.clone(),
            rejection: rejection.clone(),
        };
        (guard, rejection)
    }

    /// `Ok(false)` when the host has no entry yet.
    fn is_known(&self, key: &PublicKey) -> std::result::Result<bool, TransportError> {
        let found = match &self.known_hosts {
            Some(path) => russh::keys::check_known_hosts_path(&self.host, self.port, key, path),
            None => russh::keys::check_known_hosts(&self.host, self.port, key),
        };
        found.map_err(|e| match e {
            russh::keys::Error::KeyChanged { line } => TransportError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            },
            other => TransportError::KnownHosts(other.to_string()),
        })
    }

    fn remember(&self, key: &PublicKey) -> std::result::Result<(), TransportError> {
        let saved = match &self.known_hosts {
            Some(path) => {
                russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, key, path)
            }
            None => russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, key),
        };
        saved.map_err(|e| TransportError::KnownHosts(e.to_string()))
    }

    /// Record why the key was refused and refuse it.
    fn refuse(&self, reason: TransportError) -> bool {
        warn!("Rejecting host key for {}:{}: {}", self.host, self.port, reason);
        if let Ok(mut slot) = self.rejection.lock() {
            *slot = Some(reason);
        }
        false
    }
}

impl client::Handler for HostKeyGuard {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        if self.mode == HostKeyVerification::Disabled {
            return Ok(true);
        }

        let accepted = match (self.mode, self.is_known(server_public_key)) {
            (_, Err(reason)) => self.refuse(reason),
            (_, Ok(true)) => true,
            (HostKeyVerification::Strict, Ok(false)) => self.refuse(TransportError::HostKeyUnknown {
                host: self.host.clone(),
                port: self.port,
            }),
            (_, Ok(false)) => {
                if let Err(e) = self.remember(server_public_key) {
                    warn!("Failed to save host key for {}: {}", self.host, e);
                }
                true
            }
        };
        Ok(accepted)
    }
}
