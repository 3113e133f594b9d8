//! Per-device connection factory used by the runner.

use std::future::Future;

use super::builder::SessionBuilder;
use super::session::SessionHandle;
use super::ssh::SshTransport;
use crate::error::Result;

/// Opens and closes one session per device.
pub trait Connector: Send + Sync {
    /// Session type handed to the drivers.
    type Session: SessionHandle;

    /// Connect and authenticate to `address`.
    fn connect(&self, address: &str) -> impl Future<Output = Result<Self::Session>> + Send;

    /// Tear the session down.
    fn disconnect(&self, session: Self::Session) -> impl Future<Output = Result<()>> + Send;
}

/// SSH connector sharing one set of credentials across devices.
#[derive(Debug, Clone)]
pub struct SshConnector {
    template: SessionBuilder,
}

impl SshConnector {
    /// Create a connector from a builder holding credentials and options.
    ///
    /// The builder's host is replaced for every connection.
    pub fn new(template: SessionBuilder) -> Self {
        Self { template }
    }
}

impl Connector for SshConnector {
    type Session = SshTransport;

    async fn connect(&self, address: &str) -> Result<SshTransport> {
        self.template.clone().with_host(address).connect().await
    }

    async fn disconnect(&self, session: SshTransport) -> Result<()> {
        session.close().await
    }
}
