//! SSH transport layer wrapping russh.
//!
//! This module provides the session handle the drivers borrow: connection
//! setup, authentication, and the shell and exec channels.

mod builder;
pub mod config;
mod connector;
#[cfg(test)]
pub(crate) mod mock;
mod session;
mod ssh;

pub use builder::SessionBuilder;
pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use connector::{Connector, SshConnector};
pub use session::{ExecOutput, SessionHandle, ShellChannel};
pub use ssh::{SshShell, SshTransport};
