//! Session and channel seams the drivers are generic over.
//!
//! A [`SessionHandle`] is an authenticated connection to one device. It hands
//! out two channel flavors:
//!
//! - a shell channel ([`ShellChannel`]): long-lived, unframed byte stream
//! - an exec channel ([`SessionHandle::exec`]): one request, one response,
//!   with an exit status
//!
//! The handle is owned by whoever connected it. Drivers only borrow it for
//! the duration of a push.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;

use crate::error::Result;

/// Output of a one-shot exec request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Everything the command wrote to stdout.
    pub stdout: String,

    /// Everything the command wrote to stderr.
    pub stderr: String,

    /// Exit status reported by the remote side.
    pub exit_status: u32,
}

impl ExecOutput {
    /// Whether the remote command exited with status zero.
    pub fn is_success(&self) -> bool {
        self.exit_status == 0
    }
}

/// An open, authenticated session to a device.
pub trait SessionHandle: Send + Sync {
    /// Shell channel type produced by [`open_shell`](Self::open_shell).
    type Shell: ShellChannel;

    /// Open an interactive shell channel.
    fn open_shell(&self) -> impl Future<Output = Result<Self::Shell>> + Send;

    /// Run a single command on a fresh exec channel and collect its output.
    fn exec(&self, command: &str) -> impl Future<Output = Result<ExecOutput>> + Send;
}

/// Interactive byte-stream channel with no framing.
pub trait ShellChannel: Send {
    /// Write raw text to the channel.
    fn send(&mut self, data: &str) -> impl Future<Output = Result<()>> + Send;

    /// Wait up to `timeout` for the next chunk of output.
    ///
    /// Returns `Ok(None)` if nothing arrived in time. A closed or reset
    /// channel is an error.
    fn read_chunk(
        &mut self,
        timeout: Duration,
    ) -> impl Future<Output = Result<Option<Bytes>>> + Send;

    /// Close the channel.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;
}
