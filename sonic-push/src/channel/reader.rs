//! Paced reads from the shell channel.

use log::trace;
use tokio::time::Instant;

use super::buffer::ResponseBuffer;
use crate::error::{ChannelError, Result};
use crate::platform::Pacing;
use crate::transport::ShellChannel;

/// Whether a step must produce output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// The device always answers here (it echoes the line at least).
    /// Receiving nothing within the read timeout is a channel failure.
    Mandatory,
    /// Output is read and discarded; an empty read means "no data yet".
    Discard,
}

/// Read until the channel goes quiet, appending to `buffer`.
///
/// Each read waits at most `pacing.quiet_period`, except the first read of
/// a mandatory step, which may wait the whole `pacing.read_timeout`. The
/// drain never runs past `pacing.read_timeout` in total. Returns the number
/// of bytes received.
pub async fn drain<C: ShellChannel>(
    channel: &mut C,
    buffer: &mut ResponseBuffer,
    pacing: &Pacing,
    mode: ReadMode,
) -> Result<usize> {
    let deadline = Instant::now() + pacing.read_timeout;
    let mut received = 0;

    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        let remaining = deadline - now;
        let wait = if received == 0 && mode == ReadMode::Mandatory {
            remaining
        } else {
            pacing.quiet_period.min(remaining)
        };

        match channel.read_chunk(wait).await? {
            Some(chunk) => {
                trace!("read {} bytes", chunk.len());
                received += chunk.len();
                buffer.extend(&chunk);
            }
            None => break,
        }
    }

    if received == 0 && mode == ReadMode::Mandatory {
        return Err(ChannelError::ReadTimeout(pacing.read_timeout).into());
    }

    Ok(received)
}
