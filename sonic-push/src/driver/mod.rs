//! Configuration delivery drivers.
//!
//! The [`TerminalDriver`] walks an interactive shell through the device's
//! modes and classifies each command's response. The [`BatchPipeDriver`]
//! submits the whole batch through one exec request; [`ConfigPusher`]
//! falls back to it once when the interactive channel itself breaks.

mod batch;
mod outcome;
mod pusher;
mod terminal;

pub use batch::{BatchPipeDriver, build_payload, pipe_command};
pub use outcome::{
    CommandOutcome, DeliveryStrategy, EXECUTION_ERROR, PERSIST_CONFIGURATION, SESSION_ERROR,
    SessionResult, UNKNOWN_COMMAND, requires_fallback,
};
pub use pusher::ConfigPusher;
pub use terminal::{SessionState, TerminalDriver};
