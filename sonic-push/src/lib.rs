//! # sonic-push
//!
//! Push line-oriented configuration to Dell Enterprise SONiC switches over
//! SSH.
//!
//! The device shell gives no reliable end-of-response marker, so commands
//! are delivered through a paced interactive session: each step waits a
//! fixed settle interval and then drains whatever the device printed. If
//! that shell breaks, the whole batch is piped into the management CLI
//! through a single exec request instead.
//!
//! ## Features
//!
//! - Async SSH via russh, with known_hosts checking
//! - Interactive `sonic-cli` session driven as a state machine
//! - Per-command failure classification by free-text tokens
//! - One-shot batch-pipe fallback when the interactive channel breaks
//! - Running-configuration backup
//! - File discovery, device grouping and hosts-file resolution for runs
//!   across many switches
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sonic_push::{ConfigPusher, SessionBuilder};
//! use sonic_push::platform::vendors::dell_sonic;
//! use sonic_push::source::load_commands;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sonic_push::Error> {
//!     let transport = SessionBuilder::new("192.168.1.1")
//!         .username("admin")
//!         .password("secret")
//!         .connect()
//!         .await?;
//!
//!     let platform = dell_sonic::platform();
//!     let commands = load_commands("esw123.txt".as_ref()).await?;
//!
//!     let result = ConfigPusher::new(&transport, &platform, "esw123")
//!         .push(&commands)
//!         .await;
//!     for failure in result.failed() {
//!         eprintln!("{}", failure);
//!     }
//!
//!     transport.close().await?;
//!     Ok(())
//! }
//! ```

pub mod backup;
pub mod channel;
pub mod cli;
pub mod driver;
pub mod error;
pub mod hosts;
pub mod logging;
pub mod platform;
pub mod runner;
pub mod source;
pub mod transport;

// Re-export main types for convenience
pub use backup::capture_backup;
pub use driver::{
    BatchPipeDriver, CommandOutcome, ConfigPusher, DeliveryStrategy, SessionResult, TerminalDriver,
};
pub use error::{Error, Result};
pub use platform::{Pacing, PlatformDefinition};
pub use source::{Command, extract_commands};
pub use transport::{AuthMethod, SessionBuilder, SshConfig, SshTransport};
