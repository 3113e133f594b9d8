//! Platform definitions for the device CLI being driven.
//!
//! A platform names the commands that move the device shell between its
//! modes, the tokens that mark a rejected command, and the pacing used
//! against the unframed shell stream.

mod definition;
mod pacing;
pub mod vendors;

pub use definition::PlatformDefinition;
pub use pacing::Pacing;
