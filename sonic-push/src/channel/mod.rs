//! Channel layer: buffering, paced reads and response classification.
//!
//! This module handles everything between raw shell bytes and a
//! success/failure verdict.

mod buffer;
mod classify;
mod reader;

pub use buffer::ResponseBuffer;
pub use classify::{Classification, Classifier};
pub use reader::{ReadMode, drain};
