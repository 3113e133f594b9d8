//! Built-in platform definitions.

pub mod dell_sonic;
