//! mgadl-cli library root.
//!
//! Re-exports the configuration and terminal modules so integration tests
//! can drive them without spawning the binary.

pub mod config;
pub mod terminal;
