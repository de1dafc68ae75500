//! dd-topic — command-line helper for Device Defender topics.
//!
//! Library half of the binary so integration tests can drive commands
//! without spawning a process.

pub mod command;
pub mod error;

pub use command::{Command, Output, USAGE};
pub use error::CliError;
