//! Command-line usage errors.

use thiserror::Error;

/// Errors from parsing the command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    #[error("missing command")]
    MissingCommand,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("missing argument: <{0}>")]
    MissingArgument(&'static str),

    #[error("invalid <{name}>: {value}")]
    InvalidArgument { name: &'static str, value: String },

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
}
