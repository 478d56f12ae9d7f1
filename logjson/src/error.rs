//! Errors for the fallible edges of the crate.
//!
//! Encoding itself never fails; only rule parsing, configuration and writing to
//! an external sink do.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to write log record: {0}")]
    Io(#[from] io::Error),
    #[error("unknown log rule `{0}` (expected `omit`, `digest` or `md5`)")]
    InvalidRule(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
