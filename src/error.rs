use std::sync::Arc;

use thiserror::Error;

use crate::protocol::{packet::ErrPayloadBytes, response::ErrPayload};

/// Errors produced while decoding packets or iterating a result set
///
/// `Clone` so that a result set can remember the error that terminated it
/// and still hand a copy to the caller.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Server Error: {0}")]
    ServerError(#[from] ErrPayload),

    #[error("Transport error: {0}")]
    Transport(Arc<std::io::Error>),

    #[error("Truncated input: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput { needed: usize, remaining: usize },

    #[error("Unexpected packet header: expected 0x{expected:02X}, found 0x{found:02X}")]
    UnexpectedHeader { expected: u8, found: u8 },

    #[error("Unexpected NULL marker where an integer was expected")]
    UnexpectedNull,

    #[error("Invalid packet")]
    InvalidPacket,

    #[error("Row payload has {0} trailing bytes after the last column")]
    TrailingBytes(usize),

    #[error("Malformed error packet: {0}")]
    MalformedErrPacket(String),

    #[error("Row decoded without field metadata or without a current row")]
    EmptyMetadata,

    #[error("Bad config error: {0}")]
    BadConfigError(String),

    #[error("Bad usage error: {0}")]
    BadUsageError(String),
}

impl Error {
    /// Whether the packet boundary on the connection can no longer be trusted
    pub fn is_desync(&self) -> bool {
        matches!(
            self,
            Error::Transport(_)
                | Error::TruncatedInput { .. }
                | Error::TrailingBytes(_)
                | Error::InvalidPacket
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Transport(Arc::new(err))
    }
}

impl<'a> From<ErrPayloadBytes<'a>> for Error {
    fn from(value: ErrPayloadBytes) -> Self {
        match ErrPayload::try_from(value) {
            Ok(err_payload) => Error::ServerError(err_payload),
            Err(err) => Error::MalformedErrPacket(err.to_string()),
        }
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(err: std::convert::Infallible) -> Self {
        match err {}
    }
}

pub type Result<T> = std::result::Result<T, Error>;
