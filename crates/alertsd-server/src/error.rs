//! The protocol-level error taxonomy surfaced to mailbox clients.
//! Decode/I/O/send failures are deliberately not part of this enum —
//! they're logged at the call site and the offending message is dropped,
//! never turned into a wire-visible error token.

use alertsd_model::CodecError;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("BAD_MESSAGE")]
    BadMessage,
    #[error("BAD_STATE")]
    BadState,
    #[error("NOT_FOUND")]
    NotFound,
    #[error("UNKNOWN_PROTOCOL")]
    UnknownProtocol,
}

impl ProtocolError {
    /// The exact token a client sees in an `ERROR <reason>` reply.
    pub fn wire_token(self) -> &'static str {
        match self {
            Self::BadMessage => "BAD_MESSAGE",
            Self::BadState => "BAD_STATE",
            Self::NotFound => "NOT_FOUND",
            Self::UnknownProtocol => "UNKNOWN_PROTOCOL",
        }
    }
}

impl From<CodecError> for ProtocolError {
    fn from(_: CodecError) -> Self {
        Self::BadMessage
    }
}
