use thiserror::Error;
use vc_core::VcError;

/// Failure modes specific to the CBOR reader/writer, before they are folded
/// into the substrate-wide `VcError::CborContent`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CborError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("malformed header: {0}")]
    BadHeader(String),

    #[error("indefinite length item not permitted in this conformance mode")]
    IndefiniteLengthDisallowed,

    #[error("indefinite length item missing its break byte")]
    UnterminatedIndefiniteLength,

    #[error("duplicate map key under canonical conformance")]
    DuplicateKey,

    #[error("invalid UTF-8 text string: {0}")]
    InvalidUtf8(String),

    #[error("trailing bytes after the top-level value")]
    TrailingBytes,

    #[error("unsupported CBOR item: {0}")]
    Unsupported(String),
}

impl From<CborError> for VcError {
    fn from(e: CborError) -> Self {
        VcError::CborContent(e.to_string())
    }
}
