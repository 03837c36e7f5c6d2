use thiserror::Error;

/// Structural error taxonomy shared by every crate in the crypto substrate.
///
/// Cryptographic failures (a bad signature, a verification mismatch) are
/// never represented here — they are `bool` results. `VcError` is reserved
/// for malformed input, missing configuration, and backend failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VcError {
    /// Malformed CBOR: bad header, duplicate key under canonical mode,
    /// indefinite length when disallowed, unexpected item, length mismatch.
    #[error("malformed CBOR: {0}")]
    CborContent(String),

    /// Wrong magic bytes, wrong array arity, missing multibase prefix.
    #[error("invalid wire format: {0}")]
    FormatInvalid(String),

    /// Algorithm not registered, unsupported CBOR state, unsupported Rust
    /// type on write.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The crypto function registry was used before `initialize`.
    #[error("crypto function registry not initialized")]
    NotInitialized,

    /// A rule-level or backend-level failure, converted into a synthetic
    /// claim by the assessment pipeline rather than propagated.
    #[error("fault: {0}")]
    Fault(String),
}

pub type VcResult<T> = Result<T, VcError>;
