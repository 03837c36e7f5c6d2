//! vc-cbor
//!
//! A hand-rolled canonical/lax CBOR reader and writer. This codec is
//! deliberately not built on a general-purpose CBOR crate: canonical map
//! key ordering and definite-length enforcement are data-dependent
//! decisions the COSE/CWT/SD-CWT layers need tight control over, so the
//! wire format is owned here rather than delegated.

pub mod error;
pub mod reader;
pub mod value;
pub mod writer;

pub use error::CborError;
pub use reader::{CborReader, ConformanceMode};
pub use value::CborValue;
pub use writer::{to_canonical_bytes, CborWriter};
