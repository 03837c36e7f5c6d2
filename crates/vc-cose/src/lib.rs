//! vc-cose
//!
//! `COSE_Sign1` and CWT claim-map codecs built directly on `vc-cbor`'s
//! canonical writer, with signing/verification delegated to `vc-crypto`'s
//! bound keys.

pub mod cwt;
pub mod header;
pub mod sig_structure;
pub mod sign1;

pub use cwt::{decode_claims, encode_claims, ClaimsBuilder};
pub use header::HeaderMap;
pub use sig_structure::sig_structure_bytes;
pub use sign1::{CoseSign1, COSE_SIGN1_TAG};
