//! vc-core
//!
//! Shared primitives used by every crate in the crypto substrate: the
//! structural error taxonomy, the injected time source, algorithm
//! identifiers, and the sensitive-buffer tagging vocabulary.
//!
//! Nothing in this crate touches key material or wire bytes — those live in
//! `vc-crypto` and `vc-cbor` respectively.

pub mod alg;
pub mod error;
pub mod tag;
pub mod time;

pub use alg::{Algorithm, DigestAlgorithm};
pub use error::{VcError, VcResult};
pub use tag::{MaterialSemantics, Purpose, Tag, TagKind};
pub use time::{FixedTimeProvider, SystemTimeProvider, TimeProvider};
