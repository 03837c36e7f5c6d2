//! vc-crypto
//!
//! The sensitive buffer pool, the process-wide crypto function registry,
//! and the bound-key factory that sit between wire codecs (`vc-cbor`,
//! `vc-cose`, `vc-sdcwt`) and whatever actually holds key material
//! (software, a TPM, an HSM).

pub mod keys;
pub mod pool;
pub mod registry;
pub mod software;

pub use keys::{KeyFactory, PrivateKey, PublicKey};
pub use pool::{Pool, SensitiveBuffer};
pub use registry::{
    is_initialized, resolve_signing, resolve_verification, Context, RegistryBuilder, Signature,
    SigningFn, VerificationFn,
};
