//! Default software signing backend, registered under
//! `MaterialSemantics::Direct`. Backs `Algorithm::Es256` with RustCrypto's
//! `p256`; a TPM-backed or HSM-backed backend registers under a different
//! `MaterialSemantics` qualifier rather than overriding this one.

use std::sync::Arc;

use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature as P256Signature, SigningKey, VerifyingKey};
use vc_core::{Algorithm, VcError};

use crate::registry::{BoxFuture, Context, Signature, SigningFn, VerificationFn};

pub fn es256_signing_fn() -> SigningFn {
    Arc::new(move |private_key_bytes: &[u8], data: &[u8], _pool, _context: Option<&Context>| {
        let private_key_bytes = private_key_bytes.to_vec();
        let data = data.to_vec();
        Box::pin(async move {
            let signing_key = SigningKey::from_slice(&private_key_bytes)
                .map_err(|e| VcError::FormatInvalid(format!("p256 private key: {e}")))?;
            let signature: P256Signature = signing_key.sign(&data);
            Ok(Signature {
                algorithm: Algorithm::Es256,
                bytes: signature.to_bytes().to_vec(),
            })
        }) as BoxFuture<'static, _>
    })
}

pub fn es256_verification_fn() -> VerificationFn {
    Arc::new(
        move |data: &[u8], signature: &[u8], public_key_bytes: &[u8], _context: Option<&Context>| {
            let data = data.to_vec();
            let signature = signature.to_vec();
            let public_key_bytes = public_key_bytes.to_vec();
            Box::pin(async move {
                let verifying_key = VerifyingKey::from_sec1_bytes(&public_key_bytes)
                    .map_err(|e| VcError::FormatInvalid(format!("p256 public key: {e}")))?;
                let sig = match P256Signature::from_slice(&signature) {
                    Ok(sig) => sig,
                    Err(_) => return Ok(false),
                };
                Ok(verifying_key.verify(&data, &sig).is_ok())
            }) as BoxFuture<'static, _>
        },
    )
}

/// Generate a fresh P-256 keypair as `(private scalar bytes, SEC1
/// uncompressed public point bytes)` — the byte shapes `PrivateKey`/
/// `PublicKey` expect.
pub fn generate_es256_keypair() -> (Vec<u8>, Vec<u8>) {
    let signing_key = SigningKey::random(&mut rand::rngs::OsRng);
    let private_bytes = signing_key.to_bytes().to_vec();
    let verifying_key = VerifyingKey::from(&signing_key);
    let public_bytes = verifying_key.to_encoded_point(false).as_bytes().to_vec();
    (private_bytes, public_bytes)
}

/// Installs the default software registry: ES256 sign/verify under
/// `MaterialSemantics::Direct`. Callers that also need TPM-backed or
/// HSM-backed entries should extend this builder rather than calling
/// `install()` twice.
pub fn default_registry_builder() -> crate::registry::RegistryBuilder {
    crate::registry::RegistryBuilder::new()
        .register_signing(
            Algorithm::Es256,
            vc_core::Purpose::Signing,
            Some(vc_core::MaterialSemantics::Direct),
            es256_signing_fn(),
        )
        .register_verification(
            Algorithm::Es256,
            vc_core::Purpose::Signing,
            Some(vc_core::MaterialSemantics::Direct),
            es256_verification_fn(),
        )
}
