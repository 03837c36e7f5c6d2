use vc_core::{Algorithm, MaterialSemantics, Purpose, VcResult};
use zeroize::Zeroizing;

use crate::pool::Pool;
use crate::registry::{self, Signature};

/// A private key bound to the operation function the registry resolves for
/// its `(algorithm, purpose, material)`. Unlike a raw `SigningFn`, `sign`
/// is safe to hold across an `.await` — the key owns its bytes rather than
/// borrowing a stack-bound view.
pub struct PrivateKey {
    algorithm: Algorithm,
    purpose: Purpose,
    material: MaterialSemantics,
    bytes: Vec<u8>,
}

impl PrivateKey {
    pub fn new(bytes: Vec<u8>, algorithm: Algorithm, purpose: Purpose, material: MaterialSemantics) -> Self {
        Self { algorithm, purpose, material, bytes }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn purpose(&self) -> Purpose {
        self.purpose
    }

    pub fn material_semantics(&self) -> MaterialSemantics {
        self.material
    }

    pub async fn sign(&self, data: &[u8], pool: &Pool) -> VcResult<Signature> {
        let f = registry::resolve_signing(self.algorithm, self.purpose, Some(self.material))?;
        let key_view = Zeroizing::new(self.bytes.clone());
        f(&key_view, data, pool, None).await
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm)
            .field("purpose", &self.purpose)
            .field("material", &self.material)
            .finish()
    }
}

/// A public key bound the same way as `PrivateKey`. Holds plain bytes —
/// public material carries no zeroization obligation.
#[derive(Debug, Clone)]
pub struct PublicKey {
    algorithm: Algorithm,
    purpose: Purpose,
    material: MaterialSemantics,
    bytes: Vec<u8>,
}

impl PublicKey {
    pub fn new(bytes: Vec<u8>, algorithm: Algorithm, purpose: Purpose, material: MaterialSemantics) -> Self {
        Self { algorithm, purpose, material, bytes }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub async fn verify(&self, data: &[u8], signature: &[u8]) -> VcResult<bool> {
        let f = registry::resolve_verification(self.algorithm, self.purpose, Some(self.material))?;
        f(data, signature, &self.bytes, None).await
    }
}

/// Given raw key bytes and a routing triple, produces the bound key the
/// rest of the substrate signs/verifies with. The factory itself holds no
/// state — it only resolves through the registry and wraps the result.
pub struct KeyFactory;

impl KeyFactory {
    pub fn private_key(
        bytes: Vec<u8>,
        algorithm: Algorithm,
        purpose: Purpose,
        material: MaterialSemantics,
    ) -> PrivateKey {
        PrivateKey::new(bytes, algorithm, purpose, material)
    }

    pub fn public_key(
        bytes: Vec<u8>,
        algorithm: Algorithm,
        purpose: Purpose,
        material: MaterialSemantics,
    ) -> PublicKey {
        PublicKey::new(bytes, algorithm, purpose, material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::software;

    #[tokio::test]
    async fn bound_keys_sign_and_verify_through_the_registry() {
        registry::RegistryBuilder::new()
            .register_signing(
                Algorithm::Es256,
                Purpose::Signing,
                Some(MaterialSemantics::Direct),
                software::es256_signing_fn(),
            )
            .register_verification(
                Algorithm::Es256,
                Purpose::Signing,
                Some(MaterialSemantics::Direct),
                software::es256_verification_fn(),
            )
            .install();

        let (sk_bytes, pk_bytes) = software::generate_es256_keypair();
        let private = KeyFactory::private_key(sk_bytes, Algorithm::Es256, Purpose::Signing, MaterialSemantics::Direct);
        let public = KeyFactory::public_key(pk_bytes, Algorithm::Es256, Purpose::Signing, MaterialSemantics::Direct);

        let pool = Pool;
        let sig = private.sign(b"hello sd-cwt", &pool).await.expect("sign");
        assert!(public.verify(b"hello sd-cwt", &sig.bytes).await.expect("verify"));
        assert!(!public.verify(b"tampered", &sig.bytes).await.expect("verify"));
    }
}
