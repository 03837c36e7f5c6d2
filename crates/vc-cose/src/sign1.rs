use vc_cbor::{to_canonical_bytes, CborReader, CborValue, ConformanceMode};
use vc_core::{Algorithm, VcError, VcResult};
use vc_crypto::{Pool, PrivateKey, PublicKey};

use crate::header::HeaderMap;
use crate::sig_structure::sig_structure_bytes;

/// CBOR tag for `COSE_Sign1` (RFC 9052 §2).
pub const COSE_SIGN1_TAG: u64 = 18;

/// `COSE_Sign1 = tag(18) [protected, unprotected, payload, signature]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoseSign1 {
    pub protected: Vec<u8>,
    pub unprotected: HeaderMap,
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

impl CoseSign1 {
    /// Build and sign a `COSE_Sign1` over `payload` using `key`'s bound
    /// signing function.
    pub async fn sign(
        payload: Vec<u8>,
        protected: HeaderMap,
        unprotected: HeaderMap,
        key: &PrivateKey,
        pool: &Pool,
    ) -> VcResult<Self> {
        let protected_bytes = protected.encode();
        let tbs = sig_structure_bytes(&protected_bytes, &[], &payload);
        let signature = key.sign(&tbs, pool).await?;
        Ok(Self {
            protected: protected_bytes,
            unprotected,
            payload,
            signature: signature.bytes,
        })
    }

    /// Verify against `key`. A `false` result means the signature did not
    /// check out; it is not an error.
    pub async fn verify(&self, key: &PublicKey) -> VcResult<bool> {
        let tbs = sig_structure_bytes(&self.protected, &[], &self.payload);
        key.verify(&tbs, &self.signature).await
    }

    pub fn algorithm(&self) -> VcResult<Algorithm> {
        HeaderMap::decode(&self.protected)?.algorithm()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let array = CborValue::Array(vec![
            CborValue::Bytes(self.protected.clone()),
            self.unprotected.0.clone(),
            CborValue::Bytes(self.payload.clone()),
            CborValue::Bytes(self.signature.clone()),
        ]);
        to_canonical_bytes(&CborValue::Tagged(COSE_SIGN1_TAG, Box::new(array)))
    }

    pub fn from_bytes(bytes: &[u8]) -> VcResult<Self> {
        let value = CborReader::read_single_value(bytes, ConformanceMode::Canonical)?;
        let CborValue::Tagged(tag, inner) = value else {
            return Err(VcError::CborContent("COSE_Sign1 must be wrapped in CBOR tag 18".into()));
        };
        if tag != COSE_SIGN1_TAG {
            return Err(VcError::CborContent(format!(
                "expected COSE_Sign1 tag {COSE_SIGN1_TAG}, got {tag}"
            )));
        }
        let CborValue::Array(items) = *inner else {
            return Err(VcError::FormatInvalid("COSE_Sign1 body must be a CBOR array".into()));
        };
        let [protected, unprotected, payload, signature] =
            <[CborValue; 4]>::try_from(items).map_err(|items: Vec<CborValue>| {
                VcError::FormatInvalid(format!(
                    "COSE_Sign1 array must have exactly 4 elements, got {}",
                    items.len()
                ))
            })?;

        let protected = protected
            .as_bytes()
            .ok_or_else(|| VcError::FormatInvalid("protected header must be a byte string".into()))?
            .to_vec();
        let payload = payload
            .as_bytes()
            .ok_or_else(|| VcError::FormatInvalid("payload must be a byte string".into()))?
            .to_vec();
        let signature = signature
            .as_bytes()
            .ok_or_else(|| VcError::FormatInvalid("signature must be a byte string".into()))?
            .to_vec();
        match &unprotected {
            CborValue::Map(_) => {}
            _ => return Err(VcError::FormatInvalid("unprotected header must be a CBOR map".into())),
        }

        Ok(Self {
            protected,
            unprotected: HeaderMap(unprotected),
            payload,
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc_core::{MaterialSemantics, Purpose};
    use vc_crypto::{software, KeyFactory};

    fn install_registry() {
        if !vc_crypto::is_initialized() {
            software::default_registry_builder().install();
        }
    }

    #[tokio::test]
    async fn sign_verify_round_trip() {
        install_registry();
        let (sk, pk) = software::generate_es256_keypair();
        let private = KeyFactory::private_key(sk, Algorithm::Es256, Purpose::Signing, MaterialSemantics::Direct);
        let public = KeyFactory::public_key(pk, Algorithm::Es256, Purpose::Signing, MaterialSemantics::Direct);
        let pool = Pool;

        let protected = HeaderMap::with_algorithm(Algorithm::Es256);
        let message = CoseSign1::sign(b"sd-cwt payload".to_vec(), protected, HeaderMap::new(), &private, &pool)
            .await
            .expect("sign");

        assert!(message.verify(&public).await.expect("verify"));
        assert_eq!(message.algorithm().expect("alg"), Algorithm::Es256);
    }

    #[tokio::test]
    async fn wire_bytes_round_trip_and_enforce_tag_18() {
        install_registry();
        let (sk, pk) = software::generate_es256_keypair();
        let private = KeyFactory::private_key(sk, Algorithm::Es256, Purpose::Signing, MaterialSemantics::Direct);
        let public = KeyFactory::public_key(pk, Algorithm::Es256, Purpose::Signing, MaterialSemantics::Direct);
        let pool = Pool;

        let protected = HeaderMap::with_algorithm(Algorithm::Es256);
        let message = CoseSign1::sign(b"hello".to_vec(), protected, HeaderMap::new(), &private, &pool)
            .await
            .expect("sign");

        let bytes = message.to_bytes();
        assert_eq!(bytes[0], 0xd2); // tag(18) encodes as 0xd2 (major 6, additional 18)

        let decoded = CoseSign1::from_bytes(&bytes).expect("decodes");
        assert_eq!(decoded, message);
        assert!(decoded.verify(&public).await.expect("verify"));
    }

    #[test]
    fn wrong_tag_is_rejected() {
        let array = CborValue::Array(vec![
            CborValue::Bytes(vec![]),
            CborValue::Map(vec![]),
            CborValue::Bytes(vec![]),
            CborValue::Bytes(vec![]),
        ]);
        let bytes = to_canonical_bytes(&CborValue::Tagged(17, Box::new(array)));
        assert!(matches!(CoseSign1::from_bytes(&bytes), Err(VcError::CborContent(_))));
    }
}
