use vc_cbor::{to_canonical_bytes, CborReader, CborValue, ConformanceMode};
use vc_core::{DigestAlgorithm, VcError, VcResult};

/// One SD-CWT disclosure. `[salt, claim_name, claim_value]` discloses an
/// object property; `[salt, claim_value]` (no `name`) discloses an array
/// element.
#[derive(Debug, Clone, PartialEq)]
pub struct Disclosure {
    pub salt: Vec<u8>,
    pub name: Option<String>,
    pub value: CborValue,
}

impl Disclosure {
    pub fn property(salt: Vec<u8>, name: impl Into<String>, value: CborValue) -> Self {
        Self { salt, name: Some(name.into()), value }
    }

    pub fn array_element(salt: Vec<u8>, value: CborValue) -> Self {
        Self { salt, name: None, value }
    }

    pub fn encode(&self) -> Vec<u8> {
        let array = match &self.name {
            Some(name) => CborValue::Array(vec![
                CborValue::Bytes(self.salt.clone()),
                CborValue::Text(name.clone()),
                self.value.clone(),
            ]),
            None => CborValue::Array(vec![CborValue::Bytes(self.salt.clone()), self.value.clone()]),
        };
        to_canonical_bytes(&array)
    }

    pub fn decode(bytes: &[u8]) -> VcResult<Self> {
        let value = CborReader::read_single_value(bytes, ConformanceMode::Canonical)?;
        let CborValue::Array(mut items) = value else {
            return Err(VcError::FormatInvalid("disclosure must be a CBOR array".into()));
        };
        match items.len() {
            3 => {
                let value = items.pop().unwrap();
                let name = items.pop().unwrap();
                let salt = items.pop().unwrap();
                let salt = salt
                    .as_bytes()
                    .ok_or_else(|| VcError::FormatInvalid("disclosure salt must be a byte string".into()))?
                    .to_vec();
                let name = name
                    .as_text()
                    .ok_or_else(|| VcError::FormatInvalid("disclosure name must be text".into()))?
                    .to_string();
                Ok(Self { salt, name: Some(name), value })
            }
            2 => {
                let value = items.pop().unwrap();
                let salt = items.pop().unwrap();
                let salt = salt
                    .as_bytes()
                    .ok_or_else(|| VcError::FormatInvalid("disclosure salt must be a byte string".into()))?
                    .to_vec();
                Ok(Self { salt, name: None, value })
            }
            n => Err(VcError::FormatInvalid(format!(
                "disclosure array must have 2 or 3 elements, got {n}"
            ))),
        }
    }

    /// `H(canonical_cbor(disclosure_bytes))`.
    pub fn digest(&self, alg: DigestAlgorithm) -> Vec<u8> {
        alg.digest(&self.encode())
    }

    pub fn digest_base64url(&self, alg: DigestAlgorithm) -> String {
        base64_url_encode(&self.digest(alg))
    }
}

pub fn base64_url_encode(bytes: &[u8]) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn base64_url_decode(s: &str) -> VcResult<Vec<u8>> {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|e| VcError::FormatInvalid(format!("invalid base64url: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_disclosure_round_trips() {
        let d = Disclosure::property(vec![1, 2, 3], "given_name", CborValue::Text("Alice".into()));
        let bytes = d.encode();
        assert_eq!(Disclosure::decode(&bytes).expect("decodes"), d);
    }

    #[test]
    fn array_element_disclosure_round_trips() {
        let d = Disclosure::array_element(vec![9, 9], CborValue::Int64(42));
        let bytes = d.encode();
        let decoded = Disclosure::decode(&bytes).expect("decodes");
        assert_eq!(decoded, d);
        assert!(decoded.name.is_none());
    }

    #[test]
    fn digest_is_deterministic() {
        let d = Disclosure::property(vec![4, 5, 6], "email", CborValue::Text("a@example.com".into()));
        assert_eq!(d.digest(DigestAlgorithm::Sha256), d.digest(DigestAlgorithm::Sha256));
        assert_ne!(d.digest(DigestAlgorithm::Sha256), d.digest(DigestAlgorithm::Sha384));
    }

    #[test]
    fn wrong_array_arity_is_rejected() {
        let bytes = to_canonical_bytes(&CborValue::Array(vec![CborValue::Bytes(vec![1])]));
        assert!(matches!(Disclosure::decode(&bytes), Err(VcError::FormatInvalid(_))));
    }
}
