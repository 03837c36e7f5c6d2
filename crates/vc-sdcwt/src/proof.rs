use std::collections::BTreeMap;

use vc_cbor::{to_canonical_bytes, CborReader, CborValue, ConformanceMode};
use vc_core::{VcError, VcResult};

use crate::disclosure::{base64_url_decode, base64_url_encode};

/// Magic bytes prefixing a base ecdsa-sd-2023 proof, ahead of its canonical
/// CBOR body.
pub const BASE_PROOF_MAGIC: [u8; 3] = [0xd9, 0x5d, 0x00];
/// Magic bytes prefixing a derived (selectively-disclosed) proof.
pub const DERIVED_PROOF_MAGIC: [u8; 3] = [0xd9, 0x5d, 0x01];

/// The issuer-side proof: one signature over every statement plus the
/// per-statement HMAC key a holder needs to derive presentations from it.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseProof {
    pub base_signature: Vec<u8>,
    pub multikey_public_key: Vec<u8>,
    pub hmac_key: Vec<u8>,
    pub per_statement_signatures: Vec<Vec<u8>>,
    pub mandatory_pointers: Vec<String>,
}

impl BaseProof {
    pub fn to_bytes(&self) -> Vec<u8> {
        let array = CborValue::Array(vec![
            CborValue::Bytes(self.base_signature.clone()),
            CborValue::Bytes(self.multikey_public_key.clone()),
            CborValue::Bytes(self.hmac_key.clone()),
            CborValue::Array(self.per_statement_signatures.iter().cloned().map(CborValue::Bytes).collect()),
            CborValue::Array(self.mandatory_pointers.iter().cloned().map(CborValue::Text).collect()),
        ]);
        let mut out = BASE_PROOF_MAGIC.to_vec();
        out.extend_from_slice(&to_canonical_bytes(&array));
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> VcResult<Self> {
        let body = strip_magic(bytes, &BASE_PROOF_MAGIC)?;
        let value = CborReader::read_single_value(body, ConformanceMode::Canonical)?;
        let CborValue::Array(items) = value else {
            return Err(VcError::FormatInvalid("base proof body must be a CBOR array".into()));
        };
        let [base_signature, multikey_public_key, hmac_key, signatures, pointers] =
            <[CborValue; 5]>::try_from(items).map_err(|items: Vec<CborValue>| {
                VcError::FormatInvalid(format!("base proof array must have 5 elements, got {}", items.len()))
            })?;
        Ok(Self {
            base_signature: expect_bytes(base_signature, "base_signature")?,
            multikey_public_key: expect_bytes(multikey_public_key, "multikey_public_key")?,
            hmac_key: expect_bytes(hmac_key, "hmac_key")?,
            per_statement_signatures: expect_byte_array(signatures, "per_statement_signatures")?,
            mandatory_pointers: expect_text_array(pointers, "mandatory_pointers")?,
        })
    }

    pub fn to_multibase(&self) -> String {
        multibase_encode(&self.to_bytes())
    }

    pub fn from_multibase(s: &str) -> VcResult<Self> {
        Self::from_bytes(&multibase_decode(s)?)
    }
}

/// The holder-side derived proof: a presentation that reveals only a
/// subset of statements, carrying just the signatures and HMAC labels that
/// subset needs.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedProof {
    pub base_signature: Vec<u8>,
    pub multikey_public_key: Vec<u8>,
    pub signatures: Vec<Vec<u8>>,
    pub label_map: BTreeMap<u64, Vec<u8>>,
    pub mandatory_indexes: Vec<u64>,
}

impl DerivedProof {
    pub fn to_bytes(&self) -> Vec<u8> {
        let label_map_value = CborValue::Map(
            self.label_map
                .iter()
                .map(|(n, hmac)| (CborValue::Uint64(*n), CborValue::Bytes(hmac.clone())))
                .collect(),
        );
        let array = CborValue::Array(vec![
            CborValue::Bytes(self.base_signature.clone()),
            CborValue::Bytes(self.multikey_public_key.clone()),
            CborValue::Array(self.signatures.iter().cloned().map(CborValue::Bytes).collect()),
            label_map_value,
            CborValue::Array(self.mandatory_indexes.iter().map(|i| CborValue::Uint64(*i)).collect()),
        ]);
        let mut out = DERIVED_PROOF_MAGIC.to_vec();
        out.extend_from_slice(&to_canonical_bytes(&array));
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> VcResult<Self> {
        let body = strip_magic(bytes, &DERIVED_PROOF_MAGIC)?;
        let value = CborReader::read_single_value(body, ConformanceMode::Canonical)?;
        let CborValue::Array(items) = value else {
            return Err(VcError::FormatInvalid("derived proof body must be a CBOR array".into()));
        };
        let [base_signature, multikey_public_key, signatures, label_map, indexes] =
            <[CborValue; 5]>::try_from(items).map_err(|items: Vec<CborValue>| {
                VcError::FormatInvalid(format!("derived proof array must have 5 elements, got {}", items.len()))
            })?;
        Ok(Self {
            base_signature: expect_bytes(base_signature, "base_signature")?,
            multikey_public_key: expect_bytes(multikey_public_key, "multikey_public_key")?,
            signatures: expect_byte_array(signatures, "signatures")?,
            label_map: expect_uint_keyed_bytes_map(label_map)?,
            mandatory_indexes: expect_uint_array(indexes, "mandatory_indexes")?,
        })
    }

    pub fn to_multibase(&self) -> String {
        multibase_encode(&self.to_bytes())
    }

    pub fn from_multibase(s: &str) -> VcResult<Self> {
        Self::from_bytes(&multibase_decode(s)?)
    }
}

/// Compress `"c14nN" -> "u<base64url(hmac)>"` label entries (the form they
/// take during derivation) into the wire form `{N: hmac_bytes}`.
pub fn compress_label_map(entries: &BTreeMap<String, String>) -> VcResult<BTreeMap<u64, Vec<u8>>> {
    entries
        .iter()
        .map(|(label, value)| {
            let n = label
                .strip_prefix("c14n")
                .and_then(|s| s.parse::<u64>().ok())
                .ok_or_else(|| VcError::FormatInvalid(format!("malformed label {label}")))?;
            let hmac_b64 = value
                .strip_prefix('u')
                .ok_or_else(|| VcError::FormatInvalid(format!("label value {value} missing multibase prefix")))?;
            let hmac = base64_url_decode(hmac_b64)?;
            Ok((n, hmac))
        })
        .collect()
}

/// Inverse of `compress_label_map`.
pub fn decompress_label_map(map: &BTreeMap<u64, Vec<u8>>) -> BTreeMap<String, String> {
    map.iter()
        .map(|(n, hmac)| (format!("c14n{n}"), format!("u{}", base64_url_encode(hmac))))
        .collect()
}

fn multibase_encode(bytes: &[u8]) -> String {
    format!("u{}", base64_url_encode(bytes))
}

fn multibase_decode(s: &str) -> VcResult<Vec<u8>> {
    let rest = s
        .strip_prefix('u')
        .ok_or_else(|| VcError::FormatInvalid("missing multibase 'u' (base64url) prefix".into()))?;
    base64_url_decode(rest)
}

fn strip_magic<'a>(bytes: &'a [u8], magic: &[u8; 3]) -> VcResult<&'a [u8]> {
    if bytes.len() < 3 || &bytes[..3] != magic {
        return Err(VcError::FormatInvalid(format!("expected proof magic {magic:02x?}")));
    }
    Ok(&bytes[3..])
}

fn expect_bytes(value: CborValue, field: &str) -> VcResult<Vec<u8>> {
    value
        .as_bytes()
        .map(|b| b.to_vec())
        .ok_or_else(|| VcError::FormatInvalid(format!("{field} must be a byte string")))
}

fn expect_byte_array(value: CborValue, field: &str) -> VcResult<Vec<Vec<u8>>> {
    let CborValue::Array(items) = value else {
        return Err(VcError::FormatInvalid(format!("{field} must be an array")));
    };
    items.into_iter().map(|v| expect_bytes(v, field)).collect()
}

fn expect_text_array(value: CborValue, field: &str) -> VcResult<Vec<String>> {
    let CborValue::Array(items) = value else {
        return Err(VcError::FormatInvalid(format!("{field} must be an array")));
    };
    items
        .into_iter()
        .map(|v| {
            v.as_text()
                .map(|s| s.to_string())
                .ok_or_else(|| VcError::FormatInvalid(format!("{field} entries must be text")))
        })
        .collect()
}

fn expect_uint_array(value: CborValue, field: &str) -> VcResult<Vec<u64>> {
    let CborValue::Array(items) = value else {
        return Err(VcError::FormatInvalid(format!("{field} must be an array")));
    };
    items
        .into_iter()
        .map(|v| match v {
            CborValue::Int64(i) if i >= 0 => Ok(i as u64),
            CborValue::Uint64(u) => Ok(u),
            _ => Err(VcError::FormatInvalid(format!("{field} entries must be non-negative integers"))),
        })
        .collect()
}

fn expect_uint_keyed_bytes_map(value: CborValue) -> VcResult<BTreeMap<u64, Vec<u8>>> {
    let CborValue::Map(entries) = value else {
        return Err(VcError::FormatInvalid("label_map must be a CBOR map".into()));
    };
    entries
        .into_iter()
        .map(|(k, v)| {
            let n = match k {
                CborValue::Int64(i) if i >= 0 => i as u64,
                CborValue::Uint64(u) => u,
                _ => return Err(VcError::FormatInvalid("label_map keys must be non-negative integers".into())),
            };
            let bytes = expect_bytes(v, "label_map value")?;
            Ok((n, bytes))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_base_proof() -> BaseProof {
        BaseProof {
            base_signature: vec![1; 64],
            multikey_public_key: vec![2; 33],
            hmac_key: vec![3; 32],
            per_statement_signatures: vec![vec![4; 64], vec![5; 64]],
            mandatory_pointers: vec!["/iss".into(), "/exp".into()],
        }
    }

    fn sample_derived_proof() -> DerivedProof {
        let mut label_map = BTreeMap::new();
        label_map.insert(0, vec![6; 32]);
        label_map.insert(1, vec![7; 32]);
        DerivedProof {
            base_signature: vec![1; 64],
            multikey_public_key: vec![2; 33],
            signatures: vec![vec![4; 64]],
            label_map,
            mandatory_indexes: vec![0, 2],
        }
    }

    #[test]
    fn base_proof_round_trips_through_bytes() {
        let proof = sample_base_proof();
        let bytes = proof.to_bytes();
        assert_eq!(&bytes[..3], &BASE_PROOF_MAGIC);
        assert_eq!(BaseProof::from_bytes(&bytes).expect("decodes"), proof);
    }

    #[test]
    fn derived_proof_round_trips_through_multibase() {
        let proof = sample_derived_proof();
        let encoded = proof.to_multibase();
        assert!(encoded.starts_with('u'));
        assert_eq!(DerivedProof::from_multibase(&encoded).expect("decodes"), proof);
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut bytes = sample_base_proof().to_bytes();
        bytes[2] = 0xff;
        assert!(matches!(BaseProof::from_bytes(&bytes), Err(VcError::FormatInvalid(_))));
    }

    #[test]
    fn base_bytes_are_rejected_by_derived_decoder() {
        let bytes = sample_base_proof().to_bytes();
        assert!(DerivedProof::from_bytes(&bytes).is_err());
    }

    #[test]
    fn label_map_compression_round_trips() {
        let mut expanded = BTreeMap::new();
        expanded.insert("c14n0".to_string(), format!("u{}", base64_url_encode(&[1, 2, 3])));
        expanded.insert("c14n5".to_string(), format!("u{}", base64_url_encode(&[4, 5, 6])));

        let compressed = compress_label_map(&expanded).expect("compresses");
        assert_eq!(compressed.get(&0), Some(&vec![1, 2, 3]));
        assert_eq!(compressed.get(&5), Some(&vec![4, 5, 6]));
        assert_eq!(decompress_label_map(&compressed), expanded);
    }
}
