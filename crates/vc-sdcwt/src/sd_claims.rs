use vc_cbor::{to_canonical_bytes, CborValue};
use vc_core::{DigestAlgorithm, VcError, VcResult};
use vc_cose::HeaderMap;

use crate::disclosure::Disclosure;

/// Unprotected header key carrying the array of disclosed claims (SD-CWT
/// draft, analogous to `sd_claims` in the SD-JWT family).
pub const SD_CLAIMS_HEADER: i64 = 17;

/// Label used for the digest algorithm under which disclosures are hashed,
/// stored alongside `sd_claims` rather than as a COSE integer header since
/// no IANA value is assigned for it yet.
pub const SD_ALG_LABEL_KEY: &str = "sd_alg";

/// Write the `sd_claims` entry: an array of CBOR byte strings, one per
/// encoded disclosure.
pub fn set_sd_claims(header: &mut HeaderMap, disclosures: &[Disclosure]) {
    let array = CborValue::Array(disclosures.iter().map(|d| CborValue::Bytes(d.encode())).collect());
    header.insert_int(SD_CLAIMS_HEADER, array);
}

pub fn get_sd_claims(header: &HeaderMap) -> VcResult<Vec<Disclosure>> {
    let Some(value) = header.get_int(SD_CLAIMS_HEADER) else {
        return Ok(Vec::new());
    };
    let items = value
        .as_array()
        .ok_or_else(|| VcError::FormatInvalid("sd_claims must be a CBOR array".into()))?;
    items
        .iter()
        .map(|item| {
            let bytes = item
                .as_bytes()
                .ok_or_else(|| VcError::FormatInvalid("sd_claims entries must be byte strings".into()))?;
            Disclosure::decode(bytes)
        })
        .collect()
}

/// `sd_hash`: the digest of the canonical `sd_claims` array bytes, used for
/// key binding between a presented token and the disclosures it carries.
pub fn sd_hash(header: &HeaderMap, alg: DigestAlgorithm) -> Vec<u8> {
    let array = header
        .get_int(SD_CLAIMS_HEADER)
        .cloned()
        .unwrap_or_else(|| CborValue::Array(Vec::new()));
    alg.digest(&to_canonical_bytes(&array))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sd_claims_round_trips_through_header() {
        let disclosures = vec![
            Disclosure::property(vec![1], "given_name", CborValue::Text("Alice".into())),
            Disclosure::property(vec![2], "family_name", CborValue::Text("Doe".into())),
        ];
        let mut header = HeaderMap::new();
        set_sd_claims(&mut header, &disclosures);

        let bytes = header.encode();
        let decoded_header = HeaderMap::decode(&bytes).expect("decodes");
        let decoded = get_sd_claims(&decoded_header).expect("sd_claims present");
        assert_eq!(decoded, disclosures);
    }

    #[test]
    fn missing_sd_claims_is_empty_not_an_error() {
        let header = HeaderMap::new();
        assert!(get_sd_claims(&header).expect("ok").is_empty());
    }

    #[test]
    fn sd_hash_is_deterministic_and_sensitive_to_disclosures() {
        let mut a = HeaderMap::new();
        set_sd_claims(&mut a, &[Disclosure::property(vec![1], "x", CborValue::Int64(1))]);
        let mut b = HeaderMap::new();
        set_sd_claims(&mut b, &[Disclosure::property(vec![1], "x", CborValue::Int64(2))]);

        assert_eq!(sd_hash(&a, DigestAlgorithm::Sha256), sd_hash(&a, DigestAlgorithm::Sha256));
        assert_ne!(sd_hash(&a, DigestAlgorithm::Sha256), sd_hash(&b, DigestAlgorithm::Sha256));
    }
}
