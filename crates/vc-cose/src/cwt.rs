use vc_cbor::{to_canonical_bytes, CborReader, CborValue, ConformanceMode};
use vc_core::{VcError, VcResult};

/// Integer claim keys from RFC 8392 §3.1.
pub const CLAIM_ISS: i64 = 1;
pub const CLAIM_SUB: i64 = 2;
pub const CLAIM_AUD: i64 = 3;
pub const CLAIM_EXP: i64 = 4;
pub const CLAIM_NBF: i64 = 5;
pub const CLAIM_IAT: i64 = 6;
pub const CLAIM_CTI: i64 = 7;

/// Builds a CWT claims map. Extension claims (integer or text keyed) are
/// appended the same way as the registered ones — canonical ascending key
/// order is a write-time concern handled by `CborWriter`, not something
/// this builder has to track.
#[derive(Debug, Clone, Default)]
pub struct ClaimsBuilder {
    entries: Vec<(CborValue, CborValue)>,
}

impl ClaimsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(mut self, key: i64, value: impl Into<CborValue>) -> Self {
        self.entries.retain(|(k, _)| k.as_int() != Some(key));
        self.entries.push((CborValue::Int64(key), value.into()));
        self
    }

    pub fn extension(mut self, key: impl Into<CborValue>, value: impl Into<CborValue>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    pub fn iss(self, iss: impl Into<String>) -> Self {
        self.claim(CLAIM_ISS, iss.into())
    }

    pub fn sub(self, sub: impl Into<String>) -> Self {
        self.claim(CLAIM_SUB, sub.into())
    }

    pub fn aud(self, aud: impl Into<String>) -> Self {
        self.claim(CLAIM_AUD, aud.into())
    }

    pub fn exp(self, exp: i64) -> Self {
        self.claim(CLAIM_EXP, exp)
    }

    pub fn nbf(self, nbf: i64) -> Self {
        self.claim(CLAIM_NBF, nbf)
    }

    pub fn iat(self, iat: i64) -> Self {
        self.claim(CLAIM_IAT, iat)
    }

    pub fn cti(self, cti: Vec<u8>) -> Self {
        self.claim(CLAIM_CTI, cti)
    }

    pub fn build(self) -> CborValue {
        CborValue::Map(self.entries)
    }
}

/// Encode a claims map to canonical CBOR. Standard and extension claims
/// alike come out in ascending key order because `CborWriter` sorts every
/// map it writes that way.
pub fn encode_claims(claims: &CborValue) -> Vec<u8> {
    to_canonical_bytes(claims)
}

pub fn decode_claims(bytes: &[u8]) -> VcResult<CborValue> {
    let value = CborReader::read_single_value(bytes, ConformanceMode::Canonical)?;
    match value {
        CborValue::Map(_) => Ok(value),
        _ => Err(VcError::FormatInvalid("CWT claims must be a CBOR map".into())),
    }
}
