use vc_cbor::{to_canonical_bytes, CborReader, CborValue, ConformanceMode};
use vc_core::{Algorithm, VcError, VcResult};

/// IANA COSE header parameter labels this substrate reads or writes.
pub const HEADER_ALG: i64 = 1;
pub const HEADER_KID: i64 = 4;

/// A COSE header map — protected or unprotected. Backed directly by
/// `CborValue::Map` rather than a bespoke struct, since `vc-sdcwt` extends
/// it with its own integer-keyed entries (`sd_claims`, `sd_alg`) and a
/// second map type would just have to be kept in sync with this one.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderMap(pub CborValue);

impl HeaderMap {
    pub fn new() -> Self {
        Self(CborValue::Map(Vec::new()))
    }

    pub fn with_algorithm(alg: Algorithm) -> Self {
        let mut header = Self::new();
        header.insert_int(HEADER_ALG, CborValue::Int64(alg.cose_value()));
        header
    }

    pub fn insert_int(&mut self, key: i64, value: CborValue) {
        let CborValue::Map(entries) = &mut self.0 else {
            unreachable!("HeaderMap always wraps a CborValue::Map")
        };
        entries.retain(|(k, _)| k.as_int() != Some(key));
        entries.push((CborValue::Int64(key), value));
    }

    pub fn get_int(&self, key: i64) -> Option<&CborValue> {
        self.0.map_get_int(key)
    }

    pub fn algorithm(&self) -> VcResult<Algorithm> {
        let value = self
            .get_int(HEADER_ALG)
            .ok_or_else(|| VcError::FormatInvalid("protected header missing alg (1)".into()))?;
        let code = value
            .as_int()
            .ok_or_else(|| VcError::FormatInvalid("alg header value is not an integer".into()))?;
        Algorithm::from_cose_value(code)
            .ok_or_else(|| VcError::Unsupported(format!("unsupported COSE alg {code}")))
    }

    pub fn encode(&self) -> Vec<u8> {
        to_canonical_bytes(&self.0)
    }

    /// An empty protected header encodes to a zero-length byte string
    /// (RFC 9052 §3: "empty_or_serialized_map"), not to the bytes of an
    /// empty CBOR map — decode both shapes back to an empty header.
    pub fn decode(bytes: &[u8]) -> VcResult<Self> {
        if bytes.is_empty() {
            return Ok(Self::new());
        }
        let value = CborReader::read_single_value(bytes, ConformanceMode::Canonical)?;
        match value {
            CborValue::Map(_) => Ok(Self(value)),
            _ => Err(VcError::FormatInvalid("COSE header is not a CBOR map".into())),
        }
    }
}

impl Default for HeaderMap {
    fn default() -> Self {
        Self::new()
    }
}
