/// A decoded (or to-be-encoded) CBOR item, generic over every shape the
/// codec needs: CWT claim maps, COSE structures, SD-CWT disclosures.
///
/// `Map` keeps insertion order rather than sorting by key — canonical
/// ordering is a *writer* concern (`CborWriter` re-sorts on encode), so a
/// value read in Lax mode round-trips byte-for-byte if re-written in Lax
/// mode, and gets canonicalized only when the caller asks for it.
#[derive(Debug, Clone, PartialEq)]
pub enum CborValue {
    Null,
    Bool(bool),
    Int64(i64),
    Uint64(u64),
    F32(f32),
    F64(f64),
    Text(String),
    Bytes(Vec<u8>),
    Array(Vec<CborValue>),
    Map(Vec<(CborValue, CborValue)>),
    Tagged(u64, Box<CborValue>),
}

impl CborValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CborValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            CborValue::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[CborValue]> {
        match self {
            CborValue::Array(a) => Some(a.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(CborValue, CborValue)]> {
        match self {
            CborValue::Map(m) => Some(m.as_slice()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            CborValue::Int64(i) => Some(*i),
            CborValue::Uint64(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Look up a value in a `Map` by an integer key — the shape every CWT
    /// claim map and COSE header uses.
    pub fn map_get_int(&self, key: i64) -> Option<&CborValue> {
        self.as_map()?.iter().find_map(|(k, v)| {
            if k.as_int() == Some(key) {
                Some(v)
            } else {
                None
            }
        })
    }

    /// Look up a value in a `Map` by a text key.
    pub fn map_get_text(&self, key: &str) -> Option<&CborValue> {
        self.as_map()?.iter().find_map(|(k, v)| {
            if k.as_text() == Some(key) {
                Some(v)
            } else {
                None
            }
        })
    }
}

impl From<i64> for CborValue {
    fn from(v: i64) -> Self {
        CborValue::Int64(v)
    }
}

impl From<&str> for CborValue {
    fn from(v: &str) -> Self {
        CborValue::Text(v.to_string())
    }
}

impl From<String> for CborValue {
    fn from(v: String) -> Self {
        CborValue::Text(v)
    }
}

impl From<Vec<u8>> for CborValue {
    fn from(v: Vec<u8>) -> Self {
        CborValue::Bytes(v)
    }
}

impl From<&[u8]> for CborValue {
    fn from(v: &[u8]) -> Self {
        CborValue::Bytes(v.to_vec())
    }
}

impl From<bool> for CborValue {
    fn from(v: bool) -> Self {
        CborValue::Bool(v)
    }
}
