use crate::value::CborValue;

/// `CborWriter` conformance. `Canonical` sorts map keys by their encoded
/// byte length (then lexicographically) and always uses the shortest
/// integer encoding — both are unconditional in this writer, so there is
/// no `Lax` writer mode: a reader may be lax about what it accepts, but
/// nothing in this substrate ever *writes* non-canonical bytes.
pub struct CborWriter {
    buf: Vec<u8>,
}

impl CborWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_value(&mut self, value: &CborValue) {
        match value {
            CborValue::Null => self.write_simple(22),
            CborValue::Bool(false) => self.write_simple(20),
            CborValue::Bool(true) => self.write_simple(21),
            CborValue::Int64(i) if *i >= 0 => self.write_head(0, *i as u64),
            CborValue::Int64(i) => self.write_head(1, (-1 - *i) as u64),
            CborValue::Uint64(u) => self.write_head(0, *u),
            CborValue::F32(f) => {
                self.buf.push((7 << 5) | 26);
                self.buf.extend_from_slice(&f.to_bits().to_be_bytes());
            }
            CborValue::F64(f) => {
                self.buf.push((7 << 5) | 27);
                self.buf.extend_from_slice(&f.to_bits().to_be_bytes());
            }
            CborValue::Text(s) => {
                self.write_head(3, s.len() as u64);
                self.buf.extend_from_slice(s.as_bytes());
            }
            CborValue::Bytes(b) => {
                self.write_head(2, b.len() as u64);
                self.buf.extend_from_slice(b);
            }
            CborValue::Array(items) => {
                self.write_head(4, items.len() as u64);
                for item in items {
                    self.write_value(item);
                }
            }
            CborValue::Map(entries) => self.write_map(entries),
            CborValue::Tagged(tag, inner) => {
                self.write_head(6, *tag);
                self.write_value(inner);
            }
        }
    }

    fn write_map(&mut self, entries: &[(CborValue, CborValue)]) {
        let mut encoded: Vec<(Vec<u8>, &CborValue)> = entries
            .iter()
            .map(|(k, v)| {
                let mut kw = CborWriter::new();
                kw.write_value(k);
                (kw.into_bytes(), v)
            })
            .collect();
        // Canonical map key order (RFC 8949 §4.2.1): shorter encoding first,
        // lexicographic tiebreak on equal-length encodings.
        encoded.sort_by(|a, b| a.0.len().cmp(&b.0.len()).then_with(|| a.0.cmp(&b.0)));

        self.write_head(5, encoded.len() as u64);
        for (key_bytes, value) in encoded {
            self.buf.extend_from_slice(&key_bytes);
            self.write_value(value);
        }
    }

    fn write_simple(&mut self, code: u8) {
        self.buf.push((7 << 5) | code);
    }

    /// Writes a major-type header with the shortest possible length
    /// encoding for `value`.
    fn write_head(&mut self, major: u8, value: u64) {
        let major = major << 5;
        if value < 24 {
            self.buf.push(major | value as u8);
        } else if value <= u8::MAX as u64 {
            self.buf.push(major | 24);
            self.buf.push(value as u8);
        } else if value <= u16::MAX as u64 {
            self.buf.push(major | 25);
            self.buf.extend_from_slice(&(value as u16).to_be_bytes());
        } else if value <= u32::MAX as u64 {
            self.buf.push(major | 26);
            self.buf.extend_from_slice(&(value as u32).to_be_bytes());
        } else {
            self.buf.push(major | 27);
            self.buf.extend_from_slice(&value.to_be_bytes());
        }
    }
}

impl Default for CborWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a single value to canonical CBOR bytes — the common case used
/// throughout COSE/CWT/SD-CWT construction.
pub fn to_canonical_bytes(value: &CborValue) -> Vec<u8> {
    let mut writer = CborWriter::new();
    writer.write_value(value);
    writer.into_bytes()
}
