use crate::error::CborError;
use crate::value::CborValue;

/// Reader conformance. `Canonical` rejects indefinite lengths and duplicate
/// map keys outright; `Lax` accepts indefinite lengths when
/// `allow_indefinite_length` is set, and never re-derives canonical output
/// from what it reads — that conversion is explicit, via `CborWriter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConformanceMode {
    Canonical,
    Lax { allow_indefinite_length: bool },
}

impl ConformanceMode {
    fn allows_indefinite(self) -> bool {
        matches!(self, ConformanceMode::Lax { allow_indefinite_length: true })
    }
}

const BREAK: u8 = 0xff;

/// Borrows a byte slice and decodes one CBOR item at a time. `!Sync` by
/// construction (a `&mut self` cursor) — one reader per operation, never
/// shared across threads.
pub struct CborReader<'a> {
    data: &'a [u8],
    pos: usize,
    mode: ConformanceMode,
}

impl<'a> CborReader<'a> {
    pub fn new(data: &'a [u8], mode: ConformanceMode) -> Self {
        Self { data, pos: 0, mode }
    }

    /// Decode exactly one top-level value and confirm nothing follows it.
    pub fn read_single_value(data: &'a [u8], mode: ConformanceMode) -> Result<CborValue, CborError> {
        let mut reader = Self::new(data, mode);
        let value = reader.read_value()?;
        if reader.pos != reader.data.len() {
            return Err(CborError::TrailingBytes);
        }
        Ok(value)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn read_byte(&mut self) -> Result<u8, CborError> {
        let b = *self.data.get(self.pos).ok_or(CborError::UnexpectedEof)?;
        self.pos += 1;
        Ok(b)
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8], CborError> {
        let end = self.pos.checked_add(len).ok_or(CborError::UnexpectedEof)?;
        let slice = self.data.get(self.pos..end).ok_or(CborError::UnexpectedEof)?;
        self.pos = end;
        Ok(slice)
    }

    /// Major type, raw "additional info" nibble, and the extended value it
    /// carries (a length for major types 0-6, a float bit pattern for major
    /// type 7 with additional info 25/26/27, `None` for indefinite length).
    fn read_header(&mut self) -> Result<(u8, u8, Option<u64>), CborError> {
        let first = self.read_byte()?;
        let major = first >> 5;
        let additional = first & 0x1f;
        let value = match additional {
            0..=23 => Some(additional as u64),
            24 => Some(self.read_byte()? as u64),
            25 => {
                let b = self.read_slice(2)?;
                Some(u16::from_be_bytes([b[0], b[1]]) as u64)
            }
            26 => {
                let b = self.read_slice(4)?;
                Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as u64)
            }
            27 => {
                let b = self.read_slice(8)?;
                Some(u64::from_be_bytes(b.try_into().unwrap()))
            }
            28..=30 => return Err(CborError::BadHeader(format!("reserved additional info {additional}"))),
            31 => None,
            _ => unreachable!("additional info is masked to 5 bits"),
        };
        Ok((major, additional, value))
    }

    fn require_definite(&self, len: Option<u64>) -> Result<u64, CborError> {
        match len {
            Some(n) => Ok(n),
            None if self.mode.allows_indefinite() => Err(CborError::UnterminatedIndefiniteLength),
            None => Err(CborError::IndefiniteLengthDisallowed),
        }
    }

    pub fn read_value(&mut self) -> Result<CborValue, CborError> {
        let (major, additional, value) = self.read_header()?;
        match major {
            0 => {
                let v = self.require_definite(value)?;
                Ok(int_from_unsigned(v))
            }
            1 => {
                let v = self.require_definite(value)?;
                negative_int(v)
            }
            2 => self.read_byte_string(value).map(CborValue::Bytes),
            3 => self.read_text_string(value).map(CborValue::Text),
            4 => self.read_array(value).map(CborValue::Array),
            5 => self.read_map(value).map(CborValue::Map),
            6 => {
                let tag = self.require_definite(value)?;
                let inner = self.read_value()?;
                Ok(CborValue::Tagged(tag, Box::new(inner)))
            }
            7 => self.read_simple_or_float(additional, value),
            _ => unreachable!("major type is masked to 3 bits"),
        }
    }

    fn read_byte_string(&mut self, len: Option<u64>) -> Result<Vec<u8>, CborError> {
        self.read_chunked_string(2, len)
    }

    fn read_text_string(&mut self, len: Option<u64>) -> Result<String, CborError> {
        let bytes = self.read_chunked_string(3, len)?;
        String::from_utf8(bytes).map_err(|e| CborError::InvalidUtf8(e.to_string()))
    }

    /// Byte/text strings share the same indefinite-length chunking rule:
    /// a stream of definite-length chunks of the *same* major type,
    /// terminated by a break byte.
    fn read_chunked_string(&mut self, expected_major: u8, len: Option<u64>) -> Result<Vec<u8>, CborError> {
        match len {
            Some(n) => Ok(self.read_slice(n as usize)?.to_vec()),
            None => {
                self.require_indefinite_allowed()?;
                let mut out = Vec::new();
                loop {
                    if self.peek_is_break()? {
                        self.pos += 1;
                        return Ok(out);
                    }
                    let (major, _additional, chunk_len) = self.read_header()?;
                    if major != expected_major {
                        return Err(CborError::BadHeader(
                            "indefinite string chunk major type mismatch".into(),
                        ));
                    }
                    let n = self.require_definite(chunk_len)?;
                    out.extend_from_slice(self.read_slice(n as usize)?);
                }
            }
        }
    }

    fn read_array(&mut self, len: Option<u64>) -> Result<Vec<CborValue>, CborError> {
        match len {
            Some(n) => {
                let n = usize::try_from(n)
                    .map_err(|_| CborError::Unsupported("array length exceeds usize".into()))?;
                let mut out = Vec::with_capacity(n.min(4096));
                for _ in 0..n {
                    out.push(self.read_value()?);
                }
                Ok(out)
            }
            None => {
                self.require_indefinite_allowed()?;
                let mut out = Vec::new();
                loop {
                    if self.peek_is_break()? {
                        self.pos += 1;
                        return Ok(out);
                    }
                    out.push(self.read_value()?);
                }
            }
        }
    }

    fn read_map(&mut self, len: Option<u64>) -> Result<Vec<(CborValue, CborValue)>, CborError> {
        let mut out = match len {
            Some(n) => {
                let n = usize::try_from(n)
                    .map_err(|_| CborError::Unsupported("map length exceeds usize".into()))?;
                let mut out = Vec::with_capacity(n.min(4096));
                for _ in 0..n {
                    let k = self.read_value()?;
                    let v = self.read_value()?;
                    out.push((k, v));
                }
                out
            }
            None => {
                self.require_indefinite_allowed()?;
                let mut out = Vec::new();
                loop {
                    if self.peek_is_break()? {
                        self.pos += 1;
                        break;
                    }
                    let k = self.read_value()?;
                    let v = self.read_value()?;
                    out.push((k, v));
                }
                out
            }
        };
        if matches!(self.mode, ConformanceMode::Canonical) {
            reject_duplicate_keys(&mut out)?;
        }
        Ok(out)
    }

    fn read_simple_or_float(&mut self, additional: u8, value: Option<u64>) -> Result<CborValue, CborError> {
        match (additional, value) {
            (20, _) => Ok(CborValue::Bool(false)),
            (21, _) => Ok(CborValue::Bool(true)),
            (22, _) => Ok(CborValue::Null),
            (23, _) => Ok(CborValue::Null), // undefined collapses to Null — no caller distinguishes them
            (25, Some(bits)) => Ok(CborValue::F32(half_to_f32(bits as u16))),
            (26, Some(bits)) => Ok(CborValue::F32(f32::from_bits(bits as u32))),
            (27, Some(bits)) => Ok(CborValue::F64(f64::from_bits(bits))),
            (_, Some(n)) if n < 20 => Ok(CborValue::Uint64(n)), // unassigned simple value, preserved as its code
            (_, Some(n)) => Ok(CborValue::Uint64(n)),
            (_, None) => Err(CborError::BadHeader("break outside an indefinite-length item".into())),
        }
    }

    fn peek_is_break(&self) -> Result<bool, CborError> {
        let b = *self.data.get(self.pos).ok_or(CborError::UnexpectedEof)?;
        Ok(b == BREAK)
    }

    fn require_indefinite_allowed(&self) -> Result<(), CborError> {
        if self.mode.allows_indefinite() {
            Ok(())
        } else {
            Err(CborError::IndefiniteLengthDisallowed)
        }
    }
}

/// IEEE 754 half-precision to single-precision, per RFC 8949 Appendix D.
fn half_to_f32(bits: u16) -> f32 {
    let sign = u32::from(bits >> 15) << 31;
    let exponent = (bits >> 10) & 0x1f;
    let mantissa = u32::from(bits & 0x3ff);
    if exponent == 0 {
        if mantissa == 0 {
            f32::from_bits(sign)
        } else {
            // Subnormal half → normalized single.
            let mut e: i32 = -1;
            let mut m = mantissa;
            loop {
                m <<= 1;
                e += 1;
                if m & 0x400 != 0 {
                    break;
                }
            }
            m &= 0x3ff;
            let exp = (127 - 15 - e) as u32;
            f32::from_bits(sign | (exp << 23) | (m << 13))
        }
    } else if exponent == 0x1f {
        f32::from_bits(sign | 0x7f80_0000 | (mantissa << 13))
    } else {
        let exp = u32::from(exponent) + (127 - 15);
        f32::from_bits(sign | (exp << 23) | (mantissa << 13))
    }
}

fn int_from_unsigned(v: u64) -> CborValue {
    match i64::try_from(v) {
        Ok(i) => CborValue::Int64(i),
        Err(_) => CborValue::Uint64(v),
    }
}

fn negative_int(v: u64) -> Result<CborValue, CborError> {
    // CBOR negative integers encode -1-n for unsigned argument n.
    let magnitude = i128::from(v);
    let value = -1i128 - magnitude;
    if value >= i64::MIN as i128 {
        Ok(CborValue::Int64(value as i64))
    } else {
        Err(CborError::Unsupported("negative integer below i64::MIN".into()))
    }
}

fn reject_duplicate_keys(entries: &mut [(CborValue, CborValue)]) -> Result<(), CborError> {
    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            if cbor_value_eq(&entries[i].0, &entries[j].0) {
                return Err(CborError::DuplicateKey);
            }
        }
    }
    Ok(())
}

fn cbor_value_eq(a: &CborValue, b: &CborValue) -> bool {
    use CborValue::*;
    match (a, b) {
        (Int64(x), Int64(y)) => x == y,
        (Uint64(x), Uint64(y)) => x == y,
        (Int64(x), Uint64(y)) | (Uint64(y), Int64(x)) => i64::try_from(*y).map(|y| y == *x).unwrap_or(false),
        (Text(x), Text(y)) => x == y,
        (Bytes(x), Bytes(y)) => x == y,
        (Bool(x), Bool(y)) => x == y,
        (Null, Null) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(bytes: &[u8]) -> CborValue {
        CborReader::read_single_value(bytes, ConformanceMode::Canonical).expect("decodes")
    }

    #[test]
    fn decodes_small_unsigned_int() {
        assert_eq!(canon(&[0x05]), CborValue::Int64(5));
    }

    #[test]
    fn decodes_uint8_header() {
        assert_eq!(canon(&[0x18, 0xff]), CborValue::Int64(255));
    }

    #[test]
    fn decodes_negative_int() {
        // -10 encodes as major 1, additional 9
        assert_eq!(canon(&[0x29]), CborValue::Int64(-10));
    }

    #[test]
    fn decodes_text_string() {
        assert_eq!(canon(&[0x63, b'f', b'o', b'o']), CborValue::Text("foo".into()));
    }

    #[test]
    fn decodes_byte_string() {
        assert_eq!(canon(&[0x43, 1, 2, 3]), CborValue::Bytes(vec![1, 2, 3]));
    }

    #[test]
    fn decodes_array() {
        assert_eq!(
            canon(&[0x82, 0x01, 0x02]),
            CborValue::Array(vec![CborValue::Int64(1), CborValue::Int64(2)])
        );
    }

    #[test]
    fn decodes_map() {
        let bytes = [0xa1, 0x01, 0x02]; // {1: 2}
        assert_eq!(
            canon(&bytes),
            CborValue::Map(vec![(CborValue::Int64(1), CborValue::Int64(2))])
        );
    }

    #[test]
    fn canonical_mode_rejects_duplicate_keys() {
        let bytes = [0xa2, 0x01, 0x02, 0x01, 0x03]; // {1:2, 1:3}
        let err = CborReader::read_single_value(&bytes, ConformanceMode::Canonical).unwrap_err();
        assert_eq!(err, CborError::DuplicateKey);
    }

    #[test]
    fn canonical_mode_rejects_indefinite_length() {
        let bytes = [0x9f, 0x01, 0xff]; // indefinite array [1]
        let err = CborReader::read_single_value(&bytes, ConformanceMode::Canonical).unwrap_err();
        assert_eq!(err, CborError::IndefiniteLengthDisallowed);
    }

    #[test]
    fn lax_mode_accepts_indefinite_array_when_enabled() {
        let bytes = [0x9f, 0x01, 0x02, 0xff];
        let value = CborReader::read_single_value(
            &bytes,
            ConformanceMode::Lax { allow_indefinite_length: true },
        )
        .expect("decodes");
        assert_eq!(value, CborValue::Array(vec![CborValue::Int64(1), CborValue::Int64(2)]));
    }

    #[test]
    fn unknown_tag_is_preserved_not_dropped() {
        let bytes = [0xd9, 0x5d, 0x00, 0x01]; // tag(23808) over 1
        let value = canon(&bytes);
        assert_eq!(value, CborValue::Tagged(0x5d00, Box::new(CborValue::Int64(1))));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let bytes = [0x01, 0x02];
        let err = CborReader::read_single_value(&bytes, ConformanceMode::Canonical).unwrap_err();
        assert_eq!(err, CborError::TrailingBytes);
    }
}
