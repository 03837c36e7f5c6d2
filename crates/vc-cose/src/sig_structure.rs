use vc_cbor::{to_canonical_bytes, CborValue};

/// `Sig_structure = ["Signature1", body_protected, external_aad, payload]`
/// (RFC 9052 §4.4), the canonical CBOR bytes actually signed/verified for a
/// `COSE_Sign1`. Never transmitted — both sides derive it independently
/// from the message they already have.
pub fn sig_structure_bytes(protected: &[u8], external_aad: &[u8], payload: &[u8]) -> Vec<u8> {
    let value = CborValue::Array(vec![
        CborValue::Text("Signature1".to_string()),
        CborValue::Bytes(protected.to_vec()),
        CborValue::Bytes(external_aad.to_vec()),
        CborValue::Bytes(payload.to_vec()),
    ]);
    to_canonical_bytes(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structure_is_a_four_element_array() {
        let bytes = sig_structure_bytes(b"prot", b"", b"payload");
        // major type 4 (array), length 4: 0x84
        assert_eq!(bytes[0], 0x84);
    }

    #[test]
    fn differs_when_payload_changes() {
        let a = sig_structure_bytes(b"prot", b"", b"payload-a");
        let b = sig_structure_bytes(b"prot", b"", b"payload-b");
        assert_ne!(a, b);
    }
}
