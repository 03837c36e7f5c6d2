use vc_core::{MaterialSemantics, Purpose, Tag};
use vc_crypto::{Pool, SensitiveBuffer};

/// TPM response header layout per TPM 2.0 Part 3: 2-byte tag, 4-byte size,
/// 4-byte response code — 10 bytes before any command-specific payload.
pub const RESPONSE_HEADER_LEN: usize = 10;

/// Enforced ceiling on a single TPM response (TPM 2.0 Part 1 implementation
/// limits for FIFO-interface TPMs).
pub const MAX_RESPONSE_LEN: usize = 65536;

/// A successful submit's response bytes, held in a pooled, zeroizing
/// buffer — TPM responses can carry session data and should not outlive
/// their scope in plaintext any more than key material does.
pub struct TpmResponse {
    buf: SensitiveBuffer,
}

impl TpmResponse {
    pub(crate) fn from_bytes(pool: &Pool, bytes: &[u8]) -> Self {
        let tag = Tag::new(Purpose::Transport, MaterialSemantics::Direct);
        let mut buf = pool.acquire(bytes.len(), tag);
        buf.data_mut().copy_from_slice(bytes);
        Self { buf }
    }

    pub fn bytes(&self) -> &[u8] {
        self.buf.data()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The 4-byte `responseCode` field (bytes 6..10 of the header).
    pub fn response_code(&self) -> Option<u32> {
        let b = self.bytes();
        if b.len() < RESPONSE_HEADER_LEN {
            return None;
        }
        Some(u32::from_be_bytes([b[6], b[7], b[8], b[9]]))
    }
}

impl std::fmt::Debug for TpmResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TpmResponse").field("len", &self.len()).finish()
    }
}
