/// Signature algorithm identifier, shared by the crypto registry, the key
/// factory, and the COSE protected-header codec.
///
/// The `cose_value` mapping follows the IANA COSE Algorithms registry so
/// that `alg` header values round-trip without a side table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Algorithm {
    /// ECDSA w/ SHA-256 over curve P-256.
    Es256,
    /// ECDSA w/ SHA-384 over curve P-384.
    Es384,
    /// ECDSA w/ SHA-512 over curve P-521.
    Es512,
}

impl Algorithm {
    /// COSE algorithm identifier (RFC 9053 §2.1).
    pub const fn cose_value(self) -> i64 {
        match self {
            Algorithm::Es256 => -7,
            Algorithm::Es384 => -35,
            Algorithm::Es512 => -36,
        }
    }

    pub const fn from_cose_value(value: i64) -> Option<Self> {
        match value {
            -7 => Some(Algorithm::Es256),
            -35 => Some(Algorithm::Es384),
            -36 => Some(Algorithm::Es512),
            _ => None,
        }
    }

    /// Digest algorithm this signature scheme hashes with.
    pub const fn digest(self) -> DigestAlgorithm {
        match self {
            Algorithm::Es256 => DigestAlgorithm::Sha256,
            Algorithm::Es384 => DigestAlgorithm::Sha384,
            Algorithm::Es512 => DigestAlgorithm::Sha512,
        }
    }
}

/// Hash algorithm used for SD-CWT disclosure digests and `sd_hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DigestAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    /// `sd_alg` label used in SD-CWT protected headers (matches the
    /// `cose-hash-alg` IANA registry naming used by the SD-CWT draft).
    pub const fn label(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha-256",
            DigestAlgorithm::Sha384 => "sha-384",
            DigestAlgorithm::Sha512 => "sha-512",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "sha-256" => Some(DigestAlgorithm::Sha256),
            "sha-384" => Some(DigestAlgorithm::Sha384),
            "sha-512" => Some(DigestAlgorithm::Sha512),
            _ => None,
        }
    }

    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::Sha256 => {
                use sha2::{Digest, Sha256};
                Sha256::digest(data).to_vec()
            }
            DigestAlgorithm::Sha384 => {
                use sha2::{Digest, Sha384};
                Sha384::digest(data).to_vec()
            }
            DigestAlgorithm::Sha512 => {
                use sha2::{Digest, Sha512};
                Sha512::digest(data).to_vec()
            }
        }
    }
}
