//! vc-sdcwt
//!
//! Selective disclosure over a CWT payload (SD-CWT): the disclosure codec,
//! path-lattice extraction a verifier uses to check which claims were
//! mandatory versus disclosed, and the ecdsa-sd-2023 base/derived proof
//! codec a holder uses to produce presentations from an issuer's base
//! proof.

pub mod disclosure;
pub mod path;
pub mod proof;
pub mod sd_claims;

pub use disclosure::{base64_url_decode, base64_url_encode, Disclosure};
pub use path::{extract_path_lattice, path_to_string, Path, PathLattice, PathSegment, SD_ARRAY_ELEMENT_TAG};
pub use proof::{compress_label_map, decompress_label_map, BaseProof, DerivedProof, BASE_PROOF_MAGIC, DERIVED_PROOF_MAGIC};
pub use sd_claims::{get_sd_claims, sd_hash, set_sd_claims, SD_ALG_LABEL_KEY, SD_CLAIMS_HEADER};
