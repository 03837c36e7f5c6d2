use std::collections::{BTreeSet, HashMap};

use vc_cbor::CborValue;
use vc_core::DigestAlgorithm;

use crate::disclosure::Disclosure;

/// One step of a path into a claims structure: a map key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

pub type Path = Vec<PathSegment>;

pub fn path_to_string(path: &Path) -> String {
    path.iter()
        .map(|s| match s {
            PathSegment::Key(k) => k.clone(),
            PathSegment::Index(i) => i.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Map-level marker key listing the base64url digests of redacted
/// properties at that level.
const SD_MARKER_KEY: &str = "_sd";

/// Tag wrapping the base64url digest of a redacted array element, in place
/// of the element itself.
pub const SD_ARRAY_ELEMENT_TAG: u64 = 60002;

/// The three path sets a verifier needs: every path reachable in the
/// (possibly still-redacted) payload, the subset that would be present with
/// no disclosures applied, and the locations each disclosure maps to.
#[derive(Debug, Clone, Default)]
pub struct PathLattice {
    pub all_paths: Vec<Path>,
    pub mandatory_paths: Vec<Path>,
    pub disclosure_paths: Vec<(String, Path)>,
}

/// Walk `payload`, matching `_sd` digest markers and tagged array-element
/// markers against `disclosures` by their base64url digest, and report
/// where each disclosure would sit if reinserted.
pub fn extract_path_lattice(payload: &CborValue, disclosures: &[Disclosure], alg: DigestAlgorithm) -> PathLattice {
    let digest_index: HashMap<String, &Disclosure> =
        disclosures.iter().map(|d| (d.digest_base64url(alg), d)).collect();

    let mut all_paths = Vec::new();
    let mut disclosure_paths = Vec::new();
    walk(payload, Vec::new(), &digest_index, &mut all_paths, &mut disclosure_paths);

    let disclosed: BTreeSet<Path> = disclosure_paths.iter().map(|(_, p)| p.clone()).collect();
    let mandatory_paths = all_paths.iter().filter(|p| !disclosed.contains(*p)).cloned().collect();

    PathLattice { all_paths, mandatory_paths, disclosure_paths }
}

fn walk(
    value: &CborValue,
    prefix: Path,
    digest_index: &HashMap<String, &Disclosure>,
    all_paths: &mut Vec<Path>,
    disclosure_paths: &mut Vec<(String, Path)>,
) {
    match value {
        CborValue::Map(entries) => {
            for (k, v) in entries {
                let key_text = match k {
                    CborValue::Text(s) => s.clone(),
                    CborValue::Int64(i) => i.to_string(),
                    CborValue::Uint64(u) => u.to_string(),
                    _ => continue,
                };
                if key_text == "sd_claims" || key_text == "sd_alg" {
                    continue;
                }
                if key_text == SD_MARKER_KEY {
                    let Some(digests) = v.as_array() else { continue };
                    for digest in digests {
                        let Some(digest_text) = digest.as_text() else { continue };
                        let Some(disclosure) = digest_index.get(digest_text) else { continue };
                        let Some(name) = &disclosure.name else { continue };
                        let mut path = prefix.clone();
                        path.push(PathSegment::Key(name.clone()));
                        disclosure_paths.push((digest_text.to_string(), path.clone()));
                        all_paths.push(path.clone());
                        walk(&disclosure.value, path, digest_index, all_paths, disclosure_paths);
                    }
                    continue;
                }
                let mut path = prefix.clone();
                path.push(PathSegment::Key(key_text));
                all_paths.push(path.clone());
                walk(v, path, digest_index, all_paths, disclosure_paths);
            }
        }
        CborValue::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if let CborValue::Tagged(tag, inner) = item {
                    if *tag == SD_ARRAY_ELEMENT_TAG {
                        if let Some(digest_text) = inner.as_text() {
                            if let Some(disclosure) = digest_index.get(digest_text) {
                                let mut path = prefix.clone();
                                path.push(PathSegment::Index(i));
                                disclosure_paths.push((digest_text.to_string(), path.clone()));
                                all_paths.push(path.clone());
                                walk(&disclosure.value, path, digest_index, all_paths, disclosure_paths);
                            }
                        }
                        continue;
                    }
                }
                let mut path = prefix.clone();
                path.push(PathSegment::Index(i));
                all_paths.push(path.clone());
                walk(item, path, digest_index, all_paths, disclosure_paths);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(digest: &str) -> CborValue {
        CborValue::Tagged(SD_ARRAY_ELEMENT_TAG, Box::new(CborValue::Text(digest.to_string())))
    }

    #[test]
    fn mandatory_property_is_in_all_and_mandatory_paths() {
        let payload = CborValue::Map(vec![(
            CborValue::Text("iss".into()),
            CborValue::Text("issuer".into()),
        )]);
        let lattice = extract_path_lattice(&payload, &[], DigestAlgorithm::Sha256);
        assert_eq!(lattice.all_paths, vec![vec![PathSegment::Key("iss".into())]]);
        assert_eq!(lattice.mandatory_paths, lattice.all_paths);
        assert!(lattice.disclosure_paths.is_empty());
    }

    #[test]
    fn redacted_property_resolves_through_sd_marker() {
        let disclosure = Disclosure::property(vec![1, 2, 3], "email", CborValue::Text("a@example.com".into()));
        let digest = disclosure.digest_base64url(DigestAlgorithm::Sha256);
        let payload = CborValue::Map(vec![(
            CborValue::Text(SD_MARKER_KEY.into()),
            CborValue::Array(vec![CborValue::Text(digest.clone())]),
        )]);

        let lattice = extract_path_lattice(&payload, &[disclosure], DigestAlgorithm::Sha256);
        let expected_path = vec![PathSegment::Key("email".into())];
        assert_eq!(lattice.all_paths, vec![expected_path.clone()]);
        assert!(lattice.mandatory_paths.is_empty());
        assert_eq!(lattice.disclosure_paths, vec![(digest, expected_path)]);
    }

    #[test]
    fn redacted_array_element_resolves_through_tagged_marker() {
        let disclosure = Disclosure::array_element(vec![9], CborValue::Text("US".into()));
        let digest = disclosure.digest_base64url(DigestAlgorithm::Sha256);
        let payload = CborValue::Array(vec![CborValue::Text("CA".into()), marker(&digest)]);

        let lattice = extract_path_lattice(&payload, &[disclosure], DigestAlgorithm::Sha256);
        assert_eq!(lattice.all_paths.len(), 2);
        assert_eq!(lattice.mandatory_paths, vec![vec![PathSegment::Index(0)]]);
        assert_eq!(lattice.disclosure_paths[0].1, vec![PathSegment::Index(1)]);
    }
}
