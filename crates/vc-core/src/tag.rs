use std::collections::BTreeMap;

/// What a piece of sensitive material is being used for. Required on every
/// `SensitiveBuffer` so cross-component routing (registry, key factory, TPM)
/// can make a decision without inspecting the bytes themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Purpose {
    Nonce,
    Auth,
    Digest,
    Transport,
    Verification,
    Encryption,
    Signing,
}

/// Where the material underlying a key or buffer actually lives.
///
/// `Direct` means the bytes in the buffer *are* the key. `TpmHandle` and
/// `HsmReference` mean the buffer instead carries an opaque handle/reference
/// that a hardware-backed signing function knows how to dereference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MaterialSemantics {
    Direct,
    TpmHandle,
    HsmReference,
}

/// One discriminator kind inside a `Tag`. Kinds are unique within a tag —
/// attaching a `Purpose` twice replaces the first value rather than
/// appending a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagKind {
    Purpose(Purpose),
    MaterialSemantics(MaterialSemantics),
}

fn kind_key(kind: &TagKind) -> u8 {
    match kind {
        TagKind::Purpose(_) => 0,
        TagKind::MaterialSemantics(_) => 1,
    }
}

/// Immutable metadata attached to a `SensitiveBuffer` at creation time.
///
/// A tag always carries at least a `Purpose` and a `MaterialSemantics`
/// entry; other discriminator kinds may be layered in by callers that need
/// additional routing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    kinds: BTreeMap<u8, TagKind>,
}

impl Tag {
    pub fn new(purpose: Purpose, material: MaterialSemantics) -> Self {
        let mut kinds = BTreeMap::new();
        kinds.insert(kind_key(&TagKind::Purpose(purpose)), TagKind::Purpose(purpose));
        kinds.insert(
            kind_key(&TagKind::MaterialSemantics(material)),
            TagKind::MaterialSemantics(material),
        );
        Self { kinds }
    }

    pub fn purpose(&self) -> Purpose {
        match self.kinds.get(&kind_key(&TagKind::Purpose(Purpose::Nonce))) {
            Some(TagKind::Purpose(p)) => *p,
            _ => unreachable!("Tag invariant: Purpose kind always present"),
        }
    }

    pub fn material_semantics(&self) -> MaterialSemantics {
        match self
            .kinds
            .get(&kind_key(&TagKind::MaterialSemantics(MaterialSemantics::Direct)))
        {
            Some(TagKind::MaterialSemantics(m)) => *m,
            _ => unreachable!("Tag invariant: MaterialSemantics kind always present"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_round_trips_its_kinds() {
        let tag = Tag::new(Purpose::Signing, MaterialSemantics::TpmHandle);
        assert_eq!(tag.purpose(), Purpose::Signing);
        assert_eq!(tag.material_semantics(), MaterialSemantics::TpmHandle);
    }
}
