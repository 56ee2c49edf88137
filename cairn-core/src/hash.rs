//! Content hashing: SHA-1 over `<type> "\0" <payload>`, per data model §3.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use anyhow::{bail, Context};
use sha1::{Digest, Sha1};

use crate::obj::ObjKind;

pub const HASH_BYTES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid([u8; HASH_BYTES]);

impl Oid {
    /// The OID of the empty blob, i.e. `hash_bytes(b"blob\0")`.
    pub const EMPTY_BLOB: Oid = Oid([
        0xe6, 0x9d, 0xe2, 0x9b, 0xb2, 0xd1, 0xd6, 0x43, 0x4b, 0x8b, 0x29, 0xae, 0x77, 0x5a, 0xd8,
        0xc2, 0xe4, 0x8c, 0x53, 0x91,
    ]);

    /// The OID of the empty tree, i.e. `hash_bytes(b"tree\0")`.
    pub const EMPTY_TREE: Oid = Oid([
        0x4b, 0x82, 0x5d, 0xc6, 0x42, 0xcb, 0x6e, 0xb9, 0xa0, 0x60, 0xe5, 0x4b, 0xf8, 0xd6, 0x92,
        0x88, 0xfb, 0xee, 0x49, 0x04,
    ]);

    pub fn from_bytes(bytes: [u8; HASH_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_BYTES] {
        &self.0
    }

    /// Compute the OID of `<kind> "\0" <payload>` without writing anything.
    pub fn hash(kind: ObjKind, payload: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(kind.as_str().as_bytes());
        hasher.update(b"\0");
        hasher.update(payload);
        let digest = hasher.finalize();
        let mut bytes = [0u8; HASH_BYTES];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn short(&self) -> String {
        self.to_string()[..7].to_owned()
    }
}

impl Display for Oid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl FromStr for Oid {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 40 {
            bail!("`{}` is not a valid object id (expected 40 hex characters)", s);
        }
        let bytes = hex::decode(s).with_context(|| format!("`{}` is not valid hex", s))?;
        let mut array = [0u8; HASH_BYTES];
        array.copy_from_slice(&bytes);
        Ok(Self(array))
    }
}

impl TryFrom<String> for Oid {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let a = Oid::hash(ObjKind::Blob, b"Hello, World!");
        let b = Oid::hash(ObjKind::Blob, b"Hello, World!");
        assert_eq!(a, b);
    }

    #[test]
    fn hash_roundtrips_through_string() {
        let oid = Oid::hash(ObjKind::Blob, b"roundtrip");
        let s = oid.to_string();
        assert_eq!(s.len(), 40);
        assert_eq!(s.parse::<Oid>().unwrap(), oid);
    }

    #[test]
    fn empty_blob_constant_matches_hash() {
        assert_eq!(Oid::hash(ObjKind::Blob, b""), Oid::EMPTY_BLOB);
    }

    #[test]
    fn empty_tree_constant_matches_hash() {
        assert_eq!(Oid::hash(ObjKind::Tree, b""), Oid::EMPTY_TREE);
    }

    #[test]
    fn short_is_seven_chars() {
        let oid = Oid::hash(ObjKind::Blob, b"short me");
        assert_eq!(oid.short().len(), 7);
        assert!(oid.to_string().starts_with(&oid.short()));
    }

    #[test]
    fn rejects_bad_length() {
        assert!("deadbeef".parse::<Oid>().is_err());
    }
}
