//! The three object kinds and their exact byte encodings (data model §3).
//!
//! Objects are write-once and content-addressed; see [`crate::odb`] for the
//! on-disk storage layer. This module only knows how to turn an [`Object`] into
//! bytes and back — it never touches a filesystem.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context};

use crate::hash::Oid;
use crate::signature::Signature;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjKind {
    Blob,
    Tree,
    Commit,
}

impl ObjKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjKind::Blob => "blob",
            ObjKind::Tree => "tree",
            ObjKind::Commit => "commit",
        }
    }
}

impl Display for ObjKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ObjKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(ObjKind::Blob),
            "tree" => Ok(ObjKind::Tree),
            "commit" => Ok(ObjKind::Commit),
            _ => bail!("unknown object kind `{}`", s),
        }
    }
}

/// The kind of a tree entry — either another tree, or a blob. File mode bits
/// and symlinks are out of scope (non-goal), so there is no `FileMode` here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeEntryKind {
    Blob,
    Tree,
}

impl TreeEntryKind {
    fn as_str(self) -> &'static str {
        match self {
            TreeEntryKind::Blob => "blob",
            TreeEntryKind::Tree => "tree",
        }
    }
}

impl FromStr for TreeEntryKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(TreeEntryKind::Blob),
            "tree" => Ok(TreeEntryKind::Tree),
            _ => bail!("unknown tree entry kind `{}`", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub kind: TreeEntryKind,
    pub oid: Oid,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    /// Always kept sorted by name: round-trip stability (§3 invariants) depends on it.
    pub entries: Vec<TreeEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub tree: Oid,
    pub parents: Vec<Oid>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

impl Commit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() >= 2
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Blob(Vec<u8>),
    Tree(Tree),
    Commit(Commit),
}

impl Object {
    pub fn kind(&self) -> ObjKind {
        match self {
            Object::Blob(_) => ObjKind::Blob,
            Object::Tree(_) => ObjKind::Tree,
            Object::Commit(_) => ObjKind::Commit,
        }
    }

    /// Encode the payload bytes (without the `<type> "\0"` header; the header
    /// is added by the object store when it computes the OID).
    pub fn encode_payload(&self) -> Vec<u8> {
        match self {
            Object::Blob(bytes) => bytes.clone(),
            Object::Tree(tree) => encode_tree(tree),
            Object::Commit(commit) => encode_commit(commit),
        }
    }

    pub fn into_blob(self) -> anyhow::Result<Vec<u8>> {
        match self {
            Object::Blob(bytes) => Ok(bytes),
            other => bail!("expected a blob, found a {}", other.kind()),
        }
    }

    pub fn into_tree(self) -> anyhow::Result<Tree> {
        match self {
            Object::Tree(tree) => Ok(tree),
            other => bail!("expected a tree, found a {}", other.kind()),
        }
    }

    pub fn into_commit(self) -> anyhow::Result<Commit> {
        match self {
            Object::Commit(commit) => Ok(commit),
            other => bail!("expected a commit, found a {}", other.kind()),
        }
    }

    /// Parse a payload of a known kind, per §3's per-kind format.
    pub fn parse(kind: ObjKind, payload: &[u8]) -> anyhow::Result<Self> {
        match kind {
            ObjKind::Blob => Ok(Object::Blob(payload.to_vec())),
            ObjKind::Tree => Ok(Object::Tree(parse_tree(payload)?)),
            ObjKind::Commit => Ok(Object::Commit(parse_commit(payload)?)),
        }
    }
}

fn encode_tree(tree: &Tree) -> Vec<u8> {
    let mut buf = Vec::new();
    for entry in &tree.entries {
        buf.extend_from_slice(entry.kind.as_str().as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(entry.oid.to_string().as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(entry.name.as_bytes());
        buf.push(b'\n');
    }
    buf
}

fn parse_tree(payload: &[u8]) -> anyhow::Result<Tree> {
    let text = std::str::from_utf8(payload).context("tree object is not valid utf-8")?;
    let mut entries = Vec::new();
    for line in text.lines() {
        let mut parts = line.splitn(3, ' ');
        let kind = parts.next().ok_or_else(|| anyhow!("malformed tree entry: `{}`", line))?;
        let oid = parts.next().ok_or_else(|| anyhow!("malformed tree entry: `{}`", line))?;
        let name = parts.next().ok_or_else(|| anyhow!("malformed tree entry: `{}`", line))?;
        if name == "." || name == ".." || name.contains('/') {
            bail!("invalid tree entry name `{}`", name);
        }
        entries.push(TreeEntry {
            kind: kind.parse()?,
            oid: oid.parse()?,
            name: name.to_owned(),
        });
    }
    Ok(Tree { entries })
}

fn encode_commit(commit: &Commit) -> Vec<u8> {
    let mut buf = String::new();
    buf.push_str(&format!("tree {}\n", commit.tree));
    for parent in &commit.parents {
        buf.push_str(&format!("parent {}\n", parent));
    }
    buf.push_str(&format!("author {}\n", commit.author));
    buf.push_str(&format!("committer {}\n", commit.committer));
    buf.push('\n');
    buf.push_str(&commit.message);
    buf.into_bytes()
}

fn parse_commit(payload: &[u8]) -> anyhow::Result<Commit> {
    let text = std::str::from_utf8(payload).context("commit object is not valid utf-8")?;
    let mut lines = text.split('\n');
    let mut tree = None;
    let mut parents = Vec::new();
    let mut author = None;
    let mut committer = None;

    for line in &mut lines {
        if line.is_empty() {
            break;
        }
        let (key, rest) = line
            .split_once(' ')
            .ok_or_else(|| anyhow!("malformed commit header line: `{}`", line))?;
        match key {
            "tree" => tree = Some(rest.parse()?),
            "parent" => parents.push(rest.parse()?),
            "author" => author = Some(rest.parse()?),
            "committer" => committer = Some(rest.parse()?),
            other => bail!("unrecognized commit header key `{}`", other),
        }
    }

    let message = lines.collect::<Vec<_>>().join("\n");

    Ok(Commit {
        tree: tree.ok_or_else(|| anyhow!("commit missing `tree` header"))?,
        parents,
        author: author.ok_or_else(|| anyhow!("commit missing `author` header"))?,
        committer: committer.ok_or_else(|| anyhow!("commit missing `committer` header"))?,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Time;

    fn sig(name: &str) -> Signature {
        Signature { name: name.to_owned(), email: format!("{}@example.com", name), time: Time { seconds: 1000, tz_offset_minutes: 0 } }
    }

    #[test]
    fn tree_round_trips() {
        let tree = Tree {
            entries: vec![
                TreeEntry { kind: TreeEntryKind::Blob, oid: Oid::EMPTY_BLOB, name: "a.txt".into() },
                TreeEntry { kind: TreeEntryKind::Tree, oid: Oid::EMPTY_TREE, name: "sub".into() },
            ],
        };
        let bytes = encode_tree(&tree);
        let parsed = parse_tree(&bytes).unwrap();
        assert_eq!(parsed, tree);
    }

    #[test]
    fn tree_rejects_dotdot_name() {
        let bytes = b"blob 0000000000000000000000000000000000000000 ..\n";
        assert!(parse_tree(bytes).is_err());
    }

    #[test]
    fn commit_round_trips() {
        let commit = Commit {
            tree: Oid::EMPTY_TREE,
            parents: vec![Oid::EMPTY_BLOB],
            author: sig("alice"),
            committer: sig("bob"),
            message: "subject\n\nbody\n".to_owned(),
        };
        let bytes = encode_commit(&commit);
        let parsed = parse_commit(&bytes).unwrap();
        assert_eq!(parsed, commit);
    }

    #[test]
    fn commit_rejects_unknown_header() {
        let text = "tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904\nbogus foo\n\nmsg";
        assert!(parse_commit(text.as_bytes()).is_err());
    }

    #[test]
    fn root_commit_has_no_parents() {
        let commit = Commit {
            tree: Oid::EMPTY_TREE,
            parents: vec![],
            author: sig("alice"),
            committer: sig("alice"),
            message: "root".into(),
        };
        assert!(commit.is_root());
        assert!(!commit.is_merge());
    }

    #[test]
    fn merge_commit_has_two_parents() {
        let commit = Commit {
            tree: Oid::EMPTY_TREE,
            parents: vec![Oid::EMPTY_BLOB, Oid::EMPTY_TREE],
            author: sig("alice"),
            committer: sig("alice"),
            message: "merge".into(),
        };
        assert!(commit.is_merge());
    }
}
