//! Named pointers to object IDs, possibly symbolic (§4.2).

use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::CoreError;
use crate::hash::Oid;
use crate::lockfile::Lockfile;

const SYMBOLIC_PREFIX: &str = "ref: ";
/// Cap on symbolic-ref dereference recursion (design note §9): the source
/// trusts the filesystem not to contain a cycle; an explicit bound is safer.
const MAX_SYMBOLIC_DEPTH: usize = 8;

lazy_static! {
    static ref INVALID_REF_NAME: Regex = Regex::new(r"(^|/)\.|\.\.|//|@\{|[\x00-\x1f\x7f ~^:?*\[]|/$|\.lock$").unwrap();
}

pub fn validate_ref_name(name: &str) -> anyhow::Result<()> {
    if name.is_empty() || INVALID_REF_NAME.is_match(name) {
        bail!("`{}` is not a valid reference name", name);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ref {
    Direct(Oid),
    Symbolic(String),
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Ref::Direct(oid) => write!(f, "{}", oid),
            Ref::Symbolic(name) => write!(f, "{}{}", SYMBOLIC_PREFIX, name),
        }
    }
}

impl FromStr for Ref {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(name) = s.strip_prefix(SYMBOLIC_PREFIX) {
            Ok(Ref::Symbolic(name.to_owned()))
        } else {
            Ok(Ref::Direct(s.parse().with_context(|| format!("invalid reference value `{}`", s))?))
        }
    }
}

/// A resolved reference lookup: the direct value, plus whether the lookup
/// passed through a symbolic indirection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub symbolic: bool,
    pub value: Option<Oid>,
}

pub struct RefStore {
    root: PathBuf,
}

impl RefStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Read the literal contents of `name`, without following symbolic
    /// indirection.
    fn read_raw(&self, name: &str) -> anyhow::Result<Option<Ref>> {
        let path = self.path_for(name);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents.parse()?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read `{}`", path.display())),
        }
    }

    fn write_raw(&self, name: &str, value: &Ref) -> anyhow::Result<()> {
        let path = self.path_for(name);
        Lockfile::with_mut(&path, |lockfile| {
            use std::io::Write;
            write!(lockfile, "{}", value)?;
            Ok(())
        })
    }

    /// Resolve `name` following symbolic indirection up to [`MAX_SYMBOLIC_DEPTH`]
    /// hops, returning the final direct value (or `None` if undefined anywhere
    /// along the chain).
    pub fn get_ref(&self, name: &str) -> anyhow::Result<Resolved> {
        let mut current = name.to_owned();
        let mut symbolic = false;
        for _ in 0..MAX_SYMBOLIC_DEPTH {
            match self.read_raw(&current)? {
                None => return Ok(Resolved { symbolic, value: None }),
                Some(Ref::Direct(oid)) => return Ok(Resolved { symbolic, value: Some(oid) }),
                Some(Ref::Symbolic(next)) => {
                    symbolic = true;
                    current = next;
                }
            }
        }
        bail!("symbolic reference recursion too deep starting at `{}`", name)
    }

    /// Like [`RefStore::get_ref`] but fails with `MissingRef` if undefined.
    pub fn fully_resolve(&self, name: &str) -> anyhow::Result<Oid> {
        self.get_ref(name)?.value.ok_or_else(|| anyhow!(CoreError::MissingRef(name.to_owned())))
    }

    /// The name that `name` ultimately resolves to after following symbolic
    /// indirection (without resolving to an OID) — used by write-through
    /// updates to find the branch a symbolic HEAD points at.
    pub fn resolve_symbolic(&self, name: &str) -> anyhow::Result<String> {
        let mut current = name.to_owned();
        for _ in 0..MAX_SYMBOLIC_DEPTH {
            match self.read_raw(&current)? {
                Some(Ref::Symbolic(next)) => current = next,
                _ => return Ok(current),
            }
        }
        bail!("symbolic reference recursion too deep starting at `{}`", name)
    }

    /// Write `value` to `name`. If `deref` and `name` currently resolves
    /// symbolically, the write targets the final non-symbolic name instead
    /// (write-through, §4.2) so that committing on a branch moves the branch,
    /// not `HEAD`, while `HEAD` stays attached.
    pub fn update_ref(&self, name: &str, value: Oid, deref: bool) -> anyhow::Result<()> {
        let target = if deref { self.resolve_symbolic(name)? } else { name.to_owned() };
        self.write_raw(&target, &Ref::Direct(value))
    }

    /// Write a literal symbolic value to `name` (e.g. checkout onto a branch).
    pub fn set_symbolic(&self, name: &str, target: &str) -> anyhow::Result<()> {
        self.write_raw(name, &Ref::Symbolic(target.to_owned()))
    }

    pub fn delete_ref(&self, name: &str) -> anyhow::Result<()> {
        let path = self.path_for(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("failed to delete `{}`", path.display())),
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).exists()
    }

    /// Yield `(name, resolved)` for every ref under `refs/` and the root
    /// well-known names, in unspecified order.
    pub fn iter_refs(&self, prefix: &str) -> anyhow::Result<Vec<(String, Oid)>> {
        let dir = self.path_for(prefix);
        let mut out = Vec::new();
        if !dir.exists() {
            return Ok(out);
        }
        for entry in walkdir::WalkDir::new(&dir).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap()
                .to_str()
                .ok_or_else(|| anyhow!("non-utf8 ref path"))?
                .replace(std::path::MAIN_SEPARATOR, "/");
            if let Some(oid) = self.get_ref(&rel)?.value {
                out.push((rel, oid));
            }
        }
        Ok(out)
    }
}

pub const HEAD: &str = "HEAD";
pub const MERGE_HEAD: &str = "MERGE_HEAD";
pub const ORIG_HEAD: &str = "ORIG_HEAD";
pub const CHERRY_PICK_HEAD: &str = "CHERRY_PICK_HEAD";

pub fn branch_ref(name: &str) -> String {
    format!("refs/heads/{}", name)
}

pub fn tag_ref(name: &str) -> String {
    format!("refs/tags/{}", name)
}

pub fn remote_ref(name: &str) -> String {
    format!("refs/remote/{}", name)
}
