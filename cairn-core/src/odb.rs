//! Content-addressed object storage, loose objects only (§4.1).
//!
//! Packfiles and delta compression are out of scope (§1 non-goals); every
//! object lives as its own deflate-compressed file under `objects/<xx>/<38hex>`.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::{debug, trace};

use crate::error::CoreError;
use crate::hash::Oid;
use crate::obj::{Object, ObjKind};

pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn obj_path(&self, oid: Oid) -> PathBuf {
        let hex = oid.to_string();
        self.root.join(&hex[..2]).join(&hex[2..])
    }

    pub fn exists(&self, oid: Oid) -> bool {
        self.obj_path(oid).exists()
    }

    /// Compute the OID of `(kind, payload)` and write it if absent. Idempotent:
    /// an existing file is never rewritten, so concurrent writers racing to
    /// create the same object never tear each other's writes.
    pub fn write(&self, kind: ObjKind, payload: &[u8]) -> anyhow::Result<Oid> {
        let oid = Oid::hash(kind, payload);
        let path = self.obj_path(oid);
        if path.exists() {
            trace!("object {} already exists, not rewriting", oid);
            return Ok(oid);
        }

        let dir = path.parent().expect("object path always has a parent");
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create object directory `{}`", dir.display()))?;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(kind.as_str().as_bytes())?;
        encoder.write_all(b"\0")?;
        encoder.write_all(payload)?;
        let compressed = encoder.finish()?;

        let tmp_path = dir.join(format!(".{}.tmp", std::process::id()));
        fs::write(&tmp_path, &compressed)
            .with_context(|| format!("failed to write `{}`", tmp_path.display()))?;
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("failed to rename into place `{}`", path.display()))?;

        debug!("wrote object {} ({})", oid, kind);
        Ok(oid)
    }

    pub fn write_object(&self, object: &Object) -> anyhow::Result<Oid> {
        self.write(object.kind(), &object.encode_payload())
    }

    /// Read and inflate an object, verifying its header against `expected_kind`
    /// when given.
    pub fn read(&self, oid: Oid, expected_kind: Option<ObjKind>) -> anyhow::Result<Object> {
        let path = self.obj_path(oid);
        let compressed = fs::read(&path)
            .map_err(|_| anyhow!(CoreError::MissingObject(oid)))
            .with_context(|| format!("reading object `{}`", oid))?;

        let mut decoder = ZlibDecoder::new(compressed.as_slice());
        let mut raw = Vec::new();
        decoder
            .read_to_end(&mut raw)
            .map_err(|err| anyhow!(CoreError::CorruptObject(oid, err.to_string())))?;

        let nul = raw
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| anyhow!(CoreError::CorruptObject(oid, "missing type header".into())))?;
        let kind_str = std::str::from_utf8(&raw[..nul])
            .map_err(|err| anyhow!(CoreError::CorruptObject(oid, err.to_string())))?;
        let kind: ObjKind = kind_str
            .parse()
            .map_err(|_| anyhow!(CoreError::CorruptObject(oid, format!("unknown type `{}`", kind_str))))?;

        if let Some(expected) = expected_kind {
            if kind != expected {
                return Err(anyhow!(CoreError::WrongType {
                    oid,
                    expected: expected.as_str(),
                    found: kind.as_str(),
                }));
            }
        }

        let payload = &raw[nul + 1..];
        Object::parse(kind, payload)
            .map_err(|err| anyhow!(CoreError::CorruptObject(oid, err.to_string())))
    }

    pub fn read_blob(&self, oid: Oid) -> anyhow::Result<Vec<u8>> {
        self.read(oid, Some(ObjKind::Blob))?.into_blob()
    }

    pub fn read_tree(&self, oid: Oid) -> anyhow::Result<crate::obj::Tree> {
        self.read(oid, Some(ObjKind::Tree))?.into_tree()
    }

    pub fn read_commit(&self, oid: Oid) -> anyhow::Result<crate::obj::Commit> {
        self.read(oid, Some(ObjKind::Commit))?.into_commit()
    }

    /// File-copy of a single object into another store, used by the (out of
    /// scope) remote collaborator; a no-op if the destination already has it.
    pub fn copy_to(&self, oid: Oid, other: &ObjectStore) -> anyhow::Result<()> {
        if other.exists(oid) {
            return Ok(());
        }
        let bytes = fs::read(self.obj_path(oid))
            .map_err(|_| anyhow!(CoreError::MissingObject(oid)))?;
        let dest = other.obj_path(oid);
        fs::create_dir_all(dest.parent().unwrap())?;
        fs::write(dest, bytes)?;
        Ok(())
    }

    pub fn copy_from(&self, oid: Oid, other: &ObjectStore) -> anyhow::Result<()> {
        other.copy_to(oid, self)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
