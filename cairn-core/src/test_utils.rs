//! Shared scaffolding for integration-style tests across the crate (§10.7):
//! a throwaway repository plus a one-line commit helper, so scenario tests
//! don't each re-derive the init/add/commit boilerplate.

use std::path::Path;

use tempfile::TempDir;

use crate::hash::Oid;
use crate::index::IndexEntry;
use crate::obj::ObjKind;
use crate::repo::Repository;

/// A `Repository` backed by a `TempDir` that is removed when dropped.
pub(crate) struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Self { dir, repo }
    }

    pub fn workdir(&self) -> &Path {
        self.repo.workdir()
    }

    /// Write `content` to `path` in the working tree and stage it.
    pub fn write_and_add(&self, path: &str, content: &[u8]) {
        let full = self.repo.workdir().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full, content).unwrap();
        crate::add::add(&self.repo, &[full]).unwrap();
    }

    /// Stage `path -> content` directly (bypassing the filesystem) and
    /// return its blob OID.
    pub fn stage_blob(&self, path: &str, content: &[u8]) -> Oid {
        let oid = self.repo.odb().write(ObjKind::Blob, content).unwrap();
        self.repo
            .with_index_mut(|index| {
                index.insert(path.to_owned(), IndexEntry::Clean { oid });
                Ok(())
            })
            .unwrap();
        oid
    }

    /// Stage `path -> content` and commit it in one step.
    pub fn commit_file(&self, path: &str, content: &[u8], message: &str) -> Oid {
        self.stage_blob(path, content);
        crate::commit::commit(&self.repo, message, None, true).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_file_produces_a_readable_commit() {
        let repo = TestRepo::new();
        let oid = repo.commit_file("f.txt", b"hello", "initial");
        let commit = repo.repo.odb().read_commit(oid).unwrap();
        assert_eq!(commit.message, "initial");
        assert!(commit.parents.is_empty());
    }
}
