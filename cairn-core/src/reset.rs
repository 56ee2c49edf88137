//! `reset` (§4.7). Default mode is `Soft` (DESIGN.md Open Question #1 — a
//! deliberate departure from the teacher's `Mixed` default).

use crate::hash::Oid;
use crate::index::{checkout_index, index_from_flat_tree, read_tree_flat};
use crate::refs;
use crate::repo::Repository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    Soft,
    Mixed,
    Hard,
}

impl Default for ResetMode {
    fn default() -> Self {
        ResetMode::Soft
    }
}

pub fn reset(repo: &Repository, oid: Oid, mode: ResetMode) -> anyhow::Result<()> {
    let refs = repo.refs();
    refs.update_ref(refs::HEAD, oid, true)?;

    if mode == ResetMode::Soft {
        return Ok(());
    }

    let odb = repo.odb();
    let commit = odb.read_commit(oid)?;
    let flat = read_tree_flat(&odb, commit.tree)?;
    let new_index = index_from_flat_tree(flat);

    if mode == ResetMode::Hard {
        checkout_index(&odb, repo.workdir(), repo.store_dir_name(), &new_index)?;
    }

    repo.with_index_mut(|index| {
        *index = new_index;
        Ok(())
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::commit;
    use crate::index::IndexEntry;
    use crate::obj::ObjKind;

    fn make_commit(repo: &Repository, path: &str, content: &[u8], message: &str) -> Oid {
        let odb = repo.odb();
        let blob = odb.write(ObjKind::Blob, content).unwrap();
        repo.with_index_mut(|index| {
            index.insert(path.into(), IndexEntry::Clean { oid: blob });
            Ok(())
        })
        .unwrap();
        commit(repo, message, None, true).unwrap()
    }

    #[test]
    fn soft_reset_only_moves_head() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let first = make_commit(&repo, "f.txt", b"one", "first");
        make_commit(&repo, "g.txt", b"two", "second");

        reset(&repo, first, ResetMode::Soft).unwrap();

        assert_eq!(repo.refs().get_ref(refs::HEAD).unwrap().value, Some(first));
        repo.with_index(|index| {
            assert!(index.contains_key("g.txt"));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn mixed_reset_moves_head_and_overwrites_index_but_not_working_tree() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let first = make_commit(&repo, "f.txt", b"one", "first");
        make_commit(&repo, "g.txt", b"two", "second");

        reset(&repo, first, ResetMode::Mixed).unwrap();

        repo.with_index(|index| {
            assert!(!index.contains_key("g.txt"));
            Ok(())
        })
        .unwrap();
        assert!(repo.workdir().join("g.txt").exists());
    }

    #[test]
    fn hard_reset_also_materializes_working_tree() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let first = make_commit(&repo, "f.txt", b"one", "first");
        make_commit(&repo, "g.txt", b"two", "second");

        reset(&repo, first, ResetMode::Hard).unwrap();

        assert!(!repo.workdir().join("g.txt").exists());
        assert!(repo.workdir().join("f.txt").exists());
    }
}
