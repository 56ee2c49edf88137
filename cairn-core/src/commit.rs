//! `commit` (§4.7).

use anyhow::anyhow;

use crate::error::CoreError;
use crate::hash::Oid;
use crate::index::{has_conflicts, write_tree};
use crate::obj::{Commit, Object};
use crate::refs;
use crate::repo::Repository;
use crate::signature::Signature;

/// Write the staged index as a tree and commit it on top of `HEAD` (and
/// `MERGE_HEAD`, if `allow_merge_parent` and one is pending).
///
/// `author_override` lets history operations (cherry-pick, rebase) preserve
/// the original commit's author while stamping a fresh committer identity.
pub fn commit(
    repo: &Repository,
    message: &str,
    author_override: Option<Signature>,
    allow_merge_parent: bool,
) -> anyhow::Result<Oid> {
    let odb = repo.odb();
    let refs = repo.refs();

    let tree = repo.with_index(|index| {
        if has_conflicts(index) {
            anyhow::bail!(CoreError::ConflictInIndex { action: "commit" });
        }
        write_tree(&odb, index)
    })?;

    let mut parents = Vec::new();
    if let Some(head) = refs.get_ref(refs::HEAD)?.value {
        parents.push(head);
    }
    let merge_head = refs.get_ref(refs::MERGE_HEAD)?.value;
    let consumed_merge_parent = allow_merge_parent && merge_head.is_some();
    if consumed_merge_parent {
        parents.push(merge_head.unwrap());
    }

    let committer = Signature::now(repo.config().user_name()?, repo.config().user_email()?);
    let author = author_override.unwrap_or_else(|| committer.clone());

    let commit =
        Commit { tree, parents, author, committer, message: message.to_owned() };
    let oid = odb.write_object(&Object::Commit(commit))?;

    refs.update_ref(refs::HEAD, oid, true)?;
    log::debug!("committed {} on top of {:?}", oid, refs.get_ref(refs::HEAD)?.value);

    if consumed_merge_parent {
        refs.delete_ref(refs::MERGE_HEAD)?;
        refs.delete_ref(refs::ORIG_HEAD)?;
    }

    Ok(oid)
}
