//! `checkout` (§4.7).

use crate::error::CoreError;
use crate::hash::Oid;
use crate::index::{checkout_index, has_conflicts, index_from_flat_tree, read_tree_flat};
use crate::refs;
use crate::repo::Repository;
use crate::rev::{branch_name, resolve_rev};

/// Resolve `name`, materialize its tree into the index (all clean) and the
/// working tree, and point `HEAD` at it — symbolically if `name` names a
/// branch, direct (detached) otherwise.
pub fn checkout(repo: &Repository, name: &str) -> anyhow::Result<Oid> {
    let odb = repo.odb();
    let refs = repo.refs();

    repo.with_index(|index| {
        if has_conflicts(index) {
            anyhow::bail!(CoreError::ConflictInIndex { action: "checkout" });
        }
        Ok(())
    })?;

    let oid = resolve_rev(&refs, name)?;
    let commit = odb.read_commit(oid)?;
    let flat = read_tree_flat(&odb, commit.tree)?;
    let new_index = index_from_flat_tree(flat);

    checkout_index(&odb, repo.workdir(), repo.store_dir_name(), &new_index)?;
    repo.with_index_mut(|index| {
        *index = new_index;
        Ok(())
    })?;

    match branch_name(&refs, name) {
        Some(branch) => refs.set_symbolic(refs::HEAD, &refs::branch_ref(branch))?,
        None => refs.update_ref(refs::HEAD, oid, false)?,
    }

    log::debug!("checked out {} ({})", name, oid);
    Ok(oid)
}
