//! `cherry-pick` (§4.7), plus the `apply_commit`/`finish_apply` helpers
//! shared with `rebase`'s replay loop.
//!
//! Grounded on `repository.py`'s `cherry_pick`/`_apply_commit`/`_finish_apply`
//! (the teacher's `cherrypick.rs`/`merge.rs` contribute only the general
//! "set a transient ref, delegate to a shared apply routine" shape).

use anyhow::anyhow;

use crate::error::CoreError;
use crate::hash::Oid;
use crate::index::{checkout_index, has_conflicts, index_from_flat_tree, read_tree_flat};
use crate::merge::merge_trees;
use crate::refs;
use crate::repo::{Repository, RepoState};

/// Outcome of applying one commit onto `HEAD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Conflicts(Vec<String>),
    Skipped,
    Applied(Oid),
}

fn check_clean_working_tree(repo: &Repository) -> anyhow::Result<()> {
    let clean = repo.with_index(|index| {
        if has_conflicts(index) {
            return Ok(false);
        }
        let clean_view = crate::index::clean_view(index);
        let scanned = crate::index::scan_working_tree(&repo.odb(), repo.workdir(), repo.store_dir_name())?;
        Ok(clean_view == scanned)
    })?;
    if !clean {
        anyhow::bail!(CoreError::DirtyWorkingTree { action: "cherry-pick or rebase" });
    }
    Ok(())
}

/// Merge `c`'s changes (against its first parent's tree) into `HEAD`,
/// updating the working tree either way, then hand off to
/// [`finish_apply`] if the merge produced no conflicts.
pub(crate) fn apply_commit(repo: &Repository, c: Oid) -> anyhow::Result<ApplyOutcome> {
    let odb = repo.odb();
    let commit = odb.read_commit(c)?;
    let parent = *commit
        .parents
        .first()
        .ok_or_else(|| anyhow!(CoreError::InvalidInput("cannot apply a root commit".to_owned())))?;

    let head = repo.refs().fully_resolve(refs::HEAD)?;
    let base_tree = read_tree_flat(&odb, odb.read_commit(parent)?.tree)?;
    let head_tree = read_tree_flat(&odb, odb.read_commit(head)?.tree)?;
    let other_tree = read_tree_flat(&odb, commit.tree)?;

    let (merged_index, conflicts) = merge_trees(&odb, &base_tree, &head_tree, &other_tree, "HEAD", "commit")?;
    checkout_index(&odb, repo.workdir(), repo.store_dir_name(), &merged_index)?;
    repo.with_index_mut(|index| {
        *index = merged_index;
        Ok(())
    })?;

    if !conflicts.is_empty() {
        return Ok(ApplyOutcome::Conflicts(conflicts));
    }
    finish_apply(repo, c)
}

/// Write the (now conflict-free) index as a tree; if it equals `HEAD`'s tree
/// the apply is empty (restore the working tree to `HEAD` and skip),
/// otherwise commit it preserving `c`'s author/message.
pub(crate) fn finish_apply(repo: &Repository, c: Oid) -> anyhow::Result<ApplyOutcome> {
    let odb = repo.odb();
    let new_tree = repo.with_index(|index| crate::index::write_tree(&odb, index))?;

    let head = repo.refs().fully_resolve(refs::HEAD)?;
    let head_commit = odb.read_commit(head)?;

    if new_tree == head_commit.tree {
        let flat = read_tree_flat(&odb, head_commit.tree)?;
        let head_index = index_from_flat_tree(flat);
        checkout_index(&odb, repo.workdir(), repo.store_dir_name(), &head_index)?;
        repo.with_index_mut(|index| {
            *index = head_index;
            Ok(())
        })?;
        return Ok(ApplyOutcome::Skipped);
    }

    let applied = odb.read_commit(c)?;
    let oid = crate::commit::commit(repo, &applied.message, Some(applied.author), false)?;
    Ok(ApplyOutcome::Applied(oid))
}

fn cleanup(repo: &Repository) -> anyhow::Result<()> {
    let refs = repo.refs();
    refs.delete_ref(refs::CHERRY_PICK_HEAD)?;
    refs.delete_ref(refs::ORIG_HEAD)?;
    Ok(())
}

/// `cherry_pick(commit_oid)` (§4.7).
pub fn cherry_pick(repo: &Repository, commit_oid: Oid) -> anyhow::Result<ApplyOutcome> {
    if repo.state() != RepoState::Clean {
        anyhow::bail!(CoreError::OperationInProgress { operation: repo.state().name() });
    }
    check_clean_working_tree(repo)?;

    let odb = repo.odb();
    let c = odb.read_commit(commit_oid)?;
    if c.parents.is_empty() {
        anyhow::bail!(CoreError::InvalidInput("cannot cherry-pick a root commit".to_owned()));
    }
    if c.parents.len() > 1 {
        anyhow::bail!(CoreError::InvalidInput(format!("{} is a merge commit", commit_oid)));
    }

    let refs = repo.refs();
    let head = refs.fully_resolve(refs::HEAD)?;
    refs.update_ref(refs::ORIG_HEAD, head, false)?;

    let outcome = apply_commit(repo, commit_oid)?;
    match &outcome {
        ApplyOutcome::Conflicts(_) => {
            refs.update_ref(refs::CHERRY_PICK_HEAD, commit_oid, false)?;
        }
        ApplyOutcome::Skipped | ApplyOutcome::Applied(_) => cleanup(repo)?,
    }
    Ok(outcome)
}

/// `cherry_pick_continue()` (§4.7).
pub fn cherry_pick_continue(repo: &Repository) -> anyhow::Result<ApplyOutcome> {
    let cherry_pick_head = repo
        .refs()
        .get_ref(refs::CHERRY_PICK_HEAD)?
        .value
        .ok_or_else(|| anyhow!(CoreError::InvalidInput("no cherry-pick in progress".to_owned())))?;
    repo.with_index(|index| {
        if has_conflicts(index) {
            anyhow::bail!(CoreError::ConflictInIndex { action: "continue cherry-pick" });
        }
        Ok(())
    })?;

    let outcome = finish_apply(repo, cherry_pick_head)?;
    cleanup(repo)?;
    Ok(outcome)
}

/// `cherry_pick_abort()` (§4.7).
pub fn cherry_pick_abort(repo: &Repository) -> anyhow::Result<()> {
    let refs = repo.refs();
    if !refs.exists(refs::CHERRY_PICK_HEAD) {
        anyhow::bail!(CoreError::InvalidInput("no cherry-pick in progress".to_owned()));
    }
    let orig_head = refs.fully_resolve(refs::ORIG_HEAD)?;
    crate::reset::reset(repo, orig_head, crate::reset::ResetMode::Hard)?;
    cleanup(repo)
}
