//! Three-way tree merge (§4.6): the conflict-detection decision table over
//! flat `path → oid` maps, falling back to [`crate::xdiff::three_way_merge`]
//! only for the paths the table can't resolve on its own.
//!
//! Grounded directly on `diff_engine.py`'s `merge_trees`/`compare_trees`; the
//! table's case order here mirrors that function's case order so the two can
//! be read side by side.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::anyhow;

use crate::error::CoreError;
use crate::graph;
use crate::hash::Oid;
use crate::index::{checkout_index, has_conflicts, read_tree_flat, ConflictType, Index, IndexEntry};
use crate::obj::ObjKind;
use crate::odb::ObjectStore;
use crate::refs;
use crate::repo::Repository;
use crate::reset::{reset, ResetMode};
use crate::xdiff::three_way_merge;

/// Outcome of merging one path: `Clean(oid)`, `Deleted` (both sides agree the
/// path should vanish), or `Conflict` (needs manual resolution).
enum Resolution {
    Clean(Oid),
    Deleted,
    Conflict { ctype: ConflictType, base: Option<Oid>, head: Option<Oid>, other: Option<Oid> },
}

fn resolve_path(base: Option<Oid>, head: Option<Oid>, other: Option<Oid>) -> Resolution {
    match (base, head, other) {
        // both sides deleted
        (_, None, None) => Resolution::Deleted,

        // only one side added it
        (None, Some(h), None) => Resolution::Clean(h),
        (None, None, Some(o)) => Resolution::Clean(o),

        // delete accepted: one side deleted, the other left it unchanged
        (Some(b), None, Some(o)) if o == b => Resolution::Deleted,
        (Some(b), Some(h), None) if h == b => Resolution::Deleted,

        // only one side modified
        (Some(b), Some(h), Some(o)) if h == b && o != b => Resolution::Clean(o),
        (Some(b), Some(h), Some(o)) if o == b && h != b => Resolution::Clean(h),
        (Some(_), Some(h), Some(o)) if h == o => Resolution::Clean(h),

        // add/add identical content
        (None, Some(h), Some(o)) if h == o => Resolution::Clean(h),

        // everything else needs diff3
        (None, Some(_), Some(_)) =>
            Resolution::Conflict { ctype: ConflictType::AddAdd, base, head, other },
        (Some(_), None, Some(_)) => Resolution::Conflict {
            ctype: ConflictType::CurrentDeleteTargetModify,
            base,
            head,
            other,
        },
        (Some(_), Some(_), None) => Resolution::Conflict {
            ctype: ConflictType::CurrentModifyTargetDelete,
            base,
            head,
            other,
        },
        (Some(_), Some(_), Some(_)) =>
            Resolution::Conflict { ctype: ConflictType::ContentConflict, base, head, other },
        (None, None, None) => unreachable!("caught by both-deleted case above"),
    }
}

/// Merge three flat tree views into an index plus the list of conflicted
/// paths. `label_head`/`label_other` name the two non-base sides for the
/// conflict markers written into conflicted blobs.
pub fn merge_trees(
    odb: &ObjectStore,
    base: &BTreeMap<String, Oid>,
    head: &BTreeMap<String, Oid>,
    other: &BTreeMap<String, Oid>,
    label_head: &str,
    label_other: &str,
) -> anyhow::Result<(Index, Vec<String>)> {
    let paths: BTreeSet<&String> = base.keys().chain(head.keys()).chain(other.keys()).collect();

    let mut index = Index::new();
    let mut conflicts = Vec::new();

    for path in paths {
        let resolution = resolve_path(base.get(path).copied(), head.get(path).copied(), other.get(path).copied());
        match resolution {
            Resolution::Deleted => {}
            Resolution::Clean(oid) => {
                index.insert(path.clone(), IndexEntry::Clean { oid });
            }
            Resolution::Conflict { ctype, base: b, head: h, other: o } => {
                let base_bytes = b.map(|oid| odb.read_blob(oid)).transpose()?.unwrap_or_default();
                let head_bytes = h.map(|oid| odb.read_blob(oid)).transpose()?.unwrap_or_default();
                let other_bytes = o.map(|oid| odb.read_blob(oid)).transpose()?.unwrap_or_default();

                let (merged_bytes, has_conflict) =
                    three_way_merge(&base_bytes, &head_bytes, &other_bytes, label_head, "base", label_other);
                let merged_oid = odb.write(ObjKind::Blob, &merged_bytes)?;

                if has_conflict {
                    index.insert(
                        path.clone(),
                        IndexEntry::Conflict { ctype, merged_oid, base_oid: b, head_oid: h, other_oid: o },
                    );
                    conflicts.push(path.clone());
                } else {
                    index.insert(path.clone(), IndexEntry::Clean { oid: merged_oid });
                }
            }
        }
    }

    Ok((index, conflicts))
}

/// Result of [`merge`]: whether history advanced by fast-forward, the merge
/// produced conflicts the user must resolve, or produced a clean merge ready
/// to `commit`.
pub enum MergeOutcome {
    FastForward(Oid),
    Conflicts(Vec<String>),
    Merged,
}

/// `merge(other_oid)` (§4.7).
pub fn merge(repo: &Repository, other: Oid) -> anyhow::Result<MergeOutcome> {
    let refs = repo.refs();
    if refs.exists(refs::MERGE_HEAD) {
        anyhow::bail!(CoreError::OperationInProgress { operation: "merge" });
    }
    let head = refs.fully_resolve(refs::HEAD)?;
    repo.with_index(|index| {
        if has_conflicts(index) {
            anyhow::bail!(CoreError::ConflictInIndex { action: "merge" });
        }
        Ok(())
    })?;

    let odb = repo.odb();
    let base = graph::merge_base(&odb, other, head)?
        .ok_or_else(|| anyhow!(CoreError::NoCommonHistory { action: "merge" }))?;

    if base == head {
        reset(repo, other, ResetMode::Hard)?;
        return Ok(MergeOutcome::FastForward(other));
    }

    refs.update_ref(refs::MERGE_HEAD, other, false)?;
    refs.update_ref(refs::ORIG_HEAD, head, false)?;

    let base_commit = odb.read_commit(base)?;
    let head_commit = odb.read_commit(head)?;
    let other_commit = odb.read_commit(other)?;

    let base_tree = read_tree_flat(&odb, base_commit.tree)?;
    let head_tree = read_tree_flat(&odb, head_commit.tree)?;
    let other_tree = read_tree_flat(&odb, other_commit.tree)?;

    let (merged_index, conflicts) =
        merge_trees(&odb, &base_tree, &head_tree, &other_tree, "HEAD", "MERGE_HEAD")?;

    checkout_index(&odb, repo.workdir(), repo.store_dir_name(), &merged_index)?;
    repo.with_index_mut(|index| {
        *index = merged_index;
        Ok(())
    })?;

    if conflicts.is_empty() {
        Ok(MergeOutcome::Merged)
    } else {
        Ok(MergeOutcome::Conflicts(conflicts))
    }
}

/// `merge_abort()` (§4.7).
pub fn merge_abort(repo: &Repository) -> anyhow::Result<()> {
    let refs = repo.refs();
    if !refs.exists(refs::MERGE_HEAD) {
        anyhow::bail!(CoreError::InvalidInput("no merge in progress (MERGE_HEAD not set)".to_owned()));
    }
    let orig_head = refs.fully_resolve(refs::ORIG_HEAD)?;
    reset(repo, orig_head, ResetMode::Hard)?;
    refs.delete_ref(refs::MERGE_HEAD)?;
    refs.delete_ref(refs::ORIG_HEAD)?;
    Ok(())
}
