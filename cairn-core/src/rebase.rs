//! `rebase` (§4.7): first-parent replay of `HEAD`'s commits on top of
//! `upstream`, with a persisted, resumable state file.
//!
//! Grounded on `repository.py`'s `rebase`/`_rebase_replay_loop`/
//! `rebase_continue`/`rebase_abort`, reusing [`crate::cherrypick`]'s shared
//! apply helpers exactly as the original's `_apply_commit`/`_finish_apply`
//! are shared between cherry-pick and rebase.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::cherrypick::{apply_commit, finish_apply, ApplyOutcome};
use crate::error::CoreError;
use crate::graph;
use crate::hash::Oid;
use crate::index::has_conflicts;
use crate::refs;
use crate::repo::{Repository, RepoState};
use crate::reset::{reset, ResetMode};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebaseState {
    pub orig_head: Oid,
    pub upstream: Oid,
    pub commits: Vec<Oid>,
    pub current_index: usize,
}

fn load_state(repo: &Repository) -> anyhow::Result<Option<RebaseState>> {
    let path = repo.rebase_state_path();
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(&path)?;
    Ok(Some(serde_json::from_str(&text)?))
}

fn save_state(repo: &Repository, state: &RebaseState) -> anyhow::Result<()> {
    crate::lockfile::Lockfile::with_mut(repo.rebase_state_path(), |lockfile| {
        serde_json::to_writer_pretty(&mut *lockfile, state)?;
        Ok(())
    })
}

fn clear_state(repo: &Repository) -> anyhow::Result<()> {
    match std::fs::remove_file(repo.rebase_state_path()) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// First-parent walk from `head` back to (but excluding) `base`, reversed so
/// replay happens oldest-first.
fn commits_to_replay(repo: &Repository, base: Oid, head: Oid) -> anyhow::Result<Vec<Oid>> {
    let odb = repo.odb();
    let mut commits = Vec::new();
    let mut current = Some(head);
    while let Some(oid) = current {
        if oid == base {
            break;
        }
        commits.push(oid);
        current = odb.read_commit(oid)?.parents.first().copied();
    }
    commits.reverse();
    Ok(commits)
}

/// Outcome of starting or resuming a rebase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebaseOutcome {
    AlreadyUpToDate,
    Conflicts(Vec<String>),
    Complete,
}

/// `rebase(upstream)` (§4.7).
pub fn rebase(repo: &Repository, upstream: Oid) -> anyhow::Result<RebaseOutcome> {
    if repo.state() != RepoState::Clean {
        anyhow::bail!(CoreError::OperationInProgress { operation: repo.state().name() });
    }
    repo.with_index(|index| {
        if has_conflicts(index) {
            anyhow::bail!(CoreError::ConflictInIndex { action: "rebase" });
        }
        Ok(())
    })?;

    let refs = repo.refs();
    let head = refs.fully_resolve(refs::HEAD)?;
    let odb = repo.odb();

    let base = graph::merge_base(&odb, upstream, head)?
        .ok_or_else(|| anyhow!(CoreError::NoCommonHistory { action: "rebase" }))?;
    if base == upstream {
        return Ok(RebaseOutcome::AlreadyUpToDate);
    }

    let commits = commits_to_replay(repo, base, head)?;
    for &oid in &commits {
        if odb.read_commit(oid)?.parents.len() > 1 {
            anyhow::bail!(CoreError::InvalidInput(format!("{} is a merge commit: merge commits unsupported by rebase", oid)));
        }
    }

    let state = RebaseState { orig_head: head, upstream, commits, current_index: 0 };
    save_state(repo, &state)?;
    refs.update_ref(refs::ORIG_HEAD, head, false)?;
    reset(repo, upstream, ResetMode::Hard)?;

    replay_loop(repo)
}

fn replay_loop(repo: &Repository) -> anyhow::Result<RebaseOutcome> {
    loop {
        let mut state = match load_state(repo)? {
            Some(state) => state,
            None => return Ok(RebaseOutcome::Complete),
        };
        if state.current_index >= state.commits.len() {
            clear_state(repo)?;
            repo.refs().delete_ref(refs::ORIG_HEAD)?;
            return Ok(RebaseOutcome::Complete);
        }

        let oid = state.commits[state.current_index];
        match apply_commit(repo, oid)? {
            ApplyOutcome::Conflicts(paths) => {
                save_state(repo, &state)?;
                return Ok(RebaseOutcome::Conflicts(paths));
            }
            ApplyOutcome::Skipped | ApplyOutcome::Applied(_) => {
                state.current_index += 1;
                save_state(repo, &state)?;
            }
        }
    }
}

/// `rebase_continue()` (§4.7).
pub fn rebase_continue(repo: &Repository) -> anyhow::Result<RebaseOutcome> {
    let mut state = load_state(repo)?
        .ok_or_else(|| anyhow!(CoreError::InvalidInput("no rebase in progress".to_owned())))?;
    repo.with_index(|index| {
        if has_conflicts(index) {
            anyhow::bail!(CoreError::ConflictInIndex { action: "continue rebase" });
        }
        Ok(())
    })?;

    let oid = state.commits[state.current_index];
    finish_apply(repo, oid)?;
    state.current_index += 1;
    save_state(repo, &state)?;

    replay_loop(repo)
}

/// `rebase_abort()` (§4.7).
pub fn rebase_abort(repo: &Repository) -> anyhow::Result<()> {
    let state = load_state(repo)?
        .ok_or_else(|| anyhow!(CoreError::InvalidInput("no rebase in progress".to_owned())))?;
    reset(repo, state.orig_head, ResetMode::Hard)?;
    clear_state(repo)?;
    repo.refs().delete_ref(refs::ORIG_HEAD)?;
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
        let oid = odb.write(ObjKind::Blob, content).unwrap();
        repo.with_index_mut(|index| {
            index.insert(path.into(), IndexEntry::Clean { oid });
            Ok(())
        })
        .unwrap();
        commit(repo, message, None, true).unwrap()
    }

    #[test]
    fn rebase_replays_commits_and_completes() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let base = make_commit(&repo, "base.txt", b"base", "base");

        repo.refs().update_ref("refs/heads/upstream", base, false).unwrap();
        repo.refs().set_symbolic(refs::HEAD, "refs/heads/upstream").unwrap();
        make_commit(&repo, "up.txt", b"up", "upstream work");
        let upstream_tip = repo.refs().fully_resolve(refs::HEAD).unwrap();

        repo.refs().update_ref("refs/heads/feature", base, false).unwrap();
        repo.refs().set_symbolic(refs::HEAD, "refs/heads/feature").unwrap();
        crate::reset::reset(&repo, base, ResetMode::Hard).unwrap();
        make_commit(&repo, "f1.txt", b"one", "feature one");
        make_commit(&repo, "f2.txt", b"two", "feature two");

        let outcome = rebase(&repo, upstream_tip).unwrap();
        assert_eq!(outcome, RebaseOutcome::Complete);
        assert!(!repo.refs().exists(refs::ORIG_HEAD));
        assert!(!repo.rebase_state_path().exists());

        let new_head = repo.refs().fully_resolve(refs::HEAD).unwrap();
        let commit_count = graph::iter_commits_and_parents(&repo.odb(), [new_head]).count();
        assert_eq!(commit_count, 3);
        assert!(repo.workdir().join("up.txt").exists());
        assert!(repo.workdir().join("f1.txt").exists());
        assert!(repo.workdir().join("f2.txt").exists());
    }

    #[test]
    fn rebase_already_up_to_date_when_base_is_upstream() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let base = make_commit(&repo, "base.txt", b"base", "base");
        let outcome = rebase(&repo, base).unwrap();
        assert_eq!(outcome, RebaseOutcome::AlreadyUpToDate);
    }

    #[test]
    fn rebase_conflict_then_abort_restores_orig_head() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let base = make_commit(&repo, "f.txt", b"line1\nbase\nline3\n", "base");

        repo.refs().update_ref("refs/heads/upstream", base, false).unwrap();
        repo.refs().set_symbolic(refs::HEAD, "refs/heads/upstream").unwrap();
        make_commit(&repo, "f.txt", b"line1\nupstream\nline3\n", "upstream edit");
        let upstream_tip = repo.refs().fully_resolve(refs::HEAD).unwrap();

        repo.refs().update_ref("refs/heads/feature", base, false).unwrap();
        repo.refs().set_symbolic(refs::HEAD, "refs/heads/feature").unwrap();
        crate::reset::reset(&repo, base, ResetMode::Hard).unwrap();
        let feature_tip = make_commit(&repo, "f.txt", b"line1\nfeature\nline3\n", "feature edit");

        let outcome = rebase(&repo, upstream_tip).unwrap();
        assert!(matches!(outcome, RebaseOutcome::Conflicts(_)));
        assert!(repo.rebase_state_path().exists());

        rebase_abort(&repo).unwrap();
        assert!(!repo.rebase_state_path().exists());
        assert!(!repo.refs().exists(refs::ORIG_HEAD));
        assert_eq!(repo.refs().fully_resolve(refs::HEAD).unwrap(), feature_tip);
    }

    #[test]
    fn rebase_rejects_a_merge_commit_in_the_replay_list() {
        use crate::obj::{Commit, Object};

        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let base = make_commit(&repo, "base.txt", b"base", "base");

        repo.refs().update_ref("refs/heads/upstream", base, false).unwrap();
        repo.refs().set_symbolic(refs::HEAD, "refs/heads/upstream").unwrap();
        let upstream_tip = make_commit(&repo, "up.txt", b"up", "upstream work");

        repo.refs().update_ref("refs/heads/feature", base, false).unwrap();
        repo.refs().set_symbolic(refs::HEAD, "refs/heads/feature").unwrap();
        crate::reset::reset(&repo, base, ResetMode::Hard).unwrap();
        let side = make_commit(&repo, "side.txt", b"side", "side work");

        let odb = repo.odb();
        let parent_commit = odb.read_commit(side).unwrap();
        let merge_commit = odb
            .write_object(&Object::Commit(Commit {
                tree: parent_commit.tree,
                parents: vec![side, base],
                author: parent_commit.author.clone(),
                committer: parent_commit.committer.clone(),
                message: "a merge commit".into(),
            }))
            .unwrap();
        repo.refs().update_ref(refs::HEAD, merge_commit, true).unwrap();

        let err = rebase(&repo, upstream_tip).unwrap_err();
        assert!(err.to_string().contains("merge commit"));
    }

    #[test]
    fn rebase_of_unrelated_histories_is_rejected() {
        use crate::obj::{Commit, Object};
        use crate::signature::{Signature, Time};

        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let odb = repo.odb();

        let sig = Signature { name: "t".into(), email: "t@example.com".into(), time: Time { seconds: 0, tz_offset_minutes: 0 } };
        let tree_a = odb.write(crate::obj::ObjKind::Tree, b"").unwrap();
        let tree_b = odb.write(crate::obj::ObjKind::Tree, b"other").unwrap();
        let root_a = odb
            .write_object(&Object::Commit(Commit {
                tree: tree_a,
                parents: vec![],
                author: sig.clone(),
                committer: sig.clone(),
                message: "a".into(),
            }))
            .unwrap();
        let root_b = odb
            .write_object(&Object::Commit(Commit { tree: tree_b, parents: vec![], author: sig.clone(), committer: sig, message: "b".into() }))
            .unwrap();

        repo.refs().update_ref(refs::HEAD, root_a, true).unwrap();
        let err = rebase(&repo, root_b).unwrap_err();
        assert!(err.to_string().contains("no common history"));
    }
}
