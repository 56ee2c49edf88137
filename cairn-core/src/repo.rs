//! The `Repository` handle (§10.1): the explicit struct threaded through
//! every operation in place of the teacher's arena/`SyncOnceCell`-cached
//! `RepoCtxt`/`BitRepo<'rcx>` (see DESIGN.md departures).

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use crate::config::ConfigStore;
use crate::index::Index;
use crate::lockfile::Filelock;
use crate::odb::ObjectStore;
use crate::refs::{self, RefStore};

pub const STORE_DIR_NAME: &str = ".cairn";
const OBJECTS_DIR: &str = "objects";
const INDEX_FILE: &str = "index";
const CONFIG_FILE: &str = "config";
const REBASE_STATE_FILE: &str = "REBASE_STATE";
pub const DEFAULT_BRANCH: &str = "master";

/// The operation currently in progress, derived from transient-ref/state-file
/// presence rather than stored explicitly (§10.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoState {
    Clean,
    Merging,
    CherryPicking,
    Rebasing,
}

impl RepoState {
    pub fn name(&self) -> &'static str {
        match self {
            RepoState::Clean => "clean",
            RepoState::Merging => "merge",
            RepoState::CherryPicking => "cherry-pick",
            RepoState::Rebasing => "rebase",
        }
    }
}

pub struct Repository {
    workdir: PathBuf,
    store_root: PathBuf,
    config: ConfigStore,
}

impl Repository {
    /// Create a fresh store under `workdir/.cairn`, with `HEAD` symbolically
    /// pointing at the (not-yet-existent) default branch.
    pub fn init(workdir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let workdir = workdir.as_ref().to_path_buf();
        std::fs::create_dir_all(&workdir)?;
        let workdir = workdir.canonicalize().context("failed to resolve workdir")?;
        let store_root = workdir.join(STORE_DIR_NAME);

        if store_root.exists() {
            bail!("`{}` already exists", store_root.display());
        }
        std::fs::create_dir_all(store_root.join(OBJECTS_DIR))?;

        let repo = Self { workdir, store_root: store_root.clone(), config: ConfigStore::new(store_root.join(CONFIG_FILE)) };
        repo.refs().set_symbolic(refs::HEAD, &refs::branch_ref(DEFAULT_BRANCH))?;
        log::debug!("initialized repository at {}", repo.store_root.display());
        Ok(repo)
    }

    /// Discover an existing repository by walking `start` and its ancestors
    /// looking for a `.cairn` directory.
    pub fn find(start: impl AsRef<Path>) -> anyhow::Result<Self> {
        let start = start.as_ref().canonicalize().context("failed to resolve starting directory")?;
        let mut current = start.as_path();
        loop {
            let candidate = current.join(STORE_DIR_NAME);
            if candidate.is_dir() {
                let workdir = current.to_path_buf();
                return Ok(Self {
                    workdir,
                    store_root: candidate.clone(),
                    config: ConfigStore::new(candidate.join(CONFIG_FILE)),
                });
            }
            current = match current.parent() {
                Some(parent) => parent,
                None => bail!("not a cairn repository (or any of the parent directories): `{}`", start.display()),
            };
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn store_root(&self) -> &Path {
        &self.store_root
    }

    pub fn store_dir_name(&self) -> &str {
        STORE_DIR_NAME
    }

    pub fn odb(&self) -> ObjectStore {
        ObjectStore::new(self.store_root.join(OBJECTS_DIR))
    }

    pub fn refs(&self) -> RefStore {
        RefStore::new(&self.store_root)
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    fn index_path(&self) -> PathBuf {
        self.store_root.join(INDEX_FILE)
    }

    pub fn rebase_state_path(&self) -> PathBuf {
        self.store_root.join(REBASE_STATE_FILE)
    }

    pub fn state(&self) -> RepoState {
        let refs = self.refs();
        if refs.exists(refs::MERGE_HEAD) {
            RepoState::Merging
        } else if refs.exists(refs::CHERRY_PICK_HEAD) {
            RepoState::CherryPicking
        } else if self.rebase_state_path().exists() {
            RepoState::Rebasing
        } else {
            RepoState::Clean
        }
    }

    /// Load the index and hand the closure a read-only view.
    pub fn with_index<R>(&self, f: impl FnOnce(&Index) -> anyhow::Result<R>) -> anyhow::Result<R> {
        let lock = Filelock::<Index>::lock(self.index_path())?;
        f(&lock)
    }

    /// Load the index, hand the closure a mutable view, and persist the
    /// result via the lockfile commit protocol — unless the closure errors,
    /// in which case the lock is rolled back.
    pub fn with_index_mut<R>(&self, f: impl FnOnce(&mut Index) -> anyhow::Result<R>) -> anyhow::Result<R> {
        let mut lock = Filelock::<Index>::lock(self.index_path())?;
        match f(lock.get_mut()) {
            Ok(r) => Ok(r),
            Err(err) => {
                lock.rollback();
                Err(err)
            }
        }
    }
}
