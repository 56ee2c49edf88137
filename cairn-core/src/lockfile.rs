//! Rename-into-place commit protocol for ref/index/config/rebase-state files
//! (concurrency model §5): writers create an exclusive sibling `<path>.lock`
//! file, write the new contents, then rename it over the target. A lockfile
//! dropped without an explicit commit rolls back (removes the sibling), so a
//! panic or an early `?` return during a read-modify-write never leaves a
//! torn file.

use std::cell::Cell;
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

const LOCK_FILE_EXT: &str = "lock";

pub struct Lockfile {
    lockfile: File,
    path: PathBuf,
    lockfile_path: PathBuf,
    committed: Cell<bool>,
    rolled_back: Cell<bool>,
}

impl Write for Lockfile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lockfile.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lockfile.flush()
    }
}

impl Lockfile {
    fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let lockfile_path = path.with_extension(LOCK_FILE_EXT);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let lockfile = File::options()
            .create_new(true)
            .write(true)
            .open(&lockfile_path)
            .with_context(|| {
                format!(
                    "failed to lock `{}` (`{}` already exists; another operation may be in progress)",
                    path.display(),
                    lockfile_path.display()
                )
            })?;

        Ok(Self {
            lockfile,
            path: path.to_path_buf(),
            lockfile_path,
            committed: Cell::new(false),
            rolled_back: Cell::new(false),
        })
    }

    pub fn with_mut<R>(
        path: impl AsRef<Path>,
        f: impl FnOnce(&mut Self) -> anyhow::Result<R>,
    ) -> anyhow::Result<R> {
        let mut lockfile = Self::open(path)?;
        match f(&mut lockfile) {
            Ok(r) => {
                lockfile.commit()?;
                Ok(r)
            }
            Err(err) => {
                lockfile.rollback();
                Err(err)
            }
        }
    }

    fn commit(&self) -> anyhow::Result<()> {
        if self.rolled_back.get() {
            return Ok(());
        }
        fs::rename(&self.lockfile_path, &self.path).with_context(|| {
            format!("failed to commit `{}` -> `{}`", self.lockfile_path.display(), self.path.display())
        })?;
        self.committed.set(true);
        Ok(())
    }

    pub fn rollback(&self) {
        self.rolled_back.set(true);
    }

    fn cleanup(&self) -> io::Result<()> {
        if self.lockfile_path.exists() {
            fs::remove_file(&self.lockfile_path)?;
        }
        Ok(())
    }
}

impl Drop for Lockfile {
    fn drop(&mut self) {
        if self.rolled_back.get() || !self.committed.get() {
            let _ = self.cleanup();
        }
    }
}

/// A JSON-backed file guarded by [`Lockfile`]: load on acquisition, mutate
/// through `DerefMut`, and the new contents are written and committed on drop
/// unless `rollback` was called — the `with_index`/`with_index_mut` pattern
/// of design note §9.
pub struct Filelock<T> {
    data: T,
    lockfile: Lockfile,
    has_changes: bool,
    rolled_back: bool,
}

impl<T: Serialize + DeserializeOwned + Default> Filelock<T> {
    pub fn lock(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let lockfile = Lockfile::open(path)?;
        let data = if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("failed to open `{}`", path.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("failed to parse `{}`", path.display()))?
        } else {
            T::default()
        };
        Ok(Self { data, lockfile, has_changes: false, rolled_back: false })
    }
}

impl<T> Filelock<T> {
    pub fn rollback(&mut self) {
        self.rolled_back = true;
        self.lockfile.rollback();
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.has_changes = true;
        &mut self.data
    }
}

impl<T: Serialize> Drop for Filelock<T> {
    fn drop(&mut self) {
        if self.rolled_back || !self.has_changes {
            return;
        }
        let result = serde_json::to_writer_pretty(&mut self.lockfile, &self.data)
            .context("failed to serialize")
            .and_then(|_| self.lockfile.commit());
        if let Err(err) = result {
            log::error!("failed to commit lockfile: {:#}", err);
        }
    }
}

impl<T> Deref for Filelock<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> DerefMut for Filelock<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.has_changes = true;
        &mut self.data
    }
}
