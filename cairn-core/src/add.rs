//! `add` (§4.7): the public repository-level entry point over
//! [`crate::index::add_paths`].

use std::path::Path;

use crate::repo::Repository;

pub fn add(repo: &Repository, paths: &[impl AsRef<Path>]) -> anyhow::Result<()> {
    let odb = repo.odb();
    repo.with_index_mut(|index| {
        crate::index::add_paths(&odb, repo.workdir(), repo.store_dir_name(), index, paths)
    })
}
