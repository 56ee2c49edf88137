//! Path helpers for the working-tree scan and ignore-check (§4.4, §6).
//!
//! There is no interned path type here (departure from the teacher's
//! `BitPath`/`interner.rs`, see DESIGN.md): paths in this crate are plain
//! `String`s in the index's flat path space, so this module is just a couple
//! of small free functions.

use std::path::{Path, PathBuf};

/// True if `path` has the store directory name (e.g. `.cairn`) as one of its
/// slash-delimited components, per §6 "Ignored paths".
pub fn is_ignored(path: &Path, store_dir_name: &str) -> bool {
    path.components().any(|c| c.as_os_str() == store_dir_name)
}

/// Normalize `path` to a `/`-delimited string relative to `root`, for use as
/// an index key. Fails on non-utf8 paths.
pub fn to_index_path(root: &Path, path: &Path) -> anyhow::Result<String> {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let s = rel
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("non-utf8 path `{}`", path.display()))?;
    Ok(s.replace(std::path::MAIN_SEPARATOR, "/"))
}

pub fn from_index_path(root: &Path, index_path: &str) -> PathBuf {
    let mut buf = root.to_path_buf();
    for component in index_path.split('/') {
        buf.push(component);
    }
    buf
}
