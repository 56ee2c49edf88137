//! Core of a git-compatible-in-spirit version control system: a content-addressed
//! object store, a reference store, a staged index with three-way tree merge, and
//! the history operations (commit, checkout, reset, merge, cherry-pick, rebase)
//! built on top of them.
//!
//! This crate has no command-line surface; see the `cairn` crate for that.

#[macro_use]
extern crate lazy_static;

pub mod add;
pub mod checkout;
pub mod cherrypick;
pub mod commit;
pub mod config;
pub mod error;
pub mod graph;
pub mod hash;
pub mod index;
pub mod lockfile;
pub mod merge;
pub mod obj;
pub mod odb;
pub mod path;
pub mod rebase;
pub mod repo;
pub mod reset;
pub mod rev;
pub mod refs;
pub mod signature;
pub mod xdiff;

pub use crate::error::{CoreError, CoreResult};
pub use crate::hash::Oid;
pub use crate::repo::Repository;

#[cfg(test)]
pub(crate) mod test_utils;
