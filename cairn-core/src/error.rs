//! Error taxonomy surfaced by the core (see design docs §7).
//!
//! The core never recovers from these; it reports. `anyhow::Error` is the carrier
//! type used throughout the crate so that call sites that don't care about the
//! precise kind can just propagate with `?`, while call sites that do care can
//! downcast via [`CoreErrorExt`].

use std::fmt;

use crate::hash::Oid;

pub type CoreResult<T> = anyhow::Result<T>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("object `{0}` not found")]
    MissingObject(Oid),
    #[error("object `{0}` is corrupt: {1}")]
    CorruptObject(Oid, String),
    #[error("object `{oid}` has wrong type: expected `{expected}`, found `{found}`")]
    WrongType { oid: Oid, expected: &'static str, found: &'static str },
    #[error("reference `{0}` not found")]
    MissingRef(String),
    #[error("invalid value for reference `{0}`: `{1}`")]
    InvalidRefValue(String, String),
    #[error("`{0}` did not resolve to an object")]
    UnknownName(String),
    #[error("cannot {action}: unresolved conflicts exist in the index")]
    ConflictInIndex { action: &'static str },
    #[error("cannot {action}: you have staged or unstaged changes")]
    DirtyWorkingTree { action: &'static str },
    #[error("{operation} is already in progress")]
    OperationInProgress { operation: &'static str },
    #[error("refusing to {action}: no common history between the two commits")]
    NoCommonHistory { action: &'static str },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl CoreError {
    pub fn action(&self) -> Option<&'static str> {
        match self {
            CoreError::ConflictInIndex { action } | CoreError::DirtyWorkingTree { action } =>
                Some(action),
            _ => None,
        }
    }
}

/// Downcast helpers for call sites that need to distinguish error kinds rather
/// than just propagate them.
pub trait CoreErrorExt {
    fn is_missing_object(&self) -> bool;
    fn is_conflict_in_index(&self) -> bool;
    fn is_operation_in_progress(&self) -> bool;
}

impl CoreErrorExt for anyhow::Error {
    fn is_missing_object(&self) -> bool {
        matches!(self.downcast_ref::<CoreError>(), Some(CoreError::MissingObject(_)))
    }

    fn is_conflict_in_index(&self) -> bool {
        matches!(self.downcast_ref::<CoreError>(), Some(CoreError::ConflictInIndex { .. }))
    }

    fn is_operation_in_progress(&self) -> bool {
        matches!(self.downcast_ref::<CoreError>(), Some(CoreError::OperationInProgress { .. }))
    }
}

/// A structured (non-error) merge-conflict result, per §6/§7: a conflict-on-apply
/// is a first-class success outcome, not an error return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConflicts {
    pub paths: Vec<String>,
}

impl fmt::Display for MergeConflicts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "merge conflicts in {} path(s):", self.paths.len())?;
        for path in &self.paths {
            writeln!(f, "  {}", path)?;
        }
        Ok(())
    }
}
