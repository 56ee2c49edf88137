//! User-supplied name → OID resolution (§6 "OID resolution for user-supplied
//! names").

use anyhow::anyhow;

use crate::error::CoreError;
use crate::hash::Oid;
use crate::refs::{self, RefStore};

/// Resolve `name` to an OID, trying in order: the raw name as a ref path;
/// `refs/<name>`; `refs/tags/<name>`; `refs/heads/<name>`; the `@` alias for
/// `HEAD`; finally a literal 40-hex-char OID. Fails with `UnknownName` if
/// nothing matches.
pub fn resolve_rev(refs: &RefStore, name: &str) -> anyhow::Result<Oid> {
    if name == "@" {
        return refs.fully_resolve(refs::HEAD);
    }

    for candidate in [name.to_owned(), format!("refs/{}", name), refs::tag_ref(name), refs::branch_ref(name)] {
        if refs.exists(&candidate) {
            if let Some(oid) = refs.get_ref(&candidate)?.value {
                return Ok(oid);
            }
        }
    }

    name.parse().map_err(|_| anyhow!(CoreError::UnknownName(name.to_owned())))
}

/// `Some(branch_name)` if `name` resolves through `refs/heads/<name>`
/// specifically — used by `checkout` to decide whether HEAD should end up
/// attached to a branch or detached.
pub fn branch_name(refs: &RefStore, name: &str) -> Option<String> {
    let candidate = refs::branch_ref(name);
    refs.exists(&candidate).then(|| name.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::ObjKind;

    fn store() -> (tempfile::TempDir, RefStore) {
        let dir = tempfile::tempdir().unwrap();
        (dir, RefStore::new(dir.path()))
    }

    #[test]
    fn resolves_branch_name() {
        let (_dir, refs) = store();
        let oid = Oid::hash(ObjKind::Blob, b"x");
        refs.update_ref(&refs::branch_ref("master"), oid, false).unwrap();
        assert_eq!(resolve_rev(&refs, "master").unwrap(), oid);
        assert_eq!(branch_name(&refs, "master"), Some("master".to_owned()));
    }

    #[test]
    fn resolves_tag_name() {
        let (_dir, refs) = store();
        let oid = Oid::hash(ObjKind::Blob, b"tag-target");
        refs.update_ref(&refs::tag_ref("v1"), oid, false).unwrap();
        assert_eq!(resolve_rev(&refs, "v1").unwrap(), oid);
    }

    #[test]
    fn resolves_at_alias_to_head() {
        let (_dir, refs) = store();
        let oid = Oid::hash(ObjKind::Blob, b"head-target");
        refs.update_ref(refs::HEAD, oid, false).unwrap();
        assert_eq!(resolve_rev(&refs, "@").unwrap(), oid);
    }

    #[test]
    fn resolves_literal_hex_oid() {
        let (_dir, refs) = store();
        let oid = Oid::hash(ObjKind::Blob, b"literal");
        assert_eq!(resolve_rev(&refs, &oid.to_string()).unwrap(), oid);
    }

    #[test]
    fn unknown_name_fails() {
        let (_dir, refs) = store();
        assert!(resolve_rev(&refs, "no-such-thing").is_err());
    }

    #[test]
    fn branch_name_is_none_for_non_branch_rev() {
        let (_dir, refs) = store();
        let oid = Oid::hash(ObjKind::Blob, b"x");
        refs.update_ref(refs::HEAD, oid, false).unwrap();
        assert_eq!(branch_name(&refs, "@"), None);
    }
}
