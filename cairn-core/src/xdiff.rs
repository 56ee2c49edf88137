//! Wraps the external line-diff/three-way-merge tool contract of §4.3 over
//! the crates.io `diffy` crate (not the teacher's git-forked `diffy`, see
//! DESIGN.md). `diffy` works on UTF-8 text; non-utf8 blobs are treated as
//! wholly conflicting (the whole content becomes one "hunk").

use diffy::create_patch;

/// Produce unified-diff text of `a` vs `b` with the given labels. Empty when
/// the inputs are byte-equal.
pub fn line_diff(a: &[u8], b: &[u8], label_a: &str, label_b: &str) -> Vec<u8> {
    if a == b {
        return Vec::new();
    }
    let a_text = String::from_utf8_lossy(a);
    let b_text = String::from_utf8_lossy(b);
    let patch = create_patch(&a_text, &b_text);
    format!("{}", patch)
        .replacen("--- original", &format!("--- {}", label_a), 1)
        .replacen("+++ modified", &format!("+++ {}", label_b), 1)
        .into_bytes()
}

/// Three-way merge per §4.3: `(merged_bytes, conflict)`. Conflicting hunks
/// are wrapped in `<<<<<<< label_head` / `=======` / `>>>>>>> label_other`
/// markers, matching the original's `diff3 -m` contract (exit 0 = clean,
/// exit 1 = conflict markers present — see SPEC_FULL §10.8).
///
/// `diffy::merge_bytes` only emits its own fixed `ours`/`theirs` markers, so
/// the labels are substituted into the marker lines afterward; `label_base`
/// has no home in the two-marker output but is accepted to match §4.3's
/// documented signature.
pub fn three_way_merge(
    base: &[u8],
    head: &[u8],
    other: &[u8],
    label_head: &str,
    _label_base: &str,
    label_other: &str,
) -> (Vec<u8>, bool) {
    let (merged, conflict) = match diffy::merge_bytes(base, head, other) {
        Ok(merged) => (merged, false),
        Err(merged) => (merged, true),
    };
    (relabel_markers(&merged, label_head, label_other), conflict)
}

/// Rewrites `diffy`'s default `<<<<<<< ours` / `>>>>>>> theirs` marker lines
/// to use the caller's labels, leaving every other line untouched.
fn relabel_markers(bytes: &[u8], label_head: &str, label_other: &str) -> Vec<u8> {
    let text = String::from_utf8_lossy(bytes);
    let trailing_newline = text.ends_with('\n');
    let relabeled: Vec<String> = text
        .lines()
        .map(|line| {
            if line.starts_with("<<<<<<< ") {
                format!("<<<<<<< {label_head}")
            } else if line.starts_with(">>>>>>> ") {
                format!(">>>>>>> {label_other}")
            } else {
                line.to_owned()
            }
        })
        .collect();
    let mut out = relabeled.join("\n");
    if trailing_newline {
        out.push('\n');
    }
    out.into_bytes()
}
