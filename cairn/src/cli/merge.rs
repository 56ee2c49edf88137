use cairn_core::merge::{merge, merge_abort, MergeOutcome};
use cairn_core::rev::resolve_rev;
use cairn_core::Repository;

#[derive(clap::Args, Debug)]
#[command(group(clap::ArgGroup::new("merge_mode").args(["other", "abort"]).required(true)))]
pub struct MergeArgs {
    /// The branch or commit to merge into HEAD.
    pub other: Option<String>,
    /// Abort an in-progress merge, restoring the state before it started.
    #[arg(long)]
    pub abort: bool,
}

pub fn exec(repo: &Repository, args: &MergeArgs) -> anyhow::Result<i32> {
    if args.abort {
        merge_abort(repo)?;
        return Ok(0);
    }

    let other = resolve_rev(&repo.refs(), args.other.as_deref().expect("clap enforces other xor abort"))?;
    match merge(repo, other)? {
        MergeOutcome::FastForward(oid) => {
            println!("fast-forward to {}", oid);
            Ok(0)
        }
        MergeOutcome::Merged => {
            println!("merged cleanly; run `cairn commit` to record it");
            Ok(0)
        }
        MergeOutcome::Conflicts(paths) => {
            println!("conflicts in {} path(s), resolve then `cairn add` and `cairn commit`:", paths.len());
            for path in paths {
                println!("  {}", path);
            }
            Ok(1)
        }
    }
}
