use cairn_core::cherrypick::{cherry_pick, cherry_pick_abort, cherry_pick_continue, ApplyOutcome};
use cairn_core::rev::resolve_rev;
use cairn_core::Repository;

#[derive(clap::Args, Debug)]
#[command(group(clap::ArgGroup::new("cherry_pick_mode").args(["commit", "continue_", "abort"]).required(true)))]
pub struct CherryPickArgs {
    /// The commit whose changes should be replayed onto HEAD.
    pub commit: Option<String>,
    /// Resume after resolving the conflicts of an in-progress cherry-pick.
    #[arg(long = "continue")]
    pub continue_: bool,
    /// Abort an in-progress cherry-pick, restoring the state before it started.
    #[arg(long)]
    pub abort: bool,
}

pub fn exec(repo: &Repository, args: &CherryPickArgs) -> anyhow::Result<i32> {
    if args.abort {
        cherry_pick_abort(repo)?;
        return Ok(0);
    }
    let outcome = if args.continue_ {
        cherry_pick_continue(repo)?
    } else {
        let oid = resolve_rev(&repo.refs(), args.commit.as_deref().expect("clap enforces exactly one mode"))?;
        cherry_pick(repo, oid)?
    };
    report(outcome)
}

fn report(outcome: ApplyOutcome) -> anyhow::Result<i32> {
    match outcome {
        ApplyOutcome::Applied(oid) => {
            println!("{}", oid);
            Ok(0)
        }
        ApplyOutcome::Skipped => {
            println!("skipped (already applied): working tree left at HEAD");
            Ok(0)
        }
        ApplyOutcome::Conflicts(paths) => {
            println!("conflicts in {} path(s), resolve then `cairn add` and `cairn cherry-pick --continue`:", paths.len());
            for path in paths {
                println!("  {}", path);
            }
            Ok(1)
        }
    }
}
