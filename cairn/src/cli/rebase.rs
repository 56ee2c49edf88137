use cairn_core::rebase::{rebase, rebase_abort, rebase_continue, RebaseOutcome};
use cairn_core::rev::resolve_rev;
use cairn_core::Repository;

#[derive(clap::Args, Debug)]
#[command(group(clap::ArgGroup::new("rebase_mode").args(["upstream", "continue_", "abort"]).required(true)))]
pub struct RebaseArgs {
    /// The branch or commit to replay HEAD's commits onto.
    pub upstream: Option<String>,
    /// Resume after resolving the conflicts of an in-progress rebase.
    #[arg(long = "continue")]
    pub continue_: bool,
    /// Abort an in-progress rebase, restoring the state before it started.
    #[arg(long)]
    pub abort: bool,
}

pub fn exec(repo: &Repository, args: &RebaseArgs) -> anyhow::Result<i32> {
    if args.abort {
        rebase_abort(repo)?;
        return Ok(0);
    }
    let outcome = if args.continue_ {
        rebase_continue(repo)?
    } else {
        let upstream = resolve_rev(&repo.refs(), args.upstream.as_deref().expect("clap enforces exactly one mode"))?;
        rebase(repo, upstream)?
    };

    match outcome {
        RebaseOutcome::Complete => {
            println!("rebase complete");
            Ok(0)
        }
        RebaseOutcome::AlreadyUpToDate => {
            println!("already up to date");
            Ok(0)
        }
        RebaseOutcome::Conflicts(paths) => {
            println!("conflicts in {} path(s), resolve then `cairn add` and `cairn rebase --continue`:", paths.len());
            for path in paths {
                println!("  {}", path);
            }
            Ok(1)
        }
    }
}
