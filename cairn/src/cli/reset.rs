use cairn_core::reset::{reset, ResetMode};
use cairn_core::rev::resolve_rev;
use cairn_core::Repository;

#[derive(clap::Args, Debug)]
#[command(group(clap::ArgGroup::new("mode").args(["soft", "mixed", "hard"])))]
pub struct ResetArgs {
    /// Move HEAD only (default).
    #[arg(long)]
    pub soft: bool,
    /// Move HEAD and overwrite the index.
    #[arg(long)]
    pub mixed: bool,
    /// Move HEAD, overwrite the index, and materialize the working tree.
    #[arg(long)]
    pub hard: bool,
    /// The commit to reset to (defaults to HEAD).
    #[arg(default_value = "@")]
    pub commit: String,
}

pub fn exec(repo: &Repository, args: &ResetArgs) -> anyhow::Result<i32> {
    let mode = if args.hard {
        ResetMode::Hard
    } else if args.mixed {
        ResetMode::Mixed
    } else {
        ResetMode::Soft
    };
    let oid = resolve_rev(&repo.refs(), &args.commit)?;
    reset(repo, oid, mode)?;
    Ok(0)
}
