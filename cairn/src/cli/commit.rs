use cairn_core::Repository;

#[derive(clap::Args, Debug)]
pub struct CommitArgs {
    /// The commit message.
    #[arg(short = 'm', long = "message", required = true)]
    pub message: String,
}

pub fn exec(repo: &Repository, args: &CommitArgs) -> anyhow::Result<i32> {
    let oid = cairn_core::commit::commit(repo, &args.message, None, true)?;
    println!("{}", oid);
    Ok(0)
}
