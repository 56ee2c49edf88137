use cairn_core::Repository;

#[derive(clap::Args, Debug)]
pub struct CheckoutArgs {
    /// A branch name or a revision to detach onto.
    pub name: String,
}

pub fn exec(repo: &Repository, args: &CheckoutArgs) -> anyhow::Result<i32> {
    cairn_core::checkout::checkout(repo, &args.name)?;
    Ok(0)
}
