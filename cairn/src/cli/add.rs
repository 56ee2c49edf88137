use std::path::PathBuf;

use cairn_core::Repository;

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Files or directories to stage (a path that no longer exists stages a deletion).
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

pub fn exec(repo: &Repository, args: &AddArgs) -> anyhow::Result<i32> {
    let paths: Vec<PathBuf> = args.paths.iter().map(|p| repo.workdir().join(p)).collect();
    cairn_core::add::add(repo, &paths)?;
    Ok(0)
}
