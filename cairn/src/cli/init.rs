use std::path::{Path, PathBuf};

use cairn_core::Repository;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to create the repository in.
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

pub fn exec(root: &Path, args: &InitArgs) -> anyhow::Result<i32> {
    let repo = Repository::init(root.join(&args.path))?;
    println!("initialized empty repository in {}", repo.store_root().display());
    Ok(0)
}
