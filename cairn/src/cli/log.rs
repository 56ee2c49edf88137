use cairn_core::graph::iter_commits_and_parents;
use cairn_core::Repository;

#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Revision to start from (defaults to HEAD).
    #[arg(default_value = "@")]
    pub start: String,
}

pub fn exec(repo: &Repository, args: &LogArgs) -> anyhow::Result<i32> {
    let start = cairn_core::rev::resolve_rev(&repo.refs(), &args.start)?;
    let odb = repo.odb();
    for oid in iter_commits_and_parents(&odb, [start]) {
        let oid = oid?;
        let commit = odb.read_commit(oid)?;
        let merge_marker = if commit.is_merge() { " (merge)" } else { "" };
        println!("{}{}", oid.short(), merge_marker);
        println!("Author: {}", commit.author);
        println!();
        for line in commit.message.lines() {
            println!("    {}", line);
        }
        println!();
    }
    Ok(0)
}
