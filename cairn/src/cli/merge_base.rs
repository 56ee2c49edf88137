use cairn_core::graph::merge_base;
use cairn_core::rev::resolve_rev;
use cairn_core::Repository;

#[derive(clap::Args, Debug)]
pub struct MergeBaseArgs {
    pub a: String,
    pub b: String,
}

pub fn exec(repo: &Repository, args: &MergeBaseArgs) -> anyhow::Result<i32> {
    let a = resolve_rev(&repo.refs(), &args.a)?;
    let b = resolve_rev(&repo.refs(), &args.b)?;
    match merge_base(&repo.odb(), a, b)? {
        Some(oid) => {
            println!("{}", oid);
            Ok(0)
        }
        None => Ok(1),
    }
}
