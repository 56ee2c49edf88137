use std::path::PathBuf;

use cairn_core::hash::Oid;
use cairn_core::obj::ObjKind;
use cairn_core::Repository;

#[derive(clap::Args, Debug)]
pub struct HashObjectArgs {
    /// Write the object into the store rather than just computing its id.
    #[arg(short = 'w')]
    pub write: bool,
    #[arg(short = 't', long = "type", default_value = "blob")]
    pub objtype: String,
    pub path: PathBuf,
}

pub fn exec(repo: &Repository, args: &HashObjectArgs) -> anyhow::Result<i32> {
    let kind: ObjKind = args.objtype.parse()?;
    let bytes = std::fs::read(&args.path)?;
    let oid = if args.write { repo.odb().write(kind, &bytes)? } else { Oid::hash(kind, &bytes) };
    println!("{}", oid);
    Ok(0)
}
