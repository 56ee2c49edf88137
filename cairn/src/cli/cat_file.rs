use std::io::Write;

use cairn_core::obj::{Object, TreeEntryKind};
use cairn_core::rev::resolve_rev;
use cairn_core::Repository;

#[derive(clap::Args, Debug)]
pub struct CatFileArgs {
    /// Pretty-print the object's contents.
    #[arg(short = 'p', conflicts_with_all(["size", "objtype"]))]
    pub pretty_print: bool,
    /// Show the object's size in bytes.
    #[arg(short = 's', conflicts_with("objtype"))]
    pub size: bool,
    /// Show the object's type.
    #[arg(short = 't')]
    pub objtype: bool,
    /// A revision: a ref name, `@` for HEAD, or a literal object id.
    pub object: String,
}

pub fn exec(repo: &Repository, args: &CatFileArgs) -> anyhow::Result<i32> {
    let oid = resolve_rev(&repo.refs(), &args.object)?;
    let object = repo.odb().read(oid, None)?;

    if args.objtype {
        println!("{}", object.kind());
        return Ok(0);
    }
    if args.size {
        println!("{}", object.encode_payload().len());
        return Ok(0);
    }

    match object {
        Object::Blob(bytes) => std::io::stdout().write_all(&bytes)?,
        Object::Tree(tree) => {
            for entry in &tree.entries {
                let kind = match entry.kind {
                    TreeEntryKind::Blob => "blob",
                    TreeEntryKind::Tree => "tree",
                };
                println!("{} {} {}", kind, entry.oid, entry.name);
            }
        }
        Object::Commit(commit) => {
            println!("tree {}", commit.tree);
            for parent in &commit.parents {
                println!("parent {}", parent);
            }
            println!("author {}", commit.author);
            println!("committer {}", commit.committer);
            println!();
            println!("{}", commit.message);
        }
    }
    Ok(0)
}
