use cairn_core::index::conflicted_paths;
use cairn_core::refs;
use cairn_core::repo::RepoState;
use cairn_core::Repository;

#[derive(clap::Args, Debug)]
pub struct StatusArgs {}

pub fn exec(repo: &Repository, _args: &StatusArgs) -> anyhow::Result<i32> {
    let head = repo.refs().get_ref(refs::HEAD)?;
    if head.symbolic {
        let branch = repo.refs().resolve_symbolic(refs::HEAD)?;
        println!("on branch {}", branch.strip_prefix("refs/heads/").unwrap_or(&branch));
    } else {
        println!("HEAD detached at {}", head.value.map(|oid| oid.short()).unwrap_or_else(|| "?".to_owned()));
    }

    match repo.state() {
        RepoState::Clean => {}
        other => println!("{} in progress", other.name()),
    }

    let conflicts = repo.with_index(|index| Ok(conflicted_paths(index)))?;
    if conflicts.is_empty() {
        println!("nothing to commit, working tree clean");
    } else {
        println!("unmerged paths:");
        for path in conflicts {
            println!("  both modified: {}", path);
        }
    }
    Ok(0)
}
