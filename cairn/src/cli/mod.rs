mod add;
mod cat_file;
mod checkout;
mod cherry_pick;
mod commit;
mod config;
mod hash_object;
mod init;
mod log;
mod merge;
mod merge_base;
mod rebase;
mod reset;
mod status;

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cairn_core::Repository;

/// A git-compatible-in-spirit version control system.
#[derive(Parser, Debug)]
#[command(name = "cairn", author, version)]
struct Cli {
    /// Run as if cairn was started in `<path>` instead of the current directory.
    #[arg(short = 'C', global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty repository.
    Init(init::InitArgs),
    /// Compute the object id for file contents, optionally writing it to the store.
    HashObject(hash_object::HashObjectArgs),
    /// Print the contents, type, or size of a stored object.
    CatFile(cat_file::CatFileArgs),
    /// Stage file contents.
    Add(add::AddArgs),
    /// Record the staged contents as a new commit.
    Commit(commit::CommitArgs),
    /// Switch HEAD (and the working tree) to a commit or branch.
    Checkout(checkout::CheckoutArgs),
    /// Move HEAD (and optionally the index/working tree) to a commit.
    Reset(reset::ResetArgs),
    /// Join two histories together.
    Merge(merge::MergeArgs),
    /// Find the best common ancestor(s) of two commits.
    MergeBase(merge_base::MergeBaseArgs),
    /// Apply the changes introduced by an existing commit onto HEAD.
    CherryPick(cherry_pick::CherryPickArgs),
    /// Reapply commits from HEAD on top of another base.
    Rebase(rebase::RebaseArgs),
    /// Get or set repository configuration.
    Config(config::ConfigArgs),
    /// Show the working tree status.
    Status(status::StatusArgs),
    /// Show commit history.
    Log(log::LogArgs),
}

/// Parse `args`, locate (or create) the repository rooted at `-C`, and
/// dispatch to the matching subcommand. Returns the process exit code: `0`
/// on success, `1` when the operation produced conflicts the user must
/// resolve (a structured outcome, not a failure per spec §6/§7).
pub fn run<T: Into<OsString> + Clone>(args: impl IntoIterator<Item = T>) -> anyhow::Result<i32> {
    let cli = Cli::parse_from(args);

    if let Command::Init(args) = &cli.command {
        return init::exec(&cli.root, args);
    }

    let repo = Repository::find(&cli.root)?;
    match &cli.command {
        Command::Init(_) => unreachable!("handled above"),
        Command::HashObject(args) => hash_object::exec(&repo, args),
        Command::CatFile(args) => cat_file::exec(&repo, args),
        Command::Add(args) => add::exec(&repo, args),
        Command::Commit(args) => commit::exec(&repo, args),
        Command::Checkout(args) => checkout::exec(&repo, args),
        Command::Reset(args) => reset::exec(&repo, args),
        Command::Merge(args) => merge::exec(&repo, args),
        Command::MergeBase(args) => merge_base::exec(&repo, args),
        Command::CherryPick(args) => cherry_pick::exec(&repo, args),
        Command::Rebase(args) => rebase::exec(&repo, args),
        Command::Config(args) => config::exec(&repo, args),
        Command::Status(args) => status::exec(&repo, args),
        Command::Log(args) => log::exec(&repo, args),
    }
}
