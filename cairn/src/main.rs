//! Thin command-line entry point over `cairn-core`'s public operations.
//! The parser, dispatch, and any status/log formatting here are external-
//! collaborator concerns (spec §1 Non-goals) -- all of the interesting
//! behavior lives in `cairn-core`.

mod cli;

use owo_colors::OwoColorize;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("CAIRN_LOG", "warn")).init();

    match cli::run(std::env::args_os()) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            std::process::exit(1);
        }
    }
}
