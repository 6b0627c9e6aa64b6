//! Git command line adapter

pub mod git_cli;

pub use git_cli::GitCli;
