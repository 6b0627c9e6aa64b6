//! Infrastructure layer - concrete implementations of domain ports

pub mod filesystem;
pub mod git;
pub mod github;
pub mod shell;
pub mod uv;

pub use filesystem::LocalFileSystem;
pub use git::GitCli;
pub use github::GitHubConnector;
pub use shell::ProcessCommandRunner;
pub use uv::UvClient;
