//! GitHub code host adapter

pub mod github_client;

pub use github_client::{GitHubClient, GitHubConnector};
