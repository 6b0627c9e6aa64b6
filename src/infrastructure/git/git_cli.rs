//! `VersionControl` port over the `git` command line

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::core::{Error, Result, WrapErr};
use crate::generation::traits::{CommandRunner, VersionControl};

const GIT: &str = "git";

/// Name of the working copy `git clone <url>` creates
pub fn clone_dir_name(repository_url: &str) -> Result<String> {
    let url = url::Url::parse(repository_url)
        .map_err(|e| Error::config(format!("invalid repository url '{repository_url}': {e}")))?;
    let name = url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map(|s| s.trim_end_matches(".git").to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::config(format!("repository url '{repository_url}' has no path")))?;
    Ok(name)
}

pub struct GitCli {
    commands: Arc<dyn CommandRunner>,
}

impl GitCli {
    pub fn new(commands: Arc<dyn CommandRunner>) -> Self {
        Self { commands }
    }

    async fn git(&self, dir: &Path, args: &[&str]) -> Result<()> {
        self.commands
            .execute_and_log(Some(dir), GIT, args)
            .await
            .wrap_err("failed to run git command")
    }

    // Query commands: output is the answer, not something to log
    async fn git_output(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let out = self.commands.execute(Some(dir), GIT, args).await?;
        if !out.is_success() {
            return Err(Error::CommandFailed {
                command: std::iter::once(GIT)
                    .chain(args.iter().copied())
                    .collect::<Vec<_>>()
                    .join(" "),
                exit_code: out.exit_code,
                output: out.output,
            })
            .wrap_err("failed to run git command");
        }
        Ok(out.output)
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn clone_repo(&self, dir: &Path, url: &str) -> Result<PathBuf> {
        let name = clone_dir_name(url)?;
        self.git(dir, &["clone", url]).await?;
        Ok(dir.join(name))
    }

    async fn current_branch(&self, dir: &Path) -> Result<String> {
        let branch = self
            .git_output(dir, &["rev-parse", "--abbrev-ref", "HEAD"])
            .await?;
        info!(branch = %branch, "Current branch");
        Ok(branch)
    }

    async fn set_remote(&self, dir: &Path, url: &str) -> Result<()> {
        self.git(dir, &["remote", "set-url", "origin", url]).await
    }

    async fn checkout_new_branch(&self, dir: &Path, branch: &str) -> Result<()> {
        self.git(dir, &["checkout", "-b", branch]).await
    }

    async fn add(&self, dir: &Path, paths: &[PathBuf]) -> Result<()> {
        let paths: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        let args: Vec<&str> = std::iter::once("add")
            .chain(paths.iter().map(String::as_str))
            .collect();
        self.git(dir, &args).await
    }

    async fn commit(&self, dir: &Path, message: &str) -> Result<()> {
        self.git(dir, &["commit", "-m", message]).await
    }

    async fn push(&self, dir: &Path, branch: &str) -> Result<()> {
        self.git(dir, &["push", "--set-upstream", "origin", branch]).await
    }

    async fn default_branch(&self, dir: &Path) -> Result<String> {
        self.git_output(dir, &["symbolic-ref", "refs/remotes/origin/HEAD", "--short"])
            .await
    }
}
