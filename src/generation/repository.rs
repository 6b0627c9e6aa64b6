//! Publishing through a shared package repository
//!
//! Repository-backed languages (Python, Go, Rust) do not push to a registry.
//! They clone a shared repository, commit the generated code on an
//! `update/<package>/<version>` branch, push it and open a pull request.

use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

use crate::core::{Error, Result, WrapErr};
use crate::generation::context::GenerationContext;
use crate::generation::traits::{NewPullRequest, PullRequest};

/// A remote repository packages are committed into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageRepository {
    pub owner: &'static str,
    pub name: &'static str,
}

pub const PYTHON_SCHEMAS_REPOSITORY: PackageRepository = PackageRepository {
    owner: "spring-financial-group",
    name: "mqube-ml-doc-pipeline-schemas",
};

pub const GO_PACKAGES_REPOSITORY: PackageRepository = PackageRepository {
    owner: "spring-financial-group",
    name: "mqube-go-packages",
};

pub const RUST_PACKAGES_REPOSITORY: PackageRepository = PackageRepository {
    owner: "spring-financial-group",
    name: "mqube-rust-packages",
};

impl PackageRepository {
    pub fn clone_url(&self) -> String {
        format!("https://github.com/{}/{}.git", self.owner, self.name)
    }
}

/// Reviewers and labels applied to a language's pull requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullRequestPolicy {
    pub reviewers: &'static [&'static str],
    pub labels: &'static [&'static str],
}

/// The branch a package version is published on
pub fn branch_name(package_name: &str, version: &str) -> String {
    format!("update/{package_name}/{version}")
}

/// Embeds credentials in an https remote URL
pub fn authenticated_url(remote: &str, user: &str, token: &str) -> Result<String> {
    let mut url = Url::parse(remote)
        .map_err(|e| Error::config(format!("invalid repository URL {remote}: {e}")))?;
    url.set_username(user)
        .and_then(|_| url.set_password(Some(token)))
        .map_err(|_| Error::config(format!("cannot set credentials on {remote}")))?;
    Ok(url.to_string())
}

/// Runs the clone, commit and pull request steps for one repository
pub struct RepositoryWorkflow<'a> {
    ctx: &'a GenerationContext,
    repository: PackageRepository,
}

impl<'a> RepositoryWorkflow<'a> {
    pub fn new(ctx: &'a GenerationContext, repository: PackageRepository) -> Self {
        Self { ctx, repository }
    }

    /// Clone into `output_dir` and check out the update branch, returning the
    /// working copy
    pub async fn prepare(&self, output_dir: &Path, package_name: &str) -> Result<PathBuf> {
        let repo_dir = self
            .ctx
            .vcs
            .clone_repo(output_dir, &self.repository.clone_url())
            .await
            .wrap_err_with(|| format!("failed to clone {}", self.repository.name))?;

        let branch = branch_name(package_name, &self.ctx.run.version);
        self.ctx
            .vcs
            .checkout_new_branch(&repo_dir, &branch)
            .await
            .wrap_err("failed to checkout branch")?;
        Ok(repo_dir)
    }

    /// Remove whatever a previous version left behind and start empty
    pub async fn recreate_dir(&self, dir: &Path) -> Result<()> {
        self.ctx
            .files
            .remove(dir)
            .await
            .wrap_err_with(|| format!("failed to remove {}", dir.display()))?;
        self.ctx
            .files
            .mkdir_all(dir)
            .await
            .wrap_err_with(|| format!("failed to create {}", dir.display()))?;
        Ok(())
    }

    /// Write the plain-text version marker into a package directory
    pub async fn write_version_file(&self, package_dir: &Path) -> Result<()> {
        self.ctx
            .files
            .write(
                &package_dir.join("VERSION"),
                self.ctx.run.version.as_bytes(),
                0o644,
            )
            .await
            .wrap_err("failed to write VERSION file")
    }

    pub async fn commit(&self, repo_dir: &Path, paths: &[PathBuf], message: &str) -> Result<()> {
        self.ctx
            .vcs
            .add(repo_dir, paths)
            .await
            .wrap_err("failed to add package to Git")?;
        self.ctx
            .vcs
            .commit(repo_dir, message)
            .await
            .wrap_err("failed to commit package")
    }

    /// Push the checked out branch and open a pull request against the
    /// default branch. Reviewer or label failures are returned even though
    /// the pull request already exists.
    pub async fn open_pull_request(
        &self,
        repo_dir: &Path,
        title: &str,
        body: &str,
        policy: PullRequestPolicy,
    ) -> Result<PullRequest> {
        let vcs = &self.ctx.vcs;
        let run = &self.ctx.run;

        let branch = vcs
            .current_branch(repo_dir)
            .await
            .wrap_err("failed to get current branch")?;

        let remote = authenticated_url(&self.repository.clone_url(), &run.git_user, &run.git_token)?;
        vcs.set_remote(repo_dir, &remote)
            .await
            .wrap_err("failed to set authenticated remote")?;
        vcs.push(repo_dir, &branch)
            .await
            .wrap_err("failed to Git push package")?;

        let default_branch = vcs
            .default_branch(repo_dir)
            .await
            .wrap_err("failed to get default branch name")?;
        let base = default_branch
            .strip_prefix("origin/")
            .unwrap_or(&default_branch)
            .to_string();

        let client = self
            .ctx
            .code_host
            .connect(self.repository.owner, self.repository.name);
        let pr = client
            .create_pull_request(&NewPullRequest {
                title: title.to_string(),
                head: branch,
                base,
                body: body.to_string(),
                maintainer_can_modify: true,
            })
            .await
            .wrap_err("failed to create pull request")?;
        info!(number = pr.number, url = %pr.html_url, "Opened pull request");

        if !policy.reviewers.is_empty() {
            client
                .request_reviewers(policy.reviewers, pr.number)
                .await
                .wrap_err("failed to add reviewers to pull request")?;
        }
        if !policy.labels.is_empty() {
            client
                .add_labels(policy.labels, pr.number)
                .await
                .wrap_err("failed to add labels to pull request")?;
        }
        Ok(pr)
    }
}
