//! Rust crates committed to the shared Rust packages repository

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::core::{Result, WrapErr};
use crate::generation::base::{BaseGenerator, PACKAGE_NAME_PROPERTY, PACKAGE_VERSION_PROPERTY};
use crate::generation::repository::{
    PullRequestPolicy, RUST_PACKAGES_REPOSITORY, RepositoryWorkflow,
};
use crate::generation::traits::PackageGenerator;
use crate::generation::types::Language;

const POLICY: PullRequestPolicy = PullRequestPolicy {
    reviewers: &[],
    labels: &["updatebot"],
};

pub struct RustGenerator {
    base: BaseGenerator,
}

impl RustGenerator {
    pub fn new(base: BaseGenerator) -> Self {
        Self { base }
    }
}

#[async_trait]
impl PackageGenerator for RustGenerator {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn package_name(&self) -> String {
        self.base.context().run.repo_name.clone()
    }

    fn version(&self) -> &str {
        &self.base.context().run.version
    }

    async fn generate_package(&mut self, output_dir: &Path) -> Result<PathBuf> {
        let ctx = self.base.context().clone();
        let package_name = self.package_name();
        let workflow = RepositoryWorkflow::new(&ctx, RUST_PACKAGES_REPOSITORY);

        let repo_dir = workflow.prepare(output_dir, &package_name).await?;
        let package_dir = repo_dir.join(&package_name);
        workflow
            .recreate_dir(&package_dir)
            .await
            .wrap_err("failed to create fresh package dir")?;

        self.base
            .generate(
                &package_dir,
                &[
                    (PACKAGE_NAME_PROPERTY, package_name.clone()),
                    (PACKAGE_VERSION_PROPERTY, ctx.run.version.clone()),
                ],
            )
            .await?;

        workflow.write_version_file(&package_dir).await?;

        let message = format!(
            "chore(deps): upgrade {package_name} module -> {}",
            ctx.run.version
        );
        workflow
            .commit(&repo_dir, &[package_dir.clone()], &message)
            .await?;
        Ok(package_dir)
    }

    async fn push_package(&mut self, package_dir: &Path) -> Result<()> {
        let package_name = self.package_name();
        let ctx = self.base.context();
        let title = format!(
            "chore(deps): upgrade {package_name} package -> {}",
            ctx.run.version
        );
        let body = format!("Automated rust package update for {package_name}");
        RepositoryWorkflow::new(ctx, RUST_PACKAGES_REPOSITORY)
            .open_pull_request(package_dir, &title, &body, POLICY)
            .await?;
        Ok(())
    }
}
