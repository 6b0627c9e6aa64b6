//! JavaScript and TypeScript packages built with npm
//!
//! Both flavours run the same install, build and publish sequence; they differ
//! only in the generator key, package suffix and template directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::core::{Result, WrapErr};
use crate::generation::base::BaseGenerator;
use crate::generation::npm::{NPM_ERR_VERSION_CONFLICT, NpmClient, PublishOutcome};
use crate::generation::templates::TemplateData;
use crate::generation::traits::PackageGenerator;
use crate::generation::types::Language;

pub struct JavaScriptGenerator {
    base: BaseGenerator,
    npm: NpmClient,
    version: String,
}

impl JavaScriptGenerator {
    /// Works for both [`Language::JavaScript`] and [`Language::TypeScript`],
    /// taken from the configuration the base generator is scoped to
    pub fn new(base: BaseGenerator) -> Self {
        let npm = NpmClient::new(base.context().commands.clone(), NPM_ERR_VERSION_CONFLICT);
        Self::with_npm(base, npm)
    }

    pub fn with_npm(base: BaseGenerator, npm: NpmClient) -> Self {
        let version = base.context().run.version.clone();
        Self { base, npm, version }
    }

    /// Template the publishable manifests into `dist_dir` at the current version
    async fn render_dist(&self, dist_dir: &Path) -> Result<()> {
        let ctx = self.base.context();
        let files = ctx
            .template_files(self.language(), &["package.json", ".npmrc"])
            .await?;
        let data = TemplateData::new(&ctx.run, self.package_name())
            .with_version(&self.version)
            .to_value()?;
        ctx.files
            .template_files(dist_dir, &data, &files)
            .await
            .wrap_err("failed to template packaging files")
    }
}

#[async_trait]
impl PackageGenerator for JavaScriptGenerator {
    fn language(&self) -> Language {
        self.base.language()
    }

    fn package_name(&self) -> String {
        format!("{}-{}", self.base.context().run.repo_name, self.language())
    }

    fn version(&self) -> &str {
        &self.version
    }

    async fn generate_package(&mut self, output_dir: &Path) -> Result<PathBuf> {
        let ctx = self.base.context().clone();
        let package_dir = self
            .base
            .generate(&output_dir.join(self.package_name()), &[])
            .await?;

        ctx.commands
            .execute_and_log(Some(&package_dir), "npm", &["install"])
            .await
            .wrap_err("failed to run npm install")?;
        ctx.commands
            .execute_and_log(Some(&package_dir), "npm", &["run", "build"])
            .await
            .wrap_err("failed to run npm build")?;

        let dist_dir = package_dir.join("dist");
        self.render_dist(&dist_dir).await?;
        Ok(dist_dir)
    }

    async fn push_package(&mut self, package_dir: &Path) -> Result<()> {
        while self.npm.try_publish(package_dir, &self.version).await?
            == PublishOutcome::VersionConflict
        {
            self.version = self.npm.bump_version(package_dir, &self.version).await?;
            self.render_dist(package_dir).await?;
        }
        Ok(())
    }
}
