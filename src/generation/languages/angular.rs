//! Angular packages compiled with `ngc` and published to npm

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::core::{Result, WrapErr};
use crate::generation::base::BaseGenerator;
use crate::generation::npm::{NpmClient, PublishOutcome, VERSION_CONFLICT};
use crate::generation::templates::TemplateData;
use crate::generation::traits::PackageGenerator;
use crate::generation::types::Language;

/// Runtime dependencies installed before compiling
pub const RUNTIME_DEPENDENCIES: [&str; 4] = [
    "rxjs@6.6.7",
    "zone.js@0.9.1",
    "@angular/core@8.2.14",
    "@angular/common@8.2.14",
];

pub struct AngularGenerator {
    base: BaseGenerator,
    npm: NpmClient,
    version: String,
}

impl AngularGenerator {
    pub fn new(base: BaseGenerator) -> Self {
        let npm = NpmClient::new(base.context().commands.clone(), VERSION_CONFLICT).tag_prereleases();
        Self::with_npm(base, npm)
    }

    pub fn with_npm(base: BaseGenerator, npm: NpmClient) -> Self {
        let version = base.context().run.version.clone();
        Self { base, npm, version }
    }

    async fn render(&self, dst: &Path, names: &[&str]) -> Result<()> {
        let ctx = self.base.context();
        let files = ctx.template_files(Language::Angular, names).await?;
        let data = TemplateData::new(&ctx.run, self.package_name())
            .with_version(&self.version)
            .to_value()?;
        ctx.files
            .template_files(dst, &data, &files)
            .await
            .wrap_err("failed to template packaging files")
    }
}

#[async_trait]
impl PackageGenerator for AngularGenerator {
    fn language(&self) -> Language {
        Language::Angular
    }

    fn package_name(&self) -> String {
        format!("{}-angular", self.base.context().run.repo_name)
    }

    fn version(&self) -> &str {
        &self.version
    }

    async fn generate_package(&mut self, output_dir: &Path) -> Result<PathBuf> {
        let package_dir = self
            .base
            .generate(&output_dir.join(self.package_name()), &[])
            .await?;

        self.render(&package_dir, &["package.json", "tsconfig.json"])
            .await?;
        self.npm
            .install_each(&package_dir, &RUNTIME_DEPENDENCIES)
            .await?;

        self.base
            .context()
            .commands
            .execute_and_log(Some(&package_dir), "ngc", &[])
            .await
            .wrap_err("failed to run ngc")?;

        let dist_dir = output_dir.join("dist");
        self.render(&dist_dir, &["package.json", ".npmrc"]).await?;
        Ok(dist_dir)
    }

    async fn push_package(&mut self, package_dir: &Path) -> Result<()> {
        while self.npm.try_publish(package_dir, &self.version).await?
            == PublishOutcome::VersionConflict
        {
            self.version = self.npm.bump_version(package_dir, &self.version).await?;
            self.render(package_dir, &["package.json", ".npmrc"]).await?;
        }
        Ok(())
    }
}
