//! C# packages built with `dotnet pack` and pushed to the private NuGet feed

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::core::{Result, WrapErr};
use crate::generation::base::{BaseGenerator, PACKAGE_NAME_PROPERTY};
use crate::generation::templates::TemplateData;
use crate::generation::traits::PackageGenerator;
use crate::generation::types::Language;

const NUGET_SOURCE: &str = "mqube.packages";

pub struct CSharpGenerator {
    base: BaseGenerator,
}

impl CSharpGenerator {
    pub fn new(base: BaseGenerator) -> Self {
        Self { base }
    }
}

#[async_trait]
impl PackageGenerator for CSharpGenerator {
    fn language(&self) -> Language {
        Language::CSharp
    }

    fn package_name(&self) -> String {
        let run = &self.base.context().run;
        format!("Mqube.{}.{}", run.service_name, run.package_name)
    }

    fn version(&self) -> &str {
        &self.base.context().run.version
    }

    async fn generate_package(&mut self, output_dir: &Path) -> Result<PathBuf> {
        let ctx = self.base.context().clone();
        let package_name = self.package_name();

        let package_dir = self
            .base
            .generate(
                &output_dir.join(&package_name),
                &[(PACKAGE_NAME_PROPERTY, package_name.clone())],
            )
            .await?;

        let templates = ctx.template_dir(Language::CSharp).await?;
        let data = TemplateData::new(&ctx.run, &package_name).to_value()?;
        ctx.files
            .template_files_in_dir(&templates, &package_dir, &data)
            .await
            .wrap_err("failed to template packaging files")?;

        let version_arg = format!("-p:VERSION={}", ctx.run.version);
        ctx.commands
            .execute_and_log(
                Some(&package_dir),
                "dotnet",
                &["pack", "-c", "Release", version_arg.as_str()],
            )
            .await
            .wrap_err("failed to pack solution")?;

        Ok(package_dir)
    }

    async fn push_package(&mut self, package_dir: &Path) -> Result<()> {
        let packages = format!("./src/{}/bin/Release/**/*.nupkg", self.package_name());
        self.base
            .context()
            .commands
            .execute_and_log(
                Some(package_dir),
                "dotnet",
                &["nuget", "push", packages.as_str(), "-s", NUGET_SOURCE, "--skip-duplicate"],
            )
            .await
            .wrap_err("failed to push package")
    }
}
