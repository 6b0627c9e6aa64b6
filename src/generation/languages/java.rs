//! Java packages published with Gradle

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::core::{Result, WrapErr, utils::first_char_to_lower};
use crate::generation::base::BaseGenerator;
use crate::generation::templates::TemplateData;
use crate::generation::traits::PackageGenerator;
use crate::generation::types::Language;

pub struct JavaGenerator {
    base: BaseGenerator,
}

impl JavaGenerator {
    pub fn new(base: BaseGenerator) -> Self {
        Self { base }
    }
}

#[async_trait]
impl PackageGenerator for JavaGenerator {
    fn language(&self) -> Language {
        Language::Java
    }

    /// `mqube.` followed by the camelCased service name
    fn package_name(&self) -> String {
        format!(
            "mqube.{}",
            first_char_to_lower(&self.base.context().run.service_name)
        )
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
                &[
                    ("basePackage", package_name.clone()),
                    ("modelPackage", format!("{package_name}.models")),
                ],
            )
            .await?;

        let templates = ctx.template_dir(Language::Java).await?;
        let data = TemplateData::new(&ctx.run, &package_name).to_value()?;
        ctx.files
            .template_files_in_dir(&templates, &package_dir, &data)
            .await
            .wrap_err("failed to template packaging files")?;

        Ok(package_dir)
    }

    async fn push_package(&mut self, package_dir: &Path) -> Result<()> {
        self.base
            .context()
            .commands
            .execute_and_log(Some(package_dir), "gradle", &["publish"])
            .await
            .wrap_err("failed to publish package")
    }
}
