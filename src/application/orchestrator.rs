//! Use case for generating and publishing packages for a list of languages

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::core::{Result, WrapErr};
use crate::generation::config::{CONFIG_FILE_NAME, ConfigStore};
use crate::generation::context::GenerationContext;
use crate::generation::registry::build_generators;
use crate::generation::traits::PackageGenerator;
use crate::generation::types::{Language, PackageArtifact};

pub const TEMP_DIR_PREFIX: &str = "package-generator";

/// Runs every requested language in order, stopping at the first failure
pub struct PackageOrchestrator {
    ctx: GenerationContext,
    config_dirs: Vec<PathBuf>,
}

impl PackageOrchestrator {
    pub fn new(ctx: GenerationContext, config_dirs: Vec<PathBuf>) -> Self {
        Self { ctx, config_dirs }
    }

    pub async fn run<S: AsRef<str>>(&self, languages: &[S]) -> Result<Vec<PackageArtifact>> {
        // 1. Validate every identifier before anything else happens
        let languages = Language::parse_all(languages)?;

        // 2. Load configuration and build generators; nothing has run yet
        let store = Arc::new(
            ConfigStore::load(self.ctx.files.as_ref(), &self.config_dirs, &languages).await?,
        );
        let generators = build_generators(&languages, &self.ctx, &store)?;

        // 3. Generate and push into a scratch directory removed afterwards
        let tmp_dir = self
            .ctx
            .files
            .make_temp_dir(TEMP_DIR_PREFIX)
            .await
            .wrap_err("failed to setup environment")?;

        let result = self.run_generators(&tmp_dir, generators).await;

        self.ctx.files.remove_quietly(&tmp_dir).await;
        self.ctx
            .files
            .remove_quietly(&self.ctx.options.working_dir.join(CONFIG_FILE_NAME))
            .await;

        let artifacts = result?;
        let names: Vec<&str> = languages.iter().map(Language::as_str).collect();
        if self.ctx.run.skip_push {
            info!("Successfully generated packages for languages: {}", names.join(", "));
        } else {
            info!(
                "Successfully generated and pushed packages for languages: {}",
                names.join(", ")
            );
        }
        Ok(artifacts)
    }

    async fn run_generators(
        &self,
        tmp_dir: &Path,
        generators: Vec<Box<dyn PackageGenerator>>,
    ) -> Result<Vec<PackageArtifact>> {
        let mut artifacts = Vec::with_capacity(generators.len());

        for mut generator in generators {
            let language = generator.language();
            info!(language = %language, "Generating {} client package", language.display_name());

            let output_dir = self
                .ctx
                .files
                .mkdir_all(&tmp_dir.join(language.as_str()))
                .await
                .wrap_err_with(|| format!("failed to make output dir for {language}"))?;

            let package_dir = generator
                .generate_package(&output_dir)
                .await
                .wrap_err_with(|| format!("failed to generate {language} package"))?;

            if self.ctx.run.skip_push {
                info!(language = %language, "Skipping push");
            } else {
                info!(language = %language, "Pushing {} package", language.display_name());
                generator
                    .push_package(&package_dir)
                    .await
                    .wrap_err_with(|| format!("failed to push {language} package"))?;
            }

            artifacts.push(PackageArtifact {
                language,
                package_name: generator.package_name(),
                version: generator.version().to_string(),
                path: package_dir,
            });
        }

        Ok(artifacts)
    }
}
