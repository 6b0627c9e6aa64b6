//! The shared generation step every language generator starts from
//!
//! Merges the run's dynamic values into the language's configuration entry,
//! writes the whole configuration set to the working directory and runs the
//! external OpenAPI generator against it.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::{Error, Result, WrapErr};
use crate::generation::config::{CONFIG_FILE_NAME, ScopedConfig};
use crate::generation::context::GenerationContext;
use crate::generation::types::Language;

pub const PACKAGE_NAME_PROPERTY: &str = "packageName";
pub const PACKAGE_VERSION_PROPERTY: &str = "packageVersion";

pub struct BaseGenerator {
    ctx: GenerationContext,
    config: ScopedConfig,
}

impl BaseGenerator {
    pub fn new(ctx: GenerationContext, config: ScopedConfig) -> Self {
        Self { ctx, config }
    }

    pub fn context(&self) -> &GenerationContext {
        &self.ctx
    }

    pub fn language(&self) -> Language {
        self.config.language()
    }

    /// Path of the merged configuration the generator reads
    pub fn config_path(&self) -> PathBuf {
        self.ctx.options.working_dir.join(CONFIG_FILE_NAME)
    }

    /// Generate into `output_dir`, applying `overrides` as additional
    /// properties on top of the run's values. Returns `output_dir`.
    pub async fn generate(&self, output_dir: &Path, overrides: &[(&str, String)]) -> Result<PathBuf> {
        let language = self.language();
        self.ctx
            .files
            .mkdir_all(output_dir)
            .await
            .wrap_err_with(|| format!("failed to create {}", output_dir.display()))?;

        let run = &self.ctx.run;
        self.config.update(|generator| {
            generator.input_spec = run.spec_path.display().to_string();
            generator.git_repo_id = run.repo_name.clone();
            generator.git_user_id = run.repo_owner.clone();
            generator
                .additional_properties
                .insert(PACKAGE_VERSION_PROPERTY.to_string(), run.version.clone());
            for (key, value) in overrides {
                generator
                    .additional_properties
                    .insert((*key).to_string(), value.clone());
            }
            generator.output = output_dir.display().to_string();
        });

        let config_path = self.config_path();
        let data = self.config.to_json()?;
        self.ctx
            .files
            .write(&config_path, &data, 0o755)
            .await
            .wrap_err("failed to write generator configuration")?;

        info!(language = %language, output = %output_dir.display(), "Running OpenAPI generator");
        let config_arg = config_path.display().to_string();
        let mut args: Vec<&str> = self
            .ctx
            .options
            .generator_args
            .iter()
            .map(String::as_str)
            .collect();
        args.extend([
            "generate",
            "--generator-key",
            language.as_str(),
            "--config",
            config_arg.as_str(),
        ]);

        self.ctx
            .commands
            .execute_and_log(
                Some(&self.ctx.options.working_dir),
                &self.ctx.options.generator_program,
                &args,
            )
            .await
            .map_err(|source| Error::GenerationFailed {
                language: language.to_string(),
                source: Box::new(source),
            })?;

        Ok(output_dir.to_path_buf())
    }
}
