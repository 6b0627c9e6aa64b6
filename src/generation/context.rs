//! Run-time inputs and collaborators shared by every language generator

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::{Error, Result};
use crate::generation::traits::{
    CodeHostConnector, CommandRunner, FileSystem, PythonPackager, VersionControl,
};
use crate::generation::types::Language;

/// Invocation parameters for one run. Immutable once resolved.
#[derive(Clone, PartialEq, Eq)]
pub struct RunContext {
    pub version: String,
    pub service_name: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub git_user: String,
    pub git_token: String,
    pub spec_path: PathBuf,
    pub package_name: String,
    pub skip_push: bool,
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("version", &self.version)
            .field("service_name", &self.service_name)
            .field("repo_owner", &self.repo_owner)
            .field("repo_name", &self.repo_name)
            .field("git_user", &self.git_user)
            .field("git_token", &"***")
            .field("spec_path", &self.spec_path)
            .field("package_name", &self.package_name)
            .field("skip_push", &self.skip_push)
            .finish()
    }
}

/// Tool-level knobs the generators need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Directory the external generator runs in and reads its config from
    pub working_dir: PathBuf,
    /// Roots searched for `<language>/` packaging templates
    pub template_dirs: Vec<PathBuf>,
    pub generator_program: String,
    pub generator_args: Vec<String>,
    /// Publish Python packages to the standalone index as well
    pub pyx_publish: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            template_dirs: vec![PathBuf::from("templates"), PathBuf::from("/templates")],
            generator_program: "npx".to_string(),
            generator_args: vec!["@openapitools/openapi-generator-cli".to_string()],
            pyx_publish: false,
        }
    }
}

/// Everything a language generator is constructed with
#[derive(Clone)]
pub struct GenerationContext {
    pub run: Arc<RunContext>,
    pub options: Arc<GeneratorOptions>,
    pub commands: Arc<dyn CommandRunner>,
    pub files: Arc<dyn FileSystem>,
    pub vcs: Arc<dyn VersionControl>,
    pub code_host: Arc<dyn CodeHostConnector>,
    pub python: Arc<dyn PythonPackager>,
}

impl GenerationContext {
    /// Locate the packaging template directory for a language
    pub async fn template_dir(&self, language: Language) -> Result<PathBuf> {
        let candidates: Vec<PathBuf> = self
            .options
            .template_dirs
            .iter()
            .map(|root| root.join(language.as_str()))
            .collect();

        for candidate in &candidates {
            if self.files.exists(candidate).await? {
                return Ok(candidate.clone());
            }
        }

        Err(Error::FileNotFound(
            candidates
                .into_iter()
                .next()
                .unwrap_or_else(|| Path::new(language.as_str()).to_path_buf()),
        ))
    }

    /// Paths of named files inside a language's template directory
    pub async fn template_files(&self, language: Language, names: &[&str]) -> Result<Vec<PathBuf>> {
        let dir = self.template_dir(language).await?;
        Ok(names.iter().map(|name| dir.join(name)).collect())
    }
}
