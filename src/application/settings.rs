//! Tool-level settings with environment overrides

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::{Error, Result};
use crate::generation::context::GeneratorOptions;

pub const CONFIG_DIRS_KEY: &str = "OPENAPI_CONFIG_DIRS";
pub const TEMPLATE_DIRS_KEY: &str = "OPENAPI_TEMPLATES_DIRS";
pub const COMMAND_TIMEOUT_KEY: &str = "COMMAND_TIMEOUT_SECS";
pub const GITHUB_API_URL_KEY: &str = "GITHUB_API_URL";
pub const PYX_PUBLISH_KEY: &str = "PYX_PUBLISH";

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSettings {
    /// Directories searched, in order, for `<language>-openapitools.json`
    pub config_dirs: Vec<PathBuf>,
    pub generator: GeneratorOptions,
    /// Per-subprocess timeout; none by default
    pub command_timeout: Option<Duration>,
    pub github_api_url: String,
}

impl ToolSettings {
    pub fn from_env(working_dir: &Path) -> Result<Self> {
        Self::from_lookup(working_dir, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(working_dir: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config_dirs = value(CONFIG_DIRS_KEY)
            .map(|v| split_paths(&v))
            .unwrap_or_else(|| vec![PathBuf::from("."), PathBuf::from("/")]);

        let mut generator = GeneratorOptions {
            working_dir: working_dir.to_path_buf(),
            ..GeneratorOptions::default()
        };
        if let Some(dirs) = value(TEMPLATE_DIRS_KEY) {
            generator.template_dirs = split_paths(&dirs);
        }
        generator.pyx_publish = value(PYX_PUBLISH_KEY).as_deref() == Some("true");

        let command_timeout = value(COMMAND_TIMEOUT_KEY)
            .map(|v| {
                v.trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| Error::config(format!("invalid {COMMAND_TIMEOUT_KEY} '{v}': {e}")))
            })
            .transpose()?;

        let github_api_url = value(GITHUB_API_URL_KEY)
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());
        url::Url::parse(&github_api_url)
            .map_err(|e| Error::config(format!("invalid {GITHUB_API_URL_KEY} '{github_api_url}': {e}")))?;

        Ok(Self {
            config_dirs,
            generator,
            command_timeout,
            github_api_url,
        })
    }
}

// Colon separated, like PATH
fn split_paths(value: &str) -> Vec<PathBuf> {
    value
        .split(':')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}
