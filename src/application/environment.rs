//! Run-time inputs read from the environment

use std::path::Path;

use crate::core::{Error, Result};
use crate::generation::context::RunContext;
use crate::generation::traits::FileSystem;

pub const VERSION_KEY: &str = "VERSION";
pub const REPO_OWNER_KEY: &str = "REPO_OWNER";
pub const REPO_NAME_KEY: &str = "REPO_NAME";
pub const SERVICE_NAME_KEY: &str = "SwaggerServiceName";
pub const SPEC_PATH_KEY: &str = "SpecPath";
pub const GIT_USER_KEY: &str = "GIT_USER";
pub const GIT_TOKEN_KEY: &str = "GIT_TOKEN";
pub const PACKAGE_NAME_KEY: &str = "PackageName";
pub const SKIP_PUSH_KEY: &str = "SKIP_PUSH";

pub const DEFAULT_PACKAGE_NAME: &str = "Client";

impl RunContext {
    /// Read the run context from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the run context through `lookup`. Empty values count as unset and
    /// every missing required name is reported in one error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |key: &str| match lookup(key).filter(|v| !v.is_empty()) {
            Some(value) => value,
            None => {
                missing.push(key.to_string());
                String::new()
            }
        };

        let version = required(VERSION_KEY);
        let repo_owner = required(REPO_OWNER_KEY);
        let repo_name = required(REPO_NAME_KEY);
        let service_name = required(SERVICE_NAME_KEY);
        let spec_path = required(SPEC_PATH_KEY);
        let git_user = required(GIT_USER_KEY);
        let git_token = required(GIT_TOKEN_KEY);

        if !missing.is_empty() {
            return Err(Error::MissingEnvironmentVariables(missing));
        }

        let package_name = lookup(PACKAGE_NAME_KEY)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_PACKAGE_NAME.to_string());
        let skip_push = lookup(SKIP_PUSH_KEY).as_deref() == Some("true");

        Ok(Self {
            version,
            service_name,
            repo_owner,
            repo_name,
            git_user,
            git_token,
            spec_path: spec_path.into(),
            package_name,
            skip_push,
        })
    }

    /// Resolve the spec path against `working_dir` and make sure it exists
    pub async fn resolve_spec_path(mut self, working_dir: &Path, files: &dyn FileSystem) -> Result<Self> {
        let path = working_dir.join(&self.spec_path);
        if !files.exists(&path).await? {
            return Err(Error::FileNotFound(path));
        }
        self.spec_path = path;
        Ok(self)
    }
}
