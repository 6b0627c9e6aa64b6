//! Data exposed to packaging manifest templates

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::core::Result;
use crate::generation::context::RunContext;

/// Values a packaging template can reference, e.g. `{{ version }}`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TemplateData {
    pub version: String,
    pub service_name: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub package_name: String,
    pub git_user: String,
    pub git_token: String,
}

impl TemplateData {
    /// Template data for a package, using the run's version
    pub fn new(run: &RunContext, package_name: impl Into<String>) -> Self {
        Self {
            version: run.version.clone(),
            service_name: run.service_name.clone(),
            repo_owner: run.repo_owner.clone(),
            repo_name: run.repo_name.clone(),
            package_name: package_name.into(),
            git_user: run.git_user.clone(),
            git_token: run.git_token.clone(),
        }
    }

    /// Override the version, used after a publish conflict bumps it
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn to_value(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }
}
