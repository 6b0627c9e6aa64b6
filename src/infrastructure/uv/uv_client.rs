//! `PythonPackager` port over the `uv` build tool

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::core::{Result, WrapErr};
use crate::generation::traits::{CommandRunner, PythonPackager};

pub struct UvClient {
    commands: Arc<dyn CommandRunner>,
}

impl UvClient {
    pub fn new(commands: Arc<dyn CommandRunner>) -> Self {
        Self { commands }
    }
}

#[async_trait]
impl PythonPackager for UvClient {
    async fn build(&self, dir: &Path) -> Result<()> {
        self.commands
            .execute_and_log(Some(dir), "uv", &["build"])
            .await
            .wrap_err("failed to build project")
    }

    async fn publish(&self, dir: &Path, index: &str) -> Result<()> {
        self.commands
            .execute_and_log(Some(dir), "uv", &["publish", "--index", index])
            .await
            .wrap_err("failed to publish project")
    }
}
