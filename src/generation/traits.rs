//! Port interfaces for the generation domain
//!
//! Every side effect a generator performs goes through one of these traits so
//! the orchestration logic can be exercised against recording fakes.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::Result;
use crate::generation::types::Language;

/// Captured result of a finished subprocess
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    /// Combined stdout and stderr, trimmed
    pub output: String,
}

impl CommandOutput {
    /// A successful result with the given output
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            output: output.into(),
        }
    }

    /// A failed result with the given exit code and output
    pub fn failure(exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            output: output.into(),
        }
    }

    /// Check if the command was successful
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs external programs
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Execute a program in `dir` (or the process working directory) and
    /// capture its combined output. A non-zero exit is reported through
    /// [`CommandOutput::exit_code`], not as an error.
    async fn execute(&self, dir: Option<&Path>, program: &str, args: &[&str])
    -> Result<CommandOutput>;

    /// Execute a program, logging the invocation and its output, failing with
    /// [`crate::core::Error::CommandFailed`] on a non-zero exit
    async fn execute_and_log(&self, dir: Option<&Path>, program: &str, args: &[&str])
    -> Result<()>;
}

/// Filesystem operations used by the generators
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Checks if a path exists
    async fn exists(&self, path: &Path) -> Result<bool>;
    /// Reads the file at the given path
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;
    /// Writes data to a file, applying the permissions on unix
    async fn write(&self, path: &Path, data: &[u8], mode: u32) -> Result<()>;
    /// Copies a single file, returning the number of bytes copied
    async fn copy(&self, src: &Path, dst: &Path) -> Result<u64>;
    /// Copies a file into a directory keeping its name, returning the new path
    async fn copy_to_dir(&self, src: &Path, dst_dir: &Path) -> Result<PathBuf>;
    /// Copies a file into the working directory keeping its name
    async fn copy_to_working_dir(&self, src: &Path) -> Result<PathBuf>;
    /// Copies several files into a directory keeping their names
    async fn copy_many_to_dir(&self, dst_dir: &Path, srcs: &[PathBuf]) -> Result<()>;
    /// Moves a file or directory
    async fn rename(&self, src: &Path, dst: &Path) -> Result<()>;
    /// Creates a directory and all of its parents
    async fn mkdir_all(&self, path: &Path) -> Result<PathBuf>;
    /// Creates a fresh temporary directory whose name starts with `prefix`
    async fn make_temp_dir(&self, prefix: &str) -> Result<PathBuf>;
    /// Removes a file or directory tree; a missing path is not an error
    async fn remove(&self, path: &Path) -> Result<()>;
    /// Removes a path, logging instead of failing
    async fn remove_quietly(&self, path: &Path);
    /// Replaces every occurrence of `from` with `to` in a text file
    async fn replace_in_file(&self, path: &Path, from: &str, to: &str) -> Result<()>;
    /// Renders each template file into `dst_dir` under its own file name
    async fn template_files(&self, dst_dir: &Path, data: &JsonValue, files: &[PathBuf])
    -> Result<()>;
    /// Renders every regular file of `src_dir` into `dst_dir`
    async fn template_files_in_dir(&self, src_dir: &Path, dst_dir: &Path, data: &JsonValue)
    -> Result<()>;
}

/// Local version control operations
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Clones a repository into `dir`, returning the path of the working copy
    async fn clone_repo(&self, dir: &Path, url: &str) -> Result<PathBuf>;
    /// Name of the checked out branch
    async fn current_branch(&self, dir: &Path) -> Result<String>;
    /// Points `origin` at a different URL
    async fn set_remote(&self, dir: &Path, url: &str) -> Result<()>;
    /// Creates and checks out a new branch
    async fn checkout_new_branch(&self, dir: &Path, branch: &str) -> Result<()>;
    /// Stages the given paths
    async fn add(&self, dir: &Path, paths: &[PathBuf]) -> Result<()>;
    /// Commits staged changes
    async fn commit(&self, dir: &Path, message: &str) -> Result<()>;
    /// Pushes a branch to `origin`, setting it as upstream
    async fn push(&self, dir: &Path, branch: &str) -> Result<()>;
    /// The remote default branch, e.g. `origin/main`
    async fn default_branch(&self, dir: &Path) -> Result<String>;
}

/// Request body for opening a pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
    pub maintainer_can_modify: bool,
}

/// A created pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
}

/// Code host API bound to a single repository
#[async_trait]
pub trait CodeHostClient: Send + Sync {
    async fn create_pull_request(&self, request: &NewPullRequest) -> Result<PullRequest>;
    async fn request_reviewers(&self, reviewers: &[&str], number: u64) -> Result<()>;
    async fn add_labels(&self, labels: &[&str], number: u64) -> Result<()>;
}

/// Produces code host clients for a given repository
pub trait CodeHostConnector: Send + Sync {
    fn connect(&self, owner: &str, repository: &str) -> Arc<dyn CodeHostClient>;
}

/// Python build tool used by the standalone publish path
#[async_trait]
pub trait PythonPackager: Send + Sync {
    /// Builds the `pyproject.toml` project in `dir`
    async fn build(&self, dir: &Path) -> Result<()>;
    /// Publishes the built project to the named index
    async fn publish(&self, dir: &Path, index: &str) -> Result<()>;
}

/// A generator for one target language
#[async_trait]
pub trait PackageGenerator: Send + Sync {
    fn language(&self) -> Language;

    /// Name of the generated package, derived only from the run context
    fn package_name(&self) -> String;

    /// The version being published; may change while pushing
    fn version(&self) -> &str;

    /// Generate the package under `output_dir`, returning the directory to push
    async fn generate_package(&mut self, output_dir: &Path) -> Result<PathBuf>;

    /// Publish a generated package
    async fn push_package(&mut self, package_dir: &Path) -> Result<()>;
}
