//! npm install and publish shared by the Angular, JavaScript and TypeScript generators
//!
//! npm reports a version clash on stdout rather than through a distinct exit
//! code, so a conflict is recognized by matching the captured output. On a
//! conflict the caller bumps the version with a timestamp suffix, re-renders
//! its manifests and retries until publishing succeeds or fails for another
//! reason.

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::{Error, Result, WrapErr};
use crate::generation::traits::CommandRunner;

/// Marker npm prints when the version is already published
pub const VERSION_CONFLICT: &str = "Cannot publish over existing version";

/// The same marker as printed by the npm versions the JavaScript build uses
pub const NPM_ERR_VERSION_CONFLICT: &str =
    "npm ERR! publish fail Cannot publish over existing version";

/// Check if npm output reports a version that was already published
pub fn is_version_conflict(output: &str, marker: &str) -> bool {
    output.contains(marker)
}

/// The version to retry with after a conflict
pub fn bumped_version(current: &str, timestamp: i64) -> String {
    format!("{current}-{timestamp}")
}

fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// Result of one `npm publish` attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    VersionConflict,
}

pub struct NpmClient {
    commands: Arc<dyn CommandRunner>,
    conflict_marker: &'static str,
    tag_prereleases: bool,
    clock: fn() -> i64,
}

impl NpmClient {
    pub fn new(commands: Arc<dyn CommandRunner>, conflict_marker: &'static str) -> Self {
        Self {
            commands,
            conflict_marker,
            tag_prereleases: false,
            clock: unix_now,
        }
    }

    /// Publish versions containing `-` under the `preview` dist-tag
    pub fn tag_prereleases(mut self) -> Self {
        self.tag_prereleases = true;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Install each dependency on its own so a failure names the package
    pub async fn install_each(&self, dir: &Path, packages: &[&str]) -> Result<()> {
        for package in packages {
            self.commands
                .execute_and_log(Some(dir), "npm", &["install", "--save", *package])
                .await
                .wrap_err_with(|| format!("failed to install {package}"))?;
        }
        Ok(())
    }

    fn publish_args(&self, version: &str) -> &'static [&'static str] {
        if self.tag_prereleases && version.contains('-') {
            &["publish", "--tag", "preview"]
        } else {
            &["publish"]
        }
    }

    /// Run `npm publish` once in `dir`
    pub async fn try_publish(&self, dir: &Path, version: &str) -> Result<PublishOutcome> {
        let args = self.publish_args(version);
        let out = self
            .commands
            .execute(Some(dir), "npm", args)
            .await
            .wrap_err("failed to publish package")?;
        if !out.output.is_empty() {
            info!("{}", out.output);
        }
        if out.is_success() {
            return Ok(PublishOutcome::Published);
        }

        if is_version_conflict(&out.output, self.conflict_marker) {
            warn!(version = %version, "Package already exists at version");
            return Ok(PublishOutcome::VersionConflict);
        }
        Err(Error::CommandFailed {
            command: format!("npm {}", args.join(" ")),
            exit_code: out.exit_code,
            output: out.output,
        }
        .wrap("failed to publish package"))
    }

    /// Move the package in `dir` to a new timestamped version and return it
    pub async fn bump_version(&self, dir: &Path, version: &str) -> Result<String> {
        let next = bumped_version(version, (self.clock)());
        info!(from = %version, to = %next, "Incrementing package version");
        self.commands
            .execute_and_log(Some(dir), "npm", &["version", next.as_str()])
            .await
            .wrap_err_with(|| format!("failed to increment version to {next}"))?;
        Ok(next)
    }
}
