//! Python schema packages committed to the shared pipeline schemas repository
//!
//! The generated module is added to the schemas repository together with an
//! entry in its `packages.json` index and published by pull request. When
//! standalone publishing is enabled the package is additionally built with uv
//! before the repository step runs, and pushed to the private index before the
//! pull request is opened.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::{Result, WrapErr, utils::hyphens_to_underscores, utils::to_pretty_json};
use crate::generation::base::{BaseGenerator, PACKAGE_NAME_PROPERTY};
use crate::generation::repository::{
    PYTHON_SCHEMAS_REPOSITORY, PullRequestPolicy, RepositoryWorkflow,
};
use crate::generation::templates::TemplateData;
use crate::generation::traits::PackageGenerator;
use crate::generation::types::Language;

pub const PACKAGES_INDEX: &str = "packages.json";
pub const PROJECT_FILE: &str = "pyproject.toml";
pub const UV_INDEX: &str = "pyx";

// A dash followed by up to three digits
static DASH_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-([0-9]{1,3})").unwrap_or_else(|e| panic!("invalid version regex: {e}"))
});

// A dot, up to three digits, then the dash opening the prerelease part
static PRERELEASE_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.[0-9]{1,3}-").unwrap_or_else(|e| panic!("invalid version regex: {e}"))
});

/// Turn a SNAPSHOT version into a PEP 440 public version.
///
/// `0.0.0-PR-123-12-SNAPSHOT` becomes `0.0.0.preview123.dev12`; a SNAPSHOT
/// without two numeric parts gets a plain `.dev` suffix. Other versions are
/// returned unchanged.
pub fn pep440_version(version: &str) -> String {
    if !version.contains("SNAPSHOT") {
        return version.to_string();
    }

    let numbers: Vec<&str> = DASH_NUMBER
        .captures_iter(version)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    let suffix = match numbers.as_slice() {
        [first, second, ..] => format!(".preview{first}.dev{second}"),
        _ => ".dev".to_string(),
    };

    match PRERELEASE_START.find(version) {
        // Keep the release part, drop everything from the dash
        Some(m) => format!("{}{suffix}", &version[..m.end() - 1]),
        None => format!("{version}{suffix}"),
    }
}

const POLICY: PullRequestPolicy = PullRequestPolicy {
    reviewers: &["Reton2"],
    labels: &["updatebot"],
};

/// One entry of the schemas repository's `packages.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    #[serde(rename = "dir")]
    pub directory: String,
    pub name: String,
    pub version: String,
}

pub struct PythonGenerator {
    base: BaseGenerator,
    // Built uv project waiting to be published with the pull request
    standalone_dir: Option<PathBuf>,
}

impl PythonGenerator {
    pub fn new(base: BaseGenerator) -> Self {
        Self {
            base,
            standalone_dir: None,
        }
    }

    fn overrides(&self) -> [(&'static str, String); 1] {
        [(PACKAGE_NAME_PROPERTY, self.package_name())]
    }

    fn commit_message(&self) -> String {
        format!(
            "chore(deps): upgrade {} package -> {}",
            self.package_name(),
            self.version()
        )
    }

    /// Generate a standalone uv project and build it
    async fn build_standalone(&self, output_dir: &Path) -> Result<PathBuf> {
        let ctx = self.base.context();
        let package_name = self.package_name();
        let project_dir = ctx
            .files
            .mkdir_all(&output_dir.join(&package_name))
            .await
            .wrap_err("failed to create package directory")?;

        let project_dir = self.base.generate(&project_dir, &self.overrides()).await?;

        let version = pep440_version(&ctx.run.version);
        if version != ctx.run.version {
            info!("Converted SNAPSHOT version {} to {version} for pyx", ctx.run.version);
        }
        let files = ctx.template_files(Language::Python, &[PROJECT_FILE]).await?;
        let data = TemplateData::new(&ctx.run, &package_name)
            .with_version(version)
            .to_value()?;
        ctx.files
            .template_files(&project_dir, &data, &files)
            .await
            .wrap_err("failed to create pyproject.toml file")?;

        ctx.python
            .build(&project_dir)
            .await
            .wrap_err("failed to build UV project")?;
        Ok(project_dir)
    }

    /// Record this package version in the repository's index
    async fn update_packages_index(&self, repo_dir: &Path) -> Result<PathBuf> {
        let ctx = self.base.context();
        let path = repo_dir.join(PACKAGES_INDEX);

        let mut packages: BTreeMap<String, PackageInfo> = if ctx.files.exists(&path).await? {
            let data = ctx
                .files
                .read(&path)
                .await
                .wrap_err("failed to read packages.json")?;
            serde_json::from_slice(&data).wrap_err("failed to unmarshal packages.json")?
        } else {
            BTreeMap::new()
        };

        packages.insert(
            ctx.run.repo_name.clone(),
            PackageInfo {
                directory: self.package_name(),
                name: ctx.run.repo_name.clone(),
                version: ctx.run.version.clone(),
            },
        );

        let data = to_pretty_json(&packages)?;
        ctx.files
            .write(&path, &data, 0o755)
            .await
            .wrap_err("failed to write packages.json")?;
        Ok(path)
    }
}

#[async_trait]
impl PackageGenerator for PythonGenerator {
    fn language(&self) -> Language {
        Language::Python
    }

    fn package_name(&self) -> String {
        hyphens_to_underscores(&self.base.context().run.repo_name)
    }

    fn version(&self) -> &str {
        &self.base.context().run.version
    }

    async fn generate_package(&mut self, output_dir: &Path) -> Result<PathBuf> {
        let ctx = self.base.context().clone();
        if ctx.options.pyx_publish {
            self.standalone_dir = Some(self.build_standalone(output_dir).await?);
        }

        let package_name = self.package_name();
        let workflow = RepositoryWorkflow::new(&ctx, PYTHON_SCHEMAS_REPOSITORY);
        let repo_dir = workflow.prepare(output_dir, &package_name).await?;

        self.base.generate(&repo_dir, &self.overrides()).await?;

        let index = self
            .update_packages_index(&repo_dir)
            .await
            .wrap_err("failed to update packages.json")?;

        let paths = [
            index,
            repo_dir.join(&package_name),
            repo_dir.join(format!("{package_name}_README.md")),
        ];
        workflow
            .commit(&repo_dir, &paths, &self.commit_message())
            .await?;
        Ok(repo_dir)
    }

    async fn push_package(&mut self, package_dir: &Path) -> Result<()> {
        let ctx = self.base.context();
        if let Some(project_dir) = &self.standalone_dir {
            ctx.python
                .publish(project_dir, UV_INDEX)
                .await
                .wrap_err("failed to publish UV project")?;
            info!(dir = %project_dir.display(), index = UV_INDEX, "Published UV project");
        }

        let body = format!("Automated python schemas update for {}", self.package_name());
        RepositoryWorkflow::new(ctx, PYTHON_SCHEMAS_REPOSITORY)
            .open_pull_request(package_dir, &self.commit_message(), &body, POLICY)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestHarness;

    const REPO: &str = "/tmp/py/mqube-ml-doc-pipeline-schemas";

    #[test]
    fn test_package_name_replaces_hyphens() {
        let harness = TestHarness::with_languages(&[Language::Python]);
        let generator = PythonGenerator::new(harness.base_generator(Language::Python));
        assert_eq!(generator.package_name(), "other_test_service");
    }

    #[tokio::test]
    async fn test_generate_commits_into_schemas_repository() {
        let harness = TestHarness::with_languages(&[Language::Python]);
        harness.files.add_file(
            format!("{REPO}/packages.json"),
            r#"{"existing-service": {"dir": "existing_service", "name": "existing-service", "version": "0.1.0"}}"#,
        );
        let mut generator = PythonGenerator::new(harness.base_generator(Language::Python));

        let dir = generator.generate_package(Path::new("/tmp/py")).await.unwrap();
        assert_eq!(dir, PathBuf::from(REPO));

        assert_eq!(
            harness.calls(),
            vec![
                "git clone https://github.com/spring-financial-group/mqube-ml-doc-pipeline-schemas.git".to_string(),
                "git checkout -b update/other_test_service/1.2.3".to_string(),
                format!("mkdir {REPO}"),
                "write /work/openapitools.json".to_string(),
                "run[/work] npx @openapitools/openapi-generator-cli generate --generator-key python --config /work/openapitools.json".to_string(),
                format!("write {REPO}/packages.json"),
                "git add packages.json other_test_service other_test_service_README.md".to_string(),
                "git commit chore(deps): upgrade other_test_service package -> 1.2.3".to_string(),
            ]
        );

        let packages: BTreeMap<String, PackageInfo> =
            serde_json::from_slice(&harness.files.file(format!("{REPO}/packages.json")).unwrap())
                .unwrap();
        assert_eq!(packages.len(), 2);
        assert_eq!(
            packages["other-test-service"],
            PackageInfo {
                directory: "other_test_service".to_string(),
                name: "other-test-service".to_string(),
                version: "1.2.3".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_missing_packages_index_starts_empty() {
        let harness = TestHarness::with_languages(&[Language::Python]);
        let mut generator = PythonGenerator::new(harness.base_generator(Language::Python));

        generator.generate_package(Path::new("/tmp/py")).await.unwrap();

        let text = harness.files.file_string(format!("{REPO}/packages.json")).unwrap();
        assert!(text.contains("\"dir\": \"other_test_service\""));
    }

    #[test]
    fn test_pep440_version() {
        assert_eq!(pep440_version("1.2.3"), "1.2.3");
        assert_eq!(pep440_version("0.0.0-PR-123-12-SNAPSHOT"), "0.0.0.preview123.dev12");
        assert_eq!(pep440_version("1.4.0-SNAPSHOT"), "1.4.0.dev");
        assert_eq!(pep440_version("SNAPSHOT"), "SNAPSHOT.dev");
    }

    #[tokio::test]
    async fn test_standalone_project_is_built_before_repository_step() {
        let mut harness = TestHarness::with_languages(&[Language::Python]);
        harness.options.pyx_publish = true;
        let mut generator = PythonGenerator::new(harness.base_generator(Language::Python));

        generator.generate_package(Path::new("/tmp/py")).await.unwrap();

        let calls = harness.calls();
        assert_eq!(calls[0], "mkdir /tmp/py/other_test_service");
        let render = calls
            .iter()
            .position(|c| c == "template /tmp/py/other_test_service <- pyproject.toml")
            .unwrap();
        let build = calls
            .iter()
            .position(|c| c == "uv build /tmp/py/other_test_service")
            .unwrap();
        let clone = calls.iter().position(|c| c.starts_with("git clone")).unwrap();
        assert!(render < build && build < clone);
        assert!(!calls.iter().any(|c| c.starts_with("uv publish")));
    }

    #[tokio::test]
    async fn test_standalone_project_is_published_with_the_pull_request() {
        let mut harness = TestHarness::with_languages(&[Language::Python]);
        harness.options.pyx_publish = true;
        let mut generator = PythonGenerator::new(harness.base_generator(Language::Python));

        let repo_dir = generator.generate_package(Path::new("/tmp/py")).await.unwrap();
        generator.push_package(&repo_dir).await.unwrap();

        let calls = harness.calls();
        let publish = calls
            .iter()
            .position(|c| c == "uv publish /tmp/py/other_test_service --index pyx")
            .unwrap();
        let pr = calls.iter().position(|c| c.starts_with("pr create")).unwrap();
        assert!(publish < pr);
    }

    #[tokio::test]
    async fn test_push_opens_pull_request_with_reviewers_and_label() {
        let harness = TestHarness::with_languages(&[Language::Python]);
        let mut generator = PythonGenerator::new(harness.base_generator(Language::Python));

        generator.push_package(Path::new(REPO)).await.unwrap();

        let calls = harness.calls();
        assert_eq!(
            &calls[4..],
            &[
                "pr create spring-financial-group/mqube-ml-doc-pipeline-schemas head=main base=main title=chore(deps): upgrade other_test_service package -> 1.2.3",
                "pr reviewers #42 Reton2",
                "pr labels #42 updatebot",
            ]
        );
    }
}
