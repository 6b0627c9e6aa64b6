//! Go modules committed to the shared Go packages repository

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::core::{Result, WrapErr, utils::hyphens_to_underscores};
use crate::generation::base::{BaseGenerator, PACKAGE_NAME_PROPERTY};
use crate::generation::repository::{GO_PACKAGES_REPOSITORY, PullRequestPolicy, RepositoryWorkflow};
use crate::generation::traits::PackageGenerator;
use crate::generation::types::Language;

const POLICY: PullRequestPolicy = PullRequestPolicy {
    reviewers: &["Skisocks", "Reton2"],
    labels: &[],
};

static MODULE_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^module\s+\S+").unwrap_or_else(|e| panic!("invalid module regex: {e}"))
});

/// Module path of a package inside the shared repository
pub fn module_path(package_name: &str) -> String {
    format!(
        "github.com/{}/{}/{package_name}",
        GO_PACKAGES_REPOSITORY.owner, GO_PACKAGES_REPOSITORY.name
    )
}

/// Point the `module` directive of a go.mod at `module`
pub fn rewrite_module(go_mod: &str, module: &str) -> String {
    MODULE_DIRECTIVE
        .replace(go_mod, format!("module {module}").as_str())
        .into_owned()
}

pub struct GoGenerator {
    base: BaseGenerator,
}

impl GoGenerator {
    pub fn new(base: BaseGenerator) -> Self {
        Self { base }
    }
}

#[async_trait]
impl PackageGenerator for GoGenerator {
    fn language(&self) -> Language {
        Language::Go
    }

    fn package_name(&self) -> String {
        hyphens_to_underscores(&self.base.context().run.repo_name.to_lowercase())
    }

    fn version(&self) -> &str {
        &self.base.context().run.version
    }

    async fn generate_package(&mut self, output_dir: &Path) -> Result<PathBuf> {
        let ctx = self.base.context().clone();
        let package_name = self.package_name();
        let workflow = RepositoryWorkflow::new(&ctx, GO_PACKAGES_REPOSITORY);

        let repo_dir = workflow.prepare(output_dir, &package_name).await?;
        let package_dir = repo_dir.join(&package_name);
        workflow
            .recreate_dir(&package_dir)
            .await
            .wrap_err("failed to create fresh directory")?;

        self.base
            .generate(&package_dir, &[(PACKAGE_NAME_PROPERTY, package_name.clone())])
            .await?;

        let go_mod = package_dir.join("go.mod");
        let data = ctx.files.read(&go_mod).await.wrap_err("failed to read go.mod")?;
        let rewritten = rewrite_module(&String::from_utf8_lossy(&data), &module_path(&package_name));
        ctx.files
            .write(&go_mod, rewritten.as_bytes(), 0o644)
            .await
            .wrap_err("failed to change module name")?;

        ctx.commands
            .execute_and_log(Some(&package_dir), "go", &["mod", "tidy"])
            .await
            .wrap_err("failed to run go mod tidy")?;

        workflow
            .write_version_file(&package_dir)
            .await
            .wrap_err("failed to create package version file")?;

        let message = format!(
            "chore(deps): upgrade {package_name} module -> {}",
            ctx.run.version
        );
        workflow
            .commit(&repo_dir, &[package_dir.clone()], &message)
            .await?;
        Ok(package_dir)
    }

    async fn push_package(&mut self, package_dir: &Path) -> Result<()> {
        let package_name = self.package_name();
        let ctx = self.base.context();
        let title = format!(
            "chore(deps): upgrade {package_name} package -> {}",
            ctx.run.version
        );
        let body = format!("Automated go schemas update for {package_name}");
        RepositoryWorkflow::new(ctx, GO_PACKAGES_REPOSITORY)
            .open_pull_request(package_dir, &title, &body, POLICY)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestHarness;

    const REPO: &str = "/tmp/go/mqube-go-packages";

    #[test]
    fn test_package_name_lowercases_and_replaces_hyphens() {
        let mut harness = TestHarness::with_languages(&[Language::Go]);
        let generator = GoGenerator::new(harness.base_generator(Language::Go));
        assert_eq!(generator.package_name(), "other_test_service");

        harness.run.repo_name = "Payments-API".to_string();
        let generator = GoGenerator::new(harness.base_generator(Language::Go));
        assert_eq!(generator.package_name(), "payments_api");
    }

    #[test]
    fn test_rewrite_module_only_touches_directive() {
        let go_mod = "module github.com/GIT_USER_ID/GIT_REPO_ID\n\ngo 1.18\n\nrequire github.com/stretchr/testify v1.8.1\n";
        let rewritten = rewrite_module(go_mod, &module_path("case_service"));

        assert_eq!(
            rewritten,
            "module github.com/spring-financial-group/mqube-go-packages/case_service\n\ngo 1.18\n\nrequire github.com/stretchr/testify v1.8.1\n"
        );
    }

    #[tokio::test]
    async fn test_generate_recreates_dir_and_rewrites_module() {
        let harness = TestHarness::with_languages(&[Language::Go]);
        let pkg = format!("{REPO}/other_test_service");
        harness.files.add_file(format!("{pkg}/stale.go"), "package stale");
        harness.commands.creates(
            "npx",
            format!("{pkg}/go.mod"),
            "module github.com/GIT_USER_ID/GIT_REPO_ID\n\ngo 1.18\n",
        );
        let mut generator = GoGenerator::new(harness.base_generator(Language::Go));

        let dir = generator.generate_package(Path::new("/tmp/go")).await.unwrap();
        assert_eq!(dir, PathBuf::from(&pkg));

        assert!(harness.files.file(format!("{pkg}/stale.go")).is_none());
        assert_eq!(
            harness.files.file_string(format!("{pkg}/go.mod")).unwrap(),
            "module github.com/spring-financial-group/mqube-go-packages/other_test_service\n\ngo 1.18\n"
        );
        assert_eq!(harness.files.file_string(format!("{pkg}/VERSION")).unwrap(), "1.2.3");

        let calls = harness.calls();
        assert_eq!(
            &calls[..4],
            &[
                "git clone https://github.com/spring-financial-group/mqube-go-packages.git".to_string(),
                "git checkout -b update/other_test_service/1.2.3".to_string(),
                format!("remove {pkg}"),
                format!("mkdir {pkg}"),
            ]
        );
        assert_eq!(
            &calls[calls.len() - 5..],
            &[
                format!("write {pkg}/go.mod"),
                format!("run[{pkg}] go mod tidy"),
                format!("write {pkg}/VERSION"),
                "git add other_test_service".to_string(),
                "git commit chore(deps): upgrade other_test_service module -> 1.2.3".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_push_requests_reviewers_without_labels() {
        let harness = TestHarness::with_languages(&[Language::Go]);
        let mut generator = GoGenerator::new(harness.base_generator(Language::Go));

        generator.push_package(Path::new(REPO)).await.unwrap();

        let calls = harness.calls();
        assert_eq!(calls.last().unwrap(), "pr reviewers #42 Skisocks,Reton2");
        assert!(!calls.iter().any(|c| c.starts_with("pr labels")));
    }
}
