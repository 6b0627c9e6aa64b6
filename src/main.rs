//! openapi-packager CLI entrypoint
//! Parses command-line arguments and dispatches to the package generators.
#![deny(unsafe_code)]

// Internal imports (std, crate)
use openapi_packager::{
    application::{PackageOrchestrator, SelfTest, ToolSettings},
    generation::{CommandRunner, FileSystem, GenerationContext, Language, RunContext},
    infrastructure::{GitCli, GitHubConnector, LocalFileSystem, ProcessCommandRunner, UvClient},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "openapi-packager")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate artifacts from the service's OpenAPI specification
    #[command(visible_alias = "gen")]
    Generate {
        #[command(subcommand)]
        target: GenerateCommands,
    },
    /// Print the version of the tool
    Version,
    /// Run the generate pipeline locally with placeholder settings and pushing disabled
    Test {
        /// Languages to generate; defaults to every language except go
        languages: Vec<String>,
        /// Path to the OpenAPI specification; searched for when omitted
        #[arg(short, long)]
        spec_path: Option<PathBuf>,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum GenerateCommands {
    /// Generate and publish client packages for the given languages
    #[command(visible_aliases = ["pkg", "pkgs", "packages"])]
    Package {
        /// Languages to generate, in order
        #[arg(required = true, num_args = 1..)]
        languages: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with default level INFO
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate { target } => match target {
            GenerateCommands::Package { languages } => {
                // Unknown languages are reported before anything else is checked
                Language::parse_all(languages.as_slice())?;
                let run = RunContext::from_env()?;
                generate_packages(run, &languages).await?
            }
        },
        Commands::Version => println!("{}", env!("CARGO_PKG_VERSION")),
        Commands::Test {
            languages,
            spec_path,
        } => run_self_test(languages, spec_path.as_deref()).await?,
    }
    Ok(())
}

/// Wire the production adapters into a generation context
fn build_context(settings: &ToolSettings, run: RunContext) -> anyhow::Result<GenerationContext> {
    let commands: Arc<dyn CommandRunner> =
        Arc::new(ProcessCommandRunner::with_timeout(settings.command_timeout));
    let files: Arc<dyn FileSystem> =
        Arc::new(LocalFileSystem::new(&settings.generator.working_dir));
    let code_host = GitHubConnector::new(&settings.github_api_url, &run.git_token)
        .context("Failed to create GitHub client")?;

    Ok(GenerationContext {
        run: Arc::new(run),
        options: Arc::new(settings.generator.clone()),
        vcs: Arc::new(GitCli::new(commands.clone())),
        python: Arc::new(UvClient::new(commands.clone())),
        code_host: Arc::new(code_host),
        commands,
        files,
    })
}

/// Generate, and unless skipped push, a package for every language
async fn generate_packages(run: RunContext, languages: &[String]) -> anyhow::Result<()> {
    let working_dir = std::env::current_dir().context("Failed to read working directory")?;
    let settings = ToolSettings::from_env(&working_dir)?;

    let files = LocalFileSystem::new(&working_dir);
    let run = run.resolve_spec_path(&working_dir, &files).await?;
    info!(
        service = %run.service_name,
        version = %run.version,
        spec = %run.spec_path.display(),
        "Generating packages"
    );

    let ctx = build_context(&settings, run)?;
    let artifacts = PackageOrchestrator::new(ctx, settings.config_dirs.clone())
        .run(languages)
        .await?;

    for artifact in &artifacts {
        info!(
            language = %artifact.language,
            package = %artifact.package_name,
            version = %artifact.version,
            path = %artifact.path.display(),
            "Package ready"
        );
    }
    Ok(())
}

/// Dogfood the generate pipeline with placeholder identities
async fn run_self_test(languages: Vec<String>, spec_path: Option<&Path>) -> anyhow::Result<()> {
    let working_dir = std::env::current_dir().context("Failed to read working directory")?;
    let files = LocalFileSystem::new(&working_dir);

    let spec = SelfTest::new(&files, &working_dir)
        .locate_spec(spec_path)
        .await?;
    let run = SelfTest::run_context(&spec, |key| std::env::var(key).ok())?;
    let languages = SelfTest::languages(languages);
    info!(languages = %languages.join(", "), spec = %spec.display(), "Running self-test");

    generate_packages(run, &languages).await
}
