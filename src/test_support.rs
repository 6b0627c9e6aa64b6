//! Recording fakes for the capability ports
//!
//! All fakes built by a [`TestHarness`] append to one shared call log so tests
//! can assert ordering across ports.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::{Error, Result};
use crate::generation::base::BaseGenerator;
use crate::generation::config::{ConfigSet, ConfigStore, GeneratorConfig};
use crate::generation::context::{GenerationContext, GeneratorOptions, RunContext};
use crate::generation::traits::{
    CodeHostClient, CodeHostConnector, CommandOutput, CommandRunner, FileSystem, NewPullRequest,
    PullRequest, PythonPackager, VersionControl,
};
use crate::generation::types::Language;

/// Shared, ordered log of port calls
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

pub fn run_context() -> RunContext {
    RunContext {
        version: "1.2.3".to_string(),
        service_name: "CaseService".to_string(),
        repo_owner: "spring-financial-group".to_string(),
        repo_name: "other-test-service".to_string(),
        git_user: "release-bot".to_string(),
        git_token: "s3cr3t-token".to_string(),
        spec_path: PathBuf::from("/specs/swagger.json"),
        package_name: "Client".to_string(),
        skip_push: false,
    }
}

fn not_found(path: &Path) -> Error {
    Error::io(path, io::Error::from(io::ErrorKind::NotFound))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// In-memory filesystem that records every mutating call
#[derive(Debug, Default)]
pub struct RecordingFileSystem {
    log: CallLog,
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
}

impl RecordingFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn add_file(&self, path: impl Into<PathBuf>, data: impl AsRef<[u8]>) {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), data.as_ref().to_vec());
    }

    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        self.dirs.lock().unwrap().insert(path.into());
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path.as_ref()).cloned()
    }

    pub fn file_string(&self, path: impl AsRef<Path>) -> Option<String> {
        self.file(path).map(|data| String::from_utf8(data).unwrap())
    }

    fn contains(&self, path: &Path) -> bool {
        self.files.lock().unwrap().keys().any(|f| f.starts_with(path))
            || self.dirs.lock().unwrap().iter().any(|d| d.starts_with(path))
    }
}

#[async_trait]
impl FileSystem for RecordingFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.contains(path))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.file(path).ok_or_else(|| not_found(path))
    }

    async fn write(&self, path: &Path, data: &[u8], _mode: u32) -> Result<()> {
        self.log.push(format!("write {}", path.display()));
        self.add_file(path, data);
        Ok(())
    }

    async fn copy(&self, src: &Path, dst: &Path) -> Result<u64> {
        self.log
            .push(format!("copy {} {}", src.display(), dst.display()));
        let data = self.file(src).ok_or_else(|| not_found(src))?;
        let len = data.len() as u64;
        self.add_file(dst, data);
        Ok(len)
    }

    async fn copy_to_dir(&self, src: &Path, dst_dir: &Path) -> Result<PathBuf> {
        let dst = dst_dir.join(file_name(src));
        self.copy(src, &dst).await?;
        Ok(dst)
    }

    async fn copy_to_working_dir(&self, src: &Path) -> Result<PathBuf> {
        self.copy_to_dir(src, Path::new("/work")).await
    }

    async fn copy_many_to_dir(&self, dst_dir: &Path, srcs: &[PathBuf]) -> Result<()> {
        for src in srcs {
            self.copy_to_dir(src, dst_dir).await?;
        }
        Ok(())
    }

    async fn rename(&self, src: &Path, dst: &Path) -> Result<()> {
        self.log
            .push(format!("move {} {}", src.display(), dst.display()));
        let data = self.files.lock().unwrap().remove(src);
        match data {
            Some(data) => self.add_file(dst, data),
            None => self.add_dir(dst),
        }
        Ok(())
    }

    async fn mkdir_all(&self, path: &Path) -> Result<PathBuf> {
        self.log.push(format!("mkdir {}", path.display()));
        self.add_dir(path);
        Ok(path.to_path_buf())
    }

    async fn make_temp_dir(&self, prefix: &str) -> Result<PathBuf> {
        self.log.push(format!("mktemp {prefix}"));
        let path = PathBuf::from("/tmp").join(prefix);
        self.add_dir(&path);
        Ok(path)
    }

    async fn remove(&self, path: &Path) -> Result<()> {
        self.log.push(format!("remove {}", path.display()));
        self.files.lock().unwrap().retain(|f, _| !f.starts_with(path));
        self.dirs.lock().unwrap().retain(|d| !d.starts_with(path));
        Ok(())
    }

    async fn remove_quietly(&self, path: &Path) {
        let _ = self.remove(path).await;
    }

    async fn replace_in_file(&self, path: &Path, from: &str, to: &str) -> Result<()> {
        self.log.push(format!("replace {}", path.display()));
        let text = self.file_string(path).ok_or_else(|| not_found(path))?;
        self.add_file(path, text.replace(from, to));
        Ok(())
    }

    async fn template_files(&self, dst_dir: &Path, data: &JsonValue, files: &[PathBuf]) -> Result<()> {
        let names: Vec<String> = files.iter().map(|f| file_name(f)).collect();
        self.log
            .push(format!("template {} <- {}", dst_dir.display(), names.join(", ")));
        for name in names {
            self.add_file(dst_dir.join(name), data.to_string());
        }
        Ok(())
    }

    async fn template_files_in_dir(&self, src_dir: &Path, dst_dir: &Path, _data: &JsonValue) -> Result<()> {
        self.log.push(format!(
            "template {} <- {}/*",
            dst_dir.display(),
            src_dir.display()
        ));
        Ok(())
    }
}

/// Command runner returning scripted outputs, success by default
#[derive(Debug, Default)]
pub struct RecordingCommandRunner {
    log: CallLog,
    responses: Mutex<VecDeque<(String, CommandOutput)>>,
    files: Option<Arc<RecordingFileSystem>>,
    effects: Mutex<Vec<(String, PathBuf, Vec<u8>)>>,
}

impl RecordingCommandRunner {
    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// A runner whose commands can leave files behind in `files`
    pub fn with_files(log: CallLog, files: Arc<RecordingFileSystem>) -> Self {
        Self {
            log,
            files: Some(files),
            ..Self::default()
        }
    }

    /// Make every command line starting with `prefix` create a file
    pub fn creates(&self, prefix: &str, path: impl Into<PathBuf>, data: impl AsRef<[u8]>) {
        self.effects
            .lock()
            .unwrap()
            .push((prefix.to_string(), path.into(), data.as_ref().to_vec()));
    }

    fn apply_effects(&self, line: &str) {
        let Some(files) = &self.files else { return };
        for (prefix, path, data) in self.effects.lock().unwrap().iter() {
            if line.starts_with(prefix.as_str()) {
                files.add_file(path.clone(), data);
            }
        }
    }

    /// Queue an output for the next command line starting with `prefix`
    pub fn respond(&self, prefix: &str, output: CommandOutput) {
        self.responses
            .lock()
            .unwrap()
            .push_back((prefix.to_string(), output));
    }

    fn next_output(&self, line: &str) -> CommandOutput {
        let mut responses = self.responses.lock().unwrap();
        match responses.iter().position(|(prefix, _)| line.starts_with(prefix.as_str())) {
            Some(index) => responses.remove(index).map(|(_, out)| out).unwrap(),
            None => CommandOutput::success(""),
        }
    }
}

#[async_trait]
impl CommandRunner for RecordingCommandRunner {
    async fn execute(&self, dir: Option<&Path>, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        match dir {
            Some(dir) => self.log.push(format!("run[{}] {line}", dir.display())),
            None => self.log.push(format!("run {line}")),
        }
        self.apply_effects(&line);
        Ok(self.next_output(&line))
    }

    async fn execute_and_log(&self, dir: Option<&Path>, program: &str, args: &[&str]) -> Result<()> {
        let out = self.execute(dir, program, args).await?;
        if out.is_success() {
            return Ok(());
        }
        Err(Error::CommandFailed {
            command: std::iter::once(program)
                .chain(args.iter().copied())
                .collect::<Vec<_>>()
                .join(" "),
            exit_code: out.exit_code,
            output: out.output,
        })
    }
}

/// Version control fake; clones become `<dir>/<repository name>`
#[derive(Debug)]
pub struct RecordingVersionControl {
    log: CallLog,
    branch: Mutex<String>,
    pub default_branch: Mutex<String>,
}

impl RecordingVersionControl {
    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            branch: Mutex::new("main".to_string()),
            default_branch: Mutex::new("origin/main".to_string()),
        }
    }
}

#[async_trait]
impl VersionControl for RecordingVersionControl {
    async fn clone_repo(&self, dir: &Path, url: &str) -> Result<PathBuf> {
        self.log.push(format!("git clone {url}"));
        let name = url
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .trim_end_matches(".git");
        Ok(dir.join(name))
    }

    async fn current_branch(&self, _dir: &Path) -> Result<String> {
        self.log.push("git current-branch");
        Ok(self.branch.lock().unwrap().clone())
    }

    async fn set_remote(&self, _dir: &Path, _url: &str) -> Result<()> {
        self.log.push("git set-remote origin");
        Ok(())
    }

    async fn checkout_new_branch(&self, _dir: &Path, branch: &str) -> Result<()> {
        self.log.push(format!("git checkout -b {branch}"));
        *self.branch.lock().unwrap() = branch.to_string();
        Ok(())
    }

    async fn add(&self, dir: &Path, paths: &[PathBuf]) -> Result<()> {
        let paths: Vec<String> = paths
            .iter()
            .map(|p| p.strip_prefix(dir).unwrap_or(p).display().to_string())
            .collect();
        self.log.push(format!("git add {}", paths.join(" ")));
        Ok(())
    }

    async fn commit(&self, _dir: &Path, message: &str) -> Result<()> {
        self.log.push(format!("git commit {message}"));
        Ok(())
    }

    async fn push(&self, _dir: &Path, branch: &str) -> Result<()> {
        self.log.push(format!("git push {branch}"));
        Ok(())
    }

    async fn default_branch(&self, _dir: &Path) -> Result<String> {
        self.log.push("git default-branch");
        Ok(self.default_branch.lock().unwrap().clone())
    }
}

/// Code host fake; doubles as its own connector
#[derive(Debug, Clone, Default)]
pub struct RecordingCodeHost {
    log: CallLog,
    repository: String,
    next_number: Arc<AtomicU64>,
    fail_reviewers: Arc<AtomicBool>,
}

impl RecordingCodeHost {
    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            next_number: Arc::new(AtomicU64::new(42)),
            ..Self::default()
        }
    }

    pub fn fail_reviewer_requests(&self) {
        self.fail_reviewers.store(true, Ordering::SeqCst);
    }
}

impl CodeHostConnector for RecordingCodeHost {
    fn connect(&self, owner: &str, repository: &str) -> Arc<dyn CodeHostClient> {
        Arc::new(Self {
            repository: format!("{owner}/{repository}"),
            ..self.clone()
        })
    }
}

#[async_trait]
impl CodeHostClient for RecordingCodeHost {
    async fn create_pull_request(&self, request: &NewPullRequest) -> Result<PullRequest> {
        self.log.push(format!(
            "pr create {} head={} base={} title={}",
            self.repository, request.head, request.base, request.title
        ));
        let number = self.next_number.fetch_add(1, Ordering::SeqCst);
        Ok(PullRequest {
            number,
            html_url: format!("https://github.com/{}/pull/{number}", self.repository),
        })
    }

    async fn request_reviewers(&self, reviewers: &[&str], number: u64) -> Result<()> {
        self.log
            .push(format!("pr reviewers #{number} {}", reviewers.join(",")));
        if self.fail_reviewers.load(Ordering::SeqCst) {
            return Err(Error::CodeHost {
                status: 422,
                message: "Reviews may only be requested from collaborators".to_string(),
            });
        }
        Ok(())
    }

    async fn add_labels(&self, labels: &[&str], number: u64) -> Result<()> {
        self.log.push(format!("pr labels #{number} {}", labels.join(",")));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingPythonPackager {
    log: CallLog,
}

impl RecordingPythonPackager {
    pub fn with_log(log: CallLog) -> Self {
        Self { log }
    }
}

#[async_trait]
impl PythonPackager for RecordingPythonPackager {
    async fn build(&self, dir: &Path) -> Result<()> {
        self.log.push(format!("uv build {}", dir.display()));
        Ok(())
    }

    async fn publish(&self, dir: &Path, index: &str) -> Result<()> {
        self.log
            .push(format!("uv publish {} --index {index}", dir.display()));
        Ok(())
    }
}

/// A full set of fakes plus the inputs needed to build generators
pub struct TestHarness {
    pub log: CallLog,
    pub files: Arc<RecordingFileSystem>,
    pub commands: Arc<RecordingCommandRunner>,
    pub vcs: Arc<RecordingVersionControl>,
    pub code_host: RecordingCodeHost,
    pub python: Arc<RecordingPythonPackager>,
    pub run: RunContext,
    pub options: GeneratorOptions,
    pub store: Arc<ConfigStore>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_languages(&[])
    }

    /// Harness whose configuration store and template roots cover `languages`
    pub fn with_languages(languages: &[Language]) -> Self {
        let log = CallLog::default();
        let files = Arc::new(RecordingFileSystem::with_log(log.clone()));

        let mut set = ConfigSet::default();
        for language in languages {
            files.add_dir(PathBuf::from("/templates").join(language.as_str()));
            set.generator_cli.generators.insert(
                language.as_str().to_string(),
                GeneratorConfig {
                    generator_name: language.as_str().to_string(),
                    ..GeneratorConfig::default()
                },
            );
        }

        Self {
            commands: Arc::new(RecordingCommandRunner::with_files(log.clone(), files.clone())),
            vcs: Arc::new(RecordingVersionControl::with_log(log.clone())),
            code_host: RecordingCodeHost::with_log(log.clone()),
            python: Arc::new(RecordingPythonPackager::with_log(log.clone())),
            run: run_context(),
            options: GeneratorOptions {
                working_dir: PathBuf::from("/work"),
                ..GeneratorOptions::default()
            },
            store: Arc::new(ConfigStore::new(set)),
            files,
            log,
        }
    }

    pub fn context(&self) -> GenerationContext {
        GenerationContext {
            run: Arc::new(self.run.clone()),
            options: Arc::new(self.options.clone()),
            commands: self.commands.clone(),
            files: self.files.clone(),
            vcs: self.vcs.clone(),
            code_host: Arc::new(self.code_host.clone()),
            python: self.python.clone(),
        }
    }

    pub fn base_generator(&self, language: Language) -> BaseGenerator {
        BaseGenerator::new(self.context(), self.store.scoped(language).unwrap())
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.entries()
    }

    pub fn clear_calls(&self) {
        self.log.clear();
    }
}
