//! `FileSystem` port over the local disk, with tera templating

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::io;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use tokio::fs;
use tracing::{debug, error};

use crate::core::{Error, Result};
use crate::generation::traits::FileSystem;

const TEMPLATE_FILE_MODE: u32 = 0o644;

fn file_name(path: &Path) -> Result<&std::ffi::OsStr> {
    path.file_name().ok_or_else(|| {
        Error::io(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })
}

/// Filesystem rooted at a working directory
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    working_dir: PathBuf,
}

impl LocalFileSystem {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    async fn render(&self, template: &Path, dst: &Path, context: &Context) -> Result<()> {
        let source = fs::read_to_string(template)
            .await
            .map_err(|e| Error::io(template, e))?;
        let rendered = Tera::one_off(&source, context, false)?;
        debug!(template = %template.display(), dst = %dst.display(), "Rendered template");
        self.write(dst, rendered.as_bytes(), TEMPLATE_FILE_MODE).await
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(path).await.map_err(|e| Error::io(path, e))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).await.map_err(|e| Error::io(path, e))
    }

    async fn write(&self, path: &Path, data: &[u8], mode: u32) -> Result<()> {
        fs::write(path, data).await.map_err(|e| Error::io(path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
                .await
                .map_err(|e| Error::io(path, e))?;
        }
        #[cfg(not(unix))]
        let _ = mode;

        Ok(())
    }

    async fn copy(&self, src: &Path, dst: &Path) -> Result<u64> {
        fs::copy(src, dst).await.map_err(|e| Error::io(src, e))
    }

    async fn copy_to_dir(&self, src: &Path, dst_dir: &Path) -> Result<PathBuf> {
        let dst = dst_dir.join(file_name(src)?);
        self.copy(src, &dst).await?;
        Ok(dst)
    }

    async fn copy_to_working_dir(&self, src: &Path) -> Result<PathBuf> {
        self.copy_to_dir(src, &self.working_dir).await
    }

    async fn copy_many_to_dir(&self, dst_dir: &Path, srcs: &[PathBuf]) -> Result<()> {
        for src in srcs {
            self.copy_to_dir(src, dst_dir).await?;
        }
        Ok(())
    }

    async fn rename(&self, src: &Path, dst: &Path) -> Result<()> {
        fs::rename(src, dst).await.map_err(|e| Error::io(src, e))
    }

    async fn mkdir_all(&self, path: &Path) -> Result<PathBuf> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| Error::io(path, e))?;
        Ok(path.to_path_buf())
    }

    async fn make_temp_dir(&self, prefix: &str) -> Result<PathBuf> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .map_err(|e| Error::io(std::env::temp_dir(), e))?;
        // Removal is the caller's job
        Ok(dir.keep())
    }

    async fn remove(&self, path: &Path) -> Result<()> {
        let metadata = match fs::symlink_metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(Error::io(path, e)),
        };
        let result = if metadata.is_dir() {
            fs::remove_dir_all(path).await
        } else {
            fs::remove_file(path).await
        };
        result.map_err(|e| Error::io(path, e))
    }

    async fn remove_quietly(&self, path: &Path) {
        if let Err(e) = self.remove(path).await {
            error!(path = %path.display(), "Failed to remove: {e}");
        }
    }

    async fn replace_in_file(&self, path: &Path, from: &str, to: &str) -> Result<()> {
        let text = fs::read_to_string(path)
            .await
            .map_err(|e| Error::io(path, e))?;
        fs::write(path, text.replace(from, to))
            .await
            .map_err(|e| Error::io(path, e))
    }

    async fn template_files(&self, dst_dir: &Path, data: &JsonValue, files: &[PathBuf]) -> Result<()> {
        let context = Context::from_value(data.clone())?;
        for template in files {
            let dst = dst_dir.join(file_name(template)?);
            self.render(template, &dst, &context).await?;
        }
        Ok(())
    }

    async fn template_files_in_dir(&self, src_dir: &Path, dst_dir: &Path, data: &JsonValue) -> Result<()> {
        let mut entries = fs::read_dir(src_dir)
            .await
            .map_err(|e| Error::io(src_dir, e))?;

        let mut templates = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::io(src_dir, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| Error::io(entry.path(), e))?;
            if file_type.is_file() {
                templates.push(entry.path());
            }
        }
        templates.sort();

        self.template_files(dst_dir, data, &templates).await
    }
}
