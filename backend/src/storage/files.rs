//! Files kept under the configured web root (certificates, member photos).

use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `bytes` at `relative` by way of a temporary sibling and a
    /// rename, so readers never observe a partial file. Parent directories
    /// are created as needed.
    pub async fn write_atomic(&self, relative: &str, bytes: &[u8]) -> io::Result<()> {
        let target = self.resolve(relative)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file_name = target
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| invalid_path(relative))?;
        let temp = target.with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

        if let Err(e) = fs::write(&temp, bytes).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e);
        }
        if let Err(e) = fs::rename(&temp, &target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e);
        }

        debug!("Wrote {} bytes to {}", bytes.len(), target.display());
        Ok(())
    }

    pub async fn read(&self, relative: &str) -> io::Result<Vec<u8>> {
        let path = self.resolve(relative)?;
        fs::read(path).await
    }

    pub async fn exists(&self, relative: &str) -> bool {
        match self.resolve(relative) {
            Ok(path) => fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Maps a stored relative path onto the root. Absolute paths and `..`
    /// segments are rejected; a single leading `/` is tolerated since photo
    /// paths are stored as URLs.
    fn resolve(&self, relative: &str) -> io::Result<PathBuf> {
        let trimmed = relative.strip_prefix('/').unwrap_or(relative);
        let path = Path::new(trimmed);
        if trimmed.is_empty()
            || !path
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(invalid_path(relative));
        }
        Ok(self.root.join(path))
    }
}

fn invalid_path(relative: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("path escapes the web root: {}", relative),
    )
}
