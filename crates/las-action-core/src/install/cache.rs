//! Key-addressed cache of installed scanner executables.

use crate::error::{ActionError, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stable key for a cached executable: `<tool>-<tag>`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(tool: &str, tag: &str) -> Self {
        Self(format!("{tool}-{tag}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CacheKey").field(&self.0).finish()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage the installer consults before downloading and fills afterwards.
#[async_trait]
pub trait ArtifactCache: Send + Sync {
    /// Restore the entry for `key` to `executable`. `Ok(false)` on a miss.
    async fn restore(&self, key: &CacheKey, executable: &Path) -> Result<bool>;

    /// Store `executable` under `key`.
    async fn save(&self, key: &CacheKey, executable: &Path) -> Result<()>;
}

/// [`ArtifactCache`] over a `cacache` directory (index + content-addressed,
/// integrity-checked blobs).
#[derive(Debug, Clone)]
pub struct CacacheStore {
    root: PathBuf,
}

impl CacacheStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArtifactCache for CacacheStore {
    async fn restore(&self, key: &CacheKey, executable: &Path) -> Result<bool> {
        let bytes = match cacache::read(&self.root, key.as_str()).await {
            Ok(bytes) => bytes,
            Err(cacache::Error::EntryNotFound(_, _)) => return Ok(false),
            Err(source) => {
                return Err(ActionError::CacheRead {
                    key: key.to_string(),
                    source,
                })
            }
        };

        write_executable(executable, &bytes)
            .await
            .map_err(|source| ActionError::CacheIo {
                path: executable.to_path_buf(),
                source,
            })?;
        debug!("restored {} bytes for '{key}'", bytes.len());
        Ok(true)
    }

    async fn save(&self, key: &CacheKey, executable: &Path) -> Result<()> {
        let bytes = tokio::fs::read(executable)
            .await
            .map_err(|source| ActionError::CacheIo {
                path: executable.to_path_buf(),
                source,
            })?;

        let integrity = cacache::write(&self.root, key.as_str(), &bytes)
            .await
            .map_err(|source| ActionError::CacheWrite {
                key: key.to_string(),
                source,
            })?;
        debug!("cached '{key}' as {integrity}");
        Ok(())
    }
}

/// Write `bytes` to `path` as an executable file, creating parent directories.
pub(crate) async fn write_executable(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, bytes).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await?;
    }

    Ok(())
}
