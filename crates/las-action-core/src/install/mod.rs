//! Scanner installation: local tool cache, then artifact cache, then a fresh
//! release download.

pub mod cache;
pub mod fetch;
pub mod unpack;

use crate::config::ScannerRelease;
use crate::error::{ActionError, Result};
use crate::platform::Target;
use crate::workflow::SearchPath;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use cache::{ArtifactCache, CacacheStore, CacheKey};
pub use fetch::{ArtifactFetcher, HttpFetcher};

/// Which step produced the executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallSource {
    LocalToolCache,
    ArtifactCache,
    Download,
}

impl fmt::Display for InstallSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LocalToolCache => "tool cache",
            Self::ArtifactCache => "artifact cache",
            Self::Download => "download",
        })
    }
}

/// A runnable scanner on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    pub executable: PathBuf,
    pub version: String,
    pub target: Target,
    pub source: InstallSource,
}

/// `<tool_cache>/<owner>/<repo>/<tag>/<platform>-<arch>`.
///
/// Without a tool-cache root the path is relative to the working directory.
pub fn download_directory(
    tool_cache: Option<&Path>,
    release: &ScannerRelease,
    target: &Target,
) -> PathBuf {
    let root = match tool_cache {
        Some(root) => root.to_path_buf(),
        None => {
            warn!("Expected RUNNER_TOOL_CACHE to be defined");
            PathBuf::new()
        }
    };
    root.join(&release.owner)
        .join(&release.repo)
        .join(release.tag())
        .join(target.to_string())
}

/// Release asset URL for `target`.
pub fn download_url(release: &ScannerRelease, target: &Target) -> String {
    format!(
        "https://{host}/{owner}/{repo}/releases/download/{tag}/{binary}_{version}_{platform}_{arch}.tar.gz",
        host = release.host,
        owner = release.owner,
        repo = release.repo,
        tag = release.tag(),
        binary = release.binary,
        version = release.version,
        platform = target.platform,
        arch = target.arch,
    )
}

/// Resolves a scanner release to a local executable.
pub struct Installer {
    tool_cache: Option<PathBuf>,
    fetcher: Box<dyn ArtifactFetcher>,
    cache: Option<Box<dyn ArtifactCache>>,
    search_path: SearchPath,
}

impl Installer {
    pub fn new(
        tool_cache: Option<PathBuf>,
        fetcher: Box<dyn ArtifactFetcher>,
        cache: Option<Box<dyn ArtifactCache>>,
        search_path: SearchPath,
    ) -> Self {
        Self {
            tool_cache,
            fetcher,
            cache,
            search_path,
        }
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// Install `release` for `target`, reusing earlier installs when possible.
    pub async fn install(&self, release: &ScannerRelease, target: Target) -> Result<InstallResult> {
        debug!(
            "Detected platform '{}' and architecture '{}'.",
            target.platform, target.arch
        );
        let tag = release.tag();
        debug!("Using version tag '{tag}'.");

        let destination = download_directory(self.tool_cache.as_deref(), release, &target);
        let executable = destination.join(&release.binary);
        let result = |source| InstallResult {
            executable: executable.clone(),
            version: release.version.clone(),
            target,
            source,
        };

        if executable.is_file() {
            info!(
                "{} already installed at {}",
                release.binary,
                executable.display()
            );
            self.search_path.add(&destination)?;
            return Ok(result(InstallSource::LocalToolCache));
        }

        let key = CacheKey::new(&release.repo, &tag);
        if self.restore(&key, &executable).await {
            info!(
                "{} found in cache and restored to {}",
                release.binary,
                executable.display()
            );
            self.search_path.add(&destination)?;
            return Ok(result(InstallSource::ArtifactCache));
        }

        debug!("{} not found in cache. Downloading instead.", release.binary);
        let url = download_url(release, &target);
        info!("Downloading and unpacking {} from {url}", release.binary);
        let archive = self.fetcher.fetch(&url).await?;

        debug!("Extracting {url} into {}", destination.display());
        unpack::extract_tar_gz(archive, destination.clone()).await?;
        if !executable.is_file() {
            return Err(ActionError::MissingExecutable {
                path: executable.clone(),
            });
        }

        debug!("Attempting to save {} to the cache", executable.display());
        self.save(&key, &executable).await;

        self.search_path.add(&destination)?;
        info!("{} installed at {}", release.binary, executable.display());
        Ok(result(InstallSource::Download))
    }

    async fn restore(&self, key: &CacheKey, executable: &Path) -> bool {
        let Some(cache) = &self.cache else {
            return false;
        };
        match cache.restore(key, executable).await {
            Ok(true) => true,
            Ok(false) => {
                debug!(
                    "did not find {} in cache with key {key}",
                    executable.display()
                );
                false
            }
            Err(err) => {
                warn!(
                    "failed to restore {} from cache: {}",
                    executable.display(),
                    error_chain(&err)
                );
                false
            }
        }
    }

    async fn save(&self, key: &CacheKey, executable: &Path) {
        let Some(cache) = &self.cache else {
            return;
        };
        match cache.save(key, executable).await {
            Ok(()) => info!(
                "saved '{}' to cache with key '{key}'",
                executable.display()
            ),
            Err(err) => warn!(
                "failed to save '{}' to cache with key '{key}': {}",
                executable.display(),
                error_chain(&err)
            ),
        }
    }
}

/// `err` followed by each of its sources, `: `-separated.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

impl fmt::Debug for Installer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Installer")
            .field("tool_cache", &self.tool_cache)
            .field("cache", &self.cache.is_some())
            .field("search_path", &self.search_path)
            .finish()
    }
}
