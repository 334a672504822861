use crate::env::ActionEnv;
use std::path::PathBuf;

pub const DEFAULT_SCANNER_VERSION: &str = "0.2.0";
pub const DEFAULT_RELEASE_HOST: &str = "github.com";

const KEY_FILE_NAME: &str = "app_key.pem";
const CACHE_DIR_NAME: &str = "_las_cache";

/// Where the scanner release is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerRelease {
    pub host: String,
    pub owner: String,
    pub repo: String,
    pub binary: String,
    pub version: String,
}

impl Default for ScannerRelease {
    fn default() -> Self {
        Self {
            host: DEFAULT_RELEASE_HOST.to_string(),
            owner: "eliblock".to_string(),
            repo: "less-advanced-security".to_string(),
            binary: "less-advanced-security".to_string(),
            version: DEFAULT_SCANNER_VERSION.to_string(),
        }
    }
}

impl ScannerRelease {
    /// Version tag, e.g. `v0.2.0`.
    pub fn tag(&self) -> String {
        format!("v{}", self.version)
    }
}

/// Resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct ActionConfig {
    pub release: ScannerRelease,
    /// `RUNNER_TOOL_CACHE`; `None` when the runner did not provide one.
    pub tool_cache: Option<PathBuf>,
    /// `RUNNER_TEMP`, falling back to `/tmp`.
    pub temp_dir: PathBuf,
    /// Root of the artifact cache; `None` disables it.
    pub cache_dir: Option<PathBuf>,
}

impl ActionConfig {
    pub fn from_env(env: &ActionEnv) -> Self {
        let tool_cache = env.var_path("RUNNER_TOOL_CACHE");
        let temp_dir = env
            .var_path("RUNNER_TEMP")
            .unwrap_or_else(|| PathBuf::from("/tmp"));
        let cache_dir = tool_cache.as_ref().map(|root| root.join(CACHE_DIR_NAME));

        Self {
            release: ScannerRelease::default(),
            tool_cache,
            temp_dir,
            cache_dir,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.release.version = version.into();
        self
    }

    pub fn with_release_host(mut self, host: impl Into<String>) -> Self {
        self.release.host = host.into();
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: Option<PathBuf>) -> Self {
        if cache_dir.is_some() {
            self.cache_dir = cache_dir;
        }
        self
    }

    /// Fixed location the app key is written to and removed from.
    pub fn key_path(&self) -> PathBuf {
        self.temp_dir.join(KEY_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults() {
        let config = ActionConfig::from_env(&ActionEnv::default());
        assert_eq!(config.temp_dir, PathBuf::from("/tmp"));
        assert_eq!(config.key_path(), PathBuf::from("/tmp/app_key.pem"));
        assert!(config.tool_cache.is_none());
        assert!(config.cache_dir.is_none());
        assert_eq!(config.release.tag(), "v0.2.0");
    }

    #[test]
    fn test_from_env_runner_dirs() {
        let env = ActionEnv::default()
            .with_var("RUNNER_TEMP", "/runner/_temp")
            .with_var("RUNNER_TOOL_CACHE", "/opt/hostedtoolcache");
        let config = ActionConfig::from_env(&env);

        assert_eq!(config.key_path(), PathBuf::from("/runner/_temp/app_key.pem"));
        assert_eq!(
            config.cache_dir,
            Some(PathBuf::from("/opt/hostedtoolcache/_las_cache"))
        );
    }

    #[test]
    fn test_overrides() {
        let config = ActionConfig::from_env(&ActionEnv::default())
            .with_version("1.0.0")
            .with_release_host("ghe.example.com")
            .with_cache_dir(Some(PathBuf::from("/cache")));

        assert_eq!(config.release.tag(), "v1.0.0");
        assert_eq!(config.release.host, "ghe.example.com");
        assert_eq!(config.cache_dir, Some(PathBuf::from("/cache")));
    }
}
