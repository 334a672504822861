//! One end-to-end action run.

use crate::args::{self, KeyFile};
use crate::config::ActionConfig;
use crate::env::ActionEnv;
use crate::error::Result;
use crate::install::{CacacheStore, HttpFetcher, InstallResult, Installer};
use crate::platform::Target;
use crate::scanner::Scanner;
use crate::workflow::SearchPath;
use tracing::{debug, info};

/// Installer wired to the real HTTP fetcher and, when configured, the
/// `cacache` artifact store.
pub fn default_installer(env: &ActionEnv, config: &ActionConfig) -> Result<Installer> {
    let cache = config.cache_dir.clone().map(|dir| {
        debug!("Using artifact cache at {}", dir.display());
        Box::new(CacacheStore::new(dir)) as Box<dyn crate::install::ArtifactCache>
    });

    Ok(Installer::new(
        config.tool_cache.clone(),
        Box::new(HttpFetcher::new()?),
        cache,
        SearchPath::from_env(env),
    ))
}

/// Collect inputs and install the scanner concurrently, then run it.
///
/// The key file is removed exactly once, whichever step fails.
pub async fn run(env: &ActionEnv, config: &ActionConfig, installer: &Installer) -> Result<()> {
    let key_file = KeyFile::new(config.key_path());
    let outcome = scan(env, config, installer, &key_file).await;
    key_file.remove();
    outcome
}

async fn scan(
    env: &ActionEnv,
    config: &ActionConfig,
    installer: &Installer,
    key_file: &KeyFile,
) -> Result<()> {
    let (request, installed) = tokio::try_join!(
        async { args::collect(env, key_file.path()) },
        install(config, installer),
    )?;

    info!(
        "Using {} {} ({}) from {}",
        config.release.binary, installed.version, installed.target, installed.source
    );

    let path_env = installer.search_path().prepend_to(env.var("PATH"));
    let scanner = Scanner::new(installed.executable, path_env);
    scanner.probe_version().await?;
    scanner.scan(&request.to_cli_args()).await
}

async fn install(config: &ActionConfig, installer: &Installer) -> Result<InstallResult> {
    let target = Target::detect()?;
    installer.install(&config.release, target).await
}
