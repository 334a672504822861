#![cfg(unix)]

use async_trait::async_trait;
use las_action_core::install::{download_directory, ArtifactCache, ArtifactFetcher, CacacheStore};
use las_action_core::{ActionConfig, ActionEnv, ActionError, Installer, SearchPath, Target};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Fetcher for runs that must never reach the network.
#[derive(Default, Clone)]
struct CountingFetcher {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ArtifactFetcher for CountingFetcher {
    async fn fetch(&self, url: &str) -> las_action_core::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ActionError::MissingExecutable {
            path: PathBuf::from(url),
        })
    }
}

struct Workspace {
    _tmp: tempfile::TempDir,
    root: PathBuf,
    env: ActionEnv,
    config: ActionConfig,
}

impl Workspace {
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        let sarif = root.join("results.sarif");
        fs::write(&sarif, r#"{"version":"2.1.0","runs":[]}"#).unwrap();
        let event = root.join("event.json");
        fs::write(
            &event,
            r#"{"pull_request":{"number":99,"head":{"sha":"0123abcd"}}}"#,
        )
        .unwrap();

        let env = ActionEnv::default()
            .with_input("github_app_id", "11")
            .with_input("github_app_install_id", "22")
            .with_input("github_app_key", "secret-key-material")
            .with_input("sarif_path", sarif.display().to_string())
            .with_input("filter_annotations", "true")
            .with_var("GITHUB_REPOSITORY", "octo/widgets")
            .with_var("GITHUB_EVENT_PATH", event.display().to_string())
            .with_var("RUNNER_TEMP", root.join("runner-temp").display().to_string())
            .with_var("RUNNER_TOOL_CACHE", root.join("toolcache").display().to_string())
            .with_var("PATH", "/usr/bin:/bin");
        let config = ActionConfig::from_env(&env);

        Self {
            _tmp: tmp,
            root,
            env,
            config,
        }
    }

    fn calls_log(&self) -> PathBuf {
        self.root.join("calls.log")
    }

    fn key_seen(&self) -> PathBuf {
        self.root.join("key_seen")
    }

    /// Put a stand-in scanner where the installer's local lookup finds it.
    fn install_scanner(&self, exit_code: i32) -> PathBuf {
        self.install_scanner_with_version(0, exit_code)
    }

    fn install_scanner_with_version(&self, version_exit: i32, exit_code: i32) -> PathBuf {
        let target = Target::detect().unwrap();
        let dir = download_directory(
            self.config.tool_cache.as_deref(),
            &self.config.release,
            &target,
        );
        fs::create_dir_all(&dir).unwrap();
        let exe = dir.join(&self.config.release.binary);
        let script = format!(
            "#!/bin/sh\n\
             echo \"$*\" >> {log}\n\
             [ -f {key} ] && echo present > {seen}\n\
             [ \"$1\" = \"--version\" ] && exit {version_exit}\n\
             exit {exit_code}\n",
            log = self.calls_log().display(),
            key = self.config.key_path().display(),
            seen = self.key_seen().display(),
        );
        fs::write(&exe, script).unwrap();
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
        exe
    }

    fn installer(&self, fetcher: CountingFetcher) -> Installer {
        Installer::new(
            self.config.tool_cache.clone(),
            Box::new(fetcher),
            self.config
                .cache_dir
                .clone()
                .map(|dir| Box::new(CacacheStore::new(dir)) as Box<dyn ArtifactCache>),
            SearchPath::new(None),
        )
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.calls_log())
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

fn assert_key_removed(ws: &Workspace) {
    assert!(
        !ws.config.key_path().exists(),
        "key file survived at {}",
        ws.config.key_path().display()
    );
}

#[tokio::test]
async fn test_full_run_invokes_scanner_twice() {
    let ws = Workspace::new();
    ws.install_scanner(0);
    let fetcher = CountingFetcher::default();
    let fetches = fetcher.calls.clone();
    let installer = ws.installer(fetcher);

    las_action_core::run(&ws.env, &ws.config, &installer)
        .await
        .unwrap();

    let calls = ws.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], "--version");
    let scan = &calls[1];
    assert!(scan.contains("--app_id=11"));
    assert!(scan.contains("--install_id=22"));
    assert!(scan.contains("--repo=octo/widgets"));
    assert!(scan.contains("--pr=99"));
    assert!(scan.contains("--sha=0123abcd"));
    assert!(scan.contains("--filter_annotations=true"));
    assert!(scan.contains(&format!("--key_path={}", ws.config.key_path().display())));
    assert!(!scan.contains("--check_name="));

    // The key existed while the scanner ran and is gone afterwards.
    assert!(ws.key_seen().exists());
    assert_key_removed(&ws);
    assert_eq!(fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_scanner_failure_still_cleans_key() {
    let ws = Workspace::new();
    ws.install_scanner(2);
    let installer = ws.installer(CountingFetcher::default());

    let err = las_action_core::run(&ws.env, &ws.config, &installer)
        .await
        .unwrap_err();

    assert!(matches!(err, ActionError::ScannerFailed { .. }));
    assert!(ws.key_seen().exists());
    assert_key_removed(&ws);
}

#[tokio::test]
async fn test_missing_input_fails_and_cleans_key() {
    let ws = Workspace::new();
    ws.install_scanner(0);
    let env = ws.env.clone().with_input("github_app_install_id", "");
    let installer = ws.installer(CountingFetcher::default());

    let err = las_action_core::run(&env, &ws.config, &installer)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "'github_app_install_id' not found in action input"
    );
    assert!(ws.calls().is_empty());
    assert_key_removed(&ws);
}

#[tokio::test]
async fn test_missing_sarif_never_invokes_scanner() {
    let ws = Workspace::new();
    ws.install_scanner(0);
    let env = ws.env.clone().with_input("sarif_path", "/missing/file");
    let installer = ws.installer(CountingFetcher::default());

    let err = las_action_core::run(&env, &ws.config, &installer)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("/missing/file"));
    assert!(ws.calls().is_empty());
    // The key was written before the sarif check failed.
    assert_key_removed(&ws);
}

#[tokio::test]
async fn test_install_failure_cleans_key() {
    let ws = Workspace::new();
    let fetcher = CountingFetcher::default();
    let fetches = fetcher.calls.clone();
    let installer = ws.installer(fetcher);

    let err = las_action_core::run(&ws.env, &ws.config, &installer)
        .await
        .unwrap_err();

    assert!(matches!(err, ActionError::MissingExecutable { .. }));
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert!(ws.calls().is_empty());
    assert_key_removed(&ws);
}

#[tokio::test]
async fn test_bad_event_payload_fails() {
    let ws = Workspace::new();
    ws.install_scanner(0);
    let event = ws.root.join("push.json");
    fs::write(&event, r#"{"ref":"refs/heads/main"}"#).unwrap();
    let env = ws
        .env
        .clone()
        .with_var("GITHUB_EVENT_PATH", event.display().to_string());
    let installer = ws.installer(CountingFetcher::default());

    let err = las_action_core::run(&env, &ws.config, &installer)
        .await
        .unwrap_err();

    assert!(matches!(err, ActionError::NoPullRequestHead));
    assert_key_removed(&ws);
}

#[tokio::test]
async fn test_version_failure_stops_before_scan() {
    let ws = Workspace::new();
    ws.install_scanner_with_version(7, 0);
    let installer = ws.installer(CountingFetcher::default());

    let err = las_action_core::run(&ws.env, &ws.config, &installer)
        .await
        .unwrap_err();

    assert!(matches!(err, ActionError::ScannerFailed { .. }));
    assert_eq!(ws.calls(), vec!["--version".to_string()]);
    assert_key_removed(&ws);
}
