use crate::error::{ActionError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tokio::process::Command;
use tracing::info;

/// The installed scanner executable, ready to be invoked.
#[derive(Debug, Clone)]
pub struct Scanner {
    executable: PathBuf,
    path_env: Option<OsString>,
}

impl Scanner {
    /// `path_env` replaces the child's `PATH` when set.
    pub fn new(executable: PathBuf, path_env: Option<OsString>) -> Self {
        Self {
            executable,
            path_env,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Print the scanner version; a non-zero exit is an error.
    pub async fn probe_version(&self) -> Result<()> {
        self.run(&["--version".to_string()]).await
    }

    /// Run a scan; a non-zero exit is an error.
    pub async fn scan(&self, args: &[String]) -> Result<()> {
        self.run(args).await
    }

    async fn run(&self, args: &[String]) -> Result<()> {
        let status = self.exec(args).await?;
        if !status.success() {
            return Err(ActionError::ScannerFailed {
                path: self.executable.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }

    async fn exec(&self, args: &[String]) -> Result<ExitStatus> {
        info!("[command]{} {}", self.executable.display(), args.join(" "));

        let mut command = Command::new(&self.executable);
        command.args(args);
        if let Some(path) = &self.path_env {
            command.env("PATH", path);
        }

        command
            .status()
            .await
            .map_err(|source| ActionError::ScannerSpawn {
                path: self.executable.clone(),
                source,
            })
    }
}
