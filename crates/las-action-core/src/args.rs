use crate::env::ActionEnv;
use crate::error::{ActionError, Result};
use crate::event;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Everything the scanner needs for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub app_id: String,
    pub install_id: String,
    pub key_path: PathBuf,
    pub sha: String,
    pub repo: String,
    pub pr: u64,
    pub sarif_path: PathBuf,
    pub filter_annotations: bool,
    pub check_name_override: Option<String>,
}

impl ScanRequest {
    /// Flatten into the scanner's `--key=value` argument list.
    pub fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--app_id={}", self.app_id),
            format!("--install_id={}", self.install_id),
            format!("--key_path={}", self.key_path.display()),
            format!("--repo={}", self.repo),
            format!("--pr={}", self.pr),
            format!("--sha={}", self.sha),
            format!("--sarif_path={}", self.sarif_path.display()),
            format!("--filter_annotations={}", self.filter_annotations),
        ];

        if let Some(name) = self.check_name_override.as_deref().filter(|n| !n.is_empty()) {
            args.push(format!("--check_name={name}"));
        }

        args
    }
}

/// Gather and validate every input, writing the app key to `key_path`.
///
/// Runs to completion without yielding: by the time it returns the key file
/// is either fully written or was never created.
pub fn collect(env: &ActionEnv, key_path: &Path) -> Result<ScanRequest> {
    let app_id = env.required_input("github_app_id")?;
    let install_id = env.required_input("github_app_install_id")?;
    let key_path = write_key(env, key_path)?;

    let event = event::load_event(env)?;
    let sha = event.head_sha()?;
    let pr = event.pr_number()?;
    let repo = owner_repo(env)?;
    let sarif_path = sarif_path(env)?;
    let filter_annotations = env.boolean_input("filter_annotations")?;

    let check_name = env.input("check_name");
    let check_name_override = (!check_name.is_empty()).then(|| check_name.to_string());

    Ok(ScanRequest {
        app_id,
        install_id,
        key_path,
        sha,
        repo,
        pr,
        sarif_path,
        filter_annotations,
        check_name_override,
    })
}

fn write_key(env: &ActionEnv, key_path: &Path) -> Result<PathBuf> {
    let key = env.required_input("github_app_key")?;
    let io_err = |source| ActionError::KeyWrite {
        path: key_path.to_path_buf(),
        source,
    };

    if let Some(dir) = key_path.parent() {
        std::fs::create_dir_all(dir).map_err(io_err)?;
    }

    debug!("Writing key to '{}'.", key_path.display());
    let mut file = private_file(key_path).map_err(io_err)?;
    file.write_all(key.as_bytes()).map_err(io_err)?;

    Ok(key_path.to_path_buf())
}

/// Open `path` for writing, readable by the owner only before any byte lands.
#[cfg(unix)]
fn private_file(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on create; narrow a leftover file too.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn private_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

fn owner_repo(env: &ActionEnv) -> Result<String> {
    let repo = env.required_var("GITHUB_REPOSITORY")?;
    debug!("Found repo {repo}.");
    Ok(repo.to_string())
}

fn sarif_path(env: &ActionEnv) -> Result<PathBuf> {
    let path = PathBuf::from(env.required_input("sarif_path")?);
    if !path.is_file() {
        return Err(ActionError::SarifMissing { path });
    }
    debug!(
        "Found sarif path {} and confirmed some file is there.",
        path.display()
    );
    Ok(path)
}

/// Owns the on-disk app key and deletes it exactly once.
///
/// Create the guard before any fallible work; call [`KeyFile::remove`] on the
/// way out. Dropping an unremoved guard removes the file as well.
#[derive(Debug)]
pub struct KeyFile {
    path: PathBuf,
    removed: bool,
}

impl KeyFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn remove(mut self) {
        self.remove_once();
    }

    fn remove_once(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed key file '{}'.", self.path.display()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!("failed to remove key file '{}': {err}", self.path.display()),
        }
    }
}

impl Drop for KeyFile {
    fn drop(&mut self) {
        self.remove_once();
    }
}
