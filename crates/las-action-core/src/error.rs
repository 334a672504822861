use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ActionError>;

/// Every failure the action can surface.
///
/// The `Cache*` variants are the only ones the installer treats as non-fatal;
/// everything else ends the run.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("'{key}' not found in action input")]
    MissingInput { key: String },

    #[error(
        "Input does not meet YAML 1.2 \"Core Schema\" specification: {key}\n\
         Support boolean input list: `true | True | TRUE | false | False | FALSE`"
    )]
    InvalidBooleanInput { key: String },

    #[error("{name} is not set")]
    MissingEnv { name: String },

    #[error("GITHUB_EVENT_PATH is null or the file does not exist")]
    EventPathMissing,

    #[error("failed to read github event at '{}'", path.display())]
    EventRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("github event at '{}' is not valid JSON", path.display())]
    EventParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("github event was empty or had no pull request")]
    NoPullRequest,

    #[error("github event was empty or had no pull request or the pull request had no head")]
    NoPullRequestHead,

    #[error("\"sarif_path\" {} has no file", path.display())]
    SarifMissing { path: PathBuf },

    #[error("failed to write app key to '{}'", path.display())]
    KeyWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Platform '{platform}' is not supported. Supported platforms are {supported}")]
    UnsupportedPlatform { platform: String, supported: String },

    #[error("Architecture '{arch}' is not supported. Supported architectures are {supported}")]
    UnsupportedArch { arch: String, supported: String },

    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("failed to download {url}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to extract archive into '{}'", destination.display())]
    Extract {
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("archive did not contain the expected executable at '{}'", path.display())]
    MissingExecutable { path: PathBuf },

    #[error("failed to read artifact cache entry '{key}'")]
    CacheRead {
        key: String,
        #[source]
        source: cacache::Error,
    },

    #[error("failed to write artifact cache entry '{key}'")]
    CacheWrite {
        key: String,
        #[source]
        source: cacache::Error,
    },

    #[error("failed to move '{}' through the artifact cache", path.display())]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to update search path file '{}'", path.display())]
    SearchPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start '{}'", path.display())]
    ScannerSpawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' failed with {status}", path.display())]
    ScannerFailed { path: PathBuf, status: String },
}
