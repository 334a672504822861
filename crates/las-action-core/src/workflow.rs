//! Actions runner plumbing: workflow-command log formatting and search-path
//! registration.

use crate::env::ActionEnv;
use crate::error::{ActionError, Result};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

/// Escape a workflow-command payload.
pub fn escape_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Render tracing events as runner workflow commands.
///
/// `ERROR`, `WARN` and `DEBUG`/`TRACE` map to `::error::`, `::warning::` and
/// `::debug::`; `INFO` is printed as a plain log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkflowCommandFormat;

impl<S, N> FormatEvent<S, N> for WorkflowCommandFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut message = String::new();
        ctx.field_format()
            .format_fields(Writer::new(&mut message), event)?;

        match command_for(event.metadata().level()) {
            Some(command) => writeln!(writer, "::{command}::{}", escape_data(&message)),
            None => writeln!(writer, "{message}"),
        }
    }
}

fn command_for(level: &Level) -> Option<&'static str> {
    match *level {
        Level::ERROR => Some("error"),
        Level::WARN => Some("warning"),
        Level::DEBUG | Level::TRACE => Some("debug"),
        _ => None,
    }
}

/// Directories to put in front of `PATH` for the scanner and later steps.
///
/// Additions are deduplicated and, when the runner provides `GITHUB_PATH`,
/// appended to that file so subsequent workflow steps inherit them.
#[derive(Debug, Default)]
pub struct SearchPath {
    github_path: Option<PathBuf>,
    entries: Mutex<Vec<PathBuf>>,
}

impl SearchPath {
    pub fn new(github_path: Option<PathBuf>) -> Self {
        Self {
            github_path,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn from_env(env: &ActionEnv) -> Self {
        Self::new(env.var_path("GITHUB_PATH"))
    }

    /// Register `dir`; a directory already registered is left alone.
    pub fn add(&self, dir: &Path) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if entries.iter().any(|existing| existing == dir) {
            return Ok(());
        }

        if let Some(file) = &self.github_path {
            let io_err = |source| ActionError::SearchPath {
                path: file.clone(),
                source,
            };
            let mut handle = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .map_err(io_err)?;
            writeln!(handle, "{}", dir.display()).map_err(io_err)?;
        }

        entries.push(dir.to_path_buf());
        Ok(())
    }

    /// Registered directories, most recent first.
    pub fn entries(&self) -> Vec<PathBuf> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.iter().rev().cloned().collect()
    }

    /// `PATH` value with the registered directories in front of `current`.
    pub fn prepend_to(&self, current: Option<&str>) -> Option<std::ffi::OsString> {
        let mut dirs = self.entries();
        if let Some(current) = current {
            dirs.extend(std::env::split_paths(current));
        }
        std::env::join_paths(dirs).ok()
    }
}
