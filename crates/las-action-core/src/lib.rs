pub mod args;
pub mod config;
pub mod env;
pub mod error;
pub mod event;
pub mod install;
pub mod platform;
pub mod run;
pub mod scanner;
pub mod workflow;

pub use args::{KeyFile, ScanRequest};
pub use config::{ActionConfig, ScannerRelease};
pub use env::ActionEnv;
pub use error::{ActionError, Result};
pub use install::{InstallResult, InstallSource, Installer};
pub use platform::Target;
pub use run::{default_installer, run};
pub use workflow::{SearchPath, WorkflowCommandFormat};
