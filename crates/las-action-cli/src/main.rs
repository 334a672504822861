use anyhow::{Context, Result};
use clap::Parser;
use las_action_core::config::{DEFAULT_RELEASE_HOST, DEFAULT_SCANNER_VERSION};
use las_action_core::{ActionConfig, ActionEnv, WorkflowCommandFormat};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "las-action",
    version,
    about = "Install less-advanced-security and submit SARIF findings for a pull request",
    long_about = "Runs as a GitHub Action step. Reads action inputs (INPUT_*) and the pull request event, \
                  installs the scanner release for this runner, and invokes it with the derived arguments."
)]
struct Cli {
    /// Scanner release version to install
    #[arg(long, env = "LAS_SCANNER_VERSION", default_value = DEFAULT_SCANNER_VERSION)]
    scanner_version: String,

    /// Host serving the scanner releases
    #[arg(long, env = "LAS_RELEASE_HOST", default_value = DEFAULT_RELEASE_HOST)]
    release_host: String,

    /// Artifact cache directory (defaults to a directory inside RUNNER_TOOL_CACHE)
    #[arg(long, env = "LAS_CACHE_DIR")]
    cache_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let env = ActionEnv::from_process();
    init_tracing(&env);

    match execute(cli, env).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli, env: ActionEnv) -> Result<()> {
    let config = ActionConfig::from_env(&env)
        .with_version(cli.scanner_version)
        .with_release_host(cli.release_host)
        .with_cache_dir(cli.cache_dir);

    let installer = las_action_core::default_installer(&env, &config)
        .context("Failed to set up scanner installer")?;
    las_action_core::run(&env, &config, &installer).await?;
    Ok(())
}

fn init_tracing(env: &ActionEnv) {
    // Debug output is only shown by the runner when step debugging is on.
    let default_filter = if env.var("RUNNER_DEBUG") == Some("1") {
        "info,las_action_core=debug,las_action=debug"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(WorkflowCommandFormat)
                .with_writer(std::io::stdout),
        )
        .init();
}
