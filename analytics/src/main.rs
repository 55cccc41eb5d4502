mod config;
mod logging;
mod metrics;

use analytics_api::errors::ApiError;
use clap::Parser;
use config::{Config, ConfigError};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "analytics", about = "Records and serves HTTP access analytics")]
enum CliCommand {
    /// Run the API and admin listeners
    Serve {
        #[arg(long)]
        config: PathBuf,
    },
    /// Load and validate a config file, then exit
    CheckConfig {
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid sentry dsn: {0}")]
    Logging(#[from] sentry::types::ParseDsnError),
    #[error(transparent)]
    Metrics(#[from] metrics::MetricsError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}

fn main() {
    let cli = CliCommand::parse();

    let result = match &cli {
        CliCommand::Serve { config } => serve(config),
        CliCommand::CheckConfig { config } => check_config(config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn check_config(path: &Path) -> Result<(), CliError> {
    Config::from_file(path)?;
    println!("{} is valid", path.display());
    Ok(())
}

fn serve(path: &Path) -> Result<(), CliError> {
    let config = Config::from_file(path)?;
    let _sentry = logging::init(config.common.logging.as_ref())?;
    if let Some(metrics_config) = &config.common.metrics {
        metrics::init(metrics_config)?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    tracing::info!(config = %path.display(), "Starting analytics");
    runtime.block_on(analytics_api::run(config.api))?;
    Ok(())
}
