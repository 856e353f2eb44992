use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use slotwatch::config::{Config, LoggingConfig};
use slotwatch::crawler::{PageFetcher, PageSource};
use slotwatch::notifications::{Channel, TelegramChannel};
use slotwatch::scheduler::Scheduler;

#[derive(Parser)]
#[command(
    name = "slotwatch",
    version,
    about = "Watches TestFlight beta pages and announces open slots on Telegram",
    long_about = None
)]
struct Cli {
    /// TOML configuration file; the environment is used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long)]
    log_format: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config.as_deref() {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    config.validate()?;

    let _log_guard = setup_tracing(&config.logging, cli.verbose)?;

    tracing::info!("Starting TestFlight monitor");
    tracing::info!("Monitoring {} TestFlight URL(s):", config.monitor.targets.len());
    for (index, target) in config.monitor.targets.iter().enumerate() {
        tracing::info!("  {}. {}", index + 1, target);
    }
    tracing::info!(
        check_interval_secs = config.monitor.check_interval_secs,
        max_retries = config.monitor.max_retries,
        retry_delay_secs = config.monitor.retry_delay_secs,
        exclusive_checks = config.monitor.exclusive_checks,
        "Check interval: {} seconds",
        config.monitor.check_interval_secs
    );

    let source: Arc<dyn PageSource> =
        Arc::new(PageFetcher::from_config(&config.fetch).context("Failed to build page fetcher")?);
    let channel: Arc<dyn Channel> = Arc::new(
        TelegramChannel::new(config.telegram.clone())
            .context("Failed to build Telegram channel")?,
    );

    if channel.is_configured() {
        tracing::info!("Notifications: Telegram");
    } else {
        tracing::warn!(
            missing = %config.telegram.missing_credentials().join(", "),
            "Telegram configuration is missing, notifications will fail until it is set"
        );
    }

    let scheduler = Scheduler::from_config(&config, source, channel);
    scheduler.run_until(shutdown_signal()).await;

    tracing::info!("Shutting down TestFlight monitor");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl-C"),
        Err(e) => {
            tracing::error!(error = %e, "Unable to listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}

fn setup_tracing(logging: &LoggingConfig, verbose: bool) -> Result<Option<WorkerGuard>> {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("slotwatch={level},warn")))
        .context("Invalid log level")?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    match logging.format.as_str() {
        "json" => layers.push(fmt::layer().json().boxed()),
        _ => layers.push(fmt::layer().with_target(false).boxed()),
    }

    let guard = match &logging.file {
        Some(path) => {
            let (directory, file_name) = split_log_path(path)?;
            let appender = tracing_appender::rolling::daily(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(fmt::layer().with_writer(writer).with_ansi(false).boxed());
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .init();

    Ok(guard)
}

fn split_log_path(path: &Path) -> Result<(&Path, &std::ffi::OsStr)> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok((directory, file_name))
}
