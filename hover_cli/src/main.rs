mod cli;
mod error_fmt;
mod run;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::{Result, WrapErr};
use hover_core::HoverError;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let json = cli.json;
    let _ = JSON_MODE.set(json);

    if let Err(err) = real_main(cli) {
        tracing::error!(error = %err, "hover failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main(cli: Cli) -> Result<()> {
    let _ = color_eyre::install();

    let cfg = hover_config::load_file(&cli.config)
        .map_err(|e| HoverError::Config(format!("{}: {e}", cli.config.display())))?;

    // Held until return so the file writer flushes.
    let _log_guard = init_tracing(cli.json, &cli.log_level, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    match cli.cmd {
        Commands::Run { cycles, quiet } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let stop = Arc::clone(&shutdown);
                ctrlc::set_handler(move || {
                    stop.store(true, Ordering::Relaxed);
                })
                .wrap_err("failed to install Ctrl-C handler")?;
            }
            run::run(&cfg, cycles, quiet, cli.json, &shutdown)
        }
        Commands::SelfCheck => run::self_check(&cfg, cli.json),
    }
}

/// Console logs go to stderr so stdout carries only the display and results.
/// The console follows `RUST_LOG` or `--log-level`; `[logging] level` only
/// filters the JSON-lines file layer added by `[logging] file`.
fn init_tracing(
    json: bool,
    level: &str,
    logging: &hover_config::Logging,
) -> Result<Option<WorkerGuard>> {
    let console_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => level_filter(level)?,
    };

    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    };

    let (file, guard) = match logging.file.as_deref() {
        Some(path) => {
            let file_filter = level_filter(logging.level.as_deref().unwrap_or(level))?;
            let appender = file_appender(Path::new(path), logging.rotation.as_deref())?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(file_filter)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .wrap_err("failed to initialise logging")?;
    Ok(guard)
}

fn level_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level).wrap_err_with(|| format!("invalid log level {level:?}"))
}

fn file_appender(
    path: &Path,
    rotation: Option<&str>,
) -> Result<tracing_appender::rolling::RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| eyre::eyre!("logging.file {path:?} has no file name"))?;
    Ok(match rotation.unwrap_or("never") {
        "daily" => tracing_appender::rolling::daily(dir, name),
        "hourly" => tracing_appender::rolling::hourly(dir, name),
        _ => tracing_appender::rolling::never(dir, name),
    })
}
