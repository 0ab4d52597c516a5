use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Where log lines go. The TUI owns the terminal, so it logs to a file.
pub enum LogTarget {
    Stdout,
    File,
}

fn filter(cfg: &Config) -> Result<EnvFilter> {
    // RUST_LOG wins over LOG_LEVEL when set.
    match EnvFilter::try_from_default_env() {
        Ok(f) => Ok(f),
        Err(_) => Ok(EnvFilter::try_new(&cfg.log_level)?),
    }
}

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the process when logging to a file, or buffered lines are lost.
pub fn init(cfg: &Config, target: LogTarget) -> Result<Option<WorkerGuard>> {
    let filter = filter(cfg)?;

    let guard = match target {
        LogTarget::Stdout => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(true).with_filter(filter))
                .try_init()?;
            None
        }
        LogTarget::File => {
            let appender = tracing_appender::rolling::daily(&cfg.log_dir, "expense_tracker.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer)
                        .with_filter(filter),
                )
                .try_init()?;
            Some(guard)
        }
    };

    info!("Logging initialized");
    Ok(guard)
}

#[cfg(test)]
pub fn init_for_tests() {
    use std::sync::Once;

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env()
            .add_directive("expense_tracker=debug".parse().unwrap());

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}
