use anyhow::Result;
use sadhak_core::Config;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Environment variable holding the log filter, e.g. `SADHAK_LOG=sadhak_core=debug`
const LOG_ENV: &str = "SADHAK_LOG";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Log to `<config_dir>/sadhak/logs/sadhak.log` so output never lands on the TUI.
///
/// The returned guard flushes pending lines when dropped; keep it alive for
/// the whole session.
pub fn init_file() -> Result<WorkerGuard> {
    let log_dir = Config::config_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let (non_blocking, guard) =
        NonBlocking::new(RollingFileAppender::new(Rotation::NEVER, &log_dir, "sadhak.log"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    Registry::default().with(env_filter("info")).with(file_layer).init();

    Ok(guard)
}

/// Log warnings and errors to stderr for one-shot commands
pub fn init_stderr() {
    tracing_subscriber::registry()
        .with(env_filter("warn"))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
