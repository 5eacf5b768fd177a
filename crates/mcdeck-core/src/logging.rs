//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// File name prefix of the rolling log.
const LOG_FILE_NAME: &str = "mcdeck.log";

/// Filter used when `MCDECK_LOG` is unset.
const DEFAULT_FILTER: &str =
    "mcdeck=info,mcdeck_core=info,mcdeck_device=info,mcdeck_host=info,mcdeck_app=info,warn";

/// Initialize the logging subsystem
///
/// The host discards plugin stdout, so logs are written to
/// `<data_local_dir>/musiccast-deck/logs/`.
/// Log level is controlled by the `MCDECK_LOG` environment variable.
///
/// # Examples
/// ```bash
/// MCDECK_LOG=debug ./mcdeck -port 28196 -pluginUUID ... -registerEvent registerPlugin
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_NAME);

    let env_filter = EnvFilter::try_from_env("MCDECK_LOG")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("MusicCast deck plugin starting");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("musiccast-deck").join("logs")
}

