use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogConfig, LogFile, DEFAULT_LOG_FILTER};

/// Installs the global subscriber. Keep the returned guard alive to flush file logs.
pub fn init_tracing(config: &LogConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_new(&config.filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let (file_layer, guard) = match config.file.as_ref().and_then(open_file_writer) {
        Some((writer, guard)) => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    guard
}

fn open_file_writer(file: &LogFile) -> Option<(NonBlocking, WorkerGuard)> {
    if let Err(err) = std::fs::create_dir_all(&file.dir) {
        eprintln!("quiz log directory {} unavailable: {err}", file.dir);
        return None;
    }
    let appender = tracing_appender::rolling::daily(&file.dir, &file.file_name);
    Some(tracing_appender::non_blocking(appender))
}
