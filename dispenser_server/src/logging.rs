//! Logging initialization: console layer plus optional JSON-lines file.

use crate::cli::FILE_GUARD;
use dispenser_config::Logging;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Console level comes from `RUST_LOG` when set, else `level`. When the
/// config names a log file, a non-blocking JSON-lines appender is added
/// with the configured rotation.
pub fn init(level: &str, json_console: bool, logging: &Logging) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = logging.file.as_deref().map(|path| {
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(".", path),
            Some("hourly") => tracing_appender::rolling::hourly(".", path),
            _ => tracing_appender::rolling::never(".", path),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        fmt::layer().json().with_writer(writer)
    });

    let console_layer = if json_console {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();
}
