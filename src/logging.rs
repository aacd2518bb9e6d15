use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "LAVATYPE_LOG";
pub const LOG_FILE: &str = "lavatype.log";

/// Installs a file logger when `LAVATYPE_LOG` is set. The terminal belongs to
/// the game, so nothing is ever written to stdout or stderr.
///
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init(log_dir: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).ok()?;

    if std::fs::create_dir_all(log_dir).is_err() {
        return None;
    }

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(_) => Some(guard),
        // a subscriber is already installed; dropping the guard shuts the writer down
        Err(_) => None,
    }
}
