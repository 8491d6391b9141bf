//! Process-wide structured logging (§9 "Global logger", §10 "Logging"):
//! initialized once at startup, torn down on clean exit, never consulted
//! by feature handlers for control flow.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

/// Dropping this guard flushes any buffered log output. Held by `main` for
/// the lifetime of the process.
pub struct LoggingGuard {
    _file: Option<std::fs::File>,
}

/// Initializes the `tracing` dispatcher for the process. When
/// `config.log_to_file` is set, output goes to a log file next to
/// `workspace_root` instead of stderr, per `SMITHY_LSP_LOG` (§6).
pub fn init(config: &ServerConfig, workspace_root: Option<&Path>) -> LoggingGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string().to_lowercase()));

    if config.log_to_file {
        let log_path = workspace_root
            .unwrap_or_else(|| Path::new("."))
            .join("smithy-lsp.log");
        match OpenOptions::new().create(true).append(true).open(&log_path) {
            Ok(file) => {
                let clone = file.try_clone().ok();
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .init();
                return LoggingGuard { _file: clone };
            }
            Err(err) => {
                tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
                tracing::warn!(path = %log_path.display(), error = %err, "could not open log file, falling back to stderr");
                return LoggingGuard { _file: None };
            }
        }
    }

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    LoggingGuard { _file: None }
}
