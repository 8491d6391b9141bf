//! Server configuration (§9, §10): a plain data record built once at
//! startup from CLI flags and environment variables, not a mutable
//! builder type.

use std::time::Duration;

/// Runtime configuration for the server. Immutable once constructed —
/// `didChangeConfiguration` is not part of this server's surface, unlike
/// the live-updated config this pattern is borrowed from.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum level of detail written to the log sink.
    pub log_level: tracing::Level,
    /// `true` when `SMITHY_LSP_LOG=true` asked for a log file next to the
    /// workspace root instead of stderr only.
    pub log_to_file: bool,
    /// Host the websocket transport binds to when `transport` selects it.
    pub websocket_host: String,
    /// How the transport is selected for this run.
    pub transport: TransportMode,
    /// Idle interval the rebuild ticker waits for before assembling a
    /// dirty project (§5 "Debounce").
    pub rebuild_debounce: Duration,
    /// Upper bound on the number of symbols a `workspace/symbol` response
    /// returns, to keep a broad query over a large model cheap.
    pub workspace_symbol_limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Stdio,
    WebSocket { port: u16 },
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::INFO,
            log_to_file: false,
            websocket_host: "localhost".to_string(),
            transport: TransportMode::Stdio,
            rebuild_debounce: Duration::from_millis(250),
            workspace_symbol_limit: 512,
        }
    }
}

impl ServerConfig {
    /// Builds a config from the process environment and an already-parsed
    /// [`TransportMode`]; the CLI flag parsing that produces the transport
    /// lives in `main.rs` since its failure modes are plain exit codes, not
    /// `ServerConfig` construction errors.
    pub fn from_env(transport: TransportMode) -> Self {
        let mut config = Self {
            transport,
            ..Self::default()
        };
        if let Ok(value) = std::env::var("SMITHY_LSP_LOG") {
            config.log_to_file = value.eq_ignore_ascii_case("true");
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_stdio_and_standard_debounce() {
        let config = ServerConfig::default();
        assert_eq!(config.transport, TransportMode::Stdio);
        assert_eq!(config.rebuild_debounce, Duration::from_millis(250));
    }

    #[test]
    fn websocket_transport_carries_its_port() {
        let config = ServerConfig {
            transport: TransportMode::WebSocket { port: 3000 },
            ..ServerConfig::default()
        };
        assert_eq!(config.transport, TransportMode::WebSocket { port: 3000 });
    }
}
