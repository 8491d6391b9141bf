//! Websocket transport for `--port-number` socket mode.
//!
//! The upstream LSP Base Protocol is defined over a byte stream with
//! Content-Length framing; over a websocket we instead get one text frame
//! per JSON-RPC message, so this transport skips [`crate::framing`]
//! entirely and speaks JSON directly on top of `tungstenite`.

use std::net::TcpStream;

use smithy_lsp_protocol::{JsonRpcRequest, JsonRpcResponse};
use tungstenite::{Message, WebSocket};

#[derive(Debug, thiserror::Error)]
pub enum WebSocketTransportError {
    #[error("websocket connection closed")]
    Closed,
    #[error("websocket error: {0}")]
    Protocol(#[from] tungstenite::Error),
    #[error("received a non-text websocket frame")]
    UnexpectedFrameKind,
    #[error("malformed JSON-RPC message: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

/// Wraps a single accepted websocket connection, exposing the same
/// request/response vocabulary the stdio transport uses.
pub struct WebSocketTransport {
    socket: WebSocket<TcpStream>,
}

impl WebSocketTransport {
    pub fn new(socket: WebSocket<TcpStream>) -> Self {
        Self { socket }
    }

    /// Blocks until the next JSON-RPC message arrives.
    ///
    /// Returns `Ok(None)` when the connection closes cleanly, matching the
    /// stdio transport's EOF behavior, and logs+skips malformed frames
    /// instead of tearing down the connection.
    pub fn read_message(&mut self) -> Result<Option<JsonRpcRequest>, WebSocketTransportError> {
        loop {
            let message = match self.socket.read() {
                Ok(m) => m,
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };

            match message {
                Message::Text(text) => match serde_json::from_str(&text) {
                    Ok(request) => return Ok(Some(request)),
                    Err(e) => {
                        tracing::warn!(error = %e, "malformed websocket JSON-RPC frame, dropping");
                        continue;
                    }
                },
                Message::Close(_) => return Ok(None),
                Message::Ping(_) | Message::Pong(_) => continue,
                _ => {
                    tracing::warn!("unexpected websocket frame kind, dropping");
                    continue;
                }
            }
        }
    }

    pub fn write_message(
        &mut self,
        response: &JsonRpcResponse,
    ) -> Result<(), WebSocketTransportError> {
        let content = serde_json::to_string(response)?;
        self.socket.send(Message::Text(content.into()))?;
        Ok(())
    }

    pub fn write_notification(
        &mut self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<(), WebSocketTransportError> {
        let notification = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        let content = serde_json::to_string(&notification)?;
        self.socket.send(Message::Text(content.into()))?;
        Ok(())
    }
}
