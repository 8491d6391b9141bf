//! LSP Base Protocol transport.
//!
//! Two concrete transports are provided: [`framing`] for stdio (the
//! default, required by every LSP client) and [`websocket`] for the
//! optional `localhost` socket mode selected by `--port-number`.
//! Both produce/consume the same [`smithy_lsp_protocol::JsonRpcRequest`]
//! / [`smithy_lsp_protocol::JsonRpcResponse`] types so the dispatcher above
//! doesn't need to know which one is in use.

pub mod framing;
pub mod websocket;

pub use framing::{read_message, write_message, write_notification};
pub use websocket::{WebSocketTransport, WebSocketTransportError};
