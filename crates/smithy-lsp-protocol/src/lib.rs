//! JSON-RPC message types and LSP method-name constants.
//!
//! Isolated from the transport and dispatch layers so they can be shared
//! between the server binary and anything else that wants to speak the wire
//! format (test harnesses, a future headless CLI).

mod errors;
mod jsonrpc;
pub mod methods;

pub use errors::{error_codes, JsonRpcErrorCode};
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
