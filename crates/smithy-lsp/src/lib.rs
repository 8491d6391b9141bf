//! The Smithy Language Server's request dispatch, feature handlers, and
//! process entry point.
//!
//! Everything below this crate (document buffers, syntax, project
//! loading, model assembly, URIs, wire protocol, transport) is a plain
//! library with no knowledge of LSP request shapes. This crate is where
//! those pieces meet `lsp_types`: [`dispatcher`] resolves a request to a
//! project and a cursor (§4.9), [`handlers`] turns that into a response
//! (§4.10), and [`server`] drives the read/dispatch/write loop plus the
//! background rebuild ticker (§5).

pub mod cancellation;
pub mod capabilities;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod server;

pub use config::{ServerConfig, TransportMode};
pub use error::LspError;
pub use server::LanguageServer;
