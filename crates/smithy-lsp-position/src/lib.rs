//! Position tracking primitives for the Smithy language server.
//!
//! Smithy syntax trees carry byte ranges (`ByteSpan`); the LSP wire protocol
//! speaks UTF-16 line/column pairs. This crate is the boundary between them.

mod line_index;
mod span;

pub use line_index::LineStartsCache;
pub use span::ByteSpan;

#[cfg(feature = "wire")]
mod wire;
#[cfg(feature = "wire")]
pub use wire::{WireLocation, WirePosition, WireRange};

/// A byte offset range paired with the document URI it belongs to.
pub type SourceLocation = (String, ByteSpan);
