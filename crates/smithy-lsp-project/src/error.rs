//! Error kinds surfaced by project loading and rebuilding.
//!
//! Parse errors never reach this enum — they stay inside a `DocumentParse`
//! and surface as diagnostics (see the core spec's error-handling design).
//! This enum is for the things that keep a `Project` usable in a degraded
//! state rather than failing the request outright: bad config, an
//! unresolvable dependency, a jar that can't be opened.

use std::io;
use std::path::PathBuf;

use smithy_lsp_build::BuildLoaderError;

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("build config error: {0}")]
    Config(#[from] BuildLoaderError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("dependency resolution failed for {path}: {reason}")]
    DependencyResolutionFailure { path: PathBuf, reason: String },

    #[error("model assembly failed: {0}")]
    ModelAssemblyError(String),

    #[error("unknown URI: {0}")]
    UnknownUri(String),
}
