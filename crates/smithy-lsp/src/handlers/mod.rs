//! Stateless translators from `(Project, cursor)` to LSP responses (§4.10).
//!
//! Every handler here is a pure function over a [`smithy_lsp_project::ProjectSnapshot`]
//! (plus whatever cursor/URI context the request needs) — none of them touch
//! the project's mutable state directly, matching the "Feature handlers
//! suspend [on the dispatcher], never write" split from §5.

pub mod code_actions;
pub mod completion;
pub mod definition;
pub mod diagnostics;
pub mod formatting;
pub mod hover;
pub mod jar_file;
pub mod references;
pub mod selector;
pub mod symbols;
