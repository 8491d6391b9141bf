//! The per-request contract from §4.9: resolve a URI to its owning
//! project, gate syntactic vs. semantic requests on the right freshness
//! guarantee, resolve the cursor to a shape reference, and hand the rest
//! to a feature handler.

use std::sync::Arc;
use std::time::Duration;

use smithy_lsp_position::{LineStartsCache, WirePosition};
use smithy_lsp_project::{Project, ProjectManager, ProjectSnapshot, Reference, ReferenceAt, ReferenceRole};
use smithy_lsp_syntax::{Statement, Tree};

use crate::cancellation::{CancellationRegistry, RequestId};
use crate::config::ServerConfig;
use crate::error::LspError;

/// What the cursor in a `(URI, position)` pair points at, resolved against
/// the owning file's reference index (§4.4) with a syntax-tree fallback for
/// positions that aren't over any shape reference (used by completion to
/// decide what's valid to type next).
#[derive(Debug, Clone)]
pub enum CursorTarget {
    Reference(Reference),
    Declaration { shape_id: smithy_lsp_model::ShapeId, span: smithy_lsp_position::ByteSpan },
    None,
}

pub struct CursorContext {
    pub offset: usize,
    pub target: CursorTarget,
    /// The tightest enclosing statement, populated only when `target` is
    /// `None` — completion uses this to decide what kinds of tokens are
    /// valid at the cursor (§4.9 "Cursor resolution").
    pub enclosing_statement: Option<Statement>,
}

pub struct RequestDispatcher {
    manager: Arc<ProjectManager>,
    config: ServerConfig,
    cancellation: Arc<CancellationRegistry>,
}

impl RequestDispatcher {
    pub fn new(manager: Arc<ProjectManager>, config: ServerConfig, cancellation: Arc<CancellationRegistry>) -> Self {
        Self { manager, config, cancellation }
    }

    pub fn manager(&self) -> &Arc<ProjectManager> {
        &self.manager
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn cancellation(&self) -> &Arc<CancellationRegistry> {
        &self.cancellation
    }

    /// Step 1: resolve URI → Project. Per §7, an unknown URI is not an
    /// error condition for most requests — callers fall back to an empty
    /// result rather than propagating `UnknownUri`.
    pub fn project_for(&self, uri: &str) -> Option<Arc<Project>> {
        self.manager.project_for(uri)
    }

    /// Step 2, syntactic features: ensures the DocumentParse for `uri` is
    /// current and returns the snapshot alongside it. `Project::parse`
    /// already recomputes lazily, so no further waiting is needed here.
    pub fn syntactic_snapshot(&self, project: &Project, uri: &str) -> Option<(ProjectSnapshot, smithy_lsp_project::DocumentParse)> {
        let parse = project.parse(uri)?;
        Some((project.snapshot(), parse))
    }

    /// Step 3, semantic features: waits for the project's rebuild
    /// generation to reach at least the generation the triggering edit
    /// will be assembled into, then returns a consistent snapshot.
    ///
    /// The wait is a synchronous poll of the generation watch channel
    /// (§5's scheduling model is thread-based, not async), checking
    /// cancellation between polls so a client's `$/cancelRequest` is
    /// observed promptly rather than only after the next rebuild.
    pub fn semantic_snapshot(&self, project: &Project, request_id: &RequestId) -> Result<ProjectSnapshot, LspError> {
        let target = if project.is_dirty() { project.generation() + 1 } else { project.generation() };
        let mut generations = project.generation_receiver();
        loop {
            if *generations.borrow_and_update() >= target {
                return Ok(project.snapshot());
            }
            if self.cancellation.is_cancelled(request_id) {
                return Err(LspError::RequestCancelled);
            }
            std::thread::sleep(Self::POLL_INTERVAL);
        }
    }

    const POLL_INTERVAL: Duration = Duration::from_millis(20);

    /// Converts an LSP position to a byte offset and resolves the cursor
    /// against the file's reference index, falling back to the tightest
    /// enclosing statement in the syntax tree.
    pub fn resolve_cursor(
        &self,
        snapshot: &ProjectSnapshot,
        tree: &Tree,
        uri: &str,
        position: lsp_types::Position,
    ) -> CursorContext {
        let text = snapshot.documents.get(uri).map(|doc| doc.text()).unwrap_or_default();
        let cache = LineStartsCache::new(&text);
        let wire_pos: WirePosition = position.into();
        let offset = wire_pos.to_byte_offset(&cache, &text);

        let target = snapshot
            .smithy_files()
            .get(uri)
            .and_then(|file| file.at_offset(offset))
            .map(|at| match at {
                ReferenceAt::Reference(reference) => CursorTarget::Reference(reference.clone()),
                ReferenceAt::Declaration(shape_id, span) => CursorTarget::Declaration { shape_id: shape_id.clone(), span },
            })
            .unwrap_or(CursorTarget::None);

        let enclosing_statement = matches!(target, CursorTarget::None)
            .then(|| tree.statement_at(offset).cloned())
            .flatten();

        CursorContext { offset, target, enclosing_statement }
    }

    /// Maps a [`ReferenceRole`] to whether it denotes a definition site
    /// worth offering "go to definition" for, as opposed to a purely
    /// informational reference. Every role currently produced by
    /// [`smithy_lsp_project::SmithyFile::build`] targets a real shape, so
    /// this is total rather than filtering any out today; kept as its own
    /// function so a future non-navigable role has somewhere to opt out.
    pub fn is_navigable(role: ReferenceRole) -> bool {
        !matches!(role, ReferenceRole::ShapeIdLiteral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smithy_lsp_project::Project as ProjectImpl;
    use std::time::Duration as StdDuration;

    #[test]
    fn semantic_snapshot_resolves_immediately_when_not_dirty() {
        let project = ProjectImpl::detached("file:///a.smithy", "namespace com.foo\n", 1);
        let manager = Arc::new(ProjectManager::new("/tmp/repo"));
        let dispatcher = RequestDispatcher::new(manager, ServerConfig::default(), Arc::new(CancellationRegistry::new()));
        let id = RequestId::Number(1);
        let snapshot = dispatcher.semantic_snapshot(&project, &id).expect("snapshot");
        assert_eq!(snapshot.generation(), 0);
    }

    #[test]
    fn semantic_snapshot_waits_for_dirty_rebuild() {
        let project = Arc::new(ProjectImpl::detached("file:///a.smithy", "namespace com.foo\n", 1));
        project.change(
            "file:///a.smithy",
            &[lsp_types::TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: "namespace com.foo\nstructure A {}\n".to_string(),
            }],
            2,
        );
        let manager = Arc::new(ProjectManager::new("/tmp/repo"));
        let dispatcher = Arc::new(RequestDispatcher::new(manager, ServerConfig::default(), Arc::new(CancellationRegistry::new())));

        let worker_project = project.clone();
        let worker_dispatcher = dispatcher.clone();
        let handle = std::thread::spawn(move || {
            let id = RequestId::Number(2);
            worker_dispatcher.semantic_snapshot(&worker_project, &id)
        });

        std::thread::sleep(StdDuration::from_millis(30));
        project.rebuild();
        let snapshot = handle.join().expect("thread").expect("snapshot");
        assert_eq!(snapshot.generation(), 1);
    }

    #[test]
    fn semantic_snapshot_returns_cancelled_when_cancelled_before_rebuild() {
        let project = Arc::new(ProjectImpl::detached("file:///a.smithy", "namespace com.foo\n", 1));
        project.change(
            "file:///a.smithy",
            &[lsp_types::TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: "namespace com.foo\nstructure A {}\n".to_string(),
            }],
            2,
        );
        let manager = Arc::new(ProjectManager::new("/tmp/repo"));
        let cancellation = Arc::new(CancellationRegistry::new());
        let id = RequestId::Number(3);
        cancellation.begin(id.clone());
        cancellation.cancel(&id);

        let dispatcher = RequestDispatcher::new(manager, ServerConfig::default(), cancellation);
        let result = dispatcher.semantic_snapshot(&project, &id);
        assert!(matches!(result, Err(LspError::RequestCancelled)));
    }
}
