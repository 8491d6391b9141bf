//! The JSON-RPC read/dispatch/write loop (§5) and the background rebuild
//! ticker that drives §4.7's debounce policy.
//!
//! Requests run on a small, bounded worker pool so one handler waiting on
//! a rebuild generation (§4.9 step 3) never blocks the reader thread or a
//! sibling request; text-sync notifications are applied inline on the
//! reader thread so arrival order is preserved per URI (§5 "Ordering
//! guarantees") without needing a per-URI queue.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex as StdMutex};
use std::thread;
use std::time::Duration;

use lsp_types::{
    CodeActionParams, CompletionParams, DidChangeTextDocumentParams, DidChangeWatchedFilesParams,
    DidChangeWorkspaceFoldersParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    DidSaveTextDocumentParams, DocumentFormattingParams, DocumentSymbolParams, DocumentSymbolResponse,
    FileChangeType, GotoDefinitionParams, GotoDefinitionResponse, HoverParams, InitializeParams,
    InitializeResult, ReferenceParams, WorkspaceSymbolParams,
};
use serde_json::{json, Value};
use smithy_lsp_project::{ProjectManager, WatchedFileChangeKind, WatchedFileEvent};
use smithy_lsp_protocol::methods;
use smithy_lsp_protocol::{JsonRpcRequest, JsonRpcResponse};

use crate::cancellation::{CancellationRegistry, RequestId};
use crate::capabilities::server_capabilities;
use crate::config::ServerConfig;
use crate::dispatcher::{CursorTarget, RequestDispatcher};
use crate::error::LspError;
use crate::handlers;

/// Number of requests that may be executing concurrently (§5 "bounded
/// worker pool"). Text-sync notifications bypass the pool entirely —
/// see the module doc — so this only bounds feature-request concurrency.
const WORKER_COUNT: usize = 4;

/// Either half of the two transports this server speaks: `Content-Length`
/// framing over a byte stream for stdio, or one text frame per message for
/// the websocket mode. `write_response`/`notify` go through whichever one
/// is live so a diagnostics push from the rebuild ticker reaches the same
/// place a request's reply does, regardless of transport.
enum Sink {
    Stream(Box<dyn Write + Send>),
    WebSocket(smithy_lsp_transport::WebSocketTransport),
}

impl Sink {
    fn write_response(&mut self, response: &JsonRpcResponse) -> std::io::Result<()> {
        match self {
            Sink::Stream(w) => smithy_lsp_transport::write_message(w, response),
            Sink::WebSocket(t) => t.write_message(response).map_err(std::io::Error::other),
        }
    }

    fn write_notification(&mut self, method: &str, params: Value) -> std::io::Result<()> {
        match self {
            Sink::Stream(w) => smithy_lsp_transport::write_notification(w, method, params),
            Sink::WebSocket(t) => t.write_notification(method, params).map_err(std::io::Error::other),
        }
    }
}

/// Owns everything a running server needs: the project set, the request
/// dispatcher, and the shared sink every worker and the rebuild ticker
/// write notifications/responses through.
pub struct LanguageServer {
    manager: Arc<ProjectManager>,
    dispatcher: Arc<RequestDispatcher>,
    cancellation: Arc<CancellationRegistry>,
    config: ServerConfig,
    output: Arc<StdMutex<Sink>>,
    shutdown_received: AtomicBool,
    pool: WorkerPool,
}

impl LanguageServer {
    pub fn new(config: ServerConfig, output: Box<dyn Write + Send>) -> Arc<Self> {
        let cancellation = Arc::new(CancellationRegistry::new());
        let manager = Arc::new(ProjectManager::new(local_maven_repository()));
        let dispatcher = Arc::new(RequestDispatcher::new(manager.clone(), config.clone(), cancellation.clone()));
        Arc::new(Self {
            manager,
            dispatcher,
            cancellation,
            config,
            output: Arc::new(StdMutex::new(Sink::Stream(output))),
            shutdown_received: AtomicBool::new(false),
            pool: WorkerPool::new(WORKER_COUNT),
        })
    }

    /// Drives the server over `reader`, dispatching to `self` until `exit`
    /// is received or the stream closes. Returns the process exit code LSP
    /// expects: 0 if `shutdown` preceded `exit`, 1 otherwise.
    pub fn run_stdio(self: &Arc<Self>, reader: impl BufRead) -> std::io::Result<i32> {
        self.spawn_rebuild_ticker();
        let mut reader = reader;
        loop {
            let request = match smithy_lsp_transport::read_message(&mut reader)? {
                Some(request) => request,
                None => break,
            };
            if self.dispatch(request) {
                break;
            }
        }
        Ok(self.exit_code())
    }

    /// Accepts a single websocket connection on `host:port` and drives it
    /// through the same dispatch path as stdio (§6 "socket mode").
    pub fn run_websocket(self: &Arc<Self>, port: u16, host: &str) -> std::io::Result<i32> {
        self.spawn_rebuild_ticker();
        let listener = std::net::TcpListener::bind((host, port))?;
        let (stream, _addr) = listener.accept()?;
        let socket = tungstenite::accept(stream).map_err(|err| std::io::Error::other(err.to_string()))?;
        *self.output.lock().unwrap_or_else(|e| e.into_inner()) =
            Sink::WebSocket(smithy_lsp_transport::WebSocketTransport::new(socket));

        loop {
            let request = match self.read_websocket_message()? {
                Some(request) => request,
                None => break,
            };
            if self.dispatch(request) {
                break;
            }
        }
        Ok(self.exit_code())
    }

    fn read_websocket_message(&self) -> std::io::Result<Option<JsonRpcRequest>> {
        let mut output = self.output.lock().unwrap_or_else(|e| e.into_inner());
        match &mut *output {
            Sink::WebSocket(transport) => transport.read_message().map_err(std::io::Error::other),
            Sink::Stream(_) => Ok(None),
        }
    }

    fn exit_code(&self) -> i32 {
        i32::from(!self.shutdown_received.load(Ordering::SeqCst))
    }

    /// Routes one incoming message. Returns `true` when the server should
    /// stop reading (the `exit` notification was received).
    fn dispatch(self: &Arc<Self>, request: JsonRpcRequest) -> bool {
        if request.method == methods::EXIT {
            return true;
        }
        if request.method == methods::CANCEL_REQUEST {
            self.handle_cancel(request.params);
            return false;
        }

        let is_notification = request.id.is_none();
        if is_notification || is_text_sync_method(&request.method) {
            // Notifications, and the text-sync requests proper, run inline
            // so edits for one URI are applied strictly in arrival order
            // even while other requests are queued on the worker pool.
            if let Some(response) = self.handle_inline(&request) {
                self.write_response(response);
            }
            return false;
        }

        let server = self.clone();
        self.pool.execute(move || {
            let response = server.handle_request(request);
            server.write_response(response);
        });
        false
    }

    fn handle_cancel(&self, params: Option<Value>) {
        let Some(id) = params.and_then(|p| p.get("id").and_then(RequestId::from_value)) else {
            return;
        };
        self.cancellation.cancel(&id);
    }

    fn write_response(&self, response: JsonRpcResponse) {
        let mut output = self.output.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(err) = output.write_response(&response) {
            tracing::error!(error = %err, "failed to write LSP response");
        }
    }

    /// Handles the handful of methods that must run on the reader thread
    /// rather than the worker pool: `initialize`/`shutdown` (so they can't
    /// race a feature request against server state), and every text-sync
    /// notification/request (so edits for a URI never reorder).
    fn handle_inline(self: &Arc<Self>, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        let method = request.method.as_str();
        match method {
            methods::INITIALIZE => {
                Some(self.respond(request, self.handle_initialize(request.params.clone())))
            }
            methods::INITIALIZED => None,
            methods::SHUTDOWN => {
                self.shutdown_received.store(true, Ordering::SeqCst);
                Some(self.respond(request, Ok(Value::Null)))
            }
            methods::TEXT_DOCUMENT_DID_OPEN => {
                self.handle_did_open(request.params.clone());
                None
            }
            methods::TEXT_DOCUMENT_DID_CHANGE => {
                self.handle_did_change(request.params.clone());
                None
            }
            methods::TEXT_DOCUMENT_DID_CLOSE => {
                self.handle_did_close(request.params.clone());
                None
            }
            methods::TEXT_DOCUMENT_DID_SAVE => {
                self.handle_did_save(request.params.clone());
                None
            }
            methods::WORKSPACE_DID_CHANGE_WATCHED_FILES => {
                self.handle_watched_files(request.params.clone());
                None
            }
            methods::WORKSPACE_DID_CHANGE_WORKSPACE_FOLDERS => {
                self.handle_workspace_folders_changed(request.params.clone());
                None
            }
            _ => None,
        }
    }

    /// Every request that's safe to run off the worker pool, including the
    /// potentially long-blocking semantic ones that wait on a rebuild
    /// generation (§4.9 step 3, §5 "Suspension / blocking points").
    fn handle_request(self: &Arc<Self>, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request
            .id
            .as_ref()
            .and_then(RequestId::from_value)
            .unwrap_or(RequestId::Number(0));
        self.cancellation.begin(id.clone());
        let result = self.route(&request.method, request.params.clone(), &id);
        self.cancellation.finish(&id);
        self.respond(&request, result)
    }

    fn route(self: &Arc<Self>, method: &str, params: Option<Value>, id: &RequestId) -> Result<Value, LspError> {
        match method {
            methods::TEXT_DOCUMENT_HOVER => self.handle_hover(params, id),
            methods::TEXT_DOCUMENT_DEFINITION => self.handle_definition(params, id),
            methods::TEXT_DOCUMENT_REFERENCES => self.handle_references(params, id),
            methods::TEXT_DOCUMENT_COMPLETION => self.handle_completion(params, id),
            methods::TEXT_DOCUMENT_DOCUMENT_SYMBOL => self.handle_document_symbol(params),
            methods::WORKSPACE_SYMBOL => self.handle_workspace_symbol(params),
            methods::TEXT_DOCUMENT_FORMATTING => self.handle_formatting(params),
            methods::TEXT_DOCUMENT_CODE_ACTION => self.handle_code_action(params),
            methods::SMITHY_JAR_FILE => self.handle_jar_file(params),
            methods::SMITHY_SELECTOR => self.handle_selector(params, id),
            _ => Ok(Value::Null),
        }
    }

    fn respond(&self, request: &JsonRpcRequest, result: Result<Value, LspError>) -> JsonRpcResponse {
        match result {
            Ok(value) => JsonRpcResponse::success(request.id.clone(), value),
            Err(err) => JsonRpcResponse::error(request.id.clone(), err.to_jsonrpc()),
        }
    }

    // -- lifecycle -----------------------------------------------------

    fn handle_initialize(self: &Arc<Self>, params: Option<Value>) -> Result<Value, LspError> {
        let params: InitializeParams = params
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_else(|| InitializeParams { ..Default::default() });

        let mut roots: Vec<PathBuf> = Vec::new();
        if let Some(folders) = &params.workspace_folders {
            for folder in folders {
                if let Some(path) = smithy_lsp_uri::uri_to_fs_path(&folder.uri.to_string()) {
                    roots.push(path);
                }
            }
        } else if let Some(root_uri) = params.root_uri.as_ref() {
            if let Some(path) = smithy_lsp_uri::uri_to_fs_path(&root_uri.to_string()) {
                roots.push(path);
            }
        }

        for root in roots {
            if let Err(err) = self.manager.load_project(&root) {
                tracing::warn!(root = %root.display(), error = %err, "failed to load project at workspace folder");
            }
        }

        let result = InitializeResult {
            capabilities: server_capabilities(),
            server_info: Some(lsp_types::ServerInfo {
                name: "smithy-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        };
        Ok(serde_json::to_value(result).map_err(|e| LspError::InvalidPosition(e.to_string()))?)
    }

    // -- text sync -------------------------------------------------------

    fn handle_did_open(&self, params: Option<Value>) {
        let Some(params) = params.and_then(|v| serde_json::from_value::<DidOpenTextDocumentParams>(v).ok()) else {
            return;
        };
        let uri = params.text_document.uri.to_string();
        self.manager.open(&uri, params.text_document.text, params.text_document.version);
        self.publish_diagnostics_for(&uri);
    }

    fn handle_did_change(&self, params: Option<Value>) {
        let Some(params) = params.and_then(|v| serde_json::from_value::<DidChangeTextDocumentParams>(v).ok()) else {
            return;
        };
        let uri = params.text_document.uri.to_string();
        if let Some(project) = self.manager.project_for(&uri) {
            project.change(&uri, &params.content_changes, params.text_document.version);
        }
        self.publish_diagnostics_for(&uri);
    }

    fn handle_did_close(&self, params: Option<Value>) {
        let Some(params) = params.and_then(|v| serde_json::from_value::<DidCloseTextDocumentParams>(v).ok()) else {
            return;
        };
        self.manager.close(&params.text_document.uri.to_string());
    }

    fn handle_did_save(&self, params: Option<Value>) {
        let Some(params) = params.and_then(|v| serde_json::from_value::<DidSaveTextDocumentParams>(v).ok()) else {
            return;
        };
        let uri = params.text_document.uri.to_string();
        if let Some(project) = self.manager.project_for(&uri) {
            project.save(&uri);
        }
    }

    fn handle_watched_files(&self, params: Option<Value>) {
        let Some(params) = params.and_then(|v| serde_json::from_value::<DidChangeWatchedFilesParams>(v).ok()) else {
            return;
        };
        let events: Vec<WatchedFileEvent> = params
            .changes
            .into_iter()
            .filter_map(|change| {
                let path = smithy_lsp_uri::uri_to_fs_path(&change.uri.to_string())?;
                let kind = match change.typ {
                    FileChangeType::CREATED => WatchedFileChangeKind::Created,
                    FileChangeType::DELETED => WatchedFileChangeKind::Deleted,
                    _ => WatchedFileChangeKind::Changed,
                };
                Some(WatchedFileEvent { path, kind })
            })
            .collect();
        self.manager.dispatch_watched(&events);
    }

    fn handle_workspace_folders_changed(&self, params: Option<Value>) {
        let Some(params) = params.and_then(|v| serde_json::from_value::<DidChangeWorkspaceFoldersParams>(v).ok()) else {
            return;
        };
        for added in params.event.added {
            if let Some(path) = smithy_lsp_uri::uri_to_fs_path(&added.uri.to_string()) {
                if let Err(err) = self.manager.load_project(&path) {
                    tracing::warn!(root = %path.display(), error = %err, "failed to load added workspace folder");
                }
            }
        }
        for removed in params.event.removed {
            if let Some(path) = smithy_lsp_uri::uri_to_fs_path(&removed.uri.to_string()) {
                self.manager.unload_project(&path);
            }
        }
    }

    // -- feature handlers -------------------------------------------------

    fn handle_hover(&self, params: Option<Value>, id: &RequestId) -> Result<Value, LspError> {
        let params: HoverParams = parse_params(params)?;
        let uri = params.text_document_position_params.text_document.uri.to_string();
        let Some(project) = self.dispatcher.project_for(&uri) else { return Ok(Value::Null) };
        let snapshot = self.dispatcher.semantic_snapshot(&project, id)?;
        let Some(parse) = project.parse(&uri) else { return Ok(Value::Null) };
        let cursor = self.dispatcher.resolve_cursor(&snapshot, &parse.tree, &uri, params.text_document_position_params.position);
        let hover = handlers::hover::hover_for(&snapshot, &cursor.target);
        Ok(serde_json::to_value(hover).unwrap_or(Value::Null))
    }

    fn handle_definition(&self, params: Option<Value>, id: &RequestId) -> Result<Value, LspError> {
        let params: GotoDefinitionParams = parse_params(params)?;
        let uri = params.text_document_position_params.text_document.uri.to_string();
        let Some(project) = self.dispatcher.project_for(&uri) else { return Ok(Value::Null) };
        let snapshot = self.dispatcher.semantic_snapshot(&project, id)?;
        let Some(parse) = project.parse(&uri) else { return Ok(Value::Null) };
        let cursor = self.dispatcher.resolve_cursor(&snapshot, &parse.tree, &uri, params.text_document_position_params.position);
        if !matches!(cursor.target, CursorTarget::None) {
            if let Some(location) = handlers::definition::definition_for(&snapshot, &cursor.target) {
                return Ok(serde_json::to_value(GotoDefinitionResponse::Scalar(location)).unwrap_or(Value::Null));
            }
        }
        Ok(Value::Null)
    }

    fn handle_references(&self, params: Option<Value>, id: &RequestId) -> Result<Value, LspError> {
        let params: ReferenceParams = parse_params(params)?;
        let uri = params.text_document_position.text_document.uri.to_string();
        let Some(project) = self.dispatcher.project_for(&uri) else { return Ok(Value::Null) };
        let snapshot = self.dispatcher.semantic_snapshot(&project, id)?;
        let Some(parse) = project.parse(&uri) else { return Ok(Value::Null) };
        let cursor = self.dispatcher.resolve_cursor(&snapshot, &parse.tree, &uri, params.text_document_position.position);
        let locations = handlers::references::references_for(&snapshot, &cursor.target, params.context.include_declaration);
        Ok(serde_json::to_value(locations).unwrap_or(Value::Null))
    }

    fn handle_completion(&self, params: Option<Value>, id: &RequestId) -> Result<Value, LspError> {
        let params: CompletionParams = parse_params(params)?;
        let uri = params.text_document_position.text_document.uri.to_string();
        let Some(project) = self.dispatcher.project_for(&uri) else { return Ok(Value::Null) };
        let snapshot = self.dispatcher.semantic_snapshot(&project, id)?;
        let Some(parse) = project.parse(&uri) else { return Ok(Value::Null) };
        let cursor = self.dispatcher.resolve_cursor(&snapshot, &parse.tree, &uri, params.text_document_position.position);
        let items = handlers::completion::completions_for(&snapshot, &cursor);
        Ok(serde_json::to_value(items).unwrap_or(Value::Null))
    }

    fn handle_document_symbol(&self, params: Option<Value>) -> Result<Value, LspError> {
        let params: DocumentSymbolParams = parse_params(params)?;
        let uri = params.text_document.uri.to_string();
        let Some(project) = self.dispatcher.project_for(&uri) else { return Ok(Value::Null) };
        let snapshot = project.snapshot();
        let symbols = handlers::symbols::document_symbols(&snapshot, &uri);
        Ok(serde_json::to_value(DocumentSymbolResponse::Nested(symbols)).unwrap_or(Value::Null))
    }

    fn handle_workspace_symbol(&self, params: Option<Value>) -> Result<Value, LspError> {
        let params: WorkspaceSymbolParams = parse_params(params)?;
        let mut results = Vec::new();
        for project in self.manager.all_projects() {
            let snapshot = project.snapshot();
            results.extend(handlers::symbols::workspace_symbols(&snapshot, &params.query, &self.config));
        }
        Ok(serde_json::to_value(results).unwrap_or(Value::Null))
    }

    fn handle_formatting(&self, params: Option<Value>) -> Result<Value, LspError> {
        let params: DocumentFormattingParams = parse_params(params)?;
        let uri = params.text_document.uri.to_string();
        let Some(project) = self.dispatcher.project_for(&uri) else { return Ok(Value::Null) };
        let snapshot = project.snapshot();
        let Some(document) = snapshot.documents.get(&uri) else { return Ok(Value::Null) };
        match handlers::formatting::format_document(&document.text(), &params.options) {
            Ok(edits) => Ok(serde_json::to_value(edits).unwrap_or(Value::Null)),
            Err(err) => {
                tracing::warn!(%uri, error = %err, "formatting request could not run the formatter");
                Ok(Value::Null)
            }
        }
    }

    fn handle_code_action(&self, params: Option<Value>) -> Result<Value, LspError> {
        let params: CodeActionParams = parse_params(params)?;
        let uri = params.text_document.uri.to_string();
        let Some(project) = self.dispatcher.project_for(&uri) else { return Ok(Value::Null) };
        let Some(parse) = project.parse(&uri) else { return Ok(Value::Null) };
        let snapshot = project.snapshot();
        let Some(text) = snapshot.documents.get(&uri).map(|doc| doc.text()) else { return Ok(Value::Null) };
        let actions = handlers::code_actions::code_actions_for(&uri, &text, &parse);
        Ok(serde_json::to_value(actions).unwrap_or(Value::Null))
    }

    fn handle_jar_file(&self, params: Option<Value>) -> Result<Value, LspError> {
        let uri = params
            .as_ref()
            .and_then(|p| p.get("uri"))
            .and_then(Value::as_str)
            .ok_or_else(|| LspError::UriEncoding("smithy/jarFile requires a `uri` parameter".to_string()))?;
        let text = handlers::jar_file::jar_file_contents(uri)?;
        Ok(json!({ "text": text }))
    }

    fn handle_selector(&self, params: Option<Value>, id: &RequestId) -> Result<Value, LspError> {
        let expression = params
            .as_ref()
            .and_then(|p| p.get("expression"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let mut matches = Vec::new();
        for project in self.manager.all_projects() {
            let snapshot = self.dispatcher.semantic_snapshot(&project, id)?;
            if let Ok(found) = handlers::selector::run_selector(&snapshot, expression) {
                matches.extend(found);
            }
        }
        let rendered: Vec<Value> = matches
            .into_iter()
            .map(|m| json!({ "shapeId": m.shape_id.to_string(), "location": m.location }))
            .collect();
        Ok(Value::Array(rendered))
    }

    // -- diagnostics -------------------------------------------------------

    fn publish_diagnostics_for(&self, uri: &str) {
        let Some(project) = self.manager.project_for(uri) else { return };
        let Some(parse) = project.parse(uri) else { return };
        let snapshot = project.snapshot();
        let diagnostics = handlers::diagnostics::diagnostics_for(&snapshot, uri, &parse);
        self.notify(
            methods::TEXT_DOCUMENT_PUBLISH_DIAGNOSTICS,
            json!({ "uri": uri, "diagnostics": diagnostics }),
        );
    }

    fn notify(&self, method: &str, params: Value) {
        let mut output = self.output.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(err) = output.write_notification(method, params) {
            tracing::error!(error = %err, "failed to write LSP notification");
        }
    }

    /// Starts the rebuilder: one background thread that re-runs any
    /// project's debounced rebuild once it's due and republishes
    /// diagnostics for that project's open documents (§4.7 "Rebuild
    /// policy", §5 "Debounce"). This is the sole writer of project state
    /// once loaded, matching §5's single-rebuilder-per-project rule.
    fn spawn_rebuild_ticker(self: &Arc<Self>) {
        let server = self.clone();
        thread::spawn(move || loop {
            thread::sleep(Duration::from_millis(50));
            for project in server.manager.all_projects() {
                if project.rebuild_if_due(server.config.rebuild_debounce) {
                    let uris: Vec<String> = project.snapshot().documents.keys().cloned().collect();
                    for uri in uris {
                        server.publish_diagnostics_for(&uri);
                    }
                }
            }
        });
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Option<Value>) -> Result<T, LspError> {
    let params = params.ok_or_else(|| LspError::InvalidPosition("missing request params".to_string()))?;
    serde_json::from_value(params).map_err(|e| LspError::InvalidPosition(e.to_string()))
}

fn is_text_sync_method(method: &str) -> bool {
    method == methods::TEXT_DOCUMENT_DID_OPEN
        || method == methods::TEXT_DOCUMENT_DID_CHANGE
        || method == methods::TEXT_DOCUMENT_DID_CLOSE
        || method == methods::TEXT_DOCUMENT_DID_SAVE
        || method == methods::WORKSPACE_DID_CHANGE_WATCHED_FILES
        || method == methods::WORKSPACE_DID_CHANGE_WORKSPACE_FOLDERS
}

/// The default Maven local repository (`~/.m2/repository`), used when
/// resolving dependency coordinates for a loaded project.
fn local_maven_repository() -> PathBuf {
    dirs_home().join(".m2").join("repository")
}

fn dirs_home() -> PathBuf {
    std::env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."))
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A minimal fixed-size worker pool: N threads pulling closures off a
/// shared channel. Exists only to bound how many feature requests run
/// concurrently (§5); it is not a general-purpose executor.
struct WorkerPool {
    sender: mpsc::Sender<Job>,
    _workers: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    fn new(count: usize) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(StdMutex::new(receiver));
        let workers = (0..count)
            .map(|_| {
                let receiver = receiver.clone();
                thread::spawn(move || loop {
                    let job = {
                        let guard = receiver.lock().unwrap_or_else(|e| e.into_inner());
                        guard.recv()
                    };
                    match job {
                        Ok(job) => job(),
                        Err(_) => break,
                    }
                })
            })
            .collect();
        Self { sender, _workers: workers }
    }

    fn execute(&self, job: impl FnOnce() + Send + 'static) {
        let _ = self.sender.send(Box::new(job));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_is_zero_after_shutdown() {
        let server = LanguageServer::new(ServerConfig::default(), Box::new(Vec::new()));
        server.shutdown_received.store(true, Ordering::SeqCst);
        assert_eq!(server.exit_code(), 0);
    }

    #[test]
    fn exit_code_is_one_without_shutdown() {
        let server = LanguageServer::new(ServerConfig::default(), Box::new(Vec::new()));
        assert_eq!(server.exit_code(), 1);
    }

    #[test]
    fn cancel_notification_marks_the_request_cancelled() {
        let server = LanguageServer::new(ServerConfig::default(), Box::new(Vec::new()));
        let id = RequestId::Number(42);
        server.cancellation.begin(id.clone());
        server.handle_cancel(Some(json!({ "id": 42 })));
        assert!(server.cancellation.is_cancelled(&id));
    }

    #[test]
    fn initialize_without_workspace_folders_does_not_panic() {
        let server = LanguageServer::new(ServerConfig::default(), Box::new(Vec::new()));
        let result = server.handle_initialize(Some(json!({ "capabilities": {} })));
        assert!(result.is_ok());
    }

    #[test]
    fn jar_file_request_requires_a_uri_param() {
        let server = LanguageServer::new(ServerConfig::default(), Box::new(Vec::new()));
        let result = server.handle_jar_file(Some(json!({})));
        assert!(matches!(result, Err(LspError::UriEncoding(_))));
    }
}
