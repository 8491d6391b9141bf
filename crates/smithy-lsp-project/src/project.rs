//! The engine's authoritative per-project state: open documents, their
//! parses, the assembled model, and the debounced rebuild policy that keeps
//! them in sync.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};
use smithy_lsp_build::{resolve_maven, BuildConfig};
use smithy_lsp_model::{Model, ValidationEvent};
use smithy_lsp_uri::{fs_path_to_uri, uri_to_fs_path};
use tokio::sync::watch;

use crate::document::{Document, DocumentParse};
use crate::error::ProjectError;
use crate::jar::read_jar_sources;
use crate::loader::ProjectLoader;
use crate::reference_map::ReferenceMap;
use crate::smithy_file::SmithyFile;

/// What a [`Project`] represents in the workspace. Mirrors the data
/// model's `type ∈ {Normal, Detached, Empty}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    /// A real build: config plus sources plus resolved dependencies.
    Normal,
    /// A single orphan file with no owning build config.
    Detached,
    /// No workspace folder configured yet.
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchedFileChangeKind {
    Created,
    Changed,
    Deleted,
}

#[derive(Debug, Clone)]
pub struct WatchedFileEvent {
    pub path: PathBuf,
    pub kind: WatchedFileChangeKind,
}

/// The product of the last completed rebuild: the assembled model plus the
/// per-file navigation indices it was built alongside. Immutable once
/// published; readers share it through an `Arc`.
pub struct AssembledState {
    pub model: Model,
    pub events: Vec<ValidationEvent>,
    pub smithy_files: FxHashMap<String, SmithyFile>,
    pub reference_map: ReferenceMap,
    smithy_file_versions: FxHashMap<String, i32>,
    pub generation: u64,
}

/// A read-only, internally-consistent view of a project, handed to feature
/// handlers. Nothing in a snapshot changes once it's been returned.
pub struct ProjectSnapshot {
    pub documents: FxHashMap<String, Document>,
    pub parses: FxHashMap<String, DocumentParse>,
    pub state: Arc<AssembledState>,
}

impl ProjectSnapshot {
    pub fn model(&self) -> &Model {
        &self.state.model
    }

    pub fn events(&self) -> &[ValidationEvent] {
        &self.state.events
    }

    pub fn smithy_files(&self) -> &FxHashMap<String, SmithyFile> {
        &self.state.smithy_files
    }

    pub fn references_to(&self, id: &smithy_lsp_model::ShapeId) -> &[(String, smithy_lsp_position::ByteSpan)] {
        self.state.reference_map.references_to(id)
    }

    pub fn generation(&self) -> u64 {
        self.state.generation
    }
}

pub struct Project {
    pub root: PathBuf,
    pub kind: ProjectKind,
    loader: ProjectLoader,
    build_config: RwLock<BuildConfig>,
    source_uris: RwLock<FxHashSet<String>>,
    jar_uris: RwLock<FxHashSet<String>>,
    documents: RwLock<FxHashMap<String, Document>>,
    parses: RwLock<FxHashMap<String, DocumentParse>>,
    state: RwLock<Arc<AssembledState>>,
    dirty: AtomicBool,
    needs_full_reload: AtomicBool,
    last_edit: Mutex<Option<Instant>>,
    generation_tx: watch::Sender<u64>,
}

impl Project {
    /// Loads a Normal project rooted at `root`, resolving Maven
    /// dependencies against `local_repository`.
    pub fn load(root: impl Into<PathBuf>, local_repository: impl Into<PathBuf>) -> Result<Self, ProjectError> {
        let root = root.into();
        let loader = ProjectLoader::new(local_repository);
        let loaded = loader.load(&root, &FxHashMap::default())?;
        Ok(Self::from_loaded(root, ProjectKind::Normal, loader, loaded))
    }

    fn from_loaded(root: PathBuf, kind: ProjectKind, loader: ProjectLoader, loaded: crate::loader::LoadedProject) -> Self {
        let smithy_file_versions = loaded
            .parses
            .iter()
            .map(|(uri, parse)| (uri.clone(), parse.version))
            .collect();
        let (tx, _rx) = watch::channel(0u64);
        let reference_map = ReferenceMap::build(&loaded.smithy_files);
        let state = Arc::new(AssembledState {
            model: loaded.model,
            events: loaded.events,
            smithy_files: loaded.smithy_files,
            reference_map,
            smithy_file_versions,
            generation: 0,
        });
        Self {
            root,
            kind,
            loader,
            build_config: RwLock::new(loaded.build_config),
            source_uris: RwLock::new(loaded.source_uris.into_iter().collect()),
            jar_uris: RwLock::new(loaded.jar_uris.into_iter().collect()),
            documents: RwLock::new(loaded.documents),
            parses: RwLock::new(loaded.parses),
            state: RwLock::new(state),
            dirty: AtomicBool::new(false),
            needs_full_reload: AtomicBool::new(false),
            last_edit: Mutex::new(None),
            generation_tx: tx,
        }
    }

    /// A single-file project for a document that no configured build owns.
    pub fn detached(uri: &str, text: impl Into<String>, version: i32) -> Self {
        let text = text.into();
        let document = Document::new(text.clone(), version);
        let parse = DocumentParse::compute(&document);
        let smithy_file = SmithyFile::build(&parse.tree);
        let (model, events) = smithy_lsp_assembler::assemble([(uri.to_string(), text)]);

        let mut documents = FxHashMap::default();
        documents.insert(uri.to_string(), document);
        let mut parses = FxHashMap::default();
        parses.insert(uri.to_string(), parse.clone());
        let mut smithy_files = FxHashMap::default();
        smithy_files.insert(uri.to_string(), smithy_file);
        let mut smithy_file_versions = FxHashMap::default();
        smithy_file_versions.insert(uri.to_string(), parse.version);

        let (tx, _rx) = watch::channel(0u64);
        let reference_map = ReferenceMap::build(&smithy_files);
        let state = Arc::new(AssembledState {
            model,
            events,
            smithy_files,
            reference_map,
            smithy_file_versions,
            generation: 0,
        });

        let mut source_uris = FxHashSet::default();
        source_uris.insert(uri.to_string());

        Self {
            root: PathBuf::new(),
            kind: ProjectKind::Detached,
            loader: ProjectLoader::new(PathBuf::new()),
            build_config: RwLock::new(BuildConfig::default()),
            source_uris: RwLock::new(source_uris),
            jar_uris: RwLock::new(FxHashSet::default()),
            documents: RwLock::new(documents),
            parses: RwLock::new(parses),
            state: RwLock::new(state),
            dirty: AtomicBool::new(false),
            needs_full_reload: AtomicBool::new(false),
            last_edit: Mutex::new(None),
            generation_tx: tx,
        }
    }

    pub fn owns(&self, uri: &str) -> bool {
        self.documents.read().contains_key(uri)
            || self.source_uris.read().contains(uri)
            || self.jar_uris.read().contains(uri)
    }

    /// True if `uri` names a file under this project's root, whether or not
    /// it has been walked into the source set yet.
    pub fn root_contains(&self, uri: &str) -> bool {
        if self.root.as_os_str().is_empty() {
            return false;
        }
        match uri_to_fs_path(uri) {
            Some(path) => path.starts_with(&self.root),
            None => false,
        }
    }

    pub fn open(&self, uri: &str, text: impl Into<String>, version: i32) {
        self.documents.write().insert(uri.to_string(), Document::new(text, version));
        self.parses.write().remove(uri);
        self.source_uris.write().insert(uri.to_string());
        self.mark_dirty();
    }

    pub fn change(&self, uri: &str, changes: &[lsp_types::TextDocumentContentChangeEvent], version: i32) {
        let applied = {
            let mut docs = self.documents.write();
            match docs.get_mut(uri) {
                Some(doc) => {
                    doc.apply_changes(changes, version);
                    true
                }
                None => false,
            }
        };
        if !applied {
            return;
        }
        self.parses.write().remove(uri);
        self.mark_dirty();
    }

    /// If `uri` is a project source, the in-memory Document is kept (it
    /// will fall back to disk contents on the next full reload, not on the
    /// next debounced rebuild, since a rebuild only re-reads source text
    /// that's missing from the document map). Otherwise the buffer is
    /// dropped.
    pub fn close(&self, uri: &str) {
        if !self.source_uris.read().contains(uri) {
            self.documents.write().remove(uri);
            self.parses.write().remove(uri);
        }
    }

    pub fn save(&self, _uri: &str) {
        self.mark_dirty();
    }

    pub fn watched(&self, events: &[WatchedFileEvent]) {
        for event in events {
            if is_config_file(&event.path) {
                self.needs_full_reload.store(true, Ordering::SeqCst);
                continue;
            }
            let Ok(uri) = fs_path_to_uri(&event.path) else { continue };
            match event.kind {
                WatchedFileChangeKind::Created => {
                    self.source_uris.write().insert(uri);
                }
                WatchedFileChangeKind::Deleted => {
                    self.source_uris.write().remove(&uri);
                    self.documents.write().remove(&uri);
                    self.parses.write().remove(&uri);
                }
                WatchedFileChangeKind::Changed => {}
            }
        }
        self.mark_dirty();
    }

    /// Ensures the DocumentParse for `uri` reflects the current Document
    /// version, recomputing it lazily if stale.
    pub fn parse(&self, uri: &str) -> Option<DocumentParse> {
        {
            let parses = self.parses.read();
            let documents = self.documents.read();
            if let (Some(parse), Some(doc)) = (parses.get(uri), documents.get(uri)) {
                if parse.is_current_for(doc) {
                    return Some(parse.clone());
                }
            }
        }
        let documents = self.documents.read();
        let doc = documents.get(uri)?;
        let computed = DocumentParse::compute(doc);
        drop(documents);
        self.parses.write().insert(uri.to_string(), computed.clone());
        Some(computed)
    }

    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            documents: self.documents.read().clone(),
            parses: self.parses.read().clone(),
            state: self.state.read().clone(),
        }
    }

    pub fn generation(&self) -> u64 {
        *self.generation_tx.borrow()
    }

    pub fn generation_receiver(&self) -> watch::Receiver<u64> {
        self.generation_tx.subscribe()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Marks the project dirty and stamps the edit time the debounce window
    /// in `rebuild_if_due` measures against.
    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
        *self.last_edit.lock() = Some(Instant::now());
    }

    /// Runs a rebuild (or full reload) if one is due: a full reload takes
    /// priority whenever a config file changed, otherwise a debounced
    /// rebuild runs once `debounce` has elapsed since the last edit.
    /// Returns `true` if anything ran.
    pub fn rebuild_if_due(&self, debounce: Duration) -> bool {
        if self.needs_full_reload.swap(false, Ordering::SeqCst) {
            if let Err(err) = self.full_reload() {
                tracing::error!(root = %self.root.display(), error = %err, "full project reload failed");
            }
            return true;
        }
        if !self.dirty.load(Ordering::SeqCst) {
            return false;
        }
        let due = match *self.last_edit.lock() {
            Some(at) => at.elapsed() >= debounce,
            None => true,
        };
        if !due {
            return false;
        }
        self.rebuild();
        true
    }

    fn jar_paths(&self) -> Vec<PathBuf> {
        let config = self.build_config.read();
        let mut paths: Vec<PathBuf> = config.declared_local_jars().map(Path::to_path_buf).collect();
        paths.extend(resolve_maven(&config.maven, &self.loader.local_repository));
        paths
    }

    /// Re-parses dirty documents, re-runs the assembler over the full
    /// current file set (open documents override disk), and rebuilds only
    /// the SmithyFile indices whose DocumentParse version actually changed.
    pub fn rebuild(&self) {
        self.dirty.store(false, Ordering::SeqCst);

        let source_uris: Vec<String> = self.source_uris.read().iter().cloned().collect();

        {
            let documents = self.documents.read();
            let mut parses = self.parses.write();
            for uri in &source_uris {
                let Some(doc) = documents.get(uri) else { continue };
                let current = parses.get(uri).is_some_and(|p| p.is_current_for(doc));
                if !current {
                    parses.insert(uri.clone(), DocumentParse::compute(doc));
                }
            }
        }

        let mut assemble_input: Vec<(String, String)> = Vec::new();
        {
            let documents = self.documents.read();
            for uri in &source_uris {
                if let Some(doc) = documents.get(uri) {
                    assemble_input.push((uri.clone(), doc.text()));
                } else if let Some(path) = uri_to_fs_path(uri) {
                    if let Ok(text) = std::fs::read_to_string(&path) {
                        assemble_input.push((uri.clone(), text));
                    }
                }
            }
        }

        let mut jar_uris = FxHashSet::default();
        for jar_path in self.jar_paths() {
            match read_jar_sources(&jar_path) {
                Ok(entries) => {
                    for entry in entries {
                        jar_uris.insert(entry.uri.clone());
                        assemble_input.push((entry.uri, entry.text));
                    }
                }
                Err(err) => {
                    tracing::warn!(jar = %jar_path.display(), error = %err, "skipping unreadable dependency jar during rebuild");
                }
            }
        }
        *self.jar_uris.write() = jar_uris;

        let (model, events) = smithy_lsp_assembler::assemble(assemble_input);

        let previous = self.state.read().clone();
        let mut smithy_files = previous.smithy_files.clone();
        let mut smithy_file_versions = previous.smithy_file_versions.clone();
        {
            let parses = self.parses.read();
            for uri in &source_uris {
                match parses.get(uri) {
                    Some(parse) => {
                        let unchanged = smithy_file_versions.get(uri) == Some(&parse.version);
                        if !unchanged {
                            smithy_files.insert(uri.clone(), SmithyFile::build(&parse.tree));
                            smithy_file_versions.insert(uri.clone(), parse.version);
                        }
                    }
                    None => {
                        smithy_files.remove(uri);
                        smithy_file_versions.remove(uri);
                    }
                }
            }
        }
        let source_set: FxHashSet<String> = source_uris.into_iter().collect();
        smithy_files.retain(|uri, _| source_set.contains(uri));
        smithy_file_versions.retain(|uri, _| source_set.contains(uri));

        let reference_map = ReferenceMap::build(&smithy_files);
        let next_generation = previous.generation + 1;
        let new_state = Arc::new(AssembledState {
            model,
            events,
            smithy_files,
            reference_map,
            smithy_file_versions,
            generation: next_generation,
        });
        *self.state.write() = new_state;
        let _ = self.generation_tx.send(next_generation);
    }

    /// Reconstructs the project from scratch via its loader, preserving
    /// currently open documents by URI so in-progress edits survive a
    /// config change.
    pub fn full_reload(&self) -> Result<(), ProjectError> {
        let overrides: FxHashMap<String, (String, i32)> = {
            let documents = self.documents.read();
            documents.iter().map(|(uri, doc)| (uri.clone(), (doc.text(), doc.version()))).collect()
        };
        let loaded = self.loader.load(&self.root, &overrides)?;

        let smithy_file_versions = loaded
            .parses
            .iter()
            .map(|(uri, parse)| (uri.clone(), parse.version))
            .collect();
        let reference_map = ReferenceMap::build(&loaded.smithy_files);
        let next_generation = self.generation() + 1;
        let new_state = Arc::new(AssembledState {
            model: loaded.model,
            events: loaded.events,
            smithy_files: loaded.smithy_files,
            reference_map,
            smithy_file_versions,
            generation: next_generation,
        });

        *self.build_config.write() = loaded.build_config;
        *self.source_uris.write() = loaded.source_uris.into_iter().collect();
        *self.jar_uris.write() = loaded.jar_uris.into_iter().collect();
        *self.documents.write() = loaded.documents;
        *self.parses.write() = loaded.parses;
        *self.state.write() = new_state;
        self.dirty.store(false, Ordering::SeqCst);
        let _ = self.generation_tx.send(next_generation);
        Ok(())
    }
}

fn is_config_file(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name == smithy_lsp_build::SMITHY_BUILD_FILE || name == smithy_lsp_build::SMITHY_PROJECT_FILE,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn detached_project_assembles_single_file_model() {
        let project = Project::detached("file:///orphan.smithy", "namespace com.foo\nstructure A {}\n", 1);
        let snapshot = project.snapshot();
        assert!(snapshot.model().contains(&smithy_lsp_model::ShapeId::parse("com.foo#A").unwrap()));
        assert_eq!(snapshot.generation(), 0);
    }

    #[test]
    fn change_invalidates_parse_and_marks_dirty() {
        let project = Project::detached("file:///orphan.smithy", "namespace com.foo\n", 1);
        assert!(!project.is_dirty());
        project.change(
            "file:///orphan.smithy",
            &[lsp_types::TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: "namespace com.bar\n".to_string(),
            }],
            2,
        );
        assert!(project.is_dirty());
        let parse = project.parse("file:///orphan.smithy").expect("parse");
        assert_eq!(parse.version, 2);
    }

    #[test]
    fn rebuild_bumps_generation_and_clears_dirty() {
        let project = Project::detached("file:///orphan.smithy", "namespace com.foo\n", 1);
        project.change(
            "file:///orphan.smithy",
            &[lsp_types::TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: "namespace com.foo\nstructure A {}\n".to_string(),
            }],
            2,
        );
        project.rebuild();
        assert!(!project.is_dirty());
        assert_eq!(project.generation(), 1);
        let snapshot = project.snapshot();
        assert!(snapshot.model().contains(&smithy_lsp_model::ShapeId::parse("com.foo#A").unwrap()));
    }

    #[test]
    fn rebuild_if_due_waits_for_debounce_window() {
        let project = Project::detached("file:///orphan.smithy", "namespace com.foo\n", 1);
        project.change(
            "file:///orphan.smithy",
            &[lsp_types::TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: "namespace com.foo\nstructure A {}\n".to_string(),
            }],
            2,
        );
        assert!(!project.rebuild_if_due(Duration::from_secs(60)));
        assert!(project.rebuild_if_due(Duration::from_secs(0)));
        assert_eq!(project.generation(), 1);
    }

    #[test]
    fn loads_normal_project_from_fixture_tree() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("smithy-build.json"), r#"{"sources": ["model"]}"#).expect("write config");
        fs::create_dir_all(dir.path().join("model")).expect("mkdir");
        fs::write(
            dir.path().join("model/a.smithy"),
            "namespace com.foo\nstructure A {}\n",
        )
        .expect("write source");

        let project = Project::load(dir.path(), dir.path().join("repo")).expect("load");
        assert_eq!(project.kind, ProjectKind::Normal);
        let snapshot = project.snapshot();
        assert_eq!(snapshot.smithy_files().len(), 1);
    }

    #[test]
    fn watched_config_change_triggers_full_reload_on_next_due_check() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("smithy-build.json"), r#"{"sources": ["model"]}"#).expect("write config");
        fs::create_dir_all(dir.path().join("model")).expect("mkdir");
        fs::write(dir.path().join("model/a.smithy"), "namespace com.foo\nstructure A {}\n").expect("write source");

        let project = Project::load(dir.path(), dir.path().join("repo")).expect("load");
        fs::write(
            dir.path().join("model/a.smithy"),
            "namespace com.foo\nstructure A {}\nstructure B {}\n",
        )
        .expect("rewrite source");
        project.watched(&[WatchedFileEvent {
            path: dir.path().join("smithy-build.json"),
            kind: WatchedFileChangeKind::Changed,
        }]);
        assert!(project.rebuild_if_due(Duration::from_secs(0)));
        let snapshot = project.snapshot();
        assert!(snapshot.model().contains(&smithy_lsp_model::ShapeId::parse("com.foo#B").unwrap()));
    }
}
