//! Routes document URIs to the project that owns them, creating detached
//! single-file projects for orphans and fanning watched-file events out to
//! every project a path might belong to.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::ProjectError;
use crate::project::{Project, ProjectKind, WatchedFileEvent};

pub struct ProjectManager {
    local_repository: PathBuf,
    normal: RwLock<Vec<Arc<Project>>>,
    detached: RwLock<FxHashMap<String, Arc<Project>>>,
}

impl ProjectManager {
    pub fn new(local_repository: impl Into<PathBuf>) -> Self {
        Self {
            local_repository: local_repository.into(),
            normal: RwLock::new(Vec::new()),
            detached: RwLock::new(FxHashMap::default()),
        }
    }

    /// Loads and registers a Normal project rooted at `root`.
    pub fn load_project(&self, root: impl Into<PathBuf>) -> Result<Arc<Project>, ProjectError> {
        let project = Arc::new(Project::load(root, self.local_repository.clone())?);
        self.normal.write().push(project.clone());
        Ok(project)
    }

    pub fn unload_project(&self, root: &Path) {
        self.normal.write().retain(|p| p.root != root);
    }

    /// The project owning `uri`, if any Normal project already tracks it or
    /// has a root that contains it.
    pub fn project_for(&self, uri: &str) -> Option<Arc<Project>> {
        if let Some(project) = self.normal.read().iter().find(|p| p.owns(uri)).cloned() {
            return Some(project);
        }
        if let Some(project) = self.normal.read().iter().find(|p| p.root_contains(uri)).cloned() {
            return Some(project);
        }
        self.detached.read().get(uri).cloned()
    }

    /// Resolves the project owning `uri`, opening the document on it if
    /// found, or creating a single-file Detached project otherwise.
    pub fn open(&self, uri: &str, text: impl Into<String>, version: i32) -> Arc<Project> {
        let text = text.into();
        if let Some(project) = self.project_for(uri) {
            project.open(uri, text, version);
            return project;
        }
        let project = Arc::new(Project::detached(uri, text, version));
        self.detached.write().insert(uri.to_string(), project.clone());
        project
    }

    pub fn close(&self, uri: &str) {
        if let Some(project) = self.normal.read().iter().find(|p| p.owns(uri)) {
            project.close(uri);
        }
        self.detached.write().remove(uri);
    }

    pub fn all_normal(&self) -> Vec<Arc<Project>> {
        self.normal.read().clone()
    }

    pub fn all_detached(&self) -> Vec<Arc<Project>> {
        self.detached.read().values().cloned().collect()
    }

    /// Every project this manager currently tracks, Normal and Detached
    /// alike — the set the rebuild ticker needs to poll.
    pub fn all_projects(&self) -> Vec<Arc<Project>> {
        let mut all = self.all_normal();
        all.extend(self.all_detached());
        all
    }

    pub fn kind_of(&self, uri: &str) -> Option<ProjectKind> {
        self.project_for(uri).map(|p| p.kind)
    }

    /// Delivers watched-file events to every Normal project whose root
    /// contains the changed path; a path under more than one project's root
    /// (overlapping workspace folders) reaches each of them.
    pub fn dispatch_watched(&self, events: &[WatchedFileEvent]) {
        for project in self.normal.read().iter() {
            let relevant: Vec<WatchedFileEvent> = events
                .iter()
                .filter(|e| e.path.starts_with(&project.root))
                .cloned()
                .collect();
            if !relevant.is_empty() {
                project.watched(&relevant);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::WatchedFileChangeKind;
    use std::fs;

    #[test]
    fn open_unknown_uri_creates_detached_project() {
        let manager = ProjectManager::new("/tmp/repo");
        let project = manager.open("file:///orphan.smithy", "namespace com.foo\n", 1);
        assert_eq!(project.kind, ProjectKind::Detached);
        assert!(manager.project_for("file:///orphan.smithy").is_some());
    }

    #[test]
    fn close_removes_detached_project() {
        let manager = ProjectManager::new("/tmp/repo");
        manager.open("file:///orphan.smithy", "namespace com.foo\n", 1);
        manager.close("file:///orphan.smithy");
        assert!(manager.project_for("file:///orphan.smithy").is_none());
    }

    #[test]
    fn open_under_normal_project_root_is_routed_there() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("smithy-build.json"), r#"{"sources": ["model"]}"#).expect("write config");
        fs::create_dir_all(dir.path().join("model")).expect("mkdir");
        fs::write(dir.path().join("model/a.smithy"), "namespace com.foo\nstructure A {}\n").expect("write source");

        let manager = ProjectManager::new(dir.path().join("repo"));
        let project = manager.load_project(dir.path()).expect("load");

        let new_file_path = dir.path().join("model/b.smithy");
        fs::write(&new_file_path, "namespace com.foo\nstructure B {}\n").expect("write new source");
        let uri = smithy_lsp_uri::fs_path_to_uri(&new_file_path).expect("uri");

        let opened = manager.open(&uri, "namespace com.foo\nstructure B {}\n", 1);
        assert!(Arc::ptr_eq(&opened, &project));
    }

    #[test]
    fn watched_event_only_reaches_projects_whose_root_contains_it() {
        let dir_a = tempfile::tempdir().expect("tempdir a");
        let dir_b = tempfile::tempdir().expect("tempdir b");
        fs::create_dir_all(dir_a.path().join("model")).expect("mkdir a");
        fs::create_dir_all(dir_b.path().join("model")).expect("mkdir b");
        fs::write(dir_a.path().join("smithy-build.json"), r#"{"sources": ["model"]}"#).expect("config a");
        fs::write(dir_b.path().join("smithy-build.json"), r#"{"sources": ["model"]}"#).expect("config b");

        let manager = ProjectManager::new("/tmp/repo");
        let project_a = manager.load_project(dir_a.path()).expect("load a");
        let _project_b = manager.load_project(dir_b.path()).expect("load b");

        manager.dispatch_watched(&[WatchedFileEvent {
            path: dir_a.path().join("model/new.smithy"),
            kind: WatchedFileChangeKind::Created,
        }]);
        assert!(project_a.is_dirty());
    }
}
