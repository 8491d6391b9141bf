//! Discovers a project's sources and dependency jars, drives the initial
//! parse, runs the model assembler, and builds the per-file navigation
//! indices. The entry point that turns a root path into a [`crate::Project`].

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use smithy_lsp_build::{resolve_maven, BuildConfig};
use smithy_lsp_model::{Model, ValidationEvent};
use smithy_lsp_uri::fs_path_to_uri;
use walkdir::WalkDir;

use crate::document::{Document, DocumentParse};
use crate::error::ProjectError;
use crate::jar::read_jar_sources;
use crate::smithy_file::SmithyFile;

/// Resolves Maven dependencies against a local repository root when loading
/// projects. Stateless: every field it carries is pure configuration.
#[derive(Debug, Clone)]
pub struct ProjectLoader {
    pub local_repository: PathBuf,
}

impl ProjectLoader {
    pub fn new(local_repository: impl Into<PathBuf>) -> Self {
        Self {
            local_repository: local_repository.into(),
        }
    }

    /// Loads the project rooted at `root`. `overrides` supplies unsaved
    /// editor buffers that should win over whatever's on disk, keyed by
    /// `file://` URI.
    pub fn load(&self, root: &Path, overrides: &FxHashMap<String, (String, i32)>) -> Result<LoadedProject, ProjectError> {
        let build_config = smithy_lsp_build::load(root)?;

        let source_paths = enumerate_smithy_files(&build_config);

        let mut jar_paths: Vec<PathBuf> = build_config.declared_local_jars().map(|p| p.to_path_buf()).collect();
        jar_paths.extend(resolve_maven(&build_config.maven, &self.local_repository));

        let mut documents = FxHashMap::default();
        let mut source_uris = Vec::new();
        for path in &source_paths {
            let uri = fs_path_to_uri(path).map_err(|_| ProjectError::UnknownUri(path.display().to_string()))?;
            let (text, version) = match overrides.get(&uri) {
                Some((text, version)) => (text.clone(), *version),
                None => {
                    let text = std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
                        path: path.clone(),
                        source,
                    })?;
                    (text, 0)
                }
            };
            documents.insert(uri.clone(), Document::new(text, version));
            source_uris.push(uri);
        }

        let mut jar_uris = Vec::new();
        let mut jar_contents: FxHashMap<String, String> = FxHashMap::default();
        for jar_path in &jar_paths {
            match read_jar_sources(jar_path) {
                Ok(entries) => {
                    for entry in entries {
                        jar_uris.push(entry.uri.clone());
                        jar_contents.insert(entry.uri, entry.text);
                    }
                }
                Err(err) => {
                    tracing::warn!(jar = %jar_path.display(), error = %err, "skipping unreadable dependency jar");
                }
            }
        }

        let mut parses = FxHashMap::default();
        for uri in &source_uris {
            if let Some(doc) = documents.get(uri) {
                parses.insert(uri.clone(), DocumentParse::compute(doc));
            }
        }

        let mut assemble_input: Vec<(String, String)> = source_uris
            .iter()
            .filter_map(|uri| documents.get(uri).map(|doc| (uri.clone(), doc.text())))
            .collect();
        assemble_input.extend(jar_contents);
        let (model, events) = smithy_lsp_assembler::assemble(assemble_input);

        let mut smithy_files = FxHashMap::default();
        for uri in &source_uris {
            if let Some(parse) = parses.get(uri) {
                smithy_files.insert(uri.clone(), SmithyFile::build(&parse.tree));
            }
        }

        Ok(LoadedProject {
            build_config,
            source_uris,
            jar_uris,
            documents,
            parses,
            smithy_files,
            model,
            events,
        })
    }
}

fn enumerate_smithy_files(build_config: &BuildConfig) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for root in &build_config.source_roots {
        for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
            if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "smithy") {
                paths.push(entry.path().to_path_buf());
            }
        }
    }
    for import in &build_config.imports {
        if import.is_dir() {
            for entry in WalkDir::new(import).into_iter().filter_map(Result::ok) {
                if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "smithy") {
                    paths.push(entry.path().to_path_buf());
                }
            }
        } else if import.extension().is_some_and(|ext| ext == "smithy") {
            paths.push(import.clone());
        }
    }
    paths.sort();
    paths.dedup();
    paths
}

/// Everything a fresh project load produces, handed to [`crate::Project`]
/// to become its initial (or reloaded) state.
pub struct LoadedProject {
    pub build_config: BuildConfig,
    pub source_uris: Vec<String>,
    pub jar_uris: Vec<String>,
    pub documents: FxHashMap<String, Document>,
    pub parses: FxHashMap<String, DocumentParse>,
    pub smithy_files: FxHashMap<String, SmithyFile>,
    pub model: Model,
    pub events: Vec<ValidationEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_sources_under_configured_root_and_assembles_model() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("smithy-build.json"),
            r#"{"version": "1.0", "sources": ["model"]}"#,
        )
        .expect("write build config");
        fs::create_dir_all(dir.path().join("model")).expect("mkdir");
        fs::write(
            dir.path().join("model/a.smithy"),
            "namespace com.foo\nstructure A { b: B }\nstructure B {}\n",
        )
        .expect("write source");

        let loader = ProjectLoader::new(dir.path().join("repo"));
        let loaded = loader.load(dir.path(), &FxHashMap::default()).expect("load");

        assert_eq!(loaded.source_uris.len(), 1);
        assert_eq!(loaded.smithy_files.len(), 1);
        assert!(loaded.events.is_empty(), "unexpected events: {:?}", loaded.events);
        assert!(loaded.model.contains(&smithy_lsp_model::ShapeId::parse("com.foo#A").unwrap()));
    }

    #[test]
    fn open_document_override_wins_over_disk_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("smithy-build.json"), r#"{"sources": ["model"]}"#).expect("write config");
        fs::create_dir_all(dir.path().join("model")).expect("mkdir");
        let path = dir.path().join("model/a.smithy");
        fs::write(&path, "namespace com.foo\nstructure A {}\n").expect("write source");
        let uri = fs_path_to_uri(&path).expect("uri");

        let mut overrides = FxHashMap::default();
        overrides.insert(uri.clone(), ("namespace com.foo\nstructure A {}\nstructure B {}\n".to_string(), 7));

        let loader = ProjectLoader::new(dir.path().join("repo"));
        let loaded = loader.load(dir.path(), &overrides).expect("load");
        assert_eq!(loaded.documents.get(&uri).expect("doc").version(), 7);
        assert!(loaded.model.contains(&smithy_lsp_model::ShapeId::parse("com.foo#B").unwrap()));
    }
}
