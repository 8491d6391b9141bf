//! Loads a project's build configuration from `smithy-build.json` and
//! `.smithy-project.json`, and resolves Maven coordinates to local jar
//! paths.
//!
//! Both config files are optional; a missing file is treated as an empty
//! contribution to the merged [`BuildConfig`], not an error. A file that
//! exists but fails to parse as JSON is reported through
//! [`BuildLoaderError::ConfigParseError`] so the caller can surface it as a
//! workspace diagnostic rather than silently dropping the project's config.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const SMITHY_BUILD_FILE: &str = "smithy-build.json";
pub const SMITHY_PROJECT_FILE: &str = ".smithy-project.json";

#[derive(Debug, thiserror::Error)]
pub enum BuildLoaderError {
    #[error("failed to parse {path}: {source}")]
    ConfigParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One Maven coordinate in `group:artifact:version` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl MavenCoordinate {
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.splitn(3, ':');
        let group_id = parts.next()?.to_string();
        let artifact_id = parts.next()?.to_string();
        let version = parts.next()?.to_string();
        if group_id.is_empty() || artifact_id.is_empty() || version.is_empty() {
            return None;
        }
        Some(Self {
            group_id,
            artifact_id,
            version,
        })
    }

    /// The path a coordinate occupies inside a Maven local repository root,
    /// e.g. `software/amazon/smithy/smithy-model/1.45.0/smithy-model-1.45.0.jar`.
    pub fn repository_relative_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in self.group_id.split('.') {
            path.push(segment);
        }
        path.push(&self.artifact_id);
        path.push(&self.version);
        path.push(format!("{}-{}.jar", self.artifact_id, self.version));
        path
    }
}

/// Maven coordinates and repositories declared under a build config's
/// `maven` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MavenConfig {
    pub dependencies: Vec<MavenCoordinate>,
    pub repositories: Vec<String>,
}

/// A non-Maven local jar dependency declared in `.smithy-project.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDependency {
    pub name: String,
    pub path: PathBuf,
}

/// The merged result of loading `smithy-build.json` and
/// `.smithy-project.json` from a project root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildConfig {
    pub source_roots: Vec<PathBuf>,
    pub imports: Vec<PathBuf>,
    pub maven: MavenConfig,
    pub local_dependencies: Vec<LocalDependency>,
}

impl BuildConfig {
    /// Every jar this config names directly (not counting Maven
    /// dependencies, which require [`resolve_maven`]).
    pub fn declared_local_jars(&self) -> impl Iterator<Item = &Path> {
        self.local_dependencies.iter().map(|d| d.path.as_path())
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SmithyBuildJson {
    sources: Vec<String>,
    imports: Vec<String>,
    maven: Option<MavenSection>,
}

impl Default for SmithyBuildJson {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            imports: Vec::new(),
            maven: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct MavenSection {
    dependencies: Vec<String>,
    repositories: Vec<MavenRepository>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct MavenRepository {
    url: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SmithyProjectJson {
    sources: Vec<String>,
    imports: Vec<String>,
    dependencies: Vec<ProjectDependency>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ProjectDependency {
    name: String,
    path: String,
}

/// Loads and merges `smithy-build.json` and `.smithy-project.json` under
/// `root`. Neither file is required; each missing file simply contributes
/// nothing to the result.
pub fn load(root: &Path) -> Result<BuildConfig, BuildLoaderError> {
    let mut config = BuildConfig::default();

    if let Some(build) = read_json::<SmithyBuildJson>(&root.join(SMITHY_BUILD_FILE))? {
        config.source_roots.extend(build.sources.into_iter().map(|s| root.join(s)));
        config.imports.extend(build.imports.into_iter().map(|s| root.join(s)));
        if let Some(maven) = build.maven {
            config.maven.dependencies.extend(
                maven.dependencies.iter().filter_map(|c| MavenCoordinate::parse(c)),
            );
            config.maven.repositories.extend(maven.repositories.into_iter().map(|r| r.url));
        }
    }

    if let Some(project) = read_json::<SmithyProjectJson>(&root.join(SMITHY_PROJECT_FILE))? {
        config.source_roots.extend(project.sources.into_iter().map(|s| root.join(s)));
        config.imports.extend(project.imports.into_iter().map(|s| root.join(s)));
        config.local_dependencies.extend(project.dependencies.into_iter().map(|d| LocalDependency {
            name: d.name,
            path: root.join(d.path),
        }));
    }

    Ok(config)
}

/// Returns `Ok(None)` if `path` does not exist, `Ok(Some(_))` on a
/// successful parse, and an error for any other I/O failure or malformed
/// JSON.
fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, BuildLoaderError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(BuildLoaderError::Io {
                path: path.to_path_buf(),
                source: err,
            })
        }
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| BuildLoaderError::ConfigParseError {
            path: path.to_path_buf(),
            source,
        })
}

/// Resolves Maven coordinates against a local repository root, mirroring
/// the on-disk layout a real Maven resolver would have already populated
/// (`<repo>/<group/path>/<artifact>/<version>/<artifact>-<version>.jar`).
/// Caching and network fetch are the resolver's concern, not the core's;
/// this is a pure function from config to file list.
pub fn resolve_maven(maven: &MavenConfig, local_repository: &Path) -> Vec<PathBuf> {
    maven
        .dependencies
        .iter()
        .map(|coord| local_repository.join(coord.repository_relative_path()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_config_files_produce_empty_build() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load(dir.path()).expect("load");
        assert!(config.source_roots.is_empty());
        assert!(config.maven.dependencies.is_empty());
    }

    #[test]
    fn reads_smithy_build_json_sources_and_maven() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(SMITHY_BUILD_FILE),
            r#"{
                "version": "1.0",
                "sources": ["model"],
                "maven": {
                    "dependencies": ["software.amazon.smithy:smithy-model:1.45.0"],
                    "repositories": [{"url": "https://repo.maven.apache.org/maven2"}]
                }
            }"#,
        )
        .unwrap();

        let config = load(dir.path()).expect("load");
        assert_eq!(config.source_roots, vec![dir.path().join("model")]);
        assert_eq!(config.maven.dependencies.len(), 1);
        assert_eq!(config.maven.dependencies[0].artifact_id, "smithy-model");
        assert_eq!(config.maven.repositories, vec!["https://repo.maven.apache.org/maven2".to_string()]);
    }

    #[test]
    fn reads_smithy_project_json_local_dependencies() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(SMITHY_PROJECT_FILE),
            r#"{
                "sources": ["src/main/smithy"],
                "dependencies": [{"name": "vendor", "path": "lib/vendor.jar"}]
            }"#,
        )
        .unwrap();

        let config = load(dir.path()).expect("load");
        assert_eq!(config.source_roots, vec![dir.path().join("src/main/smithy")]);
        assert_eq!(config.local_dependencies.len(), 1);
        assert_eq!(config.local_dependencies[0].name, "vendor");
        assert_eq!(config.local_dependencies[0].path, dir.path().join("lib/vendor.jar"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(SMITHY_BUILD_FILE), "{ not json").unwrap();
        let err = load(dir.path()).unwrap_err();
        assert!(matches!(err, BuildLoaderError::ConfigParseError { .. }));
    }

    #[test]
    fn maven_coordinate_parses_and_builds_repo_path() {
        let coord = MavenCoordinate::parse("software.amazon.smithy:smithy-model:1.45.0").unwrap();
        assert_eq!(coord.group_id, "software.amazon.smithy");
        assert_eq!(
            coord.repository_relative_path(),
            PathBuf::from("software/amazon/smithy/smithy-model/1.45.0/smithy-model-1.45.0.jar")
        );
        assert!(MavenCoordinate::parse("not-a-coordinate").is_none());
    }

    #[test]
    fn resolve_maven_joins_against_local_repository() {
        let maven = MavenConfig {
            dependencies: vec![MavenCoordinate::parse("a.b:c:1.0").unwrap()],
            repositories: vec![],
        };
        let resolved = resolve_maven(&maven, Path::new("/home/user/.m2/repository"));
        assert_eq!(
            resolved,
            vec![PathBuf::from("/home/user/.m2/repository/a/b/c/1.0/c-1.0.jar")]
        );
    }
}
