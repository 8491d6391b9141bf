//! Reads `.smithy` entries out of a resolved dependency jar.
//!
//! Jars are treated as read-only sources: their entries participate in
//! model assembly and navigation but are never edited or written back.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use smithy_lsp_uri::JarUri;
use zip::ZipArchive;

use crate::error::ProjectError;

/// One `.smithy` entry read out of a dependency jar, addressed by its
/// `smithyjar:` URI.
pub struct JarSource {
    pub uri: String,
    pub text: String,
}

/// Opens `jar_path` and reads every `.smithy` entry it contains. Entries
/// that aren't valid UTF-8 are skipped rather than failing the whole jar.
pub fn read_jar_sources(jar_path: &Path) -> Result<Vec<JarSource>, ProjectError> {
    let file = File::open(jar_path).map_err(|source| ProjectError::Io {
        path: jar_path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(file).map_err(|err| ProjectError::DependencyResolutionFailure {
        path: jar_path.to_path_buf(),
        reason: err.to_string(),
    })?;

    let mut sources = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|err| ProjectError::DependencyResolutionFailure {
                path: jar_path.to_path_buf(),
                reason: err.to_string(),
            })?;
        if entry.is_dir() || !entry.name().ends_with(".smithy") {
            continue;
        }
        let name = entry.name().to_string();
        let mut text = String::new();
        if entry.read_to_string(&mut text).is_err() {
            continue;
        }
        let uri = JarUri::new(jar_path.to_path_buf(), name).to_smithyjar_uri();
        sources.push(JarSource { uri, text });
    }
    Ok(sources)
}

/// Reads the text of a single jar entry, for the `smithy/jarFile` request
/// and for opening a `smithyjar:` definition target.
pub fn read_jar_entry(jar: &JarUri) -> Result<String, ProjectError> {
    let file = File::open(&jar.jar_path).map_err(|source| ProjectError::Io {
        path: jar.jar_path.clone(),
        source,
    })?;
    let mut archive = ZipArchive::new(file).map_err(|err| ProjectError::DependencyResolutionFailure {
        path: jar.jar_path.clone(),
        reason: err.to_string(),
    })?;
    let mut entry = archive
        .by_name(&jar.entry)
        .map_err(|err| ProjectError::DependencyResolutionFailure {
            path: jar.jar_path.clone(),
            reason: err.to_string(),
        })?;
    let mut text = String::new();
    entry.read_to_string(&mut text).map_err(|source| ProjectError::Io {
        path: jar.jar_path.clone(),
        source,
    })?;
    Ok(text)
}
