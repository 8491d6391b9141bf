//! URI handling for the Smithy language server.
//!
//! Two URI families are in play:
//!
//! - `file://` URIs for ordinary workspace and build-config files.
//! - `smithyjar:<jar-path>!/<entry>` URIs for shapes that live inside a
//!   resolved Maven dependency jar. These are never written back to disk;
//!   they exist only so the client can open a read-only view of the shape
//!   source and so `textDocument/definition` can point at it.
//!
//! `smithyjar:` is this server's own scheme, chosen to stay distinct from
//! the `jar:file:...!/...` form some JVM tooling uses for the same idea;
//! [`JarUri::to_java_style`] produces that form when a consumer expects it.

use std::path::{Path, PathBuf};

use url::Url;

mod jar;
pub use jar::{JarUri, JarUriError};

/// Convert a `file://` URI to a filesystem path.
///
/// Accepts both a full `file://` authority-less URI and a bare `file:` prefix,
/// percent-decoding the path. Returns `None` for any other scheme.
pub fn uri_to_fs_path(uri: &str) -> Option<PathBuf> {
    let url = Url::parse(uri).ok()?;
    if url.scheme() != "file" {
        return None;
    }
    url.to_file_path().ok()
}

/// Convert a filesystem path to a `file://` URI.
///
/// Relative paths are resolved against the current working directory.
/// Always emits the three-slash, no-authority form (`file:///...`).
pub fn fs_path_to_uri<P: AsRef<Path>>(path: P) -> Result<String, String> {
    let path = path.as_ref();
    let abs_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| format!("failed to get current directory: {e}"))?
            .join(path)
    };

    Url::from_file_path(&abs_path)
        .map(|url| url.to_string())
        .map_err(|_| format!("failed to convert path to URI: {}", abs_path.display()))
}

/// Normalize a URI to a consistent key for map lookups.
///
/// Lowercases Windows drive letters (`file:///C:/foo` -> `file:///c:/foo`)
/// so the same file is addressed identically regardless of how the client
/// cased it. Non-file and unparsable URIs are returned unchanged.
pub fn uri_key(uri: &str) -> String {
    if let Ok(u) = Url::parse(uri) {
        let s = u.as_str().to_string();
        if let Some(rest) = s.strip_prefix("file:///")
            && rest.len() > 1
            && rest.as_bytes()[1] == b':'
            && rest.as_bytes()[0].is_ascii_alphabetic()
        {
            return format!("file:///{}{}", rest[0..1].to_ascii_lowercase(), &rest[1..]);
        }
        s
    } else {
        uri.to_string()
    }
}

/// True if `uri` addresses a local file (`file://` scheme).
pub fn is_file_uri(uri: &str) -> bool {
    uri.starts_with("file://") || uri.starts_with("file:")
}

/// True if `uri` addresses a shape inside a dependency jar.
pub fn is_jar_uri(uri: &str) -> bool {
    uri.starts_with("smithyjar:") || uri.starts_with("jar:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_file_uri() {
        let original = "/tmp/example/model.smithy";
        let uri = fs_path_to_uri(original).expect("path to uri");
        assert!(uri.starts_with("file:///"));
        let path = uri_to_fs_path(&uri).expect("uri to path");
        assert!(path.ends_with("model.smithy"));
    }

    #[test]
    fn non_file_uri_rejected() {
        assert!(uri_to_fs_path("https://example.com/model.smithy").is_none());
        assert!(uri_to_fs_path("smithyjar:/repo/a.jar!/a/b.smithy").is_none());
    }

    #[test]
    fn uri_key_normalizes_drive_letter() {
        assert_eq!(uri_key("file:///C:/Users/model.smithy"), "file:///c:/Users/model.smithy");
        assert_eq!(uri_key("file:///tmp/model.smithy"), "file:///tmp/model.smithy");
    }

    #[test]
    fn scheme_classification() {
        assert!(is_file_uri("file:///tmp/a.smithy"));
        assert!(!is_file_uri("smithyjar:/repo/a.jar!/a/b.smithy"));
        assert!(is_jar_uri("smithyjar:/repo/a.jar!/a/b.smithy"));
        assert!(!is_jar_uri("file:///tmp/a.smithy"));
    }
}
