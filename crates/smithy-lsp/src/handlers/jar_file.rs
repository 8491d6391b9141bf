//! `smithy/jarFile` (§6): resolves the read-only text behind a `smithyjar:`
//! or `jar:file:...!/...` URI so the client can open a virtual document for
//! a dependency-resident shape returned from `textDocument/definition`.

use smithy_lsp_project::read_jar_entry;
use smithy_lsp_uri::JarUri;

use crate::error::LspError;

pub fn jar_file_contents(uri: &str) -> Result<String, LspError> {
    let jar = JarUri::parse(uri).map_err(|err| LspError::UriEncoding(err.to_string()))?;
    read_jar_entry(&jar).map_err(LspError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    #[test]
    fn reads_an_entry_out_of_a_jar() {
        let dir = tempfile::tempdir().expect("tempdir");
        let jar_path = dir.path().join("dep.jar");
        let file = std::fs::File::create(&jar_path).expect("create jar");
        let mut writer = zip::ZipWriter::new(file);
        writer.start_file("META-INF/smithy/a.smithy", SimpleFileOptions::default()).expect("start file");
        writer.write_all(b"namespace com.bar\nstructure HasMyBool {}\n").expect("write entry");
        writer.finish().expect("finish");

        let uri = format!("smithyjar:{}!/META-INF/smithy/a.smithy", jar_path.display());
        let text = jar_file_contents(&uri).expect("jar file contents");
        assert!(text.contains("HasMyBool"));
    }

    #[test]
    fn rejects_a_non_jar_uri() {
        assert!(jar_file_contents("file:///tmp/a.smithy").is_err());
    }
}
