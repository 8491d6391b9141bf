//! Rope-backed document buffers and their cached syntax parse.
//!
//! Mirrors the teacher's rope-based `Doc`/`apply_changes` pair, but leans on
//! `smithy-lsp-position`'s tested UTF-16 conversion helpers instead of
//! hand-rolling the line/column walk here.

use ropey::Rope;
use smithy_lsp_position::{LineStartsCache, WireRange};
use smithy_lsp_syntax::{tokenize, LexError, ParseError, Token, Tree};

/// An open or disk-backed document buffer, keyed by URI in the owning
/// [`crate::Project`].
#[derive(Debug, Clone)]
pub struct Document {
    rope: Rope,
    version: i32,
}

impl Document {
    pub fn new(text: impl AsRef<str>, version: i32) -> Self {
        Self {
            rope: Rope::from_str(text.as_ref()),
            version,
        }
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Applies one `didChange` notification's content changes in order.
    /// A change without a range replaces the whole document; a change with
    /// a range is applied as an incremental edit, translating the LSP
    /// UTF-16 position into a rope char index.
    pub fn apply_changes(&mut self, changes: &[lsp_types::TextDocumentContentChangeEvent], version: i32) {
        for change in changes {
            match change.range {
                Some(range) => {
                    let text = self.rope.to_string();
                    let cache = LineStartsCache::new(&text);
                    let wire_range: WireRange = range.into();
                    let span = wire_range.to_byte_offsets(&cache, &text);
                    let start_char = self.rope.byte_to_char(span.start.min(self.rope.len_bytes()));
                    let end_char = self.rope.byte_to_char(span.end.min(self.rope.len_bytes()));
                    if start_char <= end_char {
                        self.rope.remove(start_char..end_char);
                        self.rope.insert(start_char, &change.text);
                    }
                }
                None => {
                    self.rope = Rope::from_str(&change.text);
                }
            }
        }
        self.version = version;
    }
}

/// The cached parse of one document version: tokens, tree, and the
/// non-fatal errors from both phases. Recomputed lazily whenever a reader
/// observes a stale version.
#[derive(Debug, Clone)]
pub struct DocumentParse {
    pub version: i32,
    pub tokens: Vec<Token>,
    pub lex_errors: Vec<LexError>,
    pub tree: Tree,
    pub parse_errors: Vec<ParseError>,
}

impl DocumentParse {
    pub fn compute(document: &Document) -> Self {
        let text = document.text();
        let (tokens, lex_errors) = tokenize(&text);
        let (tree, parse_errors) = smithy_lsp_syntax::parse(&text);
        Self {
            version: document.version(),
            tokens,
            lex_errors,
            tree,
            parse_errors,
        }
    }

    pub fn is_current_for(&self, document: &Document) -> bool {
        self.version == document.version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsp_types::{Position, Range, TextDocumentContentChangeEvent};

    #[test]
    fn full_replace_change_has_no_range() {
        let mut doc = Document::new("namespace com.foo\n", 1);
        doc.apply_changes(
            &[TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: "namespace com.bar\n".to_string(),
            }],
            2,
        );
        assert_eq!(doc.text(), "namespace com.bar\n");
        assert_eq!(doc.version(), 2);
    }

    #[test]
    fn incremental_change_applies_at_byte_range() {
        let mut doc = Document::new("structure Foo {\n    bar: String\n}\n", 1);
        doc.apply_changes(
            &[TextDocumentContentChangeEvent {
                range: Some(Range::new(Position::new(1, 9), Position::new(1, 15))),
                range_length: None,
                text: "Integer".to_string(),
            }],
            2,
        );
        assert_eq!(doc.text(), "structure Foo {\n    bar: Integer\n}\n");
    }

    #[test]
    fn parse_cache_recomputes_on_version_change() {
        let doc = Document::new("namespace com.foo\n", 1);
        let parse = DocumentParse::compute(&doc);
        assert!(parse.is_current_for(&doc));

        let mut doc2 = doc.clone();
        doc2.apply_changes(
            &[TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: "namespace com.bar\n".to_string(),
            }],
            2,
        );
        assert!(!parse.is_current_for(&doc2));
    }
}
