use crate::{ByteSpan, LineStartsCache};

/// A zero-based (line, UTF-16 column) position, as used on the LSP wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WirePosition {
    pub line: u32,
    pub character: u32,
}

impl WirePosition {
    pub fn from_byte_offset(cache: &LineStartsCache, text: &str, offset: usize) -> Self {
        let (line, col) = cache.offset_to_position(text, offset);
        Self {
            line: line as u32,
            character: col as u32,
        }
    }

    pub fn to_byte_offset(&self, cache: &LineStartsCache, text: &str) -> usize {
        cache.position_to_offset(text, self.line as usize, self.character as usize)
    }
}

/// A [start, end) range expressed as wire positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireRange {
    pub start: WirePosition,
    pub end: WirePosition,
}

impl WireRange {
    pub fn from_byte_offsets(cache: &LineStartsCache, text: &str, span: ByteSpan) -> Self {
        Self {
            start: WirePosition::from_byte_offset(cache, text, span.start),
            end: WirePosition::from_byte_offset(cache, text, span.end),
        }
    }

    pub fn to_byte_offsets(&self, cache: &LineStartsCache, text: &str) -> ByteSpan {
        ByteSpan::new(
            self.start.to_byte_offset(cache, text),
            self.end.to_byte_offset(cache, text),
        )
    }

    pub fn empty(pos: WirePosition) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn whole_document(cache: &LineStartsCache, text: &str) -> Self {
        Self::from_byte_offsets(cache, text, ByteSpan::whole(text.len()))
    }
}

/// A range paired with the document URI it points into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireLocation {
    pub uri: String,
    pub range: WireRange,
}

impl From<WirePosition> for lsp_types::Position {
    fn from(pos: WirePosition) -> Self {
        lsp_types::Position::new(pos.line, pos.character)
    }
}

impl From<lsp_types::Position> for WirePosition {
    fn from(pos: lsp_types::Position) -> Self {
        WirePosition {
            line: pos.line,
            character: pos.character,
        }
    }
}

impl From<WireRange> for lsp_types::Range {
    fn from(range: WireRange) -> Self {
        lsp_types::Range::new(range.start.into(), range.end.into())
    }
}

impl From<lsp_types::Range> for WireRange {
    fn from(range: lsp_types::Range) -> Self {
        WireRange {
            start: range.start.into(),
            end: range.end.into(),
        }
    }
}

impl WireLocation {
    /// Converts to an `lsp_types::Location`, returning `None` if `uri` is not
    /// a syntactically valid URI.
    pub fn into_lsp(self) -> Option<lsp_types::Location> {
        let uri: lsp_types::Uri = self.uri.parse().ok()?;
        Some(lsp_types::Location::new(uri, self.range.into()))
    }
}

impl From<lsp_types::Location> for WireLocation {
    fn from(loc: lsp_types::Location) -> Self {
        WireLocation {
            uri: loc.uri.to_string(),
            range: loc.range.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_roundtrip_through_lsp_types() {
        let wp = WirePosition {
            line: 3,
            character: 7,
        };
        let lsp_pos: lsp_types::Position = wp.into();
        let back: WirePosition = lsp_pos.into();
        assert_eq!(wp, back);
    }

    #[test]
    fn range_from_byte_offsets() {
        let text = "structure Foo {\n  bar: String\n}\n";
        let cache = LineStartsCache::new(text);
        let span = ByteSpan::new(19, 22);
        let range = WireRange::from_byte_offsets(&cache, text, span);
        assert_eq!(range.start.line, 1);
        assert_eq!(range.start.character, 2);
        assert_eq!(range.end.line, 1);
        assert_eq!(range.end.character, 5);

        let back = range.to_byte_offsets(&cache, text);
        assert_eq!(back, span);
    }

    #[test]
    fn whole_document_spans_everything() {
        let text = "a\nb\n";
        let cache = LineStartsCache::new(text);
        let range = WireRange::whole_document(&cache, text);
        assert_eq!(range.start, WirePosition { line: 0, character: 0 });
        assert_eq!(range.end.line, 2);
    }
}
