use ropey::Rope;

/// Caches line-start byte offsets for a document so that byte-offset to
/// line/UTF-16-column conversion doesn't require rescanning the whole text.
///
/// Rebuilt whenever a document's full text changes; Smithy documents are
/// re-parsed from scratch on every edit (see `DocumentParse`), so this cache
/// is rebuilt at the same cadence rather than incrementally patched.
#[derive(Debug, Clone)]
pub struct LineStartsCache {
    /// Byte offset of the start of each line. `line_starts[0]` is always 0.
    line_starts: Vec<usize>,
    len: usize,
}

impl LineStartsCache {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            len: text.len(),
        }
    }

    pub fn from_rope(rope: &Rope) -> Self {
        let mut line_starts = vec![0];
        let mut offset = 0;
        for chunk in rope.chunks() {
            for byte in chunk.bytes() {
                offset += 1;
                if byte == b'\n' {
                    line_starts.push(offset);
                }
            }
        }
        Self {
            line_starts,
            len: rope.len_bytes(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Returns the 0-based line number containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line - 1,
        }
    }

    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Converts a byte offset into a (line, UTF-16 column) pair.
    ///
    /// `text` must be the same text this cache was built from.
    pub fn offset_to_position(&self, text: &str, offset: usize) -> (usize, usize) {
        let line = self.line_of(offset.min(self.len));
        let line_start = self.line_starts[line];
        let col_text = &text[line_start..offset.min(self.len)];
        let col = col_text.chars().map(|c| c.len_utf16()).sum();
        (line, col)
    }

    /// Converts a (line, UTF-16 column) pair back into a byte offset.
    pub fn position_to_offset(&self, text: &str, line: usize, utf16_col: usize) -> usize {
        let Some(line_start) = self.line_start(line) else {
            return self.len;
        };
        let line_end = self
            .line_start(line + 1)
            .unwrap_or(self.len);
        let line_text = &text[line_start..line_end];

        let mut remaining = utf16_col;
        let mut byte_offset = 0;
        for ch in line_text.chars() {
            if remaining == 0 {
                break;
            }
            let units = ch.len_utf16();
            if units > remaining {
                break;
            }
            remaining -= units;
            byte_offset += ch.len_utf8();
        }
        line_start + byte_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line() {
        let cache = LineStartsCache::new("hello world");
        assert_eq!(cache.line_count(), 1);
        assert_eq!(cache.line_of(5), 0);
    }

    #[test]
    fn multiple_lines() {
        let text = "namespace com.example\n\nstructure Foo {}\n";
        let cache = LineStartsCache::new(text);
        assert_eq!(cache.line_count(), 4);
        assert_eq!(cache.line_of(0), 0);
        assert_eq!(cache.line_of(23), 1);
        assert_eq!(cache.line_of(24), 2);
    }

    #[test]
    fn offset_to_position_ascii() {
        let text = "structure Foo {\n    bar: String\n}\n";
        let cache = LineStartsCache::new(text);
        let (line, col) = cache.offset_to_position(text, 21);
        assert_eq!(line, 1);
        assert_eq!(col, 4);
    }

    #[test]
    fn roundtrip_ascii() {
        let text = "view Foo {\n  member: Bar\n}\n";
        let cache = LineStartsCache::new(text);
        for offset in [0, 5, 11, 20, text.len()] {
            let (line, col) = cache.offset_to_position(text, offset);
            let back = cache.position_to_offset(text, line, col);
            assert_eq!(back, offset, "roundtrip failed for offset {offset}");
        }
    }

    #[test]
    fn utf16_surrogate_pairs() {
        // U+1F600 (grinning face) takes 2 UTF-16 code units but 4 UTF-8 bytes.
        let text = "// 😀 comment\nnext";
        let cache = LineStartsCache::new(text);
        let emoji_end = 3 + "😀".len();
        let (line, col) = cache.offset_to_position(text, emoji_end);
        assert_eq!(line, 0);
        assert_eq!(col, 5); // "// " (3 utf16 units) + surrogate pair (2 units)
        let back = cache.position_to_offset(text, line, col);
        assert_eq!(back, emoji_end);
    }

    #[test]
    fn from_rope_matches_str() {
        let text = "a\nbb\nccc\n";
        let rope = Rope::from_str(text);
        let from_str = LineStartsCache::new(text);
        let from_rope = LineStartsCache::from_rope(&rope);
        assert_eq!(from_str.line_starts, from_rope.line_starts);
    }
}
