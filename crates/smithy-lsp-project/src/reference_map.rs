//! Cross-file reference map: every `ShapeId` to the full list of `(URI,
//! byte range)` occurrences that name it, merged from each file's
//! [`SmithyFile`] reference list. Rebuilt alongside the assembled model so
//! `textDocument/references` and jar-aware `textDocument/definition` never
//! have to walk every open file at request time.
//!
//! An arena of `(ShapeId, Location)` records keyed by ID, per the core's
//! design note that cyclic model references are resolved by value rather
//! than by owning direct pointers between files.

use rustc_hash::FxHashMap;
use smithy_lsp_position::ByteSpan;
use smithy_lsp_syntax::ShapeId;

use crate::smithy_file::SmithyFile;

#[derive(Debug, Clone, Default)]
pub struct ReferenceMap {
    by_shape: FxHashMap<ShapeId, Vec<(String, ByteSpan)>>,
}

const EMPTY: &[(String, ByteSpan)] = &[];

impl ReferenceMap {
    pub fn build(smithy_files: &FxHashMap<String, SmithyFile>) -> Self {
        let mut by_shape: FxHashMap<ShapeId, Vec<(String, ByteSpan)>> = FxHashMap::default();
        for (uri, file) in smithy_files {
            for reference in &file.references {
                by_shape.entry(reference.shape_id.clone()).or_default().push((uri.clone(), reference.span));
            }
        }
        for locations in by_shape.values_mut() {
            locations.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.start.cmp(&b.1.start)));
        }
        Self { by_shape }
    }

    pub fn references_to(&self, id: &ShapeId) -> &[(String, ByteSpan)] {
        self.by_shape.get(id).map(Vec::as_slice).unwrap_or(EMPTY)
    }

    pub fn len(&self) -> usize {
        self.by_shape.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_shape.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smithy_lsp_syntax::parse;

    #[test]
    fn merges_references_across_files() {
        let mut files = FxHashMap::default();
        let (tree_a, _) = parse("namespace com.foo\nuse com.bar#Baz\nstructure A { b: Baz }\n");
        files.insert("file:///a.smithy".to_string(), SmithyFile::build(&tree_a));
        let (tree_b, _) = parse("namespace com.bar\nstructure Baz {}\nstructure C { b: Baz }\n");
        files.insert("file:///b.smithy".to_string(), SmithyFile::build(&tree_b));

        let map = ReferenceMap::build(&files);
        let id = ShapeId::parse("com.bar#Baz").unwrap();
        let refs = map.references_to(&id);
        assert_eq!(refs.len(), 2);
        assert!(refs.iter().any(|(uri, _)| uri == "file:///a.smithy"));
        assert!(refs.iter().any(|(uri, _)| uri == "file:///b.smithy"));
    }

    #[test]
    fn unknown_shape_has_no_references() {
        let map = ReferenceMap::build(&FxHashMap::default());
        assert!(map.references_to(&ShapeId::parse("com.foo#Nope").unwrap()).is_empty());
    }
}
