//! Document and workspace symbols (§4.10): declarations from one
//! `SmithyFile`, or across every `SmithyFile` the project's snapshot
//! carries, as typed `lsp_types` symbol records.
//!
//! A `SmithyFile`'s declarations only cover shapes with their own
//! `ShapeDecl` in the source text; shapes synthesized from an inline
//! `input := { ... }` / `output := { ... }` operation body (S3) exist only
//! in the assembled model, so document symbols merges those in too.

use lsp_types::{DocumentSymbol, SymbolInformation, SymbolKind};
use smithy_lsp_model::ShapeId;
use smithy_lsp_position::{ByteSpan, LineStartsCache, WireRange};
use smithy_lsp_project::ProjectSnapshot;

use crate::config::ServerConfig;

pub fn document_symbols(snapshot: &ProjectSnapshot, uri: &str) -> Vec<DocumentSymbol> {
    let Some(file) = snapshot.smithy_files().get(uri) else {
        return Vec::new();
    };
    let Some(text) = snapshot.documents.get(uri).map(|doc| doc.text()) else {
        return Vec::new();
    };
    let cache = LineStartsCache::new(&text);

    let declared = file.declarations.iter().map(|(id, span)| (id.clone(), *span));
    let synthesized = snapshot.model().shapes_in(uri).filter_map(|(id, entry)| {
        if file.declarations.contains_key(id) {
            return None;
        }
        entry.span.map(|span| (id.clone(), span))
    });

    let mut symbols: Vec<DocumentSymbol> = declared
        .chain(synthesized)
        .map(|(shape_id, span): (ShapeId, ByteSpan)| {
            let range = WireRange::from_byte_offsets(&cache, &text, span).into();
            #[allow(deprecated)]
            DocumentSymbol {
                name: shape_id.name.clone(),
                detail: Some(shape_id.to_string()),
                kind: SymbolKind::STRUCT,
                tags: None,
                deprecated: None,
                range,
                selection_range: range,
                children: None,
            }
        })
        .collect();
    symbols.sort_by(|a, b| a.range.start.cmp(&b.range.start));
    symbols
}

/// Matches `query` against every declared shape id across all of the
/// project's files, case-insensitively and as a substring, capped at
/// `config.workspace_symbol_limit` (§10 "workspace-symbol result cap").
pub fn workspace_symbols(snapshot: &ProjectSnapshot, query: &str, config: &ServerConfig) -> Vec<SymbolInformation> {
    let query_lower = query.to_lowercase();
    let mut results = Vec::new();

    for (uri, file) in snapshot.smithy_files() {
        let Some(text) = snapshot.documents.get(uri).map(|doc| doc.text()) else {
            continue;
        };
        let cache = LineStartsCache::new(&text);
        for (shape_id, span) in &file.declarations {
            if !query.is_empty() && !matches_query(shape_id, &query_lower) {
                continue;
            }
            let Some(location) = (smithy_lsp_position::WireLocation {
                uri: uri.clone(),
                range: WireRange::from_byte_offsets(&cache, &text, *span),
            })
            .into_lsp() else {
                continue;
            };
            #[allow(deprecated)]
            results.push(SymbolInformation {
                name: shape_id.name.clone(),
                kind: SymbolKind::STRUCT,
                tags: None,
                deprecated: None,
                location,
                container_name: shape_id.namespace.clone(),
            });
            if results.len() >= config.workspace_symbol_limit {
                return results;
            }
        }
    }

    results
}

fn matches_query(shape_id: &ShapeId, query_lower: &str) -> bool {
    shape_id.to_string().to_lowercase().contains(query_lower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use smithy_lsp_project::Project;

    #[test]
    fn document_symbols_list_every_declaration() {
        let project = Project::detached(
            "file:///a.smithy",
            "namespace com.foo\nstructure A {}\nstructure B {}\n",
            1,
        );
        let snapshot = project.snapshot();
        let symbols = document_symbols(&snapshot, "file:///a.smithy");
        assert_eq!(symbols.len(), 2);
    }

    #[test]
    fn document_symbols_include_synthesized_inline_io_shapes() {
        let project = Project::detached(
            "file:///a.smithy",
            "$version: \"2\"\nnamespace com.foo\noperation Op {\n    input := { foo: String }\n    output := { bar: String }\n}\n",
            1,
        );
        let snapshot = project.snapshot();
        let symbols = document_symbols(&snapshot, "file:///a.smithy");
        let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"Op"));
        assert!(names.contains(&"OpInput"));
        assert!(names.contains(&"OpOutput"));
    }

    #[test]
    fn workspace_symbols_filters_by_query() {
        let project = Project::detached(
            "file:///a.smithy",
            "namespace com.foo\nstructure Alpha {}\nstructure Beta {}\n",
            1,
        );
        let snapshot = project.snapshot();
        let config = ServerConfig::default();
        let symbols = workspace_symbols(&snapshot, "alpha", &config);
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "Alpha");
    }
}
