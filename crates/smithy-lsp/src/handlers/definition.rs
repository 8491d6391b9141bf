//! Definition (§4.10): the shape at the cursor resolves to its
//! declaration range, whether that declaration lives in an open document
//! or a read-only dependency jar entry.

use lsp_types::Location;
use smithy_lsp_model::ShapeId;
use smithy_lsp_position::{LineStartsCache, WireLocation, WireRange};
use smithy_lsp_project::ProjectSnapshot;
use smithy_lsp_uri::JarUri;

use crate::dispatcher::CursorTarget;

/// Resolves `target`'s shape id to a `Location`. Returns `None` when the
/// cursor isn't over a navigable shape reference, or when the declaring
/// file's text isn't available to compute a range from (§7: an
/// unresolvable target yields an empty result, not an error).
pub fn definition_for(snapshot: &ProjectSnapshot, target: &CursorTarget) -> Option<Location> {
    let shape_id = shape_id_of(target)?;
    location_of_declaration(snapshot, shape_id)
}

fn shape_id_of(target: &CursorTarget) -> Option<&ShapeId> {
    match target {
        CursorTarget::Reference(reference) => Some(&reference.shape_id),
        CursorTarget::Declaration { shape_id, .. } => Some(shape_id),
        CursorTarget::None => None,
    }
}

/// Finds the declaring URI and span for `shape_id` across every file this
/// project knows about (source files and jar entries alike) and converts
/// it to an LSP `Location`, reading jar-resident text to compute the
/// range when the declaration lives in a dependency.
fn location_of_declaration(snapshot: &ProjectSnapshot, shape_id: &ShapeId) -> Option<Location> {
    let (uri, span) = snapshot
        .smithy_files()
        .iter()
        .find_map(|(uri, file)| file.declarations.get(shape_id).map(|span| (uri.clone(), *span)))?;

    let text = if let Some(doc) = snapshot.documents.get(&uri) {
        doc.text()
    } else if smithy_lsp_uri::is_jar_uri(&uri) {
        let jar = JarUri::parse(&uri).ok()?;
        smithy_lsp_project::read_jar_entry(&jar).ok()?
    } else {
        return None;
    };

    let cache = LineStartsCache::new(&text);
    let range = WireRange::from_byte_offsets(&cache, &text, span);
    WireLocation { uri, range }.into_lsp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use smithy_lsp_project::{Project, Reference, ReferenceRole};

    #[test]
    fn resolves_declaration_in_same_file() {
        let project = Project::detached(
            "file:///a.smithy",
            "namespace com.foo\nstructure A { b: B }\nstructure B {}\n",
            1,
        );
        let snapshot = project.snapshot();
        let shape_id = ShapeId::parse("com.foo#B").expect("shape id");
        let target = CursorTarget::Reference(Reference {
            span: smithy_lsp_position::ByteSpan::new(0, 0),
            shape_id,
            role: ReferenceRole::MemberTarget,
        });
        let location = definition_for(&snapshot, &target).expect("location");
        assert_eq!(location.uri.to_string(), "file:///a.smithy");
    }

    #[test]
    fn unresolved_target_yields_none() {
        let project = Project::detached("file:///a.smithy", "namespace com.foo\n", 1);
        let snapshot = project.snapshot();
        assert!(definition_for(&snapshot, &CursorTarget::None).is_none());
    }
}
