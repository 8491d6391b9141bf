//! References (§4.10): the shape at the cursor resolves to every entry
//! the cross-file reference map has recorded for it.

use lsp_types::Location;
use smithy_lsp_position::{LineStartsCache, WireLocation, WireRange};
use smithy_lsp_project::ProjectSnapshot;

use crate::dispatcher::CursorTarget;

pub fn references_for(snapshot: &ProjectSnapshot, target: &CursorTarget, include_declaration: bool) -> Vec<Location> {
    let shape_id = match target {
        CursorTarget::Reference(reference) => &reference.shape_id,
        CursorTarget::Declaration { shape_id, .. } => shape_id,
        CursorTarget::None => return Vec::new(),
    };

    let mut locations: Vec<Location> = snapshot
        .references_to(shape_id)
        .iter()
        .filter_map(|(uri, span)| {
            let text = snapshot.documents.get(uri)?.text();
            let cache = LineStartsCache::new(&text);
            let range = WireRange::from_byte_offsets(&cache, &text, *span);
            WireLocation { uri: uri.clone(), range }.into_lsp()
        })
        .collect();

    if include_declaration {
        if let Some((uri, file)) = snapshot.smithy_files().iter().find(|(_, f)| f.declarations.contains_key(shape_id)) {
            if let (Some(span), Some(doc)) = (file.declarations.get(shape_id), snapshot.documents.get(uri)) {
                let text = doc.text();
                let cache = LineStartsCache::new(&text);
                let range = WireRange::from_byte_offsets(&cache, &text, *span);
                if let Some(location) = (WireLocation { uri: uri.clone(), range }).into_lsp() {
                    locations.push(location);
                }
            }
        }
    }

    locations
}
