//! `smithy/selector` (§6, §4.10 "Selector run"): runs a selector
//! expression against the assembled model and returns matching shape IDs
//! with their declaration locations.
//!
//! §1 scopes the real Smithy selector grammar (attribute predicates,
//! relationship traversal, `:not`/`:is`/…) out of this core entirely —
//! "the downstream Smithy model validator and selector engine" is an
//! external collaborator. What lives here is just enough to give the
//! request somewhere to land: a shape-kind keyword, a bare `*`, or an
//! exact shape ID, matched against the model this server already holds.
//! A client pointed at the real selector engine gets the rest.

use lsp_types::Location;
use smithy_lsp_model::{Shape, ShapeId};
use smithy_lsp_position::{LineStartsCache, WireLocation, WireRange};
use smithy_lsp_project::ProjectSnapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    Empty,
}

impl std::fmt::Display for SelectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectorError::Empty => write!(f, "empty selector expression"),
        }
    }
}

/// One shape ID matched by a selector run, paired with the location of its
/// declaration when the owning file's text is available (e.g. not for a
/// jar-resident shape whose source couldn't be read).
pub struct SelectorMatch {
    pub shape_id: ShapeId,
    pub location: Option<Location>,
}

pub fn run_selector(snapshot: &ProjectSnapshot, expression: &str) -> Result<Vec<SelectorMatch>, SelectorError> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(SelectorError::Empty);
    }

    let matches: Vec<&ShapeId> = if expression == "*" {
        snapshot.model().shape_ids().collect()
    } else if let Some(kind) = shape_kind_keyword(expression) {
        snapshot
            .model()
            .iter()
            .filter(|(_, entry)| shape_matches_kind(&entry.shape, kind))
            .map(|(id, _)| id)
            .collect()
    } else if let Ok(id) = ShapeId::parse(expression) {
        snapshot.model().shape_ids().filter(|candidate| **candidate == id).collect()
    } else {
        Vec::new()
    };

    Ok(matches
        .into_iter()
        .map(|shape_id| SelectorMatch {
            shape_id: shape_id.clone(),
            location: location_of(snapshot, shape_id),
        })
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KindKeyword {
    Simple,
    List,
    Map,
    Set,
    Structure,
    Union,
    Enum,
    IntEnum,
    Service,
    Operation,
    Resource,
}

fn shape_kind_keyword(expression: &str) -> Option<KindKeyword> {
    Some(match expression {
        "simpleType" => KindKeyword::Simple,
        "list" => KindKeyword::List,
        "map" => KindKeyword::Map,
        "set" => KindKeyword::Set,
        "structure" => KindKeyword::Structure,
        "union" => KindKeyword::Union,
        "enum" => KindKeyword::Enum,
        "intEnum" => KindKeyword::IntEnum,
        "service" => KindKeyword::Service,
        "operation" => KindKeyword::Operation,
        "resource" => KindKeyword::Resource,
        _ => return None,
    })
}

fn shape_matches_kind(shape: &Shape, kind: KindKeyword) -> bool {
    matches!(
        (shape, kind),
        (Shape::Simple(_), KindKeyword::Simple)
            | (Shape::List { .. }, KindKeyword::List)
            | (Shape::Map { .. }, KindKeyword::Map)
            | (Shape::Set { .. }, KindKeyword::Set)
            | (Shape::Structure { .. }, KindKeyword::Structure)
            | (Shape::Union { .. }, KindKeyword::Union)
            | (Shape::Enum { .. }, KindKeyword::Enum)
            | (Shape::IntEnum { .. }, KindKeyword::IntEnum)
            | (Shape::Service { .. }, KindKeyword::Service)
            | (Shape::Operation { .. }, KindKeyword::Operation)
            | (Shape::Resource { .. }, KindKeyword::Resource)
    )
}

fn location_of(snapshot: &ProjectSnapshot, shape_id: &ShapeId) -> Option<Location> {
    let (uri, span) = snapshot
        .smithy_files()
        .iter()
        .find_map(|(uri, file)| file.declarations.get(shape_id).map(|span| (uri.clone(), *span)))?;
    let text = snapshot.documents.get(&uri)?.text();
    let cache = LineStartsCache::new(&text);
    let range = WireRange::from_byte_offsets(&cache, &text, span);
    WireLocation { uri, range }.into_lsp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use smithy_lsp_project::Project;

    #[test]
    fn wildcard_matches_every_shape() {
        let project = Project::detached("file:///a.smithy", "namespace com.foo\nstructure A {}\nstructure B {}\n", 1);
        let snapshot = project.snapshot();
        let matches = run_selector(&snapshot, "*").expect("selector");
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn kind_keyword_filters_by_shape_variant() {
        let project = Project::detached(
            "file:///a.smithy",
            "namespace com.foo\nstructure A {}\nunion U { a: A }\n",
            1,
        );
        let snapshot = project.snapshot();
        let matches = run_selector(&snapshot, "structure").expect("selector");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].shape_id.name, "A");
    }

    #[test]
    fn exact_shape_id_matches_at_most_one() {
        let project = Project::detached("file:///a.smithy", "namespace com.foo\nstructure A {}\n", 1);
        let snapshot = project.snapshot();
        let matches = run_selector(&snapshot, "com.foo#A").expect("selector");
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn empty_expression_is_rejected() {
        let project = Project::detached("file:///a.smithy", "namespace com.foo\n", 1);
        let snapshot = project.snapshot();
        assert_eq!(run_selector(&snapshot, "  "), Err(SelectorError::Empty));
    }
}
