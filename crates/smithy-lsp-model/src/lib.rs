//! The assembled Smithy model: the result of merging every source file and
//! dependency jar in a project into one validated collection of shapes.
//!
//! This crate owns only the data side of that process — `Shape`, `Model`,
//! `ValidationEvent`. The process itself (walking syntax trees, resolving
//! references, producing events) lives in `smithy-lsp-assembler`, which this
//! crate's types are built to be produced by, mirroring how the real Smithy
//! model assembler is a validator library sitting downstream of the parser.

use rustc_hash::FxHashMap;

pub use smithy_lsp_position::ByteSpan;
pub use smithy_lsp_syntax::ShapeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleType {
    Blob,
    Boolean,
    Document,
    String,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    BigInteger,
    BigDecimal,
    Timestamp,
}

/// A shape's definition, tagged by kind rather than modeled as a class
/// hierarchy. Member/property lists carry resolved absolute `ShapeId`
/// targets; the core never needs to walk inheritance to answer
/// "what does this reference point at".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Simple(SimpleType),
    List { member: ShapeId },
    Map { key: ShapeId, value: ShapeId },
    Set { member: ShapeId },
    Structure { members: Vec<(String, ShapeId)> },
    Union { members: Vec<(String, ShapeId)> },
    Enum { members: Vec<String> },
    IntEnum { members: Vec<String> },
    Service {
        operations: Vec<ShapeId>,
        resources: Vec<ShapeId>,
        errors: Vec<ShapeId>,
    },
    Operation {
        input: Option<ShapeId>,
        output: Option<ShapeId>,
        errors: Vec<ShapeId>,
    },
    Resource {
        identifiers: Vec<(String, ShapeId)>,
        operations: Vec<ShapeId>,
        resources: Vec<ShapeId>,
    },
}

impl Shape {
    /// All shape IDs this shape's definition directly points at (member
    /// targets, operation IO, resource identifiers, service/resource
    /// collections). Used to validate that every outgoing edge lands on a
    /// known shape.
    pub fn outgoing_refs(&self) -> Vec<&ShapeId> {
        match self {
            Shape::Simple(_) | Shape::Enum { .. } | Shape::IntEnum { .. } => Vec::new(),
            Shape::List { member } | Shape::Set { member } => vec![member],
            Shape::Map { key, value } => vec![key, value],
            Shape::Structure { members } | Shape::Union { members } => {
                members.iter().map(|(_, id)| id).collect()
            }
            Shape::Service {
                operations,
                resources,
                errors,
            } => operations.iter().chain(resources).chain(errors).collect(),
            Shape::Operation {
                input,
                output,
                errors,
            } => input.iter().chain(output).chain(errors).collect(),
            Shape::Resource {
                identifiers,
                operations,
                resources,
            } => identifiers
                .iter()
                .map(|(_, id)| id)
                .chain(operations)
                .chain(resources)
                .collect(),
        }
    }
}

/// A shape's entry in the assembled model: its definition, the (resolved)
/// traits applied to it, and the file it was declared in.
///
/// `span` is only populated for shapes that have no entry of their own in
/// that file's `SmithyFile.declarations` — namely shapes synthesized from
/// an inline `input := { ... }` / `output := { ... }` operation body, which
/// exist in the model but never appear as a `ShapeDecl` in the source text.
/// Top-level shapes leave it `None`; their declaration range is already
/// covered by the `SmithyFile` index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeEntry {
    pub shape: Shape,
    pub traits: Vec<ShapeId>,
    pub source_uri: String,
    pub span: Option<ByteSpan>,
}

/// The fully assembled collection of shapes for a project: every source
/// file plus every dependency jar, merged. Treated as an opaque,
/// snapshot-immutable handle by everything above this crate.
#[derive(Debug, Clone, Default)]
pub struct Model {
    shapes: FxHashMap<ShapeId, ShapeEntry>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ShapeId, entry: ShapeEntry) {
        self.shapes.insert(id, entry);
    }

    pub fn get(&self, id: &ShapeId) -> Option<&ShapeEntry> {
        self.shapes.get(id)
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.shapes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shape_ids(&self) -> impl Iterator<Item = &ShapeId> {
        self.shapes.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ShapeId, &ShapeEntry)> {
        self.shapes.iter()
    }

    pub fn shapes_in(&self, uri: &str) -> impl Iterator<Item = (&ShapeId, &ShapeEntry)> {
        self.shapes.iter().filter(move |(_, e)| e.source_uri == uri)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Note,
    Warning,
    Danger,
    Error,
}

/// A finding from model assembly: an unresolved reference, a conflicting
/// shape name, an illegal trait value, etc. Mirrors the event stream the
/// real Smithy model assembler emits alongside a (possibly partial) model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationEvent {
    pub severity: Severity,
    pub shape_id: Option<ShapeId>,
    pub event_id: String,
    pub message: String,
    pub source_uri: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ShapeId {
        ShapeId::parse(s).expect("valid shape id")
    }

    #[test]
    fn model_insert_and_lookup() {
        let mut model = Model::new();
        let sid = id("com.foo#Bar");
        model.insert(
            sid.clone(),
            ShapeEntry {
                shape: Shape::Structure { members: vec![] },
                traits: vec![],
                source_uri: "file:///a.smithy".to_string(),
                span: None,
            },
        );
        assert!(model.contains(&sid));
        assert_eq!(model.len(), 1);
        assert!(!model.contains(&id("com.foo#Other")));
    }

    #[test]
    fn outgoing_refs_cover_every_shape_kind() {
        let member_target = id("com.foo#Baz");
        let structure = Shape::Structure {
            members: vec![("m".to_string(), member_target.clone())],
        };
        assert_eq!(structure.outgoing_refs(), vec![&member_target]);

        let simple = Shape::Simple(SimpleType::String);
        assert!(simple.outgoing_refs().is_empty());

        let op = Shape::Operation {
            input: Some(id("com.foo#In")),
            output: None,
            errors: vec![id("com.foo#E1")],
        };
        assert_eq!(op.outgoing_refs().len(), 2);
    }

    #[test]
    fn shapes_in_filters_by_source_file() {
        let mut model = Model::new();
        model.insert(
            id("a#A"),
            ShapeEntry {
                shape: Shape::Structure { members: vec![] },
                traits: vec![],
                source_uri: "file:///a.smithy".to_string(),
                span: None,
            },
        );
        model.insert(
            id("a#B"),
            ShapeEntry {
                shape: Shape::Structure { members: vec![] },
                traits: vec![],
                source_uri: "file:///b.smithy".to_string(),
                span: None,
            },
        );
        assert_eq!(model.shapes_in("file:///a.smithy").count(), 1);
    }
}
