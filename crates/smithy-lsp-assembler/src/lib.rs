//! Assembles a [`smithy_lsp_model::Model`] from a set of in-memory source
//! files, standing in for the downstream Smithy model validator the real
//! server would delegate to (see the core spec's "external collaborators").
//!
//! Takes file contents keyed by URI — including unsaved editor buffers, so
//! the model always reflects open documents rather than what's on disk —
//! and always returns a best-effort `Model` plus a list of
//! [`ValidationEvent`]s; it never fails the way a parser can't fail.

use std::collections::HashMap;

use rustc_hash::FxHashMap;
use smithy_lsp_model::{Model, Severity, Shape, ShapeEntry, ShapeId, SimpleType, ValidationEvent};
use smithy_lsp_syntax::{self as syntax, Ident, Member, ShapeDecl, ShapeKind, StatementKind, Tree};

/// Per-file context needed to resolve relative shape-id text into absolute
/// `ShapeId`s: the file's own namespace plus its `use` imports.
struct FileScope {
    namespace: String,
    imports: HashMap<String, ShapeId>,
}

/// Simple-type keywords the grammar lets a member target reference bare
/// (`b: String`), which always mean the prelude shape of that name rather
/// than anything in the declaring file's own namespace.
const PRELUDE_SIMPLE_NAMES: &[&str] = &[
    "Blob",
    "Boolean",
    "Document",
    "String",
    "Byte",
    "Short",
    "Integer",
    "Long",
    "Float",
    "Double",
    "BigInteger",
    "BigDecimal",
    "Timestamp",
];

const PRELUDE_NAMESPACE: &str = "smithy.api";

/// Resolves a shape-id reference the way the real prelude-aware resolver
/// does: absolute references pass through, `use` imports take priority,
/// then a bare name matching a prelude simple type resolves into
/// `smithy.api` rather than the local namespace, and everything else
/// resolves against the declaring file's namespace.
fn resolve_ref(text: &str, scope: &FileScope) -> Option<ShapeId> {
    let parsed = ShapeId::parse(text).ok()?;
    if parsed.is_absolute() {
        return Some(parsed);
    }
    if let Some(imported) = scope.imports.get(&parsed.name) {
        return Some(parsed.combine_import(imported));
    }
    if parsed.member.is_none() && PRELUDE_SIMPLE_NAMES.contains(&parsed.name.as_str()) {
        return Some(ShapeId {
            namespace: Some(PRELUDE_NAMESPACE.to_string()),
            name: parsed.name,
            member: None,
        });
    }
    Some(parsed.resolve(&scope.namespace))
}

/// The prelude shapes every model implicitly carries, seeded up front so
/// unqualified references like `String` resolve without each file having
/// to `use smithy.api#String`.
fn prelude_shapes() -> Vec<(ShapeId, ShapeEntry)> {
    let simple = [
        ("Blob", SimpleType::Blob),
        ("Boolean", SimpleType::Boolean),
        ("Document", SimpleType::Document),
        ("String", SimpleType::String),
        ("Byte", SimpleType::Byte),
        ("Short", SimpleType::Short),
        ("Integer", SimpleType::Integer),
        ("Long", SimpleType::Long),
        ("Float", SimpleType::Float),
        ("Double", SimpleType::Double),
        ("BigInteger", SimpleType::BigInteger),
        ("BigDecimal", SimpleType::BigDecimal),
        ("Timestamp", SimpleType::Timestamp),
    ];
    simple
        .into_iter()
        .map(|(name, ty)| {
            let id = ShapeId {
                namespace: Some(PRELUDE_NAMESPACE.to_string()),
                name: name.to_string(),
                member: None,
            };
            let entry = ShapeEntry {
                shape: Shape::Simple(ty),
                traits: Vec::new(),
                source_uri: PRELUDE_NAMESPACE.to_string(),
                span: None,
            };
            (id, entry)
        })
        .collect()
}

/// Assembles a model from `files` (URI -> full text). Every file is parsed
/// with the same resilient parser the project's own `SmithyFile` index
/// uses; parse errors surface through that channel, not here — this
/// function only reports *semantic* problems (unresolved references,
/// conflicting shape names).
pub fn assemble<I, S>(files: I) -> (Model, Vec<ValidationEvent>)
where
    I: IntoIterator<Item = (String, S)>,
    S: AsRef<str>,
{
    let parsed: Vec<(String, Tree)> = files
        .into_iter()
        .map(|(uri, text)| {
            let (tree, _parse_errors) = syntax::parse(text.as_ref());
            (uri, tree)
        })
        .collect();

    let mut scopes: FxHashMap<String, FileScope> = FxHashMap::default();
    for (uri, tree) in &parsed {
        let Some(namespace_ident) = tree.namespace() else {
            continue;
        };
        let namespace = namespace_ident.text.to_string();
        let mut imports = HashMap::new();
        for use_ident in tree.uses() {
            if let Ok(id) = ShapeId::parse(&use_ident.text) {
                imports.insert(id.name.clone(), id);
            }
        }
        scopes.insert(uri.clone(), FileScope { namespace, imports });
    }

    let mut model = Model::new();
    for (id, entry) in prelude_shapes() {
        model.insert(id, entry);
    }
    let mut events = Vec::new();

    for (uri, tree) in &parsed {
        let Some(scope) = scopes.get(uri) else {
            continue;
        };
        for decl in tree.shape_decls() {
            for (name, owned) in flatten_inline_shapes(decl) {
                insert_decl(&name, &owned, scope, uri, &mut model, &mut events);
            }
        }
    }

    // Second pass: every outgoing reference (member targets, operation IO,
    // resource identifiers, apply targets, mixins) must resolve to a known
    // shape, or we emit an UnresolvedShape event for it.
    for (uri, tree) in &parsed {
        let Some(scope) = scopes.get(uri) else {
            continue;
        };
        for decl in tree.shape_decls() {
            for mixin in &decl.mixins {
                check_resolves(mixin.text.as_ref(), scope, &model, uri, &mut events);
            }
        }
        for (id, entry) in model.shapes_in(uri) {
            if entry.source_uri != *uri {
                continue;
            }
            for target in entry.shape.outgoing_refs() {
                if !model.contains(target) {
                    events.push(ValidationEvent {
                        severity: Severity::Error,
                        shape_id: Some(id.clone()),
                        event_id: "UnresolvedShape".to_string(),
                        message: format!("`{id}` targets unknown shape `{target}`"),
                        source_uri: Some(uri.clone()),
                    });
                }
            }
        }
        for stmt in &tree.statements {
            if let StatementKind::Apply { target, .. } = &stmt.kind {
                check_resolves(target.text.as_ref(), scope, &model, uri, &mut events);
            }
        }
    }

    (model, events)
}

/// A top-level shape declaration also synthesizes a shape for each inline
/// `input := { ... }` / `output := { ... }` operation body (IDL v2), the
/// same way the real assembler names those `{Operation}Input`/`Output`.
/// Returns the top-level declaration first, then any synthesized ones.
fn flatten_inline_shapes(decl: &ShapeDecl) -> Vec<(Ident, ShapeDecl)> {
    let mut out = vec![(decl.id.clone(), decl.clone())];
    if decl.shape_kind == ShapeKind::Operation {
        for m in &decl.members {
            let suffix = match m.name.text.as_ref() {
                "input" => "Input",
                "output" => "Output",
                _ => continue,
            };
            if let Some(inline) = &m.inline_shape {
                let synth_name = format!("{}{}", decl.id.text, suffix);
                out.push((Ident::new(synth_name, m.span), (**inline).clone()));
            }
        }
    }
    out
}

fn insert_decl(
    name: &Ident,
    decl: &ShapeDecl,
    scope: &FileScope,
    uri: &str,
    model: &mut Model,
    events: &mut Vec<ValidationEvent>,
) {
    let Ok(local) = ShapeId::parse(&name.text) else {
        return;
    };
    let id = local.resolve(&scope.namespace);
    if model.contains(&id) {
        events.push(ValidationEvent {
            severity: Severity::Error,
            shape_id: Some(id.clone()),
            event_id: "ConflictingShapeName".to_string(),
            message: format!("shape `{id}` is defined in more than one file"),
            source_uri: Some(uri.to_string()),
        });
        return;
    }
    let shape = build_shape(decl, scope);
    let traits = decl
        .traits
        .iter()
        .filter_map(|t| resolve_ref(&t.name.text, scope))
        .collect();
    model.insert(
        id,
        ShapeEntry {
            shape,
            traits,
            source_uri: uri.to_string(),
            span: Some(decl.span),
        },
    );
}

fn check_resolves(
    text: &str,
    scope: &FileScope,
    model: &Model,
    uri: &str,
    events: &mut Vec<ValidationEvent>,
) {
    let Some(id) = resolve_ref(text, scope) else {
        return;
    };
    if !model.contains(&id.shape_only()) {
        events.push(ValidationEvent {
            severity: Severity::Error,
            shape_id: Some(id.clone()),
            event_id: "UnresolvedShape".to_string(),
            message: format!("reference to unknown shape `{id}`"),
            source_uri: Some(uri.to_string()),
        });
    }
}

fn resolve_member(m: &Member, scope: &FileScope) -> Option<ShapeId> {
    let target = m.target.as_ref()?;
    resolve_ref(&target.text, scope)
}

fn resolve_list(members: &[syntax::Ident], scope: &FileScope) -> Vec<ShapeId> {
    members
        .iter()
        .filter_map(|i| resolve_ref(&i.text, scope))
        .collect()
}

fn build_shape(decl: &ShapeDecl, scope: &FileScope) -> Shape {
    match decl.shape_kind {
        ShapeKind::Simple(simple) => Shape::Simple(to_simple_type(simple)),
        ShapeKind::List => Shape::List {
            member: single_member_target(decl, scope),
        },
        ShapeKind::Set => Shape::Set {
            member: single_member_target(decl, scope),
        },
        ShapeKind::Map => {
            let key = decl
                .members
                .iter()
                .find(|m| m.name.text.as_ref() == "key")
                .and_then(|m| resolve_member(m, scope))
                .unwrap_or_else(default_string_shape);
            let value = decl
                .members
                .iter()
                .find(|m| m.name.text.as_ref() == "value")
                .and_then(|m| resolve_member(m, scope))
                .unwrap_or_else(default_string_shape);
            Shape::Map { key, value }
        }
        ShapeKind::Structure => Shape::Structure {
            members: named_member_targets(decl, scope),
        },
        ShapeKind::Union => Shape::Union {
            members: named_member_targets(decl, scope),
        },
        ShapeKind::Enum => Shape::Enum {
            members: decl.members.iter().map(|m| m.name.text.to_string()).collect(),
        },
        ShapeKind::IntEnum => Shape::IntEnum {
            members: decl.members.iter().map(|m| m.name.text.to_string()).collect(),
        },
        ShapeKind::Service => {
            let operations = property_list(decl, "operations", scope);
            let resources = property_list(decl, "resources", scope);
            let errors = property_list(decl, "errors", scope);
            Shape::Service {
                operations,
                resources,
                errors,
            }
        }
        ShapeKind::Operation => {
            let input_member = decl.members.iter().find(|m| m.name.text.as_ref() == "input");
            let output_member = decl.members.iter().find(|m| m.name.text.as_ref() == "output");
            let input = resolve_operation_io(input_member, decl, scope, "Input");
            let output = resolve_operation_io(output_member, decl, scope, "Output");
            let errors = property_list(decl, "errors", scope);
            Shape::Operation {
                input,
                output,
                errors,
            }
        }
        ShapeKind::Resource => {
            let identifiers = decl
                .members
                .iter()
                .find(|m| m.name.text.as_ref() == "identifiers")
                .map(|m| named_inline_targets(m, scope))
                .unwrap_or_default();
            let operations = property_list(decl, "operations", scope);
            let resources = property_list(decl, "resources", scope);
            Shape::Resource {
                identifiers,
                operations,
                resources,
            }
        }
    }
}

/// Resolves an operation's `input`/`output` member to a shape ID: a named
/// target (`input: Foo`) resolves normally, while an inline body
/// (`input := { ... }`) resolves to the synthesized shape `flatten_inline_shapes`
/// registered alongside the operation.
fn resolve_operation_io(
    m: Option<&Member>,
    decl: &ShapeDecl,
    scope: &FileScope,
    suffix: &str,
) -> Option<ShapeId> {
    let m = m?;
    if m.inline_shape.is_some() {
        let synth = format!("{}{}", decl.id.text, suffix);
        return ShapeId::parse(&synth).ok().map(|id| id.resolve(&scope.namespace));
    }
    resolve_member(m, scope)
}

/// The implicit default for an unlabeled map key/value or collection
/// member: `smithy.api#String`. Used only when the source is missing the
/// member entirely, which the parser's duplicate/shape recovery already
/// reports separately.
fn default_string_shape() -> ShapeId {
    ShapeId {
        namespace: Some(PRELUDE_NAMESPACE.to_string()),
        name: "String".to_string(),
        member: None,
    }
}

fn single_member_target(decl: &ShapeDecl, scope: &FileScope) -> ShapeId {
    decl.members
        .iter()
        .find(|m| m.name.text.as_ref() == "member")
        .and_then(|m| resolve_member(m, scope))
        .unwrap_or_else(default_string_shape)
}

fn named_member_targets(decl: &ShapeDecl, scope: &FileScope) -> Vec<(String, ShapeId)> {
    decl.members
        .iter()
        .filter_map(|m| resolve_member(m, scope).map(|t| (m.name.text.to_string(), t)))
        .collect()
}

fn named_inline_targets(m: &Member, scope: &FileScope) -> Vec<(String, ShapeId)> {
    // `identifiers: { id: String }` is parsed as an inline shape body on the
    // "identifiers" member; its members are the actual identifier names.
    let Some(inline) = &m.inline_shape else {
        return Vec::new();
    };
    named_member_targets(inline, scope)
}

fn property_list(decl: &ShapeDecl, name: &str, scope: &FileScope) -> Vec<ShapeId> {
    decl.members
        .iter()
        .find(|m| m.name.text.as_ref() == name)
        .map(|m| resolve_list(&m.target_list, scope))
        .unwrap_or_default()
}

fn to_simple_type(kind: syntax::SimpleKind) -> SimpleType {
    use syntax::SimpleKind as SK;
    match kind {
        SK::Blob => SimpleType::Blob,
        SK::Boolean => SimpleType::Boolean,
        SK::Document => SimpleType::Document,
        SK::String => SimpleType::String,
        SK::Byte => SimpleType::Byte,
        SK::Short => SimpleType::Short,
        SK::Integer => SimpleType::Integer,
        SK::Long => SimpleType::Long,
        SK::Float => SimpleType::Float,
        SK::Double => SimpleType::Double,
        SK::BigInteger => SimpleType::BigInteger,
        SK::BigDecimal => SimpleType::BigDecimal,
        SK::Timestamp => SimpleType::Timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_single_file_model() {
        let files = vec![(
            "file:///a.smithy".to_string(),
            "namespace com.foo\nstructure A { b: B }\nstructure B {}\n".to_string(),
        )];
        let (model, events) = assemble(files);
        assert!(events.is_empty(), "unexpected events: {events:?}");
        assert!(model.contains(&ShapeId::parse("com.foo#A").unwrap()));
        assert!(model.contains(&ShapeId::parse("com.foo#B").unwrap()));
    }

    #[test]
    fn reports_unresolved_member_target() {
        let files = vec![(
            "file:///a.smithy".to_string(),
            "namespace com.foo\nstructure A { b: Missing }\n".to_string(),
        )];
        let (_model, events) = assemble(files);
        assert!(events.iter().any(|e| e.event_id == "UnresolvedShape"));
    }

    #[test]
    fn apply_statement_resolves_against_later_declaration() {
        let files = vec![(
            "file:///a.smithy".to_string(),
            "$version: \"2.0\"\nnamespace com.foo\napply MyOpInput @tags([\"foo\"])\nstructure MyOpInput { @required body: String }\n"
                .to_string(),
        )];
        let (_model, events) = assemble(files);
        assert!(
            events.iter().all(|e| e.event_id != "UnresolvedShape"),
            "unexpected unresolved events: {events:?}"
        );
    }

    #[test]
    fn cross_file_references_resolve() {
        let files = vec![
            (
                "file:///a.smithy".to_string(),
                "namespace com.foo\nuse com.bar#Baz\nstructure A { b: Baz }\n".to_string(),
            ),
            (
                "file:///b.smithy".to_string(),
                "namespace com.bar\nstructure Baz {}\n".to_string(),
            ),
        ];
        let (model, events) = assemble(files);
        assert!(events.is_empty(), "unexpected events: {events:?}");
        assert!(model.contains(&ShapeId::parse("com.bar#Baz").unwrap()));
    }

    #[test]
    fn conflicting_shape_names_reported() {
        let files = vec![
            (
                "file:///a.smithy".to_string(),
                "namespace com.foo\nstructure A {}\n".to_string(),
            ),
            (
                "file:///b.smithy".to_string(),
                "namespace com.foo\nstructure A {}\n".to_string(),
            ),
        ];
        let (_model, events) = assemble(files);
        assert!(events.iter().any(|e| e.event_id == "ConflictingShapeName"));
    }

    #[test]
    fn inline_operation_io_synthesizes_shapes() {
        let files = vec![(
            "file:///a.smithy".to_string(),
            "$version: \"2\"\nnamespace com.foo\noperation Op {\n    input := { name: String }\n    output := { greeting: String }\n}\n"
                .to_string(),
        )];
        let (model, events) = assemble(files);
        assert!(events.is_empty(), "unexpected events: {events:?}");
        assert!(model.contains(&ShapeId::parse("com.foo#OpInput").unwrap()));
        assert!(model.contains(&ShapeId::parse("com.foo#OpOutput").unwrap()));
        match &model.get(&ShapeId::parse("com.foo#Op").unwrap()).unwrap().shape {
            Shape::Operation { input, output, .. } => {
                assert_eq!(input.as_ref().unwrap().to_string(), "com.foo#OpInput");
                assert_eq!(output.as_ref().unwrap().to_string(), "com.foo#OpOutput");
            }
            other => panic!("expected operation shape, got {other:?}"),
        }
    }

    #[test]
    fn service_operation_resource_lists_resolve() {
        let files = vec![(
            "file:///a.smithy".to_string(),
            "namespace com.foo\nservice Svc { version: \"1\", operations: [Op] }\noperation Op {}\n"
                .to_string(),
        )];
        let (model, events) = assemble(files);
        assert!(events.is_empty(), "unexpected events: {events:?}");
        match &model.get(&ShapeId::parse("com.foo#Svc").unwrap()).unwrap().shape {
            Shape::Service { operations, .. } => {
                assert_eq!(operations, &[ShapeId::parse("com.foo#Op").unwrap()]);
            }
            other => panic!("expected service shape, got {other:?}"),
        }
    }
}
