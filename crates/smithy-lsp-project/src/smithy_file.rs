//! Per-file navigation index: declarations and outgoing references, keyed
//! by byte range, for definition/hover/reference lookups that must answer
//! without re-running the assembler.
//!
//! Unlike `smithy-lsp-assembler`, this index resolves relative shape IDs
//! with plain [`resolve_relative`] rather than prelude-aware resolution:
//! a bare `String` reference here resolves to `<namespace>#String` instead
//! of `smithy.api#String`. Navigation over prelude shapes isn't a spec
//! requirement, so the divergence is left as-is rather than duplicating
//! the assembler's prelude table.

use std::collections::HashMap;

use rustc_hash::FxHashMap;
use smithy_lsp_position::ByteSpan;
use smithy_lsp_syntax::{resolve_relative, Member, ShapeDecl, ShapeId, StatementKind, Tree, Value};

/// What role a reference occurrence plays at its use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceRole {
    MemberTarget,
    TraitName,
    ApplyTarget,
    Mixin,
    ResourceIdentifier,
    ResourceProperty,
    ServiceOperation,
    ServiceResource,
    ServiceError,
    OperationInput,
    OperationOutput,
    OperationError,
    ResourceOperation,
    ResourceCollectionOperation,
    ResourceResource,
    /// A bare identifier appearing inside a trait argument value, e.g.
    /// `@tags(["a"])` or a structural trait referring to other shapes.
    /// Best-effort: not every such identifier is actually a shape ID.
    ShapeIdLiteral,
}

#[derive(Debug, Clone)]
pub struct Reference {
    pub span: ByteSpan,
    pub shape_id: ShapeId,
    pub role: ReferenceRole,
}

/// The navigation index built from one document's parse tree: its
/// namespace, imports, shape declarations, and every outgoing reference in
/// byte-offset order.
#[derive(Debug, Clone, Default)]
pub struct SmithyFile {
    pub namespace: Option<String>,
    pub imports: Vec<ShapeId>,
    pub declarations: FxHashMap<ShapeId, ByteSpan>,
    /// Sorted by `span.start`, enabling binary search from an offset.
    pub references: Vec<Reference>,
}

impl SmithyFile {
    pub fn build(tree: &Tree) -> Self {
        let namespace = tree.namespace().map(|n| n.text.to_string());
        let ns = namespace.clone().unwrap_or_default();

        let mut import_map: HashMap<String, ShapeId> = HashMap::new();
        let mut imports = Vec::new();
        for use_id in tree.uses() {
            if let Ok(id) = ShapeId::parse(&use_id.text) {
                import_map.insert(id.name.clone(), id.clone());
                imports.push(id);
            }
        }

        let mut declarations = FxHashMap::default();
        let mut references = Vec::new();

        for decl in tree.shape_decls() {
            index_decl(decl, &ns, &import_map, &mut declarations, &mut references);
        }

        for stmt in &tree.statements {
            if let StatementKind::Apply { target, trait_app } = &stmt.kind {
                if let Ok(id) = resolve_relative(&target.text, &ns, &import_map) {
                    references.push(Reference {
                        span: target.span,
                        shape_id: id,
                        role: ReferenceRole::ApplyTarget,
                    });
                }
                index_trait(trait_app, &ns, &import_map, &mut references);
            }
        }

        references.sort_by_key(|r| r.span.start);

        Self {
            namespace,
            imports,
            declarations,
            references,
        }
    }

    /// The declaration or reference whose span contains `offset`, preferring
    /// an exact reference hit and falling back to a containing declaration.
    pub fn at_offset(&self, offset: usize) -> Option<ReferenceAt<'_>> {
        if let Ok(idx) = self
            .references
            .binary_search_by(|r| r.span.start.cmp(&offset))
        {
            return Some(ReferenceAt::Reference(&self.references[idx]));
        }
        if let Some(found) = self
            .references
            .iter()
            .filter(|r| r.span.contains(offset))
            .min_by_key(|r| r.span.len())
        {
            return Some(ReferenceAt::Reference(found));
        }
        self.declarations
            .iter()
            .find(|(_, span)| span.contains(offset))
            .map(|(id, span)| ReferenceAt::Declaration(id, *span))
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ReferenceAt<'a> {
    Reference(&'a Reference),
    Declaration(&'a ShapeId, ByteSpan),
}

fn index_decl(
    decl: &ShapeDecl,
    ns: &str,
    imports: &HashMap<String, ShapeId>,
    declarations: &mut FxHashMap<ShapeId, ByteSpan>,
    references: &mut Vec<Reference>,
) {
    if let Ok(local) = ShapeId::parse(&decl.id.text) {
        declarations.insert(local.resolve(ns), decl.span);
    }

    for mixin in &decl.mixins {
        if let Ok(id) = resolve_relative(&mixin.text, ns, imports) {
            references.push(Reference {
                span: mixin.span,
                shape_id: id,
                role: ReferenceRole::Mixin,
            });
        }
    }

    for t in &decl.traits {
        index_trait(t, ns, imports, references);
    }

    for member in &decl.members {
        index_member(decl, member, ns, imports, references);
        if let Some(inline) = &member.inline_shape {
            index_inline(inline, ns, imports, references);
        }
    }
}

/// Inline operation I/O (`input := { ... }`) has no declarable shape ID of
/// its own in the source text (the synthesized name is an assembler
/// concern), so only its internals are indexed here.
fn index_inline(
    decl: &ShapeDecl,
    ns: &str,
    imports: &HashMap<String, ShapeId>,
    references: &mut Vec<Reference>,
) {
    for t in &decl.traits {
        index_trait(t, ns, imports, references);
    }
    for member in &decl.members {
        index_member(decl, member, ns, imports, references);
        if let Some(inline) = &member.inline_shape {
            index_inline(inline, ns, imports, references);
        }
    }
}

fn index_member(
    decl: &ShapeDecl,
    member: &Member,
    ns: &str,
    imports: &HashMap<String, ShapeId>,
    references: &mut Vec<Reference>,
) {
    for t in &member.traits {
        index_trait(t, ns, imports, references);
    }

    let role = property_role(decl, member);
    if let Some(target) = &member.target {
        if let Ok(id) = resolve_relative(&target.text, ns, imports) {
            references.push(Reference {
                span: target.span,
                shape_id: id,
                role,
            });
        }
    }
    for item in &member.target_list {
        if let Ok(id) = resolve_relative(&item.text, ns, imports) {
            references.push(Reference {
                span: item.span,
                shape_id: id,
                role: list_item_role(role),
            });
        }
    }
}

/// Maps a service/operation/resource property name (or plain structure
/// member) to the reference role its target plays.
fn property_role(decl: &ShapeDecl, member: &Member) -> ReferenceRole {
    use smithy_lsp_syntax::ShapeKind;
    match (decl.shape_kind, member.name.text.as_ref()) {
        (ShapeKind::Operation, "input") => ReferenceRole::OperationInput,
        (ShapeKind::Operation, "output") => ReferenceRole::OperationOutput,
        (ShapeKind::Operation, "errors") => ReferenceRole::OperationError,
        (ShapeKind::Service, "operations") => ReferenceRole::ServiceOperation,
        (ShapeKind::Service, "resources") => ReferenceRole::ServiceResource,
        (ShapeKind::Service, "errors") => ReferenceRole::ServiceError,
        (ShapeKind::Resource, "operations") => ReferenceRole::ResourceOperation,
        (ShapeKind::Resource, "collectionOperations") => ReferenceRole::ResourceCollectionOperation,
        (ShapeKind::Resource, "resources") => ReferenceRole::ResourceResource,
        (ShapeKind::Resource, "identifiers") => ReferenceRole::ResourceIdentifier,
        (ShapeKind::Resource, "properties") => ReferenceRole::ResourceProperty,
        _ => ReferenceRole::MemberTarget,
    }
}

/// A singular role's plural form, for the array-valued side of the same
/// property (e.g. `operations: [A, B]` uses the same role per entry).
fn list_item_role(role: ReferenceRole) -> ReferenceRole {
    role
}

fn index_trait(
    trait_app: &smithy_lsp_syntax::TraitApplication,
    ns: &str,
    imports: &HashMap<String, ShapeId>,
    references: &mut Vec<Reference>,
) {
    if let Ok(id) = resolve_relative(&trait_app.name.text, ns, imports) {
        references.push(Reference {
            span: trait_app.name.span,
            shape_id: id,
            role: ReferenceRole::TraitName,
        });
    }
    if let Some(value) = &trait_app.value {
        index_value(value, ns, imports, references);
    }
}

/// Walks a trait argument value looking for bare identifiers that could be
/// shape-id literals (e.g. `@tags([SomeShape])`). Best-effort: strings and
/// object keys are not shape IDs and are skipped.
fn index_value(
    value: &Value,
    ns: &str,
    imports: &HashMap<String, ShapeId>,
    references: &mut Vec<Reference>,
) {
    match value {
        Value::Ident(ident) => {
            if let Ok(id) = resolve_relative(&ident.text, ns, imports) {
                references.push(Reference {
                    span: ident.span,
                    shape_id: id,
                    role: ReferenceRole::ShapeIdLiteral,
                });
            }
        }
        Value::Array(items, _) => {
            for item in items {
                index_value(item, ns, imports, references);
            }
        }
        Value::Object(entries, _) => {
            for (_, v) in entries {
                index_value(v, ns, imports, references);
            }
        }
        Value::Null(_) | Value::Bool(_, _) | Value::Number(_, _) | Value::String(_, _) => {}
    }
}
