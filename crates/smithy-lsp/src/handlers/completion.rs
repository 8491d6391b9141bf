//! Completion (§4.10): the syntactic context at the cursor — top-level,
//! inside a trait, a member target, or a shape-id literal — narrows the
//! candidate list drawn from the assembled model's shape names.

use lsp_types::{CompletionItem, CompletionItemKind};
use smithy_lsp_project::{ProjectSnapshot, ReferenceRole};
use smithy_lsp_syntax::StatementKind;

use crate::dispatcher::{CursorContext, CursorTarget};

const TOP_LEVEL_KEYWORDS: &[&str] = &[
    "namespace", "use", "metadata", "apply", "structure", "union", "list", "map", "set", "enum",
    "intEnum", "service", "resource", "operation",
];

pub fn completions_for(snapshot: &ProjectSnapshot, cursor: &CursorContext) -> Vec<CompletionItem> {
    match &cursor.target {
        CursorTarget::Reference(reference) if is_shape_id_context(reference.role) => shape_id_completions(snapshot),
        CursorTarget::Reference(_) | CursorTarget::Declaration { .. } => Vec::new(),
        CursorTarget::None => match &cursor.enclosing_statement {
            None => top_level_completions(),
            Some(statement) => match &statement.kind {
                StatementKind::Namespace { .. } | StatementKind::Use { .. } => Vec::new(),
                StatementKind::ShapeDecl(_) | StatementKind::Apply { .. } => shape_id_completions(snapshot),
                _ => top_level_completions(),
            },
        },
    }
}

fn is_shape_id_context(role: ReferenceRole) -> bool {
    matches!(
        role,
        ReferenceRole::MemberTarget
            | ReferenceRole::TraitName
            | ReferenceRole::ApplyTarget
            | ReferenceRole::Mixin
            | ReferenceRole::ResourceIdentifier
            | ReferenceRole::ResourceProperty
            | ReferenceRole::ServiceOperation
            | ReferenceRole::ServiceResource
            | ReferenceRole::ServiceError
            | ReferenceRole::OperationInput
            | ReferenceRole::OperationOutput
            | ReferenceRole::OperationError
            | ReferenceRole::ResourceOperation
            | ReferenceRole::ResourceCollectionOperation
            | ReferenceRole::ResourceResource
            | ReferenceRole::ShapeIdLiteral
    )
}

fn top_level_completions() -> Vec<CompletionItem> {
    TOP_LEVEL_KEYWORDS
        .iter()
        .map(|keyword| CompletionItem {
            label: keyword.to_string(),
            kind: Some(CompletionItemKind::KEYWORD),
            ..CompletionItem::default()
        })
        .collect()
}

fn shape_id_completions(snapshot: &ProjectSnapshot) -> Vec<CompletionItem> {
    snapshot
        .model()
        .shape_ids()
        .map(|shape_id| CompletionItem {
            label: shape_id.to_string(),
            kind: Some(CompletionItemKind::CLASS),
            detail: Some(shape_id.to_string()),
            ..CompletionItem::default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use smithy_lsp_project::Project;

    #[test]
    fn top_level_offers_shape_keywords() {
        let project = Project::detached("file:///a.smithy", "namespace com.foo\n", 1);
        let snapshot = project.snapshot();
        let cursor = CursorContext { offset: 0, target: CursorTarget::None, enclosing_statement: None };
        let items = completions_for(&snapshot, &cursor);
        assert!(items.iter().any(|item| item.label == "structure"));
    }

    #[test]
    fn member_target_offers_shape_ids() {
        let project = Project::detached(
            "file:///a.smithy",
            "namespace com.foo\nstructure A { b: B }\nstructure B {}\n",
            1,
        );
        let snapshot = project.snapshot();
        let target = CursorTarget::Reference(smithy_lsp_project::Reference {
            span: smithy_lsp_position::ByteSpan::new(0, 0),
            shape_id: smithy_lsp_model::ShapeId::parse("com.foo#B").expect("shape id"),
            role: ReferenceRole::MemberTarget,
        });
        let cursor = CursorContext { offset: 0, target, enclosing_statement: None };
        let items = completions_for(&snapshot, &cursor);
        assert!(items.iter().any(|item| item.label == "com.foo#A"));
    }
}
