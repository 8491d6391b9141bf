//! Hover (§4.10): the shape at the cursor renders its normalized
//! definition — traits plus members — as Markdown.

use lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind};
use smithy_lsp_model::{Shape, ShapeEntry, ShapeId};
use smithy_lsp_project::ProjectSnapshot;

use crate::dispatcher::CursorTarget;

pub fn hover_for(snapshot: &ProjectSnapshot, target: &CursorTarget) -> Option<Hover> {
    let shape_id = match target {
        CursorTarget::Reference(reference) => &reference.shape_id,
        CursorTarget::Declaration { shape_id, .. } => shape_id,
        CursorTarget::None => return None,
    };
    let entry = snapshot.model().get(shape_id)?;
    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: render_shape(shape_id, entry),
        }),
        range: None,
    })
}

fn render_shape(shape_id: &ShapeId, entry: &ShapeEntry) -> String {
    let mut out = String::new();
    for trait_id in &entry.traits {
        out.push_str(&format!("@{trait_id}\n"));
    }
    out.push_str(&format!("```smithy\n{} {}", shape_keyword(&entry.shape), shape_id));
    if let Some(body) = render_body(&entry.shape) {
        out.push_str(&format!(" {{\n{body}}}"));
    } else {
        out.push('\n');
    }
    out.push_str("\n```");
    out
}

fn shape_keyword(shape: &Shape) -> &'static str {
    match shape {
        Shape::Simple(_) => "simple",
        Shape::List { .. } => "list",
        Shape::Map { .. } => "map",
        Shape::Set { .. } => "set",
        Shape::Structure { .. } => "structure",
        Shape::Union { .. } => "union",
        Shape::Enum { .. } => "enum",
        Shape::IntEnum { .. } => "intEnum",
        Shape::Service { .. } => "service",
        Shape::Operation { .. } => "operation",
        Shape::Resource { .. } => "resource",
    }
}

fn render_body(shape: &Shape) -> Option<String> {
    match shape {
        Shape::Structure { members } | Shape::Union { members } => {
            Some(members.iter().map(|(name, target)| format!("    {name}: {target}\n")).collect())
        }
        Shape::Enum { members } | Shape::IntEnum { members } => {
            Some(members.iter().map(|name| format!("    {name}\n")).collect())
        }
        Shape::List { member } => Some(format!("    member: {member}\n")),
        Shape::Set { member } => Some(format!("    member: {member}\n")),
        Shape::Map { key, value } => Some(format!("    key: {key}\n    value: {value}\n")),
        Shape::Operation { input, output, errors } => {
            let mut body = String::new();
            if let Some(input) = input {
                body.push_str(&format!("    input: {input}\n"));
            }
            if let Some(output) = output {
                body.push_str(&format!("    output: {output}\n"));
            }
            for error in errors {
                body.push_str(&format!("    errors += [{error}]\n"));
            }
            Some(body)
        }
        Shape::Service { operations, resources, errors } => {
            let mut body = String::new();
            for op in operations {
                body.push_str(&format!("    operations += [{op}]\n"));
            }
            for resource in resources {
                body.push_str(&format!("    resources += [{resource}]\n"));
            }
            for error in errors {
                body.push_str(&format!("    errors += [{error}]\n"));
            }
            Some(body)
        }
        Shape::Resource { identifiers, operations, resources } => {
            let mut body = String::new();
            for (name, target) in identifiers {
                body.push_str(&format!("    identifiers.{name}: {target}\n"));
            }
            for op in operations {
                body.push_str(&format!("    operations += [{op}]\n"));
            }
            for resource in resources {
                body.push_str(&format!("    resources += [{resource}]\n"));
            }
            Some(body)
        }
        Shape::Simple(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smithy_lsp_project::Project;

    #[test]
    fn hover_renders_structure_members() {
        let project = Project::detached(
            "file:///a.smithy",
            "namespace com.foo\nstructure A { b: String }\n",
            1,
        );
        let snapshot = project.snapshot();
        let shape_id = ShapeId::parse("com.foo#A").expect("shape id");
        let target = CursorTarget::Declaration { shape_id, span: smithy_lsp_position::ByteSpan::new(0, 0) };
        let hover = hover_for(&snapshot, &target).expect("hover");
        match hover.contents {
            HoverContents::Markup(markup) => {
                assert!(markup.value.contains("structure"));
                assert!(markup.value.contains("b: "));
            }
            other => panic!("expected markup contents, got {other:?}"),
        }
    }

    #[test]
    fn hover_over_unknown_shape_is_none() {
        let project = Project::detached("file:///a.smithy", "namespace com.foo\n", 1);
        let snapshot = project.snapshot();
        assert!(hover_for(&snapshot, &CursorTarget::None).is_none());
    }
}
