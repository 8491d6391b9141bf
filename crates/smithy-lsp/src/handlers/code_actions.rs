//! Code actions (§4.10): limited to "update to IDL 2" and trivial fixes
//! keyed off parse errors, as scoped by §1 ("Individual editor features
//! ... are described only to the extent that they constrain what the core
//! must expose").

use lsp_types::{CodeAction, CodeActionKind, CodeActionOrCommand, Position, Range, TextEdit, Uri, WorkspaceEdit};
use rustc_hash::FxHashMap;
use smithy_lsp_position::{LineStartsCache, WireRange};
use smithy_lsp_project::DocumentParse;
use smithy_lsp_syntax::{IdlVersion, ParseErrorKind, StatementKind};

/// Builds the code actions available for `uri`: one "update to IDL 2" fix
/// whenever the file parses as v1 (it's always a no-op-safe rewrite, not
/// only offered once a v1-only construct trips a parse error), plus a
/// trivial per-error fix for parse error kinds that have an unambiguous
/// single-edit repair.
pub fn code_actions_for(uri: &str, text: &str, parse: &DocumentParse) -> Vec<CodeActionOrCommand> {
    let Ok(lsp_uri) = uri.parse::<Uri>() else {
        return Vec::new();
    };
    let cache = LineStartsCache::new(text);
    let mut actions = Vec::new();

    if parse.tree.idl_version == IdlVersion::V1 {
        if let Some(action) = update_to_idl2(&lsp_uri, text, &cache, parse) {
            actions.push(CodeActionOrCommand::CodeAction(action));
        }
    }

    for error in &parse.parse_errors {
        if let Some(action) = trivial_fix_for(&lsp_uri, text, &cache, error) {
            actions.push(CodeActionOrCommand::CodeAction(action));
        }
    }

    actions
}

/// Rewrites (or inserts) the `$version` control statement to `"2.0"`.
fn update_to_idl2(
    uri: &Uri,
    text: &str,
    cache: &LineStartsCache,
    parse: &DocumentParse,
) -> Option<CodeAction> {
    let existing_control = parse.tree.statements.iter().find_map(|statement| match &statement.kind {
        StatementKind::Control { key, value } if &*key.text == "version" => Some((statement.span, value.span())),
        _ => None,
    });

    let edit = match existing_control {
        Some((_, value_span)) => TextEdit {
            range: WireRange::from_byte_offsets(cache, text, value_span).into(),
            new_text: "\"2.0\"".to_string(),
        },
        None => TextEdit {
            range: Range::new(Position::new(0, 0), Position::new(0, 0)),
            new_text: "$version: \"2.0\"\n".to_string(),
        },
    };

    let mut changes = FxHashMap::default();
    changes.insert(uri.clone(), vec![edit]);

    Some(CodeAction {
        title: "Update to Smithy IDL 2".to_string(),
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: None,
        edit: Some(WorkspaceEdit {
            changes: Some(changes.into_iter().collect()),
            ..Default::default()
        }),
        command: None,
        is_preferred: Some(true),
        disabled: None,
        data: None,
    })
}

/// A handful of parse errors have an unambiguous single-edit repair; the
/// rest (e.g. `DuplicateMember`, `UnexpectedToken`) require the author to
/// decide what they meant and get no trivial fix.
fn trivial_fix_for(
    uri: &Uri,
    text: &str,
    cache: &LineStartsCache,
    error: &smithy_lsp_syntax::ParseError,
) -> Option<CodeAction> {
    match error.kind {
        ParseErrorKind::UnterminatedString => {
            let line_end = text[error.span.end..].find('\n').map(|i| error.span.end + i).unwrap_or(text.len());
            let pos = WireRange::from_byte_offsets(cache, text, smithy_lsp_position::ByteSpan::new(line_end, line_end)).start;
            let edit = TextEdit { range: Range::new(pos.into(), pos.into()), new_text: "\"".to_string() };
            let mut changes = FxHashMap::default();
            changes.insert(uri.clone(), vec![edit]);
            Some(CodeAction {
                title: "Close unterminated string".to_string(),
                kind: Some(CodeActionKind::QUICKFIX),
                diagnostics: None,
                edit: Some(WorkspaceEdit { changes: Some(changes.into_iter().collect()), ..Default::default() }),
                command: None,
                is_preferred: Some(true),
                disabled: None,
                data: None,
            })
        }
        _ => None,
    }
}
