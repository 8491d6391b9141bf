//! Diagnostics (§4.10): validation events from the last assembly plus
//! syntactic parse/lex errors, mapped through the wire adapter (§6).

use lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString};
use smithy_lsp_model::Severity;
use smithy_lsp_position::{ByteSpan, LineStartsCache, WireRange};
use smithy_lsp_project::{DocumentParse, ProjectSnapshot};
use smithy_lsp_syntax::ParseErrorKind;

const SOURCE: &str = "smithy-lsp";

/// All diagnostics for `uri`: the file's own parse/lex errors plus any
/// validation event from the last model assembly attributed to it.
pub fn diagnostics_for(snapshot: &ProjectSnapshot, uri: &str, parse: &DocumentParse) -> Vec<Diagnostic> {
    let text = snapshot.documents.get(uri).map(|doc| doc.text()).unwrap_or_default();
    let cache = LineStartsCache::new(&text);

    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    for error in &parse.parse_errors {
        diagnostics.push(Diagnostic {
            range: WireRange::from_byte_offsets(&cache, &text, error.span).into(),
            severity: Some(DiagnosticSeverity::WARNING),
            code: Some(NumberOrString::String(parse_error_code(error.kind).to_string())),
            source: Some(SOURCE.to_string()),
            message: error.message.clone(),
            ..Default::default()
        });
    }

    for lex_error in &parse.lex_errors {
        let (span, code, message) = match lex_error {
            smithy_lsp_syntax::LexError::UnterminatedString { span } => {
                (*span, "UnterminatedString", "unterminated string literal".to_string())
            }
            smithy_lsp_syntax::LexError::InvalidEscape { span } => {
                (*span, "InvalidEscape", "invalid escape sequence".to_string())
            }
        };
        diagnostics.push(Diagnostic {
            range: WireRange::from_byte_offsets(&cache, &text, span).into(),
            severity: Some(DiagnosticSeverity::ERROR),
            code: Some(NumberOrString::String(code.to_string())),
            source: Some(SOURCE.to_string()),
            message,
            ..Default::default()
        });
    }

    for event in snapshot.events() {
        if event.source_uri.as_deref() != Some(uri) {
            continue;
        }
        let span = event
            .shape_id
            .as_ref()
            .and_then(|id| snapshot.smithy_files().get(uri)?.declarations.get(id))
            .copied()
            .unwrap_or(ByteSpan::new(0, 0));
        diagnostics.push(Diagnostic {
            range: WireRange::from_byte_offsets(&cache, &text, span).into(),
            severity: Some(severity_to_lsp(event.severity)),
            code: Some(NumberOrString::String(event.event_id.clone())),
            source: Some(SOURCE.to_string()),
            message: event.message.clone(),
            ..Default::default()
        });
    }

    diagnostics
}

fn severity_to_lsp(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Note => DiagnosticSeverity::HINT,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Danger | Severity::Error => DiagnosticSeverity::ERROR,
    }
}

fn parse_error_code(kind: ParseErrorKind) -> &'static str {
    match kind {
        ParseErrorKind::UnexpectedToken => "UnexpectedToken",
        ParseErrorKind::ExpectedIdent => "ExpectedIdent",
        ParseErrorKind::ExpectedShapeId => "ExpectedShapeId",
        ParseErrorKind::UnterminatedString => "UnterminatedString",
        ParseErrorKind::InvalidEscape => "InvalidEscape",
        ParseErrorKind::MixinsNotAllowed => "MixinsNotAllowed",
        ParseErrorKind::InlineIoNotAllowed => "InlineIoNotAllowed",
        ParseErrorKind::DuplicateMember => "DuplicateMember",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smithy_lsp_project::Project;

    #[test]
    fn unresolved_shape_event_becomes_an_error_diagnostic() {
        let project = Project::detached(
            "file:///a.smithy",
            "namespace com.foo\nstructure A { b: Missing }\n",
            1,
        );
        let snapshot = project.snapshot();
        let parse = project.parse("file:///a.smithy").expect("parse");
        let diagnostics = diagnostics_for(&snapshot, "file:///a.smithy", &parse);
        assert!(diagnostics.iter().any(|d| d.message.contains("Missing") || d.code == Some(NumberOrString::String("UnresolvedShape".to_string()))));
    }

    #[test]
    fn clean_document_has_no_diagnostics() {
        let project = Project::detached("file:///a.smithy", "namespace com.foo\nstructure A {}\n", 1);
        let snapshot = project.snapshot();
        let parse = project.parse("file:///a.smithy").expect("parse");
        let diagnostics = diagnostics_for(&snapshot, "file:///a.smithy", &parse);
        assert!(diagnostics.is_empty());
    }
}
