use std::collections::HashSet;
use std::sync::Arc;

use smithy_lsp_position::ByteSpan;

use crate::lexer::{tokenize, LexError};
use crate::token::{Token, TokenKind};
use crate::tree::{
    ErrorStatement, Ident, IdlVersion, Member, ParseError, ParseErrorKind, ShapeDecl, ShapeKind,
    Statement, StatementKind, TraitApplication, Tree, Value,
};

/// Parses a Smithy source file into a resilient [`Tree`].
///
/// Never fails: malformed input produces `ErrorStatement` nodes and entries
/// in the returned error list rather than an `Err`.
pub fn parse(source: &str) -> (Tree, Vec<ParseError>) {
    let (tokens, lex_errors) = tokenize(source);
    let mut parser = Parser {
        source,
        tokens,
        idx: 0,
        errors: lex_errors.into_iter().map(convert_lex_error).collect(),
        idl_version: IdlVersion::V1,
        line_start: true,
        last_end: 0,
    };

    let mut statements = Vec::new();
    while parser.peek_kind() != TokenKind::Eof {
        statements.push(parser.parse_statement());
    }

    let idl_version = parser.idl_version;
    let mut errors = parser.errors;
    errors.sort_by_key(|e| e.span.start);
    (
        Tree {
            statements,
            idl_version,
        },
        errors,
    )
}

fn convert_lex_error(e: LexError) -> ParseError {
    match e {
        LexError::UnterminatedString { span } => ParseError {
            kind: ParseErrorKind::UnterminatedString,
            span,
            message: "unterminated string literal".to_string(),
        },
        LexError::InvalidEscape { span } => ParseError {
            kind: ParseErrorKind::InvalidEscape,
            span,
            message: "invalid escape sequence".to_string(),
        },
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    idx: usize,
    errors: Vec<ParseError>,
    idl_version: IdlVersion,
    /// True if the next significant token follows a newline (or is the
    /// first token of the file) — used to decide recovery boundaries,
    /// which are always top-level constructs starting at column 0.
    line_start: bool,
    last_end: usize,
}

impl<'a> Parser<'a> {
    fn skip_trivia(&mut self) {
        let mut saw_newline = false;
        while let Some(t) = self.tokens.get(self.idx) {
            if t.kind.is_trivia() {
                if t.kind == TokenKind::Newline {
                    saw_newline = true;
                }
                self.idx += 1;
            } else {
                break;
            }
        }
        if saw_newline {
            self.line_start = true;
        }
    }

    fn peek(&mut self) -> &Token {
        self.skip_trivia();
        &self.tokens[self.idx]
    }

    fn peek_kind(&mut self) -> TokenKind {
        self.peek().kind
    }

    fn peek_text(&mut self) -> Arc<str> {
        self.peek().text.clone()
    }

    fn bump(&mut self) -> Token {
        self.skip_trivia();
        let t = self.tokens[self.idx].clone();
        self.idx += 1;
        self.last_end = t.span.end;
        if t.kind != TokenKind::Eof {
            self.line_start = false;
        }
        t
    }

    fn prev_end(&self) -> usize {
        self.last_end
    }

    fn error(&mut self, kind: ParseErrorKind, span: ByteSpan, message: impl Into<String>) {
        self.errors.push(ParseError {
            kind,
            span,
            message: message.into(),
        });
    }

    fn expect(&mut self, kind: TokenKind) {
        if self.peek_kind() == kind {
            self.bump();
        } else {
            let span = self.peek().span;
            self.error(
                ParseErrorKind::UnexpectedToken,
                span,
                format!("expected {kind:?}"),
            );
        }
    }

    fn expect_ident(&mut self) -> Ident {
        if self.peek_kind() == TokenKind::Identifier {
            let t = self.bump();
            Ident::new(t.text.clone(), t.span)
        } else {
            let span = self.peek().span;
            self.error(ParseErrorKind::ExpectedIdent, span, "expected identifier");
            Ident::new("", span)
        }
    }

    fn expect_ident_or_string(&mut self) -> Ident {
        match self.peek_kind() {
            TokenKind::Identifier | TokenKind::String => {
                let t = self.bump();
                Ident::new(t.text.clone(), t.span)
            }
            _ => {
                let span = self.peek().span;
                self.error(ParseErrorKind::ExpectedIdent, span, "expected key");
                Ident::new("", span)
            }
        }
    }

    fn at_statement_boundary(&mut self) -> bool {
        self.peek();
        if !self.line_start {
            return false;
        }
        match self.peek_kind() {
            TokenKind::At | TokenKind::ControlIdentifier => true,
            TokenKind::Identifier => {
                let text = self.peek_text();
                matches!(text.as_ref(), "namespace" | "use" | "metadata" | "apply")
                    || ShapeKind::from_keyword(&text).is_some()
            }
            _ => false,
        }
    }

    fn parse_statement(&mut self) -> Statement {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::ControlIdentifier => self.parse_control(),
            TokenKind::At => self.parse_traits_then_shape(),
            TokenKind::Identifier => match tok.text.as_ref() {
                "metadata" => self.parse_metadata(),
                "namespace" => self.parse_namespace(),
                "use" => self.parse_use(),
                "apply" => self.parse_apply(),
                kw if let Some(shape_kind) = ShapeKind::from_keyword(kw) => {
                    self.parse_shape_decl(shape_kind, Vec::new(), tok.span.start)
                }
                _ => self.recover(tok.span.start),
            },
            _ => self.recover(tok.span.start),
        }
    }

    /// Consumes at least one token, then continues until the next
    /// statement boundary, wrapping the skipped span in an `ErrorStatement`.
    fn recover(&mut self, start: usize) -> Statement {
        let bad = self.bump();
        let mut end = bad.span.end;
        loop {
            if self.peek_kind() == TokenKind::Eof || self.at_statement_boundary() {
                break;
            }
            let t = self.bump();
            end = t.span.end;
        }
        let span = ByteSpan::new(start, end);
        self.error(
            ParseErrorKind::UnexpectedToken,
            span,
            "unrecognized statement; skipped to next statement boundary",
        );
        Statement {
            kind: StatementKind::Error(ErrorStatement {
                span,
                message: "unrecognized statement".to_string(),
            }),
            span,
        }
    }

    /// Like [`Self::recover`] but doesn't force an initial token consumption
    /// — used when the cursor may already sit exactly on a boundary (e.g.
    /// trailing traits with nothing to attach to).
    fn finish_as_error(&mut self, start: usize, message: &str) -> Statement {
        let mut end = self.prev_end().max(start);
        loop {
            if self.peek_kind() == TokenKind::Eof || self.at_statement_boundary() {
                break;
            }
            let t = self.bump();
            end = t.span.end;
        }
        let span = ByteSpan::new(start, end);
        self.error(ParseErrorKind::UnexpectedToken, span, message.to_string());
        Statement {
            kind: StatementKind::Error(ErrorStatement {
                span,
                message: message.to_string(),
            }),
            span,
        }
    }

    fn parse_control(&mut self) -> Statement {
        let key_tok = self.bump();
        let key = Ident::new(key_tok.text.clone(), key_tok.span);
        self.expect(TokenKind::Colon);
        let value = self.parse_value();
        if key.text.as_ref() == "$version"
            && let Value::String(v, _) = &value
        {
            self.idl_version = if v.starts_with('1') {
                IdlVersion::V1
            } else {
                IdlVersion::V2
            };
        }
        let span = ByteSpan::new(key_tok.span.start, self.prev_end());
        Statement {
            kind: StatementKind::Control { key, value },
            span,
        }
    }

    fn parse_metadata(&mut self) -> Statement {
        let kw = self.bump();
        let key = self.expect_ident_or_string();
        self.expect(TokenKind::Equals);
        let value = self.parse_value();
        let span = ByteSpan::new(kw.span.start, self.prev_end());
        Statement {
            kind: StatementKind::Metadata { key, value },
            span,
        }
    }

    fn parse_namespace(&mut self) -> Statement {
        let kw = self.bump();
        let name = self.parse_dotted_name();
        let span = ByteSpan::new(kw.span.start, self.prev_end());
        Statement {
            kind: StatementKind::Namespace { name },
            span,
        }
    }

    fn parse_use(&mut self) -> Statement {
        let kw = self.bump();
        let shape_id = self
            .parse_shape_id_ref()
            .unwrap_or_else(|| Ident::new("", kw.span));
        let span = ByteSpan::new(kw.span.start, self.prev_end());
        Statement {
            kind: StatementKind::Use { shape_id },
            span,
        }
    }

    fn parse_apply(&mut self) -> Statement {
        let kw = self.bump();
        let target = self
            .parse_shape_id_ref()
            .unwrap_or_else(|| Ident::new("", kw.span));
        let trait_app = if self.peek_kind() == TokenKind::At {
            self.parse_trait()
        } else {
            let span = self.peek().span;
            self.error(
                ParseErrorKind::UnexpectedToken,
                span,
                "expected trait application after apply target",
            );
            TraitApplication {
                name: Ident::new("", span),
                value: None,
                span,
            }
        };
        let span = ByteSpan::new(kw.span.start, self.prev_end());
        Statement {
            kind: StatementKind::Apply { target, trait_app },
            span,
        }
    }

    fn parse_traits_then_shape(&mut self) -> Statement {
        let start = self.peek().span.start;
        let traits = self.parse_traits();
        match self
            .peek_kind()
            .eq(&TokenKind::Identifier)
            .then(|| ShapeKind::from_keyword(&self.peek_text()))
            .flatten()
        {
            Some(shape_kind) => self.parse_shape_decl(shape_kind, traits, start),
            None => self.finish_as_error(start, "traits not attached to a shape declaration"),
        }
    }

    fn parse_shape_decl(&mut self, shape_kind: ShapeKind, leading_traits: Vec<TraitApplication>, start: usize) -> Statement {
        let kind_tok = self.bump();
        if shape_kind.v2_only() && self.idl_version == IdlVersion::V1 {
            self.error(
                ParseErrorKind::UnexpectedToken,
                kind_tok.span,
                format!("`{}` requires Smithy IDL 2.0", kind_tok.text),
            );
        }
        let id = self.expect_ident();

        let mut mixins = Vec::new();
        if self.peek_kind() == TokenKind::Identifier && self.peek_text().as_ref() == "with" {
            let with_tok = self.bump();
            if self.idl_version == IdlVersion::V1 {
                self.error(
                    ParseErrorKind::MixinsNotAllowed,
                    with_tok.span,
                    "mixins are not allowed in Smithy IDL 1.0",
                );
            }
            self.expect(TokenKind::LBracket);
            while self.peek_kind() != TokenKind::RBracket && self.peek_kind() != TokenKind::Eof {
                match self.parse_shape_id_ref() {
                    Some(id) => mixins.push(id),
                    None => {
                        self.bump();
                    }
                }
                if self.peek_kind() == TokenKind::Comma {
                    self.bump();
                }
            }
            self.expect(TokenKind::RBracket);
        }

        let members = if self.peek_kind() == TokenKind::LBrace {
            self.parse_member_block()
        } else {
            Vec::new()
        };
        self.check_duplicate_members(&members);

        let span = ByteSpan::new(start, self.prev_end());
        Statement {
            kind: StatementKind::ShapeDecl(ShapeDecl {
                shape_kind,
                id,
                traits: leading_traits,
                mixins,
                members,
                span,
            }),
            span,
        }
    }

    fn parse_member_block(&mut self) -> Vec<Member> {
        self.bump(); // '{'
        let mut members = Vec::new();
        while self.peek_kind() != TokenKind::RBrace && self.peek_kind() != TokenKind::Eof {
            members.push(self.parse_member());
            if self.peek_kind() == TokenKind::Comma {
                self.bump();
            }
        }
        self.expect(TokenKind::RBrace);
        members
    }

    fn check_duplicate_members(&mut self, members: &[Member]) {
        let mut seen: HashSet<&str> = HashSet::new();
        for m in members {
            if !seen.insert(m.name.text.as_ref()) {
                self.error(
                    ParseErrorKind::DuplicateMember,
                    m.name.span,
                    format!("duplicate member `{}`", m.name.text),
                );
            }
        }
    }

    fn parse_member(&mut self) -> Member {
        let start = self.peek().span.start;
        let traits = self.parse_traits();
        let name = self.expect_ident();

        let mut target = None;
        let mut target_list = Vec::new();
        let mut inline_shape = None;

        if self.peek_kind() == TokenKind::Colon {
            self.bump();
            if self.peek_kind() == TokenKind::LBracket {
                self.bump();
                while self.peek_kind() != TokenKind::RBracket && self.peek_kind() != TokenKind::Eof
                {
                    match self.parse_shape_id_ref() {
                        Some(id) => target_list.push(id),
                        None => {
                            self.bump();
                        }
                    }
                    if self.peek_kind() == TokenKind::Comma {
                        self.bump();
                    }
                }
                self.expect(TokenKind::RBracket);
            } else {
                target = self.parse_shape_id_ref();
            }
        } else if self.peek_kind() == TokenKind::Walrus {
            let walrus = self.bump();
            if self.idl_version == IdlVersion::V1 {
                self.error(
                    ParseErrorKind::InlineIoNotAllowed,
                    walrus.span,
                    "inline input/output requires Smithy IDL 2.0",
                );
            }
            let body_start = self.peek().span.start;
            let members = if self.peek_kind() == TokenKind::LBrace {
                self.parse_member_block()
            } else {
                Vec::new()
            };
            inline_shape = Some(Box::new(ShapeDecl {
                shape_kind: ShapeKind::Structure,
                id: name.clone(),
                traits: Vec::new(),
                mixins: Vec::new(),
                members,
                span: ByteSpan::new(body_start, self.prev_end()),
            }));
        }

        let mut default = None;
        if self.peek_kind() == TokenKind::Equals {
            self.bump();
            default = Some(self.parse_value());
        }

        let span = ByteSpan::new(start, self.prev_end());
        Member {
            traits,
            name,
            target,
            target_list,
            default,
            inline_shape,
            span,
        }
    }

    fn parse_traits(&mut self) -> Vec<TraitApplication> {
        let mut traits = Vec::new();
        while self.peek_kind() == TokenKind::At {
            traits.push(self.parse_trait());
        }
        traits
    }

    fn parse_trait(&mut self) -> TraitApplication {
        let at_tok = self.bump();
        let name = self.parse_shape_id_ref().unwrap_or_else(|| {
            let span = self.peek().span;
            self.error(ParseErrorKind::ExpectedShapeId, span, "expected trait name");
            Ident::new("", span)
        });
        let mut value = None;
        if self.peek_kind() == TokenKind::LParen {
            self.bump();
            value = Some(self.parse_trait_args());
            self.expect(TokenKind::RParen);
        }
        let span = ByteSpan::new(at_tok.span.start, self.prev_end());
        TraitApplication { name, value, span }
    }

    /// Trait argument lists are either a single positional value
    /// (`@tags(["a"])`) or a set of `key: value` pairs (`@http(method: "GET")`).
    fn parse_trait_args(&mut self) -> Value {
        let start = self.peek().span.start;
        let mut entries = Vec::new();
        let mut single_value = None;
        while self.peek_kind() != TokenKind::RParen && self.peek_kind() != TokenKind::Eof {
            if matches!(self.peek_kind(), TokenKind::Identifier | TokenKind::String) {
                let save = self.idx;
                let key_tok = self.bump();
                if self.peek_kind() == TokenKind::Colon {
                    self.bump();
                    let val = self.parse_value();
                    entries.push((Ident::new(key_tok.text.clone(), key_tok.span), val));
                    if self.peek_kind() == TokenKind::Comma {
                        self.bump();
                    }
                    continue;
                }
                self.idx = save;
            }
            single_value = Some(self.parse_value());
            if self.peek_kind() == TokenKind::Comma {
                self.bump();
            }
        }
        let end = self.prev_end();
        if !entries.is_empty() {
            Value::Object(entries, ByteSpan::new(start, end))
        } else if let Some(v) = single_value {
            v
        } else {
            Value::Object(Vec::new(), ByteSpan::new(start, end))
        }
    }

    fn parse_value(&mut self) -> Value {
        match self.peek_kind() {
            TokenKind::LBrace => self.parse_object_value(),
            TokenKind::LBracket => self.parse_array_value(),
            TokenKind::String => {
                let t = self.bump();
                Value::String(unescape_string_token(&t.text), t.span)
            }
            TokenKind::Number => {
                let t = self.bump();
                Value::Number(t.text.to_string(), t.span)
            }
            TokenKind::Identifier => match self.peek_text().as_ref() {
                "true" => {
                    let t = self.bump();
                    Value::Bool(true, t.span)
                }
                "false" => {
                    let t = self.bump();
                    Value::Bool(false, t.span)
                }
                "null" => {
                    let t = self.bump();
                    Value::Null(t.span)
                }
                _ => match self.parse_shape_id_ref() {
                    Some(id) => Value::Ident(id),
                    None => {
                        let span = self.peek().span;
                        Value::Null(span)
                    }
                },
            },
            _ => {
                let tok = self.bump();
                self.error(
                    ParseErrorKind::UnexpectedToken,
                    tok.span,
                    format!("unexpected token in value position: {:?}", tok.kind),
                );
                Value::Null(tok.span)
            }
        }
    }

    fn parse_object_value(&mut self) -> Value {
        let start = self.peek().span.start;
        self.bump(); // '{'
        let mut entries = Vec::new();
        while self.peek_kind() != TokenKind::RBrace && self.peek_kind() != TokenKind::Eof {
            let key_tok = if matches!(self.peek_kind(), TokenKind::Identifier | TokenKind::String) {
                self.bump()
            } else {
                let span = self.peek().span;
                self.error(ParseErrorKind::ExpectedIdent, span, "expected object key");
                self.bump()
            };
            let key = Ident::new(key_tok.text.clone(), key_tok.span);
            self.expect(TokenKind::Colon);
            let value = self.parse_value();
            entries.push((key, value));
            if self.peek_kind() == TokenKind::Comma {
                self.bump();
            }
        }
        self.expect(TokenKind::RBrace);
        Value::Object(entries, ByteSpan::new(start, self.prev_end()))
    }

    fn parse_array_value(&mut self) -> Value {
        let start = self.peek().span.start;
        self.bump(); // '['
        let mut items = Vec::new();
        while self.peek_kind() != TokenKind::RBracket && self.peek_kind() != TokenKind::Eof {
            items.push(self.parse_value());
            if self.peek_kind() == TokenKind::Comma {
                self.bump();
            }
        }
        self.expect(TokenKind::RBracket);
        Value::Array(items, ByteSpan::new(start, self.prev_end()))
    }

    fn parse_dotted_name(&mut self) -> Ident {
        if self.peek_kind() != TokenKind::Identifier {
            let span = self.peek().span;
            self.error(ParseErrorKind::ExpectedIdent, span, "expected namespace name");
            return Ident::new("", span);
        }
        let start_tok = self.bump();
        let start = start_tok.span.start;
        let mut end = start_tok.span.end;
        while self.peek_kind() == TokenKind::Dot {
            self.bump();
            if self.peek_kind() == TokenKind::Identifier {
                end = self.bump().span.end;
            } else {
                break;
            }
        }
        Ident::new(
            self.source[start..end].to_string(),
            ByteSpan::new(start, end),
        )
    }

    /// Parses `ns.segments#Name$member`, combining every segment present
    /// into one `Ident`. Any of the namespace, `#Name`, or `$member` parts
    /// may be absent; resolving what remains into an absolute `ShapeId`
    /// happens above this crate, against file/namespace context.
    fn parse_shape_id_ref(&mut self) -> Option<Ident> {
        if self.peek_kind() != TokenKind::Identifier {
            let span = self.peek().span;
            self.error(ParseErrorKind::ExpectedShapeId, span, "expected shape ID");
            return None;
        }
        let first = self.bump();
        let start = first.span.start;
        let mut end = first.span.end;
        while self.peek_kind() == TokenKind::Dot {
            self.bump();
            if self.peek_kind() == TokenKind::Identifier {
                end = self.bump().span.end;
            } else {
                break;
            }
        }
        if self.peek_kind() == TokenKind::Hash {
            self.bump();
            if self.peek_kind() == TokenKind::Identifier {
                end = self.bump().span.end;
            }
        }
        if self.peek_kind() == TokenKind::ControlIdentifier {
            end = self.bump().span.end;
        }
        Some(Ident::new(
            self.source[start..end].to_string(),
            ByteSpan::new(start, end),
        ))
    }
}

fn unescape_string_token(text: &str) -> String {
    let inner = if let Some(s) = text
        .strip_prefix("\"\"\"")
        .and_then(|s| s.strip_suffix("\"\"\""))
    {
        s
    } else if let Some(s) = text.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        s
    } else {
        text
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('$') => out.push('$'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                if let Ok(code) = u32::from_str_radix(&hex, 16)
                    && let Some(ch) = char::from_u32(code)
                {
                    out.push(ch);
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decls<'a>(tree: &'a Tree) -> Vec<&'a ShapeDecl> {
        tree.shape_decls().collect()
    }

    #[test]
    fn parses_simple_namespace_and_structure() {
        let src = "namespace com.foo\nstructure A { b: B }\nstructure B {}\n";
        let (tree, errors) = parse(src);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        assert_eq!(tree.namespace().unwrap().text.as_ref(), "com.foo");
        let decls = decls(&tree);
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].id.text.as_ref(), "A");
        assert_eq!(decls[0].members[0].target.as_ref().unwrap().text.as_ref(), "B");
    }

    // S2: apply statement parses before the shape it targets is declared.
    #[test]
    fn apply_statement_before_declaration() {
        let src = "$version: \"2.0\"\nnamespace com.foo\napply MyOpInput @tags([\"foo\"])\nstructure MyOpInput { @required body: String }\n";
        let (tree, errors) = parse(src);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        assert_eq!(tree.idl_version, IdlVersion::V2);
        let apply = tree
            .statements
            .iter()
            .find_map(|s| match &s.kind {
                StatementKind::Apply { target, trait_app } => Some((target, trait_app)),
                _ => None,
            })
            .expect("apply statement");
        assert_eq!(apply.0.text.as_ref(), "MyOpInput");
        assert_eq!(apply.1.name.text.as_ref(), "tags");
    }

    // S3: inline input/output shapes under IDL v2.
    #[test]
    fn inline_operation_io() {
        let src = "$version: \"2.0\"\nnamespace com.foo\noperation Op { input := { foo: String } output := { bar: String } }\n";
        let (tree, errors) = parse(src);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        let op = decls(&tree)
            .into_iter()
            .find(|d| d.id.text.as_ref() == "Op")
            .expect("Op shape");
        assert_eq!(op.members.len(), 2);
        let input = op.members.iter().find(|m| m.name.text.as_ref() == "input").unwrap();
        let inline = input.inline_shape.as_ref().expect("inline shape");
        assert_eq!(inline.members[0].name.text.as_ref(), "foo");
    }

    // S4: IDL v1 rejects mixins but still recovers the shape declaration.
    #[test]
    fn v1_rejects_mixins_non_fatally() {
        let src = "$version: \"1.0\"\nnamespace n\nstructure S with [T] {}\n";
        let (tree, errors) = parse(src);
        assert!(errors
            .iter()
            .any(|e| e.kind == ParseErrorKind::MixinsNotAllowed));
        let s = decls(&tree)
            .into_iter()
            .find(|d| d.id.text.as_ref() == "S")
            .expect("S shape still present");
        assert_eq!(s.mixins[0].text.as_ref(), "T");
    }

    #[test]
    fn v1_rejects_inline_io_non_fatally() {
        let src = "$version: \"1.0\"\nnamespace n\noperation Op { input := { a: String } }\n";
        let (_tree, errors) = parse(src);
        assert!(errors
            .iter()
            .any(|e| e.kind == ParseErrorKind::InlineIoNotAllowed));
    }

    #[test]
    fn duplicate_member_reported() {
        let src = "namespace n\nstructure S { a: String, a: Integer }\n";
        let (_tree, errors) = parse(src);
        assert!(errors.iter().any(|e| e.kind == ParseErrorKind::DuplicateMember));
    }

    #[test]
    fn unrecognized_statement_recovers_at_next_boundary() {
        let src = "namespace n\n&&& garbage here\nstructure S {}\n";
        let (tree, errors) = parse(src);
        assert!(errors.iter().any(|e| e.kind == ParseErrorKind::UnexpectedToken));
        assert!(tree
            .statements
            .iter()
            .any(|s| matches!(s.kind, StatementKind::Error(_))));
        let s = decls(&tree)
            .into_iter()
            .find(|d| d.id.text.as_ref() == "S");
        assert!(s.is_some(), "parser should resync and still find structure S");
    }

    #[test]
    fn dangling_trait_without_shape_is_recovered_not_panicked() {
        let src = "namespace n\n@deprecated\nnamespace m\n";
        let (tree, _errors) = parse(src);
        // Must not panic; both namespaces should still be visible.
        let namespaces: Vec<_> = tree
            .statements
            .iter()
            .filter_map(|s| match &s.kind {
                StatementKind::Namespace { name } => Some(name.text.as_ref()),
                _ => None,
            })
            .collect();
        assert_eq!(namespaces, vec!["n", "m"]);
    }

    #[test]
    fn trait_with_object_args() {
        let src = "namespace n\n@http(method: \"GET\", uri: \"/foo\")\noperation Op {}\n";
        let (tree, errors) = parse(src);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        let op = decls(&tree)[0];
        let http = &op.traits[0];
        assert_eq!(http.name.text.as_ref(), "http");
        match &http.value {
            Some(Value::Object(entries, _)) => assert_eq!(entries.len(), 2),
            other => panic!("expected object trait value, got {other:?}"),
        }
    }

    #[test]
    fn totality_never_panics_on_arbitrary_bytes() {
        for src in [
            "",
            "{{{{",
            "\"",
            "@@@ @ @",
            "namespace",
            "structure",
            ":=:=:=",
            "\u{0}\u{0}\u{0}",
        ] {
            let (_tree, _errors) = parse(src);
        }
    }

    #[test]
    fn sibling_statement_ranges_never_overlap() {
        let src = "namespace n\nuse n#Foo\nstructure A { x: String }\nstructure B { y: Integer }\napply A @deprecated\n";
        let (tree, _errors) = parse(src);
        for window in tree.statements.windows(2) {
            assert!(window[0].span.end <= window[1].span.start);
        }
        for stmt in &tree.statements {
            assert!(stmt.span.end <= src.len());
        }
    }
}
