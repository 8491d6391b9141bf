use smithy_lsp_position::ByteSpan;

use crate::token::{Token, TokenKind};

/// A non-fatal problem discovered while tokenizing. The tokenizer itself
/// never fails (see [`tokenize`]); these are folded into the parser's
/// error list by whichever statement contains the offending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    UnterminatedString { span: ByteSpan },
    InvalidEscape { span: ByteSpan },
}

/// Tokenizes `source` exhaustively: every byte belongs to exactly one
/// token, including whitespace, so that downstream byte ranges never have
/// gaps. Always succeeds; lexical problems are reported in the returned
/// error list rather than aborting.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<LexError>) {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let span = ByteSpan::new(start, self.pos);
        let text = &self.source[start..self.pos];
        self.tokens.push(Token::new(kind, text, span));
    }

    fn run(mut self) -> (Vec<Token>, Vec<LexError>) {
        while let Some(byte) = self.peek() {
            let start = self.pos;
            match byte {
                b' ' | b'\t' | b'\r' => {
                    while matches!(self.peek(), Some(b' ' | b'\t' | b'\r')) {
                        self.pos += 1;
                    }
                    self.push(TokenKind::Whitespace, start);
                }
                b'\n' => {
                    self.pos += 1;
                    self.push(TokenKind::Newline, start);
                }
                b'/' if self.peek_at(1) == Some(b'/') => {
                    let doc = self.peek_at(2) == Some(b'/');
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.pos += 1;
                    }
                    self.push(
                        if doc {
                            TokenKind::DocComment
                        } else {
                            TokenKind::LineComment
                        },
                        start,
                    );
                }
                b'"' => self.lex_string(start),
                b'0'..=b'9' => self.lex_number(start),
                b'-' if matches!(self.peek_at(1), Some(b'0'..=b'9')) => self.lex_number(start),
                b'$' => self.lex_dollar(start),
                b':' if self.peek_at(1) == Some(b'=') => {
                    self.pos += 2;
                    self.push(TokenKind::Walrus, start);
                }
                b':' => {
                    self.pos += 1;
                    self.push(TokenKind::Colon, start);
                }
                b'{' => self.single(TokenKind::LBrace, start),
                b'}' => self.single(TokenKind::RBrace, start),
                b'[' => self.single(TokenKind::LBracket, start),
                b']' => self.single(TokenKind::RBracket, start),
                b'(' => self.single(TokenKind::LParen, start),
                b')' => self.single(TokenKind::RParen, start),
                b'=' => self.single(TokenKind::Equals, start),
                b'@' => self.single(TokenKind::At, start),
                b'#' => self.single(TokenKind::Hash, start),
                b',' => self.single(TokenKind::Comma, start),
                b'.' => self.single(TokenKind::Dot, start),
                c if is_ident_start(c) => self.lex_identifier(start),
                _ => {
                    // Consume one UTF-8 scalar so multi-byte garbage doesn't
                    // split a codepoint across two error tokens.
                    let width = utf8_len(byte);
                    self.pos += width.max(1);
                    self.push(TokenKind::Error, start);
                }
            }
        }
        self.tokens.push(Token::new(
            TokenKind::Eof,
            "",
            ByteSpan::empty(self.source.len()),
        ));
        (self.tokens, self.errors)
    }

    fn single(&mut self, kind: TokenKind, start: usize) {
        self.pos += 1;
        self.push(kind, start);
    }

    fn lex_identifier(&mut self, start: usize) {
        while matches!(self.peek(), Some(c) if is_ident_continue(c)) {
            self.pos += 1;
        }
        self.push(TokenKind::Identifier, start);
    }

    fn lex_dollar(&mut self, start: usize) {
        self.pos += 1;
        if matches!(self.peek(), Some(c) if is_ident_start(c)) {
            while matches!(self.peek(), Some(c) if is_ident_continue(c)) {
                self.pos += 1;
            }
            self.push(TokenKind::ControlIdentifier, start);
        } else {
            self.push(TokenKind::Dollar, start);
        }
    }

    fn lex_number(&mut self, start: usize) {
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.pos += 1;
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if matches!(self.peek(), Some(b'0'..=b'9')) {
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.pos += 1;
                }
            } else {
                self.pos = mark;
            }
        }
        self.push(TokenKind::Number, start);
    }

    fn lex_string(&mut self, start: usize) {
        let triple = self.peek_at(1) == Some(b'"') && self.peek_at(2) == Some(b'"');
        if triple {
            self.pos += 3;
            loop {
                match self.peek() {
                    None => {
                        self.errors.push(LexError::UnterminatedString {
                            span: ByteSpan::new(start, self.pos),
                        });
                        break;
                    }
                    Some(b'"') if self.peek_at(1) == Some(b'"') && self.peek_at(2) == Some(b'"') => {
                        self.pos += 3;
                        break;
                    }
                    Some(b'\\') => self.consume_escape(),
                    _ => self.pos += 1,
                }
            }
        } else {
            self.pos += 1;
            loop {
                match self.peek() {
                    None | Some(b'\n') => {
                        self.errors.push(LexError::UnterminatedString {
                            span: ByteSpan::new(start, self.pos),
                        });
                        break;
                    }
                    Some(b'"') => {
                        self.pos += 1;
                        break;
                    }
                    Some(b'\\') => self.consume_escape(),
                    _ => self.pos += 1,
                }
            }
        }
        self.push(TokenKind::String, start);
    }

    fn consume_escape(&mut self) {
        let escape_start = self.pos;
        self.pos += 1; // consume backslash
        match self.peek() {
            Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' | b'$') => {
                self.pos += 1;
            }
            Some(b'u') => {
                self.pos += 1;
                for _ in 0..4 {
                    if matches!(self.peek(), Some(b'0'..=b'9' | b'a'..=b'f' | b'A'..=b'F')) {
                        self.pos += 1;
                    } else {
                        self.errors.push(LexError::InvalidEscape {
                            span: ByteSpan::new(escape_start, self.pos),
                        });
                        break;
                    }
                }
            }
            _ => {
                self.errors.push(LexError::InvalidEscape {
                    span: ByteSpan::new(escape_start, (escape_start + 2).min(self.bytes.len())),
                });
                self.pos += 1;
            }
        }
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn utf8_len(first_byte: u8) -> usize {
    if first_byte & 0x80 == 0 {
        1
    } else if first_byte & 0xE0 == 0xC0 {
        2
    } else if first_byte & 0xF0 == 0xE0 {
        3
    } else if first_byte & 0xF8 == 0xF0 {
        4
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn exhaustive_coverage_namespace_statement() {
        let source = "namespace com.example\n";
        let (tokens, errors) = tokenize(source);
        assert!(errors.is_empty());
        // Every byte must be covered without gaps.
        let mut covered = 0;
        for tok in &tokens {
            if tok.kind == TokenKind::Eof {
                continue;
            }
            assert_eq!(tok.span.start, covered);
            covered = tok.span.end;
        }
        assert_eq!(covered, source.len());
    }

    #[test]
    fn control_identifier_vs_dollar() {
        let (tokens, _) = tokenize("$version $");
        assert_eq!(tokens[0].kind, TokenKind::ControlIdentifier);
        assert_eq!(tokens[0].text.as_ref(), "$version");
        // whitespace, then bare '$'
        assert_eq!(tokens[2].kind, TokenKind::Dollar);
    }

    #[test]
    fn walrus_vs_colon() {
        let (tokens, _) = tokenize(":= :");
        assert_eq!(tokens[0].kind, TokenKind::Walrus);
        assert_eq!(tokens[2].kind, TokenKind::Colon);
    }

    #[test]
    fn line_and_doc_comments() {
        let (tokens, _) = tokenize("// plain\n/// doc\n");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::LineComment,
                TokenKind::Newline,
                TokenKind::DocComment,
                TokenKind::Newline,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn unterminated_string_reports_error_but_still_tokenizes() {
        let (tokens, errors) = tokenize("\"abc");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], LexError::UnterminatedString { .. }));
    }

    #[test]
    fn triple_quoted_text_block() {
        let (tokens, errors) = tokenize("\"\"\"line one\nline two\"\"\"");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].span, ByteSpan::new(0, 24));
    }

    #[test]
    fn negative_and_decimal_numbers() {
        let (tokens, _) = tokenize("-1 1.5 1e10 1e");
        let numbers: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Number)
            .map(|t| t.text.as_ref())
            .collect();
        assert_eq!(numbers, vec!["-1", "1.5", "1e10", "1"]);
    }

    #[test]
    fn shape_id_splits_into_ident_hash_ident_then_member_control_identifier() {
        // `$member` lexes the same way `$version` does: one combined
        // ControlIdentifier token, not a bare `$` followed by an identifier.
        // The parser relies on this to read a member name in one step.
        let (tokens, _) = tokenize("com.foo#Bar$baz");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::Hash,
                TokenKind::Identifier,
                TokenKind::ControlIdentifier,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[5].text.as_ref(), "$baz");
    }

    #[test]
    fn error_token_on_garbage_byte() {
        let (tokens, _) = tokenize("\u{0}");
        assert_eq!(tokens[0].kind, TokenKind::Error);
    }
}
