//! Tokenizer and error-recovering parser for the Smithy IDL.
//!
//! Two-phase pipeline: [`lexer::tokenize`] produces an exhaustive token
//! stream (every byte belongs to exactly one token), then [`parser::parse`]
//! builds a resilient [`tree::Tree`] over it. Both phases are total
//! functions — parsing never fails, it reports problems in a side channel
//! of non-fatal [`tree::ParseError`]s instead.

mod lexer;
mod parser;
mod shape_id;
mod token;
mod tree;

pub use lexer::{tokenize, LexError};
pub use parser::parse;
pub use shape_id::{resolve_relative, ShapeId, ShapeIdError};
pub use token::{Token, TokenKind};
pub use tree::{
    ErrorStatement, Ident, IdlVersion, Member, ParseError, ParseErrorKind, ShapeDecl, ShapeKind,
    SimpleKind, Statement, StatementKind, TraitApplication, Tree, Value,
};
