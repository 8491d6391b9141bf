use smithy_lsp_position::ByteSpan;
use std::sync::Arc;

/// An identifier or shape-id reference occurrence: raw text plus the byte
/// range it came from. Interpreting the text as a (possibly relative)
/// shape ID is `ShapeId::parse`'s job; resolving it against a namespace is
/// `SmithyFile`'s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub text: Arc<str>,
    pub span: ByteSpan,
}

impl Ident {
    pub fn new(text: impl Into<Arc<str>>, span: ByteSpan) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

/// A value appearing on the right of `:`, `=`, inside trait arguments, or
/// inside `metadata`/control statements. Mirrors the Smithy node-value
/// grammar (a superset of JSON).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null(ByteSpan),
    Bool(bool, ByteSpan),
    Number(String, ByteSpan),
    String(String, ByteSpan),
    /// A bare identifier used as a value, e.g. an unquoted shape-id-like
    /// token inside a trait argument list.
    Ident(Ident),
    Array(Vec<Value>, ByteSpan),
    Object(Vec<(Ident, Value)>, ByteSpan),
}

impl Value {
    pub fn span(&self) -> ByteSpan {
        match self {
            Value::Null(s) | Value::Bool(_, s) | Value::Number(_, s) | Value::String(_, s) => *s,
            Value::Ident(ident) => ident.span,
            Value::Array(_, s) | Value::Object(_, s) => *s,
        }
    }
}

/// A trait application: `@name` or `@name(value)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitApplication {
    pub name: Ident,
    pub value: Option<Value>,
    pub span: ByteSpan,
}

/// One member of a shape body: a structure/union field, or (treated
/// uniformly for simplicity) a service/operation/resource property like
/// `input: Foo` or `errors: [A, B]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub traits: Vec<TraitApplication>,
    pub name: Ident,
    /// Single shape-id target, e.g. `foo: Bar`.
    pub target: Option<Ident>,
    /// Array-valued shape-id targets, e.g. `errors: [A, B]` or `identifiers: {id: String}`
    /// keys reuse `target` per-entry instead; this covers bare-identifier lists.
    pub target_list: Vec<Ident>,
    pub default: Option<Value>,
    /// `foo := { ... }` inline shape definition.
    pub inline_shape: Option<Box<ShapeDecl>>,
    pub span: ByteSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleKind {
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

impl SimpleKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "blob" => Self::Blob,
            "boolean" => Self::Boolean,
            "document" => Self::Document,
            "string" => Self::String,
            "byte" => Self::Byte,
            "short" => Self::Short,
            "integer" => Self::Integer,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "bigInteger" => Self::BigInteger,
            "bigDecimal" => Self::BigDecimal,
            "timestamp" => Self::Timestamp,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Simple(SimpleKind),
    List,
    Map,
    Set,
    Structure,
    Union,
    Enum,
    IntEnum,
    Service,
    Operation,
    Resource,
}

impl ShapeKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "list" => Self::List,
            "map" => Self::Map,
            "set" => Self::Set,
            "structure" => Self::Structure,
            "union" => Self::Union,
            "enum" => Self::Enum,
            "intEnum" => Self::IntEnum,
            "service" => Self::Service,
            "operation" => Self::Operation,
            "resource" => Self::Resource,
            other => Self::Simple(SimpleKind::from_keyword(other)?),
        })
    }

    /// True for `enum`/`intEnum`/mixin-elision/inline-IO forms that are
    /// only legal under IDL v2.
    pub fn v2_only(self) -> bool {
        matches!(self, Self::Enum | Self::IntEnum)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDecl {
    pub shape_kind: ShapeKind,
    pub id: Ident,
    pub traits: Vec<TraitApplication>,
    pub mixins: Vec<Ident>,
    pub members: Vec<Member>,
    pub span: ByteSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedToken,
    ExpectedIdent,
    ExpectedShapeId,
    UnterminatedString,
    InvalidEscape,
    MixinsNotAllowed,
    InlineIoNotAllowed,
    DuplicateMember,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: ByteSpan,
    pub message: String,
}

/// A statement that failed to parse, recovered at the next statement
/// boundary. The tree retains it (rather than discarding it) so position
/// lookups over the erroring region still resolve to *something*.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorStatement {
    pub span: ByteSpan,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Control { key: Ident, value: Value },
    Metadata { key: Ident, value: Value },
    Namespace { name: Ident },
    Use { shape_id: Ident },
    ShapeDecl(ShapeDecl),
    Apply {
        target: Ident,
        trait_app: TraitApplication,
    },
    Error(ErrorStatement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: ByteSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdlVersion {
    V1,
    V2,
}

/// The resilient parse tree for one document: a flat forest of top-level
/// statements (no single root node — Smithy files have no enclosing
/// construct), plus the dialect the `$version` control statement selected.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub statements: Vec<Statement>,
    pub idl_version: IdlVersion,
}

impl Tree {
    /// Returns the innermost statement whose span contains `offset`, if any.
    pub fn statement_at(&self, offset: usize) -> Option<&Statement> {
        self.statements
            .iter()
            .find(|stmt| stmt.span.contains(offset) || stmt.span.end == offset)
    }

    pub fn namespace(&self) -> Option<&Ident> {
        self.statements.iter().find_map(|stmt| match &stmt.kind {
            StatementKind::Namespace { name } => Some(name),
            _ => None,
        })
    }

    pub fn uses(&self) -> impl Iterator<Item = &Ident> {
        self.statements.iter().filter_map(|stmt| match &stmt.kind {
            StatementKind::Use { shape_id } => Some(shape_id),
            _ => None,
        })
    }

    pub fn shape_decls(&self) -> impl Iterator<Item = &ShapeDecl> {
        self.statements.iter().filter_map(|stmt| match &stmt.kind {
            StatementKind::ShapeDecl(decl) => Some(decl),
            _ => None,
        })
    }
}
