//! Declaration-level syntax tree.
//!
//! Every node keeps the byte span it was parsed from so diagnostics can be
//! located precisely and fixes can be expressed as span replacements.

use crate::common::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    /// Identifier value without a verbatim `@`.
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKind {
    Public,
    Private,
    Protected,
    Internal,
    File,
    Static,
    Readonly,
    Sealed,
    Abstract,
    Virtual,
    Override,
    Partial,
    New,
    Extern,
    Unsafe,
    Volatile,
    Const,
    Required,
    Async,
    Ref,
}

impl ModifierKind {
    pub fn from_keyword(text: &str) -> Option<Self> {
        let kind = match text {
            "public" => Self::Public,
            "private" => Self::Private,
            "protected" => Self::Protected,
            "internal" => Self::Internal,
            "file" => Self::File,
            "static" => Self::Static,
            "readonly" => Self::Readonly,
            "sealed" => Self::Sealed,
            "abstract" => Self::Abstract,
            "virtual" => Self::Virtual,
            "override" => Self::Override,
            "partial" => Self::Partial,
            "new" => Self::New,
            "extern" => Self::Extern,
            "unsafe" => Self::Unsafe,
            "volatile" => Self::Volatile,
            "const" => Self::Const,
            "required" => Self::Required,
            "async" => Self::Async,
            "ref" => Self::Ref,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Protected => "protected",
            Self::Internal => "internal",
            Self::File => "file",
            Self::Static => "static",
            Self::Readonly => "readonly",
            Self::Sealed => "sealed",
            Self::Abstract => "abstract",
            Self::Virtual => "virtual",
            Self::Override => "override",
            Self::Partial => "partial",
            Self::New => "new",
            Self::Extern => "extern",
            Self::Unsafe => "unsafe",
            Self::Volatile => "volatile",
            Self::Const => "const",
            Self::Required => "required",
            Self::Async => "async",
            Self::Ref => "ref",
        }
    }

    pub fn is_accessibility(self) -> bool {
        matches!(
            self,
            Self::Public | Self::Private | Self::Protected | Self::Internal | Self::File
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub span: Span,
}

pub fn has_modifier(modifiers: &[Modifier], kind: ModifierKind) -> bool {
    modifiers.iter().any(|m| m.kind == kind)
}

#[derive(Debug, Clone)]
pub struct AttributeList {
    pub target: Option<Ident>,
    pub attributes: Vec<Attribute>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Attribute {
    /// Dotted name segments as written, e.g. `["Thinktecture", "SmartEnum"]`.
    pub name: Vec<String>,
    pub name_span: Span,
    pub type_args: Vec<TypeRef>,
    pub args: Vec<AttributeArg>,
    /// Span of the `( ... )` argument list, if present.
    pub args_span: Option<Span>,
    pub span: Span,
}

impl Attribute {
    /// Last name segment without an `Attribute` suffix.
    pub fn simple_name(&self) -> &str {
        let last = self.name.last().map(String::as_str).unwrap_or_default();
        last.strip_suffix("Attribute")
            .filter(|s| !s.is_empty())
            .unwrap_or(last)
    }

    pub fn named_arg(&self, name: &str) -> Option<&AttributeArg> {
        self.args
            .iter()
            .find(|a| a.name.as_ref().is_some_and(|n| n.text == name))
    }
}

#[derive(Debug, Clone)]
pub struct AttributeArg {
    /// `Name = value` or `name: value`
    pub name: Option<Ident>,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDeclKind {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
    Record,
    RecordStruct,
}

impl TypeDeclKind {
    pub fn is_struct_like(self) -> bool {
        matches!(self, Self::Struct | Self::RecordStruct)
    }

    pub fn is_class_like(self) -> bool {
        matches!(self, Self::Class | Self::Record)
    }

    pub fn is_record(self) -> bool {
        matches!(self, Self::Record | Self::RecordStruct)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Delegate => "delegate",
            Self::Record => "record",
            Self::RecordStruct => "record struct",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub namespace: String,
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<Modifier>,
    pub kind: TypeDeclKind,
    /// Span of the declaration keyword(s), e.g. `record struct`.
    pub keyword_span: Span,
    pub name: Ident,
    pub type_params: Vec<Ident>,
    pub primary_ctor: Option<ParameterList>,
    pub base_list: Vec<TypeRef>,
    pub constraints: Vec<ConstraintClause>,
    pub members: Vec<Member>,
    pub open_brace: Option<Span>,
    pub close_brace: Option<Span>,
    pub span: Span,
}

impl TypeDecl {
    pub fn has_modifier(&self, kind: ModifierKind) -> bool {
        has_modifier(&self.modifiers, kind)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().flat_map(|l| l.attributes.iter())
    }

    pub fn nested_types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Type(t) => Some(t),
            _ => None,
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Field(f) => Some(f),
            _ => None,
        })
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Property(p) => Some(p),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(m) => Some(m),
            _ => None,
        })
    }

    pub fn constructors(&self) -> impl Iterator<Item = &ConstructorDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Constructor(c) => Some(c),
            _ => None,
        })
    }

    /// Offset where a new member can be appended (just before `}`).
    pub fn member_insertion_point(&self) -> Option<usize> {
        self.close_brace.map(|b| b.start)
    }

    /// Offset of the first token after the attribute lists.
    pub fn header_start(&self) -> usize {
        self.modifiers
            .first()
            .map_or(self.keyword_span.start, |m| m.span.start)
    }
}

#[derive(Debug, Clone)]
pub struct ConstraintClause {
    pub param: Ident,
    pub constraints: Vec<TypeRef>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ParameterList {
    pub params: Vec<Parameter>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefKind {
    #[default]
    None,
    Ref,
    Out,
    In,
    RefReadonly,
}

impl RefKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Ref => "ref",
            Self::Out => "out",
            Self::In => "in",
            Self::RefReadonly => "ref readonly",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub attributes: Vec<AttributeList>,
    pub ref_kind: RefKind,
    pub is_params: bool,
    pub is_this: bool,
    pub ty: TypeRef,
    pub name: Ident,
    pub default: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Member {
    Field(FieldDecl),
    Property(PropertyDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    Type(TypeDecl),
    Other(OtherMember),
}

impl Member {
    pub fn span(&self) -> Span {
        match self {
            Member::Field(f) => f.span,
            Member::Property(p) => p.span,
            Member::Method(m) => m.span,
            Member::Constructor(c) => c.span,
            Member::Type(t) => t.span,
            Member::Other(o) => o.span,
        }
    }

    pub fn modifiers(&self) -> &[Modifier] {
        match self {
            Member::Field(f) => &f.modifiers,
            Member::Property(p) => &p.modifiers,
            Member::Method(m) => &m.modifiers,
            Member::Constructor(c) => &c.modifiers,
            Member::Type(t) => &t.modifiers,
            Member::Other(o) => &o.modifiers,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<Modifier>,
    pub ty: TypeRef,
    pub declarators: Vec<VariableDeclarator>,
    pub span: Span,
}

impl FieldDecl {
    pub fn has_modifier(&self, kind: ModifierKind) -> bool {
        has_modifier(&self.modifiers, kind)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().flat_map(|l| l.attributes.iter())
    }

    /// Offset of the first token after the attribute lists.
    pub fn header_start(&self) -> usize {
        self.modifiers.first().map_or(self.ty.span.start, |m| m.span.start)
    }
}

#[derive(Debug, Clone)]
pub struct VariableDeclarator {
    pub name: Ident,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct PropertyDecl {
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<Modifier>,
    pub ty: TypeRef,
    pub explicit_interface: Option<TypeRef>,
    pub name: Ident,
    pub accessor_list: Option<AccessorList>,
    pub expression_body: Option<Expr>,
    pub initializer: Option<Expr>,
    pub span: Span,
}

impl PropertyDecl {
    pub fn has_modifier(&self, kind: ModifierKind) -> bool {
        has_modifier(&self.modifiers, kind)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().flat_map(|l| l.attributes.iter())
    }

    pub fn accessor(&self, kind: AccessorKind) -> Option<&Accessor> {
        self.accessor_list
            .as_ref()
            .and_then(|list| list.accessors.iter().find(|a| a.kind == kind))
    }

    pub fn header_start(&self) -> usize {
        self.modifiers.first().map_or(self.ty.span.start, |m| m.span.start)
    }
}

#[derive(Debug, Clone)]
pub struct AccessorList {
    pub accessors: Vec<Accessor>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Get,
    Set,
    Init,
    Add,
    Remove,
}

#[derive(Debug, Clone)]
pub struct Accessor {
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<Modifier>,
    pub kind: AccessorKind,
    pub keyword_span: Span,
    pub body: AccessorBody,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum AccessorBody {
    /// `get;`
    None,
    Expression(Expr),
    Block(Block),
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<Modifier>,
    pub return_type: TypeRef,
    pub explicit_interface: Option<TypeRef>,
    pub name: Ident,
    pub type_params: Vec<Ident>,
    pub params: ParameterList,
    pub constraints: Vec<ConstraintClause>,
    pub body: Option<Body>,
    pub span: Span,
}

impl MethodDecl {
    pub fn has_modifier(&self, kind: ModifierKind) -> bool {
        has_modifier(&self.modifiers, kind)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().flat_map(|l| l.attributes.iter())
    }

    pub fn header_start(&self) -> usize {
        self.modifiers
            .first()
            .map_or(self.return_type.span.start, |m| m.span.start)
    }
}

#[derive(Debug, Clone)]
pub struct ConstructorDecl {
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<Modifier>,
    pub name: Ident,
    pub params: ParameterList,
    pub initializer: Option<ConstructorInitializer>,
    pub body: Option<Body>,
    pub span: Span,
}

impl ConstructorDecl {
    pub fn has_modifier(&self, kind: ModifierKind) -> bool {
        has_modifier(&self.modifiers, kind)
    }
}

#[derive(Debug, Clone)]
pub struct ConstructorInitializer {
    pub is_base: bool,
    pub args: Vec<Argument>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherMemberKind {
    Event,
    Operator,
    Conversion,
    Indexer,
    Finalizer,
    EnumMember,
    Unknown,
}

/// Members the rules never inspect structurally; bodies are kept so usage
/// rules still see the expressions inside them.
#[derive(Debug, Clone)]
pub struct OtherMember {
    pub kind: OtherMemberKind,
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<Modifier>,
    pub bodies: Vec<Body>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Body {
    Block(Block),
    Expression(Expr),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TypeRef {
    pub kind: TypeRefKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypeRefKind {
    /// `int`, `string`, `object`, `void`, ...
    Predefined(String),
    Named {
        global: bool,
        segments: Vec<NameSegment>,
    },
    Nullable(Box<TypeRef>),
    Array { element: Box<TypeRef>, rank: usize },
    Tuple(Vec<TupleElement>),
}

#[derive(Debug, Clone)]
pub struct NameSegment {
    pub name: Ident,
    pub type_args: Vec<TypeRef>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TupleElement {
    pub ty: TypeRef,
    pub name: Option<Ident>,
}

impl TypeRef {
    /// `var` in a local declaration.
    pub fn is_var(&self) -> bool {
        matches!(&self.kind, TypeRefKind::Named { segments, global: false }
            if segments.len() == 1 && segments[0].name.text == "var" && segments[0].type_args.is_empty())
    }

    /// Last name segment for named types.
    pub fn last_segment(&self) -> Option<&NameSegment> {
        match &self.kind {
            TypeRefKind::Named { segments, .. } => segments.last(),
            _ => None,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self.kind, TypeRefKind::Nullable(_))
    }

    /// The type with one level of `?` removed.
    pub fn without_nullable(&self) -> &TypeRef {
        match &self.kind {
            TypeRefKind::Nullable(inner) => inner,
            _ => self,
        }
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Block(Block),
    LocalDecl {
        ty: TypeRef,
        declarators: Vec<VariableDeclarator>,
        is_const: bool,
    },
    LocalFunction(Box<MethodDecl>),
    Expr(Expr),
    Return(Option<Expr>),
    If {
        cond: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        init: Vec<Stmt>,
        cond: Option<Expr>,
        step: Vec<Expr>,
        body: Box<Stmt>,
    },
    ForEach {
        ty: TypeRef,
        name: Ident,
        expr: Expr,
        body: Box<Stmt>,
    },
    Using {
        resource: Option<Box<Stmt>>,
        body: Option<Box<Stmt>>,
    },
    Lock {
        expr: Expr,
        body: Box<Stmt>,
    },
    Throw(Option<Expr>),
    Try {
        block: Block,
        catches: Vec<CatchClause>,
        finally: Option<Block>,
    },
    Switch {
        expr: Expr,
        sections: Vec<SwitchSection>,
    },
    Yield(Option<Expr>),
    Break,
    Continue,
    Empty,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub ty: Option<TypeRef>,
    pub name: Option<Ident>,
    pub filter: Option<Expr>,
    pub block: Block,
}

#[derive(Debug, Clone)]
pub struct SwitchSection {
    pub labels: Vec<Expr>,
    pub stmts: Vec<Stmt>,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Int,
    Real,
    String,
    Char,
    True,
    False,
    Null,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(LiteralKind),
    Name {
        name: Ident,
        type_args: Vec<TypeRef>,
    },
    /// Predefined type used as an expression receiver, e.g. `string.Empty`.
    PredefinedType(String),
    This,
    Base,
    /// `default` (None) or `default(T)`.
    Default(Option<TypeRef>),
    /// `new T(args) { init }`; `ty` is None for target-typed `new(...)`.
    ObjectCreation {
        ty: Option<TypeRef>,
        args: Option<Vec<Argument>>,
        initializer: Option<Vec<Expr>>,
    },
    ArrayCreation {
        ty: Option<TypeRef>,
        sizes: Vec<Expr>,
        initializer: Option<Vec<Expr>>,
    },
    AnonymousObject(Vec<Expr>),
    TypeOf(TypeRef),
    NameOf(Box<Expr>),
    SizeOf(TypeRef),
    Cast {
        ty: TypeRef,
        expr: Box<Expr>,
    },
    Parenthesized(Box<Expr>),
    Tuple(Vec<Argument>),
    Lambda(Box<Lambda>),
    MemberAccess {
        target: Box<Expr>,
        name: Ident,
        type_args: Vec<TypeRef>,
        conditional: bool,
    },
    Invocation {
        callee: Box<Expr>,
        args: Vec<Argument>,
        args_span: Span,
    },
    ElementAccess {
        target: Box<Expr>,
        args: Vec<Argument>,
    },
    Unary {
        op: String,
        operand: Box<Expr>,
    },
    Postfix {
        op: String,
        operand: Box<Expr>,
    },
    Binary {
        op: String,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assignment {
        op: String,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        when_true: Box<Expr>,
        when_false: Box<Expr>,
    },
    Is {
        expr: Box<Expr>,
        pattern: Box<Pattern>,
    },
    As {
        expr: Box<Expr>,
        ty: TypeRef,
    },
    Throw(Box<Expr>),
    Collection(Vec<Expr>),
    /// `out var x` / `out int x` inside an argument list.
    Declaration {
        ty: TypeRef,
        name: Ident,
    },
    /// Switch/with expressions, query expressions, anonymous methods.
    Opaque,
}

#[derive(Debug, Clone)]
pub enum Pattern {
    Type {
        ty: TypeRef,
        designation: Option<Ident>,
    },
    Constant(Expr),
    Not(Box<Pattern>),
    Opaque(Span),
}

#[derive(Debug, Clone)]
pub struct Argument {
    pub name: Option<Ident>,
    pub ref_kind: RefKind,
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Lambda {
    pub modifiers: Vec<Modifier>,
    pub params: Vec<LambdaParam>,
    /// `(a, b) => ...` rather than `a => ...`
    pub parenthesized: bool,
    pub params_span: Span,
    pub arrow_span: Span,
    pub body: LambdaBody,
    pub span: Span,
}

impl Lambda {
    pub fn is_static(&self) -> bool {
        has_modifier(&self.modifiers, ModifierKind::Static)
    }
}

#[derive(Debug, Clone)]
pub struct LambdaParam {
    pub ty: Option<TypeRef>,
    pub name: Ident,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

impl Expr {
    pub fn opaque(span: Span) -> Self {
        Self {
            kind: ExprKind::Opaque,
            span,
        }
    }

    /// `default` or `default(T)`.
    pub fn is_default_literal(&self) -> bool {
        matches!(self.kind, ExprKind::Default(_))
    }

    /// Strips any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expr {
        match &self.kind {
            ExprKind::Parenthesized(inner) => inner.unparenthesized(),
            _ => self,
        }
    }
}
