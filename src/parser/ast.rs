//! Typed AST for the Java subset the remapper understands.
//!
//! Declarations are parsed fully. Method bodies, initializers and non-literal
//! annotation values are kept as a [`Body`]: the reference chains, local
//! variables and type uses found in them, which is all name resolution needs.

use text_size::TextRange;

use crate::base::Name;
use crate::descriptor::Primitive;

// ============================================================================
// NAMES
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ident {
    pub text: Name,
    pub range: TextRange,
}

impl Ident {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// A dotted name, `a.b.C`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QualifiedName {
    pub segments: Vec<Ident>,
}

impl QualifiedName {
    pub fn range(&self) -> TextRange {
        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => first.range.cover(last.range),
            _ => TextRange::default(),
        }
    }

    pub fn last(&self) -> Option<&Ident> {
        self.segments.last()
    }

    pub fn to_dotted(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(&segment.text);
        }
        out
    }
}

// ============================================================================
// COMPILATION UNIT
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompilationUnit {
    pub package: Option<PackageDecl>,
    pub imports: Vec<ImportDecl>,
    pub types: Vec<TypeDecl>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageDecl {
    pub annotations: Vec<Annotation>,
    pub name: QualifiedName,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportDecl {
    pub is_static: bool,
    /// Imported path without the trailing `.*`.
    pub path: QualifiedName,
    pub on_demand: bool,
    pub range: TextRange,
}

// ============================================================================
// TYPE DECLARATIONS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<TypeExpr>,
    pub implements: Vec<TypeExpr>,
    pub permits: Vec<TypeExpr>,
    pub record_components: Vec<Param>,
    pub members: Vec<Member>,
    /// From the first modifier or annotation to the closing brace.
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParam {
    pub name: Ident,
    pub bounds: Vec<TypeExpr>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    Type(TypeDecl),
    Initializer(Initializer),
    EnumConstant(EnumConstant),
}

impl Member {
    pub fn range(&self) -> TextRange {
        match self {
            Member::Field(f) => f.range,
            Member::Method(m) => m.range,
            Member::Type(t) => t.range,
            Member::Initializer(i) => i.body.range,
            Member::EnumConstant(c) => c.range,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Package,
    Private,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub annotations: Vec<Annotation>,
    pub keywords: Vec<Name>,
    /// `None` when the declaration has no modifiers at all.
    pub range: Option<TextRange>,
}

impl Modifiers {
    pub fn has(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }

    pub fn is_static(&self) -> bool {
        self.has("static")
    }

    pub fn visibility(&self) -> Visibility {
        if self.has("public") {
            Visibility::Public
        } else if self.has("protected") {
            Visibility::Protected
        } else if self.has("private") {
            Visibility::Private
        } else {
            Visibility::Package
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDecl {
    pub modifiers: Modifiers,
    pub ty: TypeExpr,
    pub declarators: Vec<VariableDeclarator>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableDeclarator {
    pub name: Ident,
    /// Extra array dimensions written after the name (`int x[]`).
    pub dims: u8,
    pub init: Option<Body>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDecl {
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeParam>,
    /// `None` for constructors.
    pub return_type: Option<TypeExpr>,
    pub name: Ident,
    pub params: Vec<Param>,
    pub throws: Vec<TypeExpr>,
    /// Default value of an annotation type element.
    pub default_value: Option<ElementValue>,
    pub body: Option<Body>,
    pub range: TextRange,
}

impl MethodDecl {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub modifiers: Modifiers,
    pub ty: TypeExpr,
    pub varargs: bool,
    pub name: Ident,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Initializer {
    pub is_static: bool,
    pub body: Body,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumConstant {
    pub annotations: Vec<Annotation>,
    pub name: Ident,
    pub args: Option<Body>,
    pub class_body: Option<Vec<Member>>,
    pub range: TextRange,
}

// ============================================================================
// TYPES
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub dims: u8,
    pub range: TextRange,
}

impl TypeExpr {
    /// `var` in a local declaration.
    pub fn is_var(&self) -> bool {
        match &self.kind {
            TypeExprKind::Named(segments) => {
                segments.len() == 1 && segments[0].name.text == "var" && segments[0].args.is_empty()
            }
            _ => false,
        }
    }

    pub fn segments(&self) -> &[TypeSegment] {
        match &self.kind {
            TypeExprKind::Named(segments) => segments,
            _ => &[],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeExprKind {
    Primitive(Primitive),
    /// `a.b.Outer<T>.Inner`
    Named(Vec<TypeSegment>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSegment {
    pub name: Ident,
    pub args: Vec<TypeArg>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeArg {
    Type(TypeExpr),
    Wildcard(Option<TypeExpr>),
}

// ============================================================================
// ANNOTATIONS
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub name: QualifiedName,
    /// `None` for a marker annotation without parentheses.
    pub args: Option<Vec<AnnotationArg>>,
    /// Range of the parenthesized argument list, parentheses included.
    pub args_range: Option<TextRange>,
    pub range: TextRange,
}

impl Annotation {
    pub fn simple_name(&self) -> &str {
        self.name.last().map_or("", |i| i.as_str())
    }

    /// Argument by key. The single unnamed argument counts as `value`.
    pub fn arg(&self, key: &str) -> Option<&AnnotationArg> {
        self.args.as_ref()?.iter().find(|a| match &a.key {
            Some(k) => k.text == key,
            None => key == "value",
        })
    }

    pub fn args(&self) -> &[AnnotationArg] {
        self.args.as_deref().unwrap_or(&[])
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationArg {
    pub key: Option<Ident>,
    pub value: ElementValue,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementValue {
    Literal(Literal),
    /// `Foo.class`
    Class { ty: TypeExpr, range: TextRange },
    /// `{a, b}`
    Array { elements: Vec<ElementValue>, range: TextRange },
    Annotation(Box<Annotation>),
    /// Anything else: constants, concatenations.
    Expr(Body),
}

impl ElementValue {
    pub fn range(&self) -> TextRange {
        match self {
            ElementValue::Literal(l) => l.range,
            ElementValue::Class { range, .. } | ElementValue::Array { range, .. } => *range,
            ElementValue::Annotation(a) => a.range,
            ElementValue::Expr(b) => b.range,
        }
    }

    /// The elements of an array value, or the value itself.
    pub fn flatten(&self) -> Vec<&ElementValue> {
        match self {
            ElementValue::Array { elements, .. } => elements.iter().collect(),
            other => vec![other],
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ElementValue::Literal(Literal {
                kind: LiteralKind::String(s),
                ..
            }) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ElementValue::Literal(Literal {
                kind: LiteralKind::Bool(b),
                ..
            }) => Some(*b),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    /// Unescaped string contents.
    String(String),
    Char,
    Number,
    Bool(bool),
    Null,
}

// ============================================================================
// BODIES
// ============================================================================

/// References found in executable code.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Body {
    pub range: TextRange,
    pub chains: Vec<ExprChain>,
    pub locals: Vec<LocalVar>,
    pub type_uses: Vec<TypeExpr>,
    pub annotations: Vec<Annotation>,
    pub anonymous_classes: Vec<AnonymousClass>,
    pub local_types: Vec<TypeDecl>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalVar {
    pub name: Ident,
    /// `None` for lambda parameters and `var`.
    pub ty: Option<TypeExpr>,
    /// Where the name is visible: from the declaration to the end of the block.
    pub scope: TextRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnonymousClass {
    pub base: TypeExpr,
    pub members: Vec<Member>,
    pub range: TextRange,
}

/// `a.b.c()`, `this.x`, `new T().m()`, `T::m`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExprChain {
    pub head: ChainHead,
    pub segments: Vec<ChainSegment>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainHead {
    Name(Ident),
    /// Unqualified call, `foo(a, b)`.
    Call { name: Ident, argc: usize },
    This(TextRange),
    Super(TextRange),
    New(TypeExpr),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainSegment {
    Field(Ident),
    Call { name: Ident, argc: usize },
    MethodRef(Ident),
    /// `[...]`
    Index,
}
