//! Logos-based lexer for Java sources
//!
//! Produces every token, trivia included, with its byte range. The parser
//! filters trivia out; the rewriter works on the original text.

use logos::Logos;
use text_size::{TextRange, TextSize};

/// Token classes the parser distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Whitespace,
    LineComment,
    BlockComment,

    Ident,
    StringLit,
    TextBlock,
    CharLit,
    Number,

    PackageKw,
    ImportKw,
    ClassKw,
    InterfaceKw,
    EnumKw,
    ExtendsKw,
    ImplementsKw,
    ThrowsKw,
    DefaultKw,
    NewKw,
    ThisKw,
    SuperKw,
    VoidKw,
    InstanceofKw,
    TrueKw,
    FalseKw,
    NullKw,
    /// `public`, `static`, `final`, ...
    Modifier,
    /// `int`, `boolean`, ...
    PrimitiveKw,
    /// Statement keywords the parser never looks into (`if`, `return`, ...).
    Keyword,

    At,
    Dot,
    Ellipsis,
    Comma,
    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Lt,
    Gt,
    Eq,
    Question,
    Colon,
    ColonColon,
    Arrow,
    Amp,
    /// Any other operator.
    Op,

    Error,
    /// Past the last token of the input or of the current parse window.
    Eof,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::StringLit
                | TokenKind::TextBlock
                | TokenKind::CharLit
                | TokenKind::Number
                | TokenKind::TrueKw
                | TokenKind::FalseKw
                | TokenKind::NullKw
        )
    }
}

/// A token with its kind, text, and position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub range: TextRange,
}

impl Token<'_> {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_ident(&self, text: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == text
    }
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let span = self.inner.span();
        let range = TextRange::new(
            TextSize::from(span.start as u32),
            TextSize::from(span.end as u32),
        );

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => TokenKind::Error,
        };

        Some(Token {
            kind,
            text: self.inner.slice(),
            range,
        })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Consume a text block body up to and including the closing `"""`.
fn lex_text_block(lex: &mut logos::Lexer<LogosToken>) -> bool {
    let rest = lex.remainder().as_bytes();
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            b'\\' => i += 2,
            b'"' if rest[i..].starts_with(b"\"\"\"") => {
                lex.bump(i + 3);
                return true;
            }
            _ => i += 1,
        }
    }
    false
}

/// Logos token enum - maps to TokenKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Ident,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    StringLit,

    #[token(r#"""""#, lex_text_block)]
    TextBlock,

    #[regex(r"'([^'\\\n]|\\.)*'")]
    CharLit,

    #[regex(r"[0-9][0-9a-zA-Z_]*(\.[0-9a-zA-Z_]*)?")]
    #[regex(r"\.[0-9][0-9a-zA-Z_]*")]
    Number,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("class")]
    Class,
    #[token("interface")]
    Interface,
    #[token("enum")]
    Enum,
    #[token("extends")]
    Extends,
    #[token("implements")]
    Implements,
    #[token("throws")]
    Throws,
    #[token("default")]
    Default,
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("super")]
    Super,
    #[token("void")]
    Void,
    #[token("instanceof")]
    Instanceof,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    #[token("public")]
    #[token("protected")]
    #[token("private")]
    #[token("static")]
    #[token("final")]
    #[token("abstract")]
    #[token("native")]
    #[token("synchronized")]
    #[token("transient")]
    #[token("volatile")]
    #[token("strictfp")]
    Modifier,

    #[token("boolean")]
    #[token("byte")]
    #[token("char")]
    #[token("short")]
    #[token("int")]
    #[token("long")]
    #[token("float")]
    #[token("double")]
    Primitive,

    #[token("if")]
    #[token("else")]
    #[token("for")]
    #[token("while")]
    #[token("do")]
    #[token("switch")]
    #[token("case")]
    #[token("return")]
    #[token("break")]
    #[token("continue")]
    #[token("throw")]
    #[token("try")]
    #[token("catch")]
    #[token("finally")]
    #[token("assert")]
    #[token("goto")]
    #[token("const")]
    Keyword,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("@")]
    At,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Eq,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("::")]
    ColonColon,
    #[token("->")]
    Arrow,
    #[token("&")]
    Amp,

    #[regex(r"==|!=|<=|>=|&&|\|\||\+\+|--|<<=?|&=|[+\-*/%|^!~]=?")]
    Op,
}

impl From<LogosToken> for TokenKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => TokenKind::Whitespace,
            LogosToken::LineComment => TokenKind::LineComment,
            LogosToken::BlockComment => TokenKind::BlockComment,
            LogosToken::Ident => TokenKind::Ident,
            LogosToken::StringLit => TokenKind::StringLit,
            LogosToken::TextBlock => TokenKind::TextBlock,
            LogosToken::CharLit => TokenKind::CharLit,
            LogosToken::Number => TokenKind::Number,
            LogosToken::Package => TokenKind::PackageKw,
            LogosToken::Import => TokenKind::ImportKw,
            LogosToken::Class => TokenKind::ClassKw,
            LogosToken::Interface => TokenKind::InterfaceKw,
            LogosToken::Enum => TokenKind::EnumKw,
            LogosToken::Extends => TokenKind::ExtendsKw,
            LogosToken::Implements => TokenKind::ImplementsKw,
            LogosToken::Throws => TokenKind::ThrowsKw,
            LogosToken::Default => TokenKind::DefaultKw,
            LogosToken::New => TokenKind::NewKw,
            LogosToken::This => TokenKind::ThisKw,
            LogosToken::Super => TokenKind::SuperKw,
            LogosToken::Void => TokenKind::VoidKw,
            LogosToken::Instanceof => TokenKind::InstanceofKw,
            LogosToken::True => TokenKind::TrueKw,
            LogosToken::False => TokenKind::FalseKw,
            LogosToken::Null => TokenKind::NullKw,
            LogosToken::Modifier => TokenKind::Modifier,
            LogosToken::Primitive => TokenKind::PrimitiveKw,
            LogosToken::Keyword => TokenKind::Keyword,
            LogosToken::At => TokenKind::At,
            LogosToken::Dot => TokenKind::Dot,
            LogosToken::Ellipsis => TokenKind::Ellipsis,
            LogosToken::Comma => TokenKind::Comma,
            LogosToken::Semicolon => TokenKind::Semicolon,
            LogosToken::LParen => TokenKind::LParen,
            LogosToken::RParen => TokenKind::RParen,
            LogosToken::LBrace => TokenKind::LBrace,
            LogosToken::RBrace => TokenKind::RBrace,
            LogosToken::LBracket => TokenKind::LBracket,
            LogosToken::RBracket => TokenKind::RBracket,
            LogosToken::Lt => TokenKind::Lt,
            LogosToken::Gt => TokenKind::Gt,
            LogosToken::Eq => TokenKind::Eq,
            LogosToken::Question => TokenKind::Question,
            LogosToken::Colon => TokenKind::Colon,
            LogosToken::ColonColon => TokenKind::ColonColon,
            LogosToken::Arrow => TokenKind::Arrow,
            LogosToken::Amp => TokenKind::Amp,
            LogosToken::Op => TokenKind::Op,
        }
    }
}
