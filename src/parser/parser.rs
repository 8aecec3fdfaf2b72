//! Recursive descent parser for Java declarations
//!
//! Works on the non-trivia tokens of one file. Declarations are parsed into
//! the typed AST; executable code is handed to the body scanner. Errors are
//! recovered at member granularity and never abort the file.

use text_size::{TextRange, TextSize};

use super::ast::*;
use super::lexer::{Lexer, Token, TokenKind};
use super::strings;
use crate::base::Name;
use crate::descriptor::Primitive;

/// Parse result: the compilation unit and any syntax errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub unit: CompilationUnit,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Parse Java source code
pub fn parse_java(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input)
        .filter(|t| !t.kind.is_trivia())
        .collect();
    let mut parser = Parser::new(tokens, TextSize::of(input));
    let unit = parser.parse_compilation_unit();
    Parse {
        unit,
        errors: parser.errors,
    }
}

/// The parser state
pub(super) struct Parser<'t> {
    pub(super) tokens: Vec<Token<'t>>,
    pub(super) pos: usize,
    /// Exclusive upper bound of the current parse window.
    pub(super) end: usize,
    pub(super) errors: Vec<SyntaxError>,
    eof: TextSize,
}

impl<'t> Parser<'t> {
    fn new(tokens: Vec<Token<'t>>, eof: TextSize) -> Self {
        let end = tokens.len();
        Self {
            tokens,
            pos: 0,
            end,
            errors: Vec::new(),
            eof,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    pub(super) fn kind_at(&self, index: usize) -> TokenKind {
        if index < self.end {
            self.tokens[index].kind
        } else {
            TokenKind::Eof
        }
    }

    pub(super) fn token_at(&self, index: usize) -> Option<Token<'t>> {
        (index < self.end).then(|| self.tokens[index])
    }

    fn nth(&self, n: usize) -> TokenKind {
        self.kind_at(self.pos + n)
    }

    fn current(&self) -> Option<Token<'t>> {
        self.token_at(self.pos)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.nth(0) == kind
    }

    fn at_ident(&self, text: &str) -> bool {
        self.current().is_some_and(|t| t.is_ident(text))
    }

    pub(super) fn at_eof(&self) -> bool {
        self.pos >= self.end
    }

    /// Start offset of the token at `index`, or the end of the input.
    pub(super) fn offset_at(&self, index: usize) -> TextSize {
        self.tokens
            .get(index)
            .map_or(self.eof, |t| t.range.start())
    }

    fn current_start(&self) -> TextSize {
        self.offset_at(self.pos)
    }

    /// End offset of the last consumed token.
    fn prev_end(&self) -> TextSize {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(t) => t.range.end(),
            None => TextSize::from(0),
        }
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) -> Option<Token<'t>> {
        let token = self.current()?;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {what}"));
            false
        }
    }

    fn ident(&mut self) -> Option<Ident> {
        if !self.at(TokenKind::Ident) {
            return None;
        }
        self.bump().map(|t| Ident {
            text: Name::new(t.text),
            range: t.range,
        })
    }

    fn expect_ident(&mut self, what: &str) -> Option<Ident> {
        let ident = self.ident();
        if ident.is_none() {
            self.error(format!("expected {what}"));
        }
        ident
    }

    /// Run `f` with the parse window narrowed to end at `end`.
    pub(super) fn with_limit<R>(&mut self, end: usize, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.end;
        self.end = end.min(saved);
        let result = f(self);
        self.end = saved;
        result
    }

    /// Index of the token closing the bracket at `open`, or the window end if unbalanced.
    pub(super) fn matching_close(&self, open: usize) -> usize {
        let (open_kind, close_kind) = match self.kind_at(open) {
            TokenKind::LParen => (TokenKind::LParen, TokenKind::RParen),
            TokenKind::LBrace => (TokenKind::LBrace, TokenKind::RBrace),
            TokenKind::LBracket => (TokenKind::LBracket, TokenKind::RBracket),
            _ => return open,
        };
        let mut depth = 0usize;
        for index in open..self.end {
            let kind = self.tokens[index].kind;
            if kind == open_kind {
                depth += 1;
            } else if kind == close_kind {
                depth -= 1;
                if depth == 0 {
                    return index;
                }
            }
        }
        self.end
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, message: impl Into<String>) {
        let range = self
            .current()
            .map(|t| t.range)
            .unwrap_or_else(|| TextRange::empty(self.offset_at(self.pos)));
        self.errors.push(SyntaxError::new(message, range));
    }

    /// Skip to the end of the broken member: past a `;`, past a balanced
    /// block, or up to the closing brace of the enclosing body.
    fn recover_member(&mut self, start: usize) {
        if self.pos == start && !self.at_eof() && !self.at(TokenKind::RBrace) {
            self.pos += 1;
        }
        let mut depth = 0usize;
        while !self.at_eof() {
            match self.nth(0) {
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                TokenKind::Semicolon if depth == 0 => {
                    self.pos += 1;
                    return;
                }
                TokenKind::LBrace => {
                    self.pos = self.matching_close(self.pos) + 1;
                    if depth == 0 {
                        return;
                    }
                    continue;
                }
                TokenKind::RBrace => return,
                _ => {}
            }
            self.pos += 1;
        }
    }

    // =========================================================================
    // Compilation unit
    // =========================================================================

    fn parse_compilation_unit(&mut self) -> CompilationUnit {
        let mut unit = CompilationUnit::default();

        let mut pending = Some(self.parse_modifiers());
        if self.at(TokenKind::PackageKw) {
            let modifiers = pending.take().unwrap_or_default();
            let start = modifiers.range.map_or(self.current_start(), |r| r.start());
            self.pos += 1;
            if let Some(name) = self.parse_qualified_name() {
                self.expect(TokenKind::Semicolon, "`;`");
                unit.package = Some(PackageDecl {
                    annotations: modifiers.annotations,
                    name,
                    range: TextRange::new(start, self.prev_end()),
                });
            } else {
                self.error("expected package name");
            }
        }

        while self.at(TokenKind::ImportKw) {
            if let Some(import) = self.parse_import() {
                unit.imports.push(import);
            }
        }

        while !self.at_eof() {
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            let start = self.pos;
            let modifiers = match pending.take() {
                Some(m) if m.range.is_some() => m,
                _ => self.parse_modifiers(),
            };
            if self.at_type_decl_start() {
                if let Some(decl) = self.parse_type_decl(modifiers) {
                    unit.types.push(decl);
                    continue;
                }
            } else {
                self.error("expected type declaration");
            }
            if self.pos == start {
                self.pos += 1;
            }
        }

        unit
    }

    /// Import = 'import' 'static'? QualifiedName ('.' '*')? ';'
    fn parse_import(&mut self) -> Option<ImportDecl> {
        let start = self.current_start();
        self.pos += 1;
        let is_static = self.at(TokenKind::Modifier) && self.current().is_some_and(|t| t.text == "static");
        if is_static {
            self.pos += 1;
        }
        let Some(path) = self.parse_qualified_name() else {
            self.error("expected import path");
            self.recover_member(self.pos);
            return None;
        };
        let on_demand = self.at(TokenKind::Dot)
            && self.token_at(self.pos + 1).is_some_and(|t| t.text == "*");
        if on_demand {
            self.pos += 2;
        }
        self.expect(TokenKind::Semicolon, "`;`");
        Some(ImportDecl {
            is_static,
            path,
            on_demand,
            range: TextRange::new(start, self.prev_end()),
        })
    }

    pub(super) fn parse_qualified_name(&mut self) -> Option<QualifiedName> {
        let mut segments = vec![self.ident()?];
        while self.at(TokenKind::Dot) && self.nth(1) == TokenKind::Ident {
            self.pos += 1;
            segments.extend(self.ident());
        }
        Some(QualifiedName { segments })
    }

    // =========================================================================
    // Modifiers and annotations
    // =========================================================================

    pub(super) fn parse_modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::default();
        let start = self.current_start();
        let start_pos = self.pos;

        loop {
            if self.at(TokenKind::At) && self.nth(1) != TokenKind::InterfaceKw {
                match self.parse_annotation() {
                    Some(annotation) => modifiers.annotations.push(annotation),
                    None => break,
                }
            } else if self.at(TokenKind::Modifier) || self.at(TokenKind::DefaultKw) {
                if let Some(t) = self.bump() {
                    modifiers.keywords.push(Name::new(t.text));
                }
            } else if self.at_ident("sealed")
                && matches!(
                    self.nth(1),
                    TokenKind::ClassKw | TokenKind::InterfaceKw | TokenKind::Modifier | TokenKind::At
                )
            {
                self.pos += 1;
                modifiers.keywords.push(Name::new("sealed"));
            } else if self.at_ident("non")
                && self.token_at(self.pos + 1).is_some_and(|t| t.text == "-")
                && self.token_at(self.pos + 2).is_some_and(|t| t.is_ident("sealed"))
            {
                self.pos += 3;
                modifiers.keywords.push(Name::new("non-sealed"));
            } else {
                break;
            }
        }

        if self.pos > start_pos {
            modifiers.range = Some(TextRange::new(start, self.prev_end()));
        }
        modifiers
    }

    /// Annotation = '@' QualifiedName ('(' ElementValuePairs? ')')?
    pub(super) fn parse_annotation(&mut self) -> Option<Annotation> {
        let start = self.current_start();
        self.pos += 1;
        let Some(name) = self.parse_qualified_name() else {
            self.error("expected annotation name");
            return None;
        };

        let mut args = None;
        let mut args_range = None;
        if self.at(TokenKind::LParen) {
            let open = self.pos;
            let close = self.matching_close(open);
            self.pos += 1;
            let list = self.with_limit(close, |p| p.parse_annotation_args());
            self.pos = close;
            if !self.expect(TokenKind::RParen, "`)`") {
                self.pos = self.end;
            }
            args_range = Some(TextRange::new(self.offset_at(open), self.prev_end()));
            args = Some(list);
        }

        Some(Annotation {
            name,
            args,
            args_range,
            range: TextRange::new(start, self.prev_end()),
        })
    }

    fn parse_annotation_args(&mut self) -> Vec<AnnotationArg> {
        let mut args = Vec::new();
        if self.at_eof() {
            return args;
        }

        if !(self.at(TokenKind::Ident) && self.nth(1) == TokenKind::Eq) {
            let start = self.current_start();
            if let Some(value) = self.parse_element_value() {
                args.push(AnnotationArg {
                    key: None,
                    value,
                    range: TextRange::new(start, self.prev_end()),
                });
            }
            return args;
        }

        while !self.at_eof() {
            let start = self.current_start();
            let Some(key) = self.expect_ident("annotation attribute name") else {
                break;
            };
            if !self.expect(TokenKind::Eq, "`=`") {
                break;
            }
            let Some(value) = self.parse_element_value() else {
                break;
            };
            args.push(AnnotationArg {
                key: Some(key),
                value,
                range: TextRange::new(start, self.prev_end()),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        args
    }

    /// ElementValue = Annotation | '{' (ElementValue ','?)* '}' | Expression
    pub(super) fn parse_element_value(&mut self) -> Option<ElementValue> {
        match self.nth(0) {
            TokenKind::At => self
                .parse_annotation()
                .map(|a| ElementValue::Annotation(Box::new(a))),
            TokenKind::LBrace => {
                let open = self.pos;
                let close = self.matching_close(open);
                self.pos += 1;
                let elements = self.with_limit(close, |p| {
                    let mut elements = Vec::new();
                    while !p.at_eof() {
                        if p.eat(TokenKind::Comma) {
                            continue;
                        }
                        let before = p.pos;
                        match p.parse_element_value() {
                            Some(value) => elements.push(value),
                            None if p.pos == before => p.pos += 1,
                            None => {}
                        }
                    }
                    elements
                });
                self.pos = close;
                self.expect(TokenKind::RBrace, "`}`");
                Some(ElementValue::Array {
                    elements,
                    range: TextRange::new(self.offset_at(open), self.prev_end()),
                })
            }
            TokenKind::Eof => None,
            _ => {
                let start = self.pos;
                let end = self.expression_end(start);
                if end == start {
                    self.error("expected annotation value");
                    return None;
                }
                self.pos = end;
                Some(self.element_value_from(start, end))
            }
        }
    }

    /// End of an expression starting at `start`: the first `,`, `)`, `}` or `;`
    /// outside nested brackets.
    pub(super) fn expression_end(&self, start: usize) -> usize {
        let mut depth = 0usize;
        let mut index = start;
        while index < self.end {
            match self.tokens[index].kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace if depth > 0 => {
                    depth -= 1
                }
                TokenKind::Comma | TokenKind::RParen | TokenKind::RBrace | TokenKind::Semicolon
                    if depth == 0 =>
                {
                    return index;
                }
                _ => {}
            }
            index += 1;
        }
        self.end
    }

    fn element_value_from(&mut self, start: usize, end: usize) -> ElementValue {
        if end == start + 1 {
            if let Some(literal) = self.literal_at(start) {
                return ElementValue::Literal(literal);
            }
        }
        if let Some((ty, next)) = self.type_at(start) {
            if next + 2 == end
                && self.kind_at(next) == TokenKind::Dot
                && self.kind_at(next + 1) == TokenKind::ClassKw
            {
                return ElementValue::Class {
                    ty,
                    range: TextRange::new(self.offset_at(start), self.tokens[end - 1].range.end()),
                };
            }
        }
        ElementValue::Expr(self.scan_region(start, end, self.tokens[end - 1].range.end()))
    }

    pub(super) fn literal_at(&self, index: usize) -> Option<Literal> {
        let token = self.token_at(index)?;
        let kind = match token.kind {
            TokenKind::StringLit => {
                let inner = &token.text[1..token.text.len() - 1];
                LiteralKind::String(strings::unescape(inner))
            }
            TokenKind::TextBlock => {
                let inner = &token.text[3..token.text.len() - 3];
                LiteralKind::String(strings::text_block_content(inner))
            }
            TokenKind::CharLit => LiteralKind::Char,
            TokenKind::Number => LiteralKind::Number,
            TokenKind::TrueKw => LiteralKind::Bool(true),
            TokenKind::FalseKw => LiteralKind::Bool(false),
            TokenKind::NullKw => LiteralKind::Null,
            _ => return None,
        };
        Some(Literal {
            kind,
            range: token.range,
        })
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// Try to read a type starting at `index` without consuming anything.
    /// Returns the type and the index of the first token after it.
    pub(super) fn type_at(&self, index: usize) -> Option<(TypeExpr, usize)> {
        let first = self.token_at(index)?;
        let mut next = index;

        let kind = match first.kind {
            TokenKind::PrimitiveKw | TokenKind::VoidKw => {
                next += 1;
                TypeExprKind::Primitive(Primitive::from_keyword(first.text)?)
            }
            TokenKind::Ident => {
                let mut segments = Vec::new();
                loop {
                    let token = self.token_at(next)?;
                    next += 1;
                    let args = if self.kind_at(next) == TokenKind::Lt {
                        let (args, after) = self.type_args_at(next)?;
                        next = after;
                        args
                    } else {
                        Vec::new()
                    };
                    segments.push(TypeSegment {
                        name: Ident {
                            text: Name::new(token.text),
                            range: token.range,
                        },
                        args,
                    });
                    if self.kind_at(next) == TokenKind::Dot
                        && self.kind_at(next + 1) == TokenKind::Ident
                    {
                        next += 1;
                    } else {
                        break;
                    }
                }
                TypeExprKind::Named(segments)
            }
            _ => return None,
        };

        let mut dims = 0u8;
        while self.kind_at(next) == TokenKind::LBracket
            && self.kind_at(next + 1) == TokenKind::RBracket
        {
            dims = dims.saturating_add(1);
            next += 2;
        }

        let range = TextRange::new(first.range.start(), self.tokens[next - 1].range.end());
        Some((TypeExpr { kind, dims, range }, next))
    }

    /// Read `<...>` at `index`. The diamond `<>` yields no arguments.
    pub(super) fn type_args_at(&self, index: usize) -> Option<(Vec<TypeArg>, usize)> {
        let mut next = index + 1;
        let mut args = Vec::new();
        if self.kind_at(next) == TokenKind::Gt {
            return Some((args, next + 1));
        }
        loop {
            if self.kind_at(next) == TokenKind::Question {
                next += 1;
                if matches!(self.kind_at(next), TokenKind::ExtendsKw | TokenKind::SuperKw) {
                    let (bound, after) = self.type_at(next + 1)?;
                    next = after;
                    args.push(TypeArg::Wildcard(Some(bound)));
                } else {
                    args.push(TypeArg::Wildcard(None));
                }
            } else {
                let (ty, after) = self.type_at(next)?;
                next = after;
                args.push(TypeArg::Type(ty));
            }
            match self.kind_at(next) {
                TokenKind::Comma => next += 1,
                TokenKind::Gt => return Some((args, next + 1)),
                _ => return None,
            }
        }
    }

    fn parse_type(&mut self) -> Option<TypeExpr> {
        // Type-use annotations are accepted and dropped
        while self.at(TokenKind::At) && self.nth(1) != TokenKind::InterfaceKw {
            self.parse_annotation()?;
        }
        let (ty, next) = self.type_at(self.pos)?;
        self.pos = next;
        Some(ty)
    }

    fn expect_type(&mut self, what: &str) -> Option<TypeExpr> {
        let ty = self.parse_type();
        if ty.is_none() {
            self.error(format!("expected {what}"));
        }
        ty
    }

    fn parse_type_list(&mut self) -> Vec<TypeExpr> {
        let mut types = Vec::new();
        while let Some(ty) = self.expect_type("type") {
            types.push(ty);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        types
    }

    /// TypeParams = '<' (Ident ('extends' Type ('&' Type)*)?) (',' ...)* '>'
    fn parse_type_params(&mut self) -> Vec<TypeParam> {
        let mut params = Vec::new();
        self.pos += 1;
        while !self.at_eof() {
            while self.at(TokenKind::At) {
                if self.parse_annotation().is_none() {
                    break;
                }
            }
            let Some(name) = self.expect_ident("type parameter") else {
                break;
            };
            let mut bounds = Vec::new();
            if self.eat(TokenKind::ExtendsKw) {
                bounds.extend(self.expect_type("bound"));
                while self.eat(TokenKind::Amp) {
                    bounds.extend(self.expect_type("bound"));
                }
            }
            params.push(TypeParam { name, bounds });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Gt, "`>`");
        params
    }

    // =========================================================================
    // Type declarations
    // =========================================================================

    pub(super) fn at_type_decl_start(&self) -> bool {
        match self.nth(0) {
            TokenKind::ClassKw | TokenKind::InterfaceKw | TokenKind::EnumKw => true,
            TokenKind::At => self.nth(1) == TokenKind::InterfaceKw,
            TokenKind::Ident => {
                self.at_ident("record")
                    && self.nth(1) == TokenKind::Ident
                    && matches!(self.nth(2), TokenKind::LParen | TokenKind::Lt)
            }
            _ => false,
        }
    }

    /// TypeDecl = Modifiers ('class' | 'interface' | 'enum' | '@interface' | 'record') Ident ...
    pub(super) fn parse_type_decl(&mut self, modifiers: Modifiers) -> Option<TypeDecl> {
        let start = modifiers.range.map_or(self.current_start(), |r| r.start());
        let kind = match self.nth(0) {
            TokenKind::ClassKw => TypeKind::Class,
            TokenKind::InterfaceKw => TypeKind::Interface,
            TokenKind::EnumKw => TypeKind::Enum,
            TokenKind::At => {
                self.pos += 1;
                TypeKind::Annotation
            }
            _ => TypeKind::Record,
        };
        self.pos += 1;

        let name = self.expect_ident("type name")?;
        let type_params = if self.at(TokenKind::Lt) {
            self.parse_type_params()
        } else {
            Vec::new()
        };
        let record_components = if kind == TypeKind::Record && self.at(TokenKind::LParen) {
            self.parse_params()
        } else {
            Vec::new()
        };

        let mut extends = Vec::new();
        let mut implements = Vec::new();
        let mut permits = Vec::new();
        loop {
            if self.eat(TokenKind::ExtendsKw) {
                extends = self.parse_type_list();
            } else if self.eat(TokenKind::ImplementsKw) {
                implements = self.parse_type_list();
            } else if self.at_ident("permits") {
                self.pos += 1;
                permits = self.parse_type_list();
            } else {
                break;
            }
        }

        if !self.at(TokenKind::LBrace) {
            self.error("expected `{`");
            return None;
        }
        let open = self.pos;
        let close = self.matching_close(open);
        self.pos += 1;
        let members = self.with_limit(close, |p| {
            if kind == TypeKind::Enum {
                p.parse_enum_body()
            } else {
                p.parse_members()
            }
        });
        self.pos = close;
        if !self.expect(TokenKind::RBrace, "`}`") {
            self.pos = self.end;
        }

        Some(TypeDecl {
            kind,
            modifiers,
            name,
            type_params,
            extends,
            implements,
            permits,
            record_components,
            members,
            range: TextRange::new(start, self.prev_end()),
        })
    }

    fn parse_enum_body(&mut self) -> Vec<Member> {
        let mut members = Vec::new();
        while !self.at_eof() {
            if self.eat(TokenKind::Semicolon) {
                break;
            }
            if self.eat(TokenKind::Comma) {
                continue;
            }
            let start = self.current_start();
            let annotations = self.parse_modifiers().annotations;
            let Some(name) = self.ident() else {
                // Not a constant: the member section starts without a `;`
                break;
            };

            let args = if self.at(TokenKind::LParen) {
                let open = self.pos;
                let close = self.matching_close(open);
                let mut body = self.scan_region(open + 1, close, self.offset_at(close));
                body.range = TextRange::new(self.offset_at(open), self.offset_at(close));
                self.pos = (close + 1).min(self.end);
                Some(body)
            } else {
                None
            };

            let class_body = if self.at(TokenKind::LBrace) {
                let open = self.pos;
                let close = self.matching_close(open);
                self.pos += 1;
                let body = self.with_limit(close, |p| p.parse_members());
                self.pos = (close + 1).min(self.end);
                Some(body)
            } else {
                None
            };

            members.push(Member::EnumConstant(EnumConstant {
                annotations,
                name,
                args,
                class_body,
                range: TextRange::new(start, self.prev_end()),
            }));
        }
        members.extend(self.parse_members());
        members
    }

    // =========================================================================
    // Members
    // =========================================================================

    pub(super) fn parse_members(&mut self) -> Vec<Member> {
        let mut members = Vec::new();
        while !self.at_eof() && !self.at(TokenKind::RBrace) {
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            let start = self.pos;
            match self.parse_member() {
                Some(member) => members.push(member),
                None => self.recover_member(start),
            }
        }
        members
    }

    fn parse_member(&mut self) -> Option<Member> {
        if self.at(TokenKind::LBrace) {
            let body = self.parse_block_body();
            return Some(Member::Initializer(Initializer {
                is_static: false,
                body,
            }));
        }
        if self.at(TokenKind::Modifier)
            && self.current().is_some_and(|t| t.text == "static")
            && self.nth(1) == TokenKind::LBrace
        {
            self.pos += 1;
            let body = self.parse_block_body();
            return Some(Member::Initializer(Initializer {
                is_static: true,
                body,
            }));
        }

        let modifiers = self.parse_modifiers();
        let start = modifiers.range.map_or(self.current_start(), |r| r.start());

        if self.at_type_decl_start() {
            return self.parse_type_decl(modifiers).map(Member::Type);
        }

        let type_params = if self.at(TokenKind::Lt) {
            self.parse_type_params()
        } else {
            Vec::new()
        };

        // Constructor, including the compact form of records
        if self.at(TokenKind::Ident)
            && matches!(self.nth(1), TokenKind::LParen | TokenKind::LBrace)
        {
            let name = self.ident()?;
            return self
                .parse_method_rest(modifiers, type_params, None, name, start)
                .map(Member::Method);
        }

        let ty = self.expect_type("member type")?;
        let name = self.expect_ident("member name")?;
        if self.at(TokenKind::LParen) {
            self.parse_method_rest(modifiers, type_params, Some(ty), name, start)
                .map(Member::Method)
        } else {
            self.parse_field_rest(modifiers, ty, name, start)
                .map(Member::Field)
        }
    }

    fn parse_method_rest(
        &mut self,
        modifiers: Modifiers,
        type_params: Vec<TypeParam>,
        return_type: Option<TypeExpr>,
        name: Ident,
        start: TextSize,
    ) -> Option<MethodDecl> {
        let params = if self.at(TokenKind::LParen) {
            self.parse_params()
        } else {
            Vec::new()
        };
        while self.at(TokenKind::LBracket) && self.nth(1) == TokenKind::RBracket {
            self.pos += 2;
        }
        let throws = if self.eat(TokenKind::ThrowsKw) {
            self.parse_type_list()
        } else {
            Vec::new()
        };
        let default_value = if self.eat(TokenKind::DefaultKw) {
            self.parse_element_value()
        } else {
            None
        };

        let body = if self.at(TokenKind::LBrace) {
            Some(self.parse_block_body())
        } else {
            if !self.expect(TokenKind::Semicolon, "`;` or method body") {
                return None;
            }
            None
        };

        Some(MethodDecl {
            modifiers,
            type_params,
            return_type,
            name,
            params,
            throws,
            default_value,
            body,
            range: TextRange::new(start, self.prev_end()),
        })
    }

    /// Params = '(' (Modifiers Type '...'? Ident Dims) (',' ...)* ')'
    fn parse_params(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        let open = self.pos;
        let close = self.matching_close(open);
        self.pos += 1;

        self.with_limit(close, |p| {
            while !p.at_eof() {
                let modifiers = p.parse_modifiers();
                let Some(ty) = p.expect_type("parameter type") else {
                    break;
                };
                let varargs = p.eat(TokenKind::Ellipsis);
                if p.eat(TokenKind::ThisKw) {
                    // Receiver parameter
                    if !p.eat(TokenKind::Comma) {
                        break;
                    }
                    continue;
                }
                let Some(name) = p.expect_ident("parameter name") else {
                    break;
                };
                while p.at(TokenKind::LBracket) && p.nth(1) == TokenKind::RBracket {
                    p.pos += 2;
                }
                params.push(Param {
                    modifiers,
                    ty,
                    varargs,
                    name,
                });
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
        });

        self.pos = close;
        if !self.expect(TokenKind::RParen, "`)`") {
            self.pos = self.end;
        }
        params
    }

    fn parse_field_rest(
        &mut self,
        modifiers: Modifiers,
        ty: TypeExpr,
        first: Ident,
        start: TextSize,
    ) -> Option<FieldDecl> {
        let mut declarators = Vec::new();
        let mut name = first;
        loop {
            let mut dims = 0u8;
            while self.at(TokenKind::LBracket) && self.nth(1) == TokenKind::RBracket {
                dims = dims.saturating_add(1);
                self.pos += 2;
            }
            let init = if self.eat(TokenKind::Eq) {
                let from = self.pos;
                let to = self.declarator_end(from);
                let scope_end = self.offset_at(to);
                let body = self.scan_region(from, to, scope_end);
                self.pos = to;
                Some(body)
            } else {
                None
            };
            declarators.push(VariableDeclarator { name, dims, init });

            if self.eat(TokenKind::Comma) {
                name = self.expect_ident("field name")?;
                continue;
            }
            if !self.expect(TokenKind::Semicolon, "`;`") {
                return None;
            }
            break;
        }

        Some(FieldDecl {
            modifiers,
            ty,
            declarators,
            range: TextRange::new(start, self.prev_end()),
        })
    }

    /// End of a variable initializer: `;`, or a top-level `,` that starts the
    /// next declarator.
    fn declarator_end(&self, start: usize) -> usize {
        let mut depth = 0usize;
        let mut index = start;
        while index < self.end {
            match self.tokens[index].kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    if depth == 0 {
                        return index;
                    }
                    depth -= 1;
                }
                TokenKind::Semicolon if depth == 0 => return index,
                TokenKind::Comma
                    if depth == 0
                        && self.kind_at(index + 1) == TokenKind::Ident
                        && matches!(
                            self.kind_at(index + 2),
                            TokenKind::Eq | TokenKind::Comma | TokenKind::Semicolon | TokenKind::LBracket
                        ) =>
                {
                    return index;
                }
                _ => {}
            }
            index += 1;
        }
        self.end
    }

    /// Block = '{' ... '}' scanned as a body.
    fn parse_block_body(&mut self) -> Body {
        let open = self.pos;
        let close = self.matching_close(open);
        if close >= self.end {
            self.error("unclosed block");
        }
        let mut body = self.scan_region(open + 1, close, self.offset_at(close));
        let end = self
            .token_at(close)
            .map_or(self.eof, |t| t.range.end());
        body.range = TextRange::new(self.offset_at(open), end);
        self.pos = (close + 1).min(self.end);
        body
    }
}
