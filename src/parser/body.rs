//! Body scanner
//!
//! Executable code is not parsed into statements. The scanner walks a token
//! window and records what name resolution needs: reference chains, local
//! variable declarations with their scopes, explicit type uses, annotations,
//! anonymous classes and local type declarations.

use text_size::{TextRange, TextSize};

use super::ast::*;
use super::lexer::TokenKind;
use super::parser::Parser;
use crate::base::Name;

impl<'t> Parser<'t> {
    /// Scan tokens `start..end`. Locals declared at the top level of the
    /// window stay visible until `scope_end`.
    pub(super) fn scan_region(&mut self, start: usize, end: usize, scope_end: TextSize) -> Body {
        let end = end.min(self.end);
        let mut body = Body {
            range: if start < end {
                TextRange::new(self.offset_at(start), self.tokens[end - 1].range.end())
            } else {
                TextRange::empty(self.offset_at(start))
            },
            ..Body::default()
        };
        let saved = self.pos;
        self.scan_into(&mut body, start, end, scope_end);
        self.pos = saved;
        body
    }

    fn scan_into(&mut self, body: &mut Body, start: usize, end: usize, scope_end: TextSize) {
        // Type of the declaration a `,` would continue
        let mut pending: Option<Option<TypeExpr>> = None;
        let mut in_case_label = false;
        let mut i = start;

        while i < end {
            let token = self.tokens[i];
            i = match token.kind {
                TokenKind::LBrace => {
                    let close = self.close_within(i, end);
                    self.scan_into(body, i + 1, close, self.offset_at(close));
                    pending = None;
                    close + 1
                }
                TokenKind::LParen => self.scan_paren(body, i, end, scope_end),
                TokenKind::LBracket => {
                    let close = self.close_within(i, end);
                    self.scan_into(body, i + 1, close, scope_end);
                    close + 1
                }
                TokenKind::At if self.kind_at(i + 1) == TokenKind::Ident => {
                    self.pos = i;
                    if let Some(annotation) = self.with_limit(end, |p| p.parse_annotation()) {
                        body.annotations.push(annotation);
                    }
                    self.pos.max(i + 1)
                }
                TokenKind::ClassKw | TokenKind::InterfaceKw | TokenKind::EnumKw
                    if !self.follows_dot(i) =>
                {
                    self.scan_local_type(body, i, end)
                }
                TokenKind::NewKw => self.scan_new(body, i, end, scope_end),
                TokenKind::ThisKw | TokenKind::SuperKw => {
                    if self.kind_at(i + 1) == TokenKind::LParen {
                        // Explicit constructor invocation
                        self.scan_paren(body, i + 1, end, scope_end)
                    } else {
                        let head = if token.kind == TokenKind::ThisKw {
                            ChainHead::This(token.range)
                        } else {
                            ChainHead::Super(token.range)
                        };
                        self.scan_segments(body, head, i + 1, end, scope_end)
                    }
                }
                TokenKind::InstanceofKw => self.scan_instanceof(body, i, end, scope_end),
                TokenKind::Keyword => {
                    if token.text == "case" {
                        in_case_label = true;
                    }
                    i + 1
                }
                TokenKind::Arrow | TokenKind::Colon => {
                    in_case_label = false;
                    i + 1
                }
                TokenKind::Ident => {
                    if self.follows_dot(i) {
                        i + 1
                    } else if self.kind_at(i + 1) == TokenKind::Arrow && !in_case_label {
                        let scope = self.lambda_scope_end(i + 1, end);
                        if let Some(name) = self.ident_at(i) {
                            declare(body, name, None, scope);
                        }
                        i + 1
                    } else if token.text == "record" && self.local_record_at(i, end) {
                        self.scan_local_type(body, i, end)
                    } else if let Some((ty, next)) = self.try_local_decl(body, i, end, scope_end) {
                        pending = Some(ty);
                        next
                    } else {
                        self.scan_name_chain(body, i, end, scope_end)
                    }
                }
                TokenKind::PrimitiveKw => match self.try_local_decl(body, i, end, scope_end) {
                    Some((ty, next)) => {
                        pending = Some(ty);
                        next
                    }
                    None => i + 1,
                },
                TokenKind::Comma if pending.is_some() && self.starts_declarator(i + 1) => {
                    if let (Some(ty), Some(name)) = (pending.clone(), self.ident_at(i + 1)) {
                        let scope = TextRange::new(name.range.start(), scope_end.max(name.range.start()));
                        body.locals.push(LocalVar { name, ty, scope });
                    }
                    i + 2
                }
                TokenKind::Semicolon => {
                    pending = None;
                    i + 1
                }
                _ => i + 1,
            };
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn close_within(&self, open: usize, end: usize) -> usize {
        self.matching_close(open).min(end)
    }

    fn follows_dot(&self, index: usize) -> bool {
        index > 0
            && matches!(
                self.tokens[index - 1].kind,
                TokenKind::Dot | TokenKind::ColonColon
            )
    }

    fn ident_at(&self, index: usize) -> Option<Ident> {
        let token = self.token_at(index)?;
        (token.kind == TokenKind::Ident).then(|| Ident {
            text: Name::new(token.text),
            range: token.range,
        })
    }

    /// `name` followed by something that ends or continues a declarator.
    fn starts_declarator(&self, index: usize) -> bool {
        self.kind_at(index) == TokenKind::Ident
            && matches!(
                self.kind_at(index + 1),
                TokenKind::Eq | TokenKind::Comma | TokenKind::Semicolon | TokenKind::LBracket
            )
    }

    fn end_before(&self, index: usize) -> TextSize {
        index
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(TextSize::from(0), |t| t.range.end())
    }

    /// End of the lambda whose arrow sits at `arrow`.
    fn lambda_scope_end(&self, arrow: usize, end: usize) -> TextSize {
        let first = arrow + 1;
        let stop = if self.kind_at(first) == TokenKind::LBrace {
            self.close_within(first, end) + 1
        } else {
            self.expression_end(first).min(end)
        };
        self.end_before(stop.max(first))
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// `Type name` followed by `=`, `;`, `,`, `:`, `)`, `[` or the window end.
    /// Returns the declared type (`None` for `var`) and the index after the name.
    fn try_local_decl(
        &mut self,
        body: &mut Body,
        index: usize,
        end: usize,
        scope_end: TextSize,
    ) -> Option<(Option<TypeExpr>, usize)> {
        if self.tokens[index].text == "yield" {
            return None;
        }
        let (ty, next) = self.type_at(index)?;
        if next >= end {
            return None;
        }
        let name = self.ident_at(next)?;
        if next + 1 < end
            && !matches!(
                self.kind_at(next + 1),
                TokenKind::Eq
                    | TokenKind::Semicolon
                    | TokenKind::Comma
                    | TokenKind::Colon
                    | TokenKind::RParen
                    | TokenKind::LBracket
            )
        {
            return None;
        }

        let ty = if ty.is_var() {
            None
        } else {
            body.type_uses.push(ty.clone());
            Some(ty)
        };
        let scope = TextRange::new(name.range.start(), scope_end.max(name.range.start()));
        body.locals.push(LocalVar {
            name,
            ty: ty.clone(),
            scope,
        });
        Some((ty, next + 1))
    }

    fn local_record_at(&mut self, index: usize, end: usize) -> bool {
        self.pos = index;
        self.with_limit(end, |p| p.at_type_decl_start())
    }

    fn scan_local_type(&mut self, body: &mut Body, index: usize, end: usize) -> usize {
        self.pos = index;
        let decl = self.with_limit(end, |p| {
            let modifiers = p.parse_modifiers();
            p.parse_type_decl(modifiers)
        });
        if let Some(decl) = decl {
            body.local_types.push(decl);
        }
        self.pos.max(index + 1)
    }

    fn scan_instanceof(
        &mut self,
        body: &mut Body,
        index: usize,
        end: usize,
        scope_end: TextSize,
    ) -> usize {
        let mut next = index + 1;
        while self.kind_at(next) == TokenKind::Modifier {
            next += 1;
        }
        let Some((ty, after)) = self.type_at(next) else {
            return next;
        };
        let after = after.min(end);
        body.type_uses.push(ty.clone());
        if after < end {
            if let Some(name) = self.ident_at(after) {
                let scope = TextRange::new(name.range.start(), scope_end.max(name.range.start()));
                body.locals.push(LocalVar {
                    name,
                    ty: Some(ty),
                    scope,
                });
                return after + 1;
            }
        }
        after
    }

    // =========================================================================
    // Parentheses: lambdas, casts, groups
    // =========================================================================

    fn scan_paren(&mut self, body: &mut Body, open: usize, end: usize, scope_end: TextSize) -> usize {
        let close = self.close_within(open, end);

        if close < end && self.kind_at(close + 1) == TokenKind::Arrow {
            let scope = self.lambda_scope_end(close + 1, end);
            self.declare_lambda_params(body, open + 1, close, scope);
            return close + 1;
        }

        if let Some((ty, next)) = self.type_at(open + 1) {
            let explicit_type = ty.dims > 0 || ty.segments().iter().any(|s| !s.args.is_empty());
            let is_primitive = matches!(ty.kind, TypeExprKind::Primitive(_));
            if next == close && (explicit_type || is_primitive) && self.starts_cast_operand(close + 1) {
                if !is_primitive {
                    body.type_uses.push(ty);
                }
                return close + 1;
            }
        }

        self.scan_into(body, open + 1, close, scope_end);
        close + 1
    }

    fn starts_cast_operand(&self, index: usize) -> bool {
        let Some(token) = self.token_at(index) else {
            return false;
        };
        match token.kind {
            TokenKind::Ident
            | TokenKind::LParen
            | TokenKind::ThisKw
            | TokenKind::SuperKw
            | TokenKind::NewKw => true,
            TokenKind::Op => token.text == "!" || token.text == "~",
            kind => kind.is_literal(),
        }
    }

    fn declare_lambda_params(&mut self, body: &mut Body, start: usize, end: usize, scope: TextSize) {
        let mut index = start;
        while index < end {
            while self.kind_at(index) == TokenKind::Modifier {
                index += 1;
            }
            if self.kind_at(index + 1) == TokenKind::Comma || index + 1 >= end {
                if let Some(name) = self.ident_at(index) {
                    declare(body, name, None, scope);
                }
                index += 2;
                continue;
            }
            let Some((ty, next)) = self.type_at(index) else {
                break;
            };
            let next = if self.kind_at(next) == TokenKind::Ellipsis {
                next + 1
            } else {
                next
            };
            let Some(name) = self.ident_at(next) else {
                break;
            };
            let ty = if ty.is_var() {
                None
            } else {
                body.type_uses.push(ty.clone());
                Some(ty)
            };
            declare(body, name, ty, scope);
            index = next + 2;
        }
    }

    // =========================================================================
    // Instance creation
    // =========================================================================

    fn scan_new(&mut self, body: &mut Body, index: usize, end: usize, scope_end: TextSize) -> usize {
        let mut next = index + 1;
        while self.kind_at(next) == TokenKind::At && self.kind_at(next + 1) == TokenKind::Ident {
            self.pos = next;
            match self.with_limit(end, |p| p.parse_annotation()) {
                Some(annotation) => body.annotations.push(annotation),
                None => return next + 1,
            }
            next = self.pos;
        }
        let Some((ty, after)) = self.type_at(next) else {
            return next;
        };
        if after >= end {
            body.type_uses.push(ty);
            return end;
        }

        match self.kind_at(after) {
            TokenKind::LParen => {
                let close = self.close_within(after, end);
                self.scan_into(body, after + 1, close, scope_end);
                let body_open = close + 1;
                if body_open < end && self.kind_at(body_open) == TokenKind::LBrace {
                    let body_close = self.close_within(body_open, end);
                    self.pos = body_open + 1;
                    let members = self.with_limit(body_close, |p| p.parse_members());
                    let range_end = self
                        .token_at(body_close)
                        .map_or(self.end_before(body_close), |t| t.range.end());
                    body.anonymous_classes.push(AnonymousClass {
                        base: ty,
                        members,
                        range: TextRange::new(self.offset_at(index), range_end),
                    });
                    body_close + 1
                } else {
                    self.scan_segments(body, ChainHead::New(ty), close + 1, end, scope_end)
                }
            }
            // Array creation
            _ => {
                if !matches!(ty.kind, TypeExprKind::Primitive(_)) {
                    body.type_uses.push(ty);
                }
                after
            }
        }
    }

    // =========================================================================
    // Reference chains
    // =========================================================================

    fn scan_name_chain(&mut self, body: &mut Body, index: usize, end: usize, scope_end: TextSize) -> usize {
        let Some(name) = self.ident_at(index) else {
            return index + 1;
        };
        if index + 1 < end && self.kind_at(index + 1) == TokenKind::LParen {
            let close = self.close_within(index + 1, end);
            let argc = self.count_args(index + 1, close);
            self.scan_into(body, index + 2, close, scope_end);
            self.scan_segments(body, ChainHead::Call { name, argc }, close + 1, end, scope_end)
        } else {
            self.scan_segments(body, ChainHead::Name(name), index + 1, end, scope_end)
        }
    }

    /// Read `.name`, `.call(..)`, `::ref` and `[..]` segments after a head and
    /// record the chain. Returns the index after the chain.
    fn scan_segments(
        &mut self,
        body: &mut Body,
        head: ChainHead,
        start: usize,
        end: usize,
        scope_end: TextSize,
    ) -> usize {
        let mut segments = Vec::new();
        let mut index = start;

        while index < end {
            match self.kind_at(index) {
                TokenKind::Dot => {
                    let mut name_at = index + 1;
                    if self.kind_at(name_at) == TokenKind::Lt {
                        // Explicit type arguments, `a.<T>call()`
                        let Some((args, after)) = self.type_args_at(name_at) else {
                            break;
                        };
                        for arg in args {
                            if let TypeArg::Type(ty) | TypeArg::Wildcard(Some(ty)) = arg {
                                body.type_uses.push(ty);
                            }
                        }
                        name_at = after;
                    }
                    match self.kind_at(name_at) {
                        TokenKind::Ident => {
                            let Some(name) = self.ident_at(name_at) else {
                                break;
                            };
                            if name_at + 1 < end && self.kind_at(name_at + 1) == TokenKind::LParen {
                                let close = self.close_within(name_at + 1, end);
                                let argc = self.count_args(name_at + 1, close);
                                self.scan_into(body, name_at + 2, close, scope_end);
                                segments.push(ChainSegment::Call { name, argc });
                                index = close + 1;
                            } else {
                                segments.push(ChainSegment::Field(name));
                                index = name_at + 1;
                            }
                        }
                        TokenKind::ClassKw => {
                            index = name_at + 1;
                            break;
                        }
                        // `Outer.this`, `outer.new Inner()`
                        _ => {
                            index = name_at;
                            break;
                        }
                    }
                }
                TokenKind::ColonColon => {
                    if let Some(name) = self.ident_at(index + 1) {
                        segments.push(ChainSegment::MethodRef(name));
                    }
                    index += 2;
                    break;
                }
                TokenKind::LBracket => {
                    let close = self.close_within(index, end);
                    self.scan_into(body, index + 1, close, scope_end);
                    segments.push(ChainSegment::Index);
                    index = close + 1;
                }
                _ => break,
            }
        }

        body.chains.push(ExprChain { head, segments });
        index
    }

    /// Number of arguments between the parentheses at `open` and `close`.
    fn count_args(&self, open: usize, close: usize) -> usize {
        if close <= open + 1 {
            return 0;
        }
        let mut count = 1;
        let mut depth = 0usize;
        let mut index = open + 1;
        while index < close {
            match self.kind_at(index) {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1)
                }
                TokenKind::Comma if depth == 0 => count += 1,
                // Type arguments may contain commas
                TokenKind::NewKw => {
                    if let Some((_, after)) = self.type_at(index + 1) {
                        index = after;
                        continue;
                    }
                }
                TokenKind::Dot if self.kind_at(index + 1) == TokenKind::Lt => {
                    if let Some((_, after)) = self.type_args_at(index + 1) {
                        index = after;
                        continue;
                    }
                }
                _ => {}
            }
            index += 1;
        }
        count
    }
}

fn declare(body: &mut Body, name: Ident, ty: Option<TypeExpr>, scope_end: TextSize) {
    let start = name.range.start();
    body.locals.push(LocalVar {
        name,
        ty,
        scope: TextRange::new(start, scope_end.max(start)),
    });
}
