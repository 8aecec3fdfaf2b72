//! Java source parser
//!
//! This module provides an error-tolerant parser for the Java subset the
//! remapper rewrites:
//! - **logos** for fast lexing, trivia included
//! - a hand-written recursive descent parser for declarations
//! - a body scanner for executable code
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with TokenKind and TextRange
//!     ↓
//! Parser → CompilationUnit (packages, imports, types, members, annotations)
//!     ↓
//! Body scanner → reference chains, locals, type uses
//!     ↓
//! HIR → Program index and resolution
//! ```
//!
//! Every AST node keeps the byte range it came from, so rewrites are
//! computed as replacements over the original text.

#[allow(clippy::module_inception)]
mod parser;

pub mod ast;
mod body;
mod lexer;
pub mod strings;

pub use ast::*;
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use parser::{Parse, SyntaxError, parse_java};

pub use text_size::{TextRange, TextSize};
