//! JVM type descriptors.
//!
//! Parses and encodes field/method descriptors (`I`, `[Ljava/lang/String;`,
//! `(IJ)V`) and rewrites the class references embedded in descriptor-like
//! strings.
//!
//! ```text
//! SourceType ──encode_raw_type──▶ RawType ──descriptor()──▶ "Lfoo/Bar;"
//!                                    ▲
//!                     parse_field_descriptor / parse_method_descriptor
//! ```

use std::fmt;

use smol_str::SmolStr;
use thiserror::Error;

/// Internal name used when a type variable has no bound.
pub const OBJECT_INTERNAL_NAME: &str = "java/lang/Object";

// ============================================================================
// ERRORS
// ============================================================================

/// A descriptor string that does not follow the JVM grammar.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("malformed descriptor `{descriptor}`: unknown type tag `{tag}` at offset {offset}")]
    UnknownTag {
        descriptor: String,
        tag: char,
        offset: usize,
    },

    #[error(
        "malformed descriptor `{descriptor}`: class reference at offset {offset} has no terminating `;`"
    )]
    UnterminatedClass { descriptor: String, offset: usize },

    #[error("malformed descriptor `{descriptor}`: {reason}")]
    Malformed {
        descriptor: String,
        reason: &'static str,
    },
}

impl DescriptorError {
    pub(crate) fn malformed(descriptor: &str, reason: &'static str) -> Self {
        Self::Malformed {
            descriptor: descriptor.to_string(),
            reason,
        }
    }

    /// The offending descriptor text.
    pub fn descriptor(&self) -> &str {
        match self {
            Self::UnknownTag { descriptor, .. }
            | Self::UnterminatedClass { descriptor, .. }
            | Self::Malformed { descriptor, .. } => descriptor,
        }
    }
}

// ============================================================================
// RAW TYPES
// ============================================================================

/// JVM primitive types, `void` included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl Primitive {
    pub const ALL: [Primitive; 9] = [
        Primitive::Boolean,
        Primitive::Byte,
        Primitive::Char,
        Primitive::Short,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
        Primitive::Void,
    ];

    /// Single-letter descriptor tag.
    pub const fn tag(self) -> char {
        match self {
            Primitive::Boolean => 'Z',
            Primitive::Byte => 'B',
            Primitive::Char => 'C',
            Primitive::Short => 'S',
            Primitive::Int => 'I',
            Primitive::Long => 'J',
            Primitive::Float => 'F',
            Primitive::Double => 'D',
            Primitive::Void => 'V',
        }
    }

    pub fn from_tag(tag: char) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.tag() == tag)
    }

    /// Java source keyword (`int`, `boolean`, ...).
    pub const fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Void => "void",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.keyword() == keyword)
    }
}

/// An erased JVM type in canonical internal form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RawType {
    Primitive(Primitive),
    Array(Box<RawType>),
    /// Internal class name, e.g. `java/lang/String` or `a/Outer$Inner`.
    Object(SmolStr),
}

impl RawType {
    pub fn object(internal_name: impl Into<SmolStr>) -> Self {
        RawType::Object(internal_name.into())
    }

    pub fn array_of(component: RawType) -> Self {
        RawType::Array(Box::new(component))
    }

    /// Append the descriptor encoding of this type to `out`.
    pub fn write_descriptor(&self, out: &mut String) {
        match self {
            RawType::Primitive(p) => out.push(p.tag()),
            RawType::Array(component) => {
                out.push('[');
                component.write_descriptor(out);
            }
            RawType::Object(name) => {
                out.push('L');
                out.push_str(name);
                out.push(';');
            }
        }
    }

    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out);
        out
    }
}

impl fmt::Display for RawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

/// Parameter and return types of a method descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub params: Vec<RawType>,
    pub ret: RawType,
}

impl MethodDescriptor {
    pub fn new(params: Vec<RawType>, ret: RawType) -> Self {
        Self { params, ret }
    }

    pub fn parse(descriptor: &str) -> Result<Self, DescriptorError> {
        parse_method_descriptor(descriptor)
    }

    /// Descriptor of the parameter list only, e.g. `(ILjava/lang/String;)`.
    pub fn params_descriptor(&self) -> String {
        let mut out = String::from("(");
        for param in &self.params {
            param.write_descriptor(&mut out);
        }
        out.push(')');
        out
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.params_descriptor())?;
        f.write_str(&self.ret.descriptor())
    }
}

// ============================================================================
// PARSING
// ============================================================================

struct Cursor<'a> {
    descriptor: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(descriptor: &'a str) -> Self {
        Self { descriptor, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.descriptor[self.pos..].chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.descriptor.len()
    }

    fn parse_type(&mut self) -> Result<RawType, DescriptorError> {
        let start = self.pos;
        let Some(tag) = self.peek() else {
            return Err(DescriptorError::malformed(
                self.descriptor,
                "unexpected end of descriptor",
            ));
        };
        self.pos += tag.len_utf8();

        match tag {
            '[' => Ok(RawType::array_of(self.parse_type()?)),
            'L' => {
                let rest = &self.descriptor[self.pos..];
                let Some(end) = rest.find(';') else {
                    return Err(DescriptorError::UnterminatedClass {
                        descriptor: self.descriptor.to_string(),
                        offset: start,
                    });
                };
                let name = &rest[..end];
                if name.is_empty() || name.contains(['(', ')', '[', '.']) {
                    return Err(DescriptorError::UnterminatedClass {
                        descriptor: self.descriptor.to_string(),
                        offset: start,
                    });
                }
                self.pos += end + 1;
                Ok(RawType::object(name))
            }
            _ => Primitive::from_tag(tag)
                .map(RawType::Primitive)
                .ok_or_else(|| DescriptorError::UnknownTag {
                    descriptor: self.descriptor.to_string(),
                    tag,
                    offset: start,
                }),
        }
    }
}

/// Parse a single field descriptor such as `[[I` or `Ljava/util/List;`.
pub fn parse_field_descriptor(descriptor: &str) -> Result<RawType, DescriptorError> {
    let mut cursor = Cursor::new(descriptor);
    let ty = cursor.parse_type()?;
    if ty == RawType::Primitive(Primitive::Void) {
        return Err(DescriptorError::malformed(descriptor, "field of type void"));
    }
    if !cursor.at_end() {
        return Err(DescriptorError::malformed(descriptor, "trailing characters"));
    }
    Ok(ty)
}

/// Parse a method descriptor such as `(ILjava/lang/String;)V`.
pub fn parse_method_descriptor(descriptor: &str) -> Result<MethodDescriptor, DescriptorError> {
    let mut cursor = Cursor::new(descriptor);
    if cursor.peek() != Some('(') {
        return Err(DescriptorError::malformed(descriptor, "expected `(`"));
    }
    cursor.pos += 1;

    let mut params = Vec::new();
    loop {
        match cursor.peek() {
            Some(')') => {
                cursor.pos += 1;
                break;
            }
            Some(_) => params.push(cursor.parse_type()?),
            None => return Err(DescriptorError::malformed(descriptor, "expected `)`")),
        }
    }

    let ret = cursor.parse_type()?;
    if !cursor.at_end() {
        return Err(DescriptorError::malformed(descriptor, "trailing characters"));
    }
    if params.contains(&RawType::Primitive(Primitive::Void)) {
        return Err(DescriptorError::malformed(descriptor, "parameter of type void"));
    }
    Ok(MethodDescriptor { params, ret })
}

// ============================================================================
// ENCODING
// ============================================================================

/// A source-level type after name resolution, before erasure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceType {
    Primitive(Primitive),
    Array(Box<SourceType>),
    /// A resolved class, by internal name.
    Class(SmolStr),
    /// A type variable with its declared bounds (possibly none).
    Variable { bounds: Vec<SourceType> },
}

/// Erase a source type into its canonical raw form.
///
/// Type variables erase to their first bound, or `java/lang/Object` when unbounded.
pub fn encode_raw_type(ty: &SourceType) -> RawType {
    match ty {
        SourceType::Primitive(p) => RawType::Primitive(*p),
        SourceType::Array(component) => RawType::array_of(encode_raw_type(component)),
        SourceType::Class(name) => RawType::Object(name.clone()),
        SourceType::Variable { bounds } => match bounds.first() {
            Some(bound) => encode_raw_type(bound),
            None => RawType::object(OBJECT_INTERNAL_NAME),
        },
    }
}

/// Build a method descriptor from resolved parameter and return types.
/// A missing return type (constructors) encodes as `V`.
pub fn encode_method_descriptor(params: &[SourceType], ret: Option<&SourceType>) -> MethodDescriptor {
    MethodDescriptor {
        params: params.iter().map(encode_raw_type).collect(),
        ret: ret
            .map(encode_raw_type)
            .unwrap_or(RawType::Primitive(Primitive::Void)),
    }
}

// ============================================================================
// EMBEDDED CLASS REFERENCES
// ============================================================================

fn is_internal_name_char(c: char) -> bool {
    c == '/' || c == '$' || unicode_ident::is_xid_continue(c)
}

/// Replace every `L<internal-name>;` span whose class `translate` knows.
///
/// Text outside matched spans, and spans `translate` declines, pass through
/// unchanged. Works on plain descriptors as well as selector strings such as
/// `Lfoo/Bar;baz(Lfoo/Qux;)V`.
pub fn rewrite_embedded_class_refs<F>(text: &str, mut translate: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('L') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let name_len = after
            .char_indices()
            .find(|&(_, c)| !is_internal_name_char(c))
            .map(|(i, _)| i)
            .unwrap_or(after.len());

        if name_len > 0 && after[name_len..].starts_with(';') {
            let name = &after[..name_len];
            out.push('L');
            match translate(name) {
                Some(new_name) => out.push_str(&new_name),
                None => out.push_str(name),
            }
            out.push(';');
            rest = &after[name_len + 1..];
        } else {
            out.push('L');
            rest = after;
        }
    }

    out.push_str(rest);
    out
}
