//! Member selector strings: `Lowner;name(desc)`, `name(desc)`, `name:desc`, `name`.

use std::fmt;

use crate::base::Name;
use crate::descriptor::{DescriptorError, parse_field_descriptor, parse_method_descriptor};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectorDescriptor {
    /// `(params)ret` right after the name.
    Method(String),
    /// Field type after a `:`.
    Field(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberSelector {
    /// Internal name of an explicit owner.
    pub owner: Option<Name>,
    pub name: Name,
    pub descriptor: Option<SelectorDescriptor>,
}

impl MemberSelector {
    pub fn parse(text: &str) -> Result<Self, DescriptorError> {
        let (owner, rest) = split_owner(text)?;

        let (name, descriptor) = if let Some(i) = rest.find('(') {
            let desc = &rest[i..];
            parse_method_descriptor(desc)?;
            (&rest[..i], Some(SelectorDescriptor::Method(desc.to_string())))
        } else if let Some(i) = rest.find(':') {
            let desc = &rest[i + 1..];
            parse_field_descriptor(desc)?;
            (&rest[..i], Some(SelectorDescriptor::Field(desc.to_string())))
        } else {
            (rest, None)
        };

        Ok(Self {
            owner: owner.map(Name::new),
            name: Name::new(name),
            descriptor,
        })
    }

    pub fn method_descriptor(&self) -> Option<&str> {
        match &self.descriptor {
            Some(SelectorDescriptor::Method(desc)) => Some(desc),
            _ => None,
        }
    }

    pub fn field_descriptor(&self) -> Option<&str> {
        match &self.descriptor {
            Some(SelectorDescriptor::Field(desc)) => Some(desc),
            _ => None,
        }
    }

    /// Constructors and static initializers keep their names.
    pub fn is_initializer(&self) -> bool {
        self.name == "<init>" || self.name == "<clinit>"
    }
}

/// `Lowner;rest` -> `(Some(owner), rest)`. A leading `L` only starts an
/// owner when a `;` follows before any descriptor.
fn split_owner(text: &str) -> Result<(Option<&str>, &str), DescriptorError> {
    let Some(body) = text.strip_prefix('L') else {
        return Ok((None, text));
    };
    let descriptor_start = text.find(['(', ':']).unwrap_or(text.len());
    match text.find(';') {
        Some(semi) if semi < descriptor_start => {
            let owner = &body[..semi - 1];
            if owner.is_empty() {
                return Err(DescriptorError::malformed(text, "empty owner"));
            }
            Ok((Some(owner), &text[semi + 1..]))
        }
        _ => Ok((None, text)),
    }
}

impl fmt::Display for MemberSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(owner) = &self.owner {
            write!(f, "L{owner};")?;
        }
        f.write_str(&self.name)?;
        match &self.descriptor {
            Some(SelectorDescriptor::Method(desc)) => f.write_str(desc),
            Some(SelectorDescriptor::Field(desc)) => write!(f, ":{desc}"),
            None => Ok(()),
        }
    }
}
