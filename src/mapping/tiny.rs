//! Tiny v2 mapping reader.
//!
//! ```text
//! tiny	2	0	official	intermediary	named
//! c	a	net/minecraft/class_1	net/minecraft/Foo
//! 	f	I	b	field_1	count
//! 	m	(La;)V	c	method_1	accept
//! 		p	1		param_1	other
//! ```
//!
//! Parameters, local variables and comments are skipped. Descriptors are
//! always spelled in the first namespace.

use tracing::debug;

use super::{MappingError, NamespaceMapping};
use crate::base::Name;
use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};

/// Parse a Tiny v2 document into a [`NamespaceMapping`].
pub fn parse_tiny_v2(text: &str) -> Result<NamespaceMapping, MappingError> {
    let mut lines = text.lines().enumerate();
    let Some((_, header)) = lines.next() else {
        return Err(MappingError::syntax(1, "empty mapping file"));
    };

    let header: Vec<&str> = header.split('\t').collect();
    if header.len() < 5 || header[0] != "tiny" || header[1] != "2" {
        return Err(MappingError::UnsupportedHeader(header.join("\t")));
    }
    let source = header[3];
    let destinations = &header[4..];
    let mut table = NamespaceMapping::new(source, destinations);
    let name_count = destinations.len() + 1;

    let mut escaped_names = false;
    let mut current_class: Option<Name> = None;
    let mut in_header = true;

    for (index, line) in lines {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let depth = line.bytes().take_while(|b| *b == b'\t').count();
        let columns: Vec<&str> = line[depth..].split('\t').collect();

        if in_header && depth == 1 {
            if columns[0] == "escaped-names" {
                escaped_names = true;
            }
            continue;
        }
        in_header = false;

        let names = |from: usize| -> Result<Vec<String>, MappingError> {
            let names = columns.get(from..from + name_count).ok_or_else(|| {
                MappingError::syntax(line_no, format!("expected {name_count} names"))
            })?;
            Ok(names
                .iter()
                .map(|n| if escaped_names { unescape(n) } else { n.to_string() })
                .collect())
        };

        match (depth, columns[0]) {
            (0, "c") => {
                let names = names(1)?;
                let dst: Vec<&str> = names[1..].iter().map(String::as_str).collect();
                table.class(&names[0], &dst);
                current_class = Some(Name::new(&names[0]));
            }
            (1, kind @ ("f" | "m")) => {
                let class = current_class
                    .as_ref()
                    .and_then(|c| table.get_class_mut(c))
                    .ok_or_else(|| MappingError::syntax(line_no, "member outside of a class"))?;
                let descriptor = *columns
                    .get(1)
                    .ok_or_else(|| MappingError::syntax(line_no, "missing descriptor"))?;
                let names = names(2)?;
                let dst: Vec<&str> = names[1..].iter().map(String::as_str).collect();

                if kind == "f" {
                    parse_field_descriptor(descriptor)
                        .map_err(|source| MappingError::Descriptor { line: line_no, source })?;
                    class.field(&names[0], Some(descriptor), &dst);
                } else {
                    parse_method_descriptor(descriptor)
                        .map_err(|source| MappingError::Descriptor { line: line_no, source })?;
                    class.method(&names[0], descriptor, &dst);
                }
            }
            (0, other) => {
                return Err(MappingError::syntax(
                    line_no,
                    format!("unknown top-level entry `{other}`"),
                ));
            }
            // Comments, parameters and locals
            _ => {}
        }
    }

    debug!(
        "[MAPPING] Loaded {} classes ({} -> {:?})",
        table.class_count(),
        source,
        destinations
    );
    Ok(table)
}

fn unescape(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "tiny\t2\t0\tofficial\tnamed\n\
c\ta\tpkg/Foo\n\
\tc\tA comment on the class\n\
\tf\tI\tb\tcount\n\
\tm\t(La;)V\tc\taccept\n\
\t\tp\t1\t\tother\n\
c\td\t\n";

    #[test]
    fn test_parse_sample() {
        let table = parse_tiny_v2(SAMPLE).unwrap();
        let named = table.namespace_id("named").unwrap();
        assert_eq!(table.class_count(), 2);

        let foo = table.get_class("a").unwrap();
        assert_eq!(foo.name_in(named), "pkg/Foo");
        assert_eq!(foo.get_field("b", Some("I")).unwrap().name_in(named), "count");
        assert_eq!(foo.get_method("c", "(La;)V").unwrap().name_in(named), "accept");
        assert_eq!(table.get_class("d").unwrap().name_in(named), "d");
    }

    #[test]
    fn test_rejects_v1_header() {
        let err = parse_tiny_v2("v1\tofficial\tnamed\n").unwrap_err();
        assert!(matches!(err, MappingError::UnsupportedHeader(_)));
    }

    #[test]
    fn test_rejects_bad_descriptor() {
        let text = "tiny\t2\t0\tofficial\tnamed\nc\ta\tb\n\tm\t(Q)V\tc\td\n";
        let err = parse_tiny_v2(text).unwrap_err();
        assert!(matches!(err, MappingError::Descriptor { line: 3, .. }));
    }

    #[test]
    fn test_missing_names() {
        let text = "tiny\t2\t0\tofficial\tnamed\nc\ta\n";
        let err = parse_tiny_v2(text).unwrap_err();
        assert!(matches!(err, MappingError::Syntax { line: 2, .. }));
    }

    #[test]
    fn test_escaped_names() {
        let text = "tiny\t2\t0\tofficial\tnamed\n\tescaped-names\nc\ta\\tb\tc\n";
        let table = parse_tiny_v2(text).unwrap();
        assert!(table.get_class("a\tb").is_some());
    }
}
