//! Diagnostics raised while remapping.
//!
//! Unresolved symbols are expected and never reported. Everything else the
//! remapper declines to rewrite becomes an [`Issue`], logged and (unless
//! disabled) written into the source as a `TODO(<tool>)` comment.

use std::fmt;
use std::path::PathBuf;

use crate::base::{FileId, LineCol, Name};

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Error,
    Warning,
}

/// Why a construct was left untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Issue {
    /// Some members of an override set translate and others do not.
    AmbiguousOrigin { symbol: String },
    /// Candidates translate to different names. Each entry is `origin -> new name`.
    DivergentRename { candidates: Vec<(String, Name)> },
    /// Wildcard targets, non-literal values, unimplemented annotations.
    UnsupportedConstruct { reason: String },
    /// A mixin member annotation in a class without targets.
    MissingTarget { mixin: String },
    MalformedDescriptor { message: String },
    WriteFailure { message: String },
}

impl Issue {
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Issue::UnsupportedConstruct {
            reason: reason.into(),
        }
    }

    /// Stable code for this kind of issue.
    pub fn code(&self) -> &'static str {
        match self {
            Issue::AmbiguousOrigin { .. } => "R0001",
            Issue::DivergentRename { .. } => "R0002",
            Issue::UnsupportedConstruct { .. } => "R0003",
            Issue::MissingTarget { .. } => "R0004",
            Issue::MalformedDescriptor { .. } => "R0005",
            Issue::WriteFailure { .. } => "R0006",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Issue::MalformedDescriptor { .. } | Issue::WriteFailure { .. } => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::AmbiguousOrigin { symbol } => {
                write!(f, "could not resolve all method origins of {symbol}")
            }
            Issue::DivergentRename { candidates } => {
                f.write_str("origins have different new names")?;
                for (origin, name) in candidates {
                    write!(f, "\n{origin} -> {name}")?;
                }
                Ok(())
            }
            Issue::UnsupportedConstruct { reason } => f.write_str(reason),
            Issue::MissingTarget { mixin } => {
                write!(f, "could not determine a single target for mixin {mixin}")
            }
            Issue::MalformedDescriptor { message } => write!(f, "malformed descriptor: {message}"),
            Issue::WriteFailure { message } => write!(f, "failed to apply edit: {message}"),
        }
    }
}

/// An issue located in a file.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    pub file: FileId,
    pub path: PathBuf,
    /// Position of the declaration or import the issue is anchored to.
    pub position: LineCol,
    /// `owner#member` of the enclosing declaration, if any.
    pub context: Option<String>,
    pub issue: Issue,
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        self.issue.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: [{}] ",
            self.path.display(),
            self.position.line + 1,
            self.position.col + 1,
            self.issue.code()
        )?;
        if let Some(context) = &self.context {
            write!(f, "{context}: ")?;
        }
        write!(f, "{}", self.issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divergent_rename_lists_candidates() {
        let issue = Issue::DivergentRename {
            candidates: vec![
                ("a/A#f".to_string(), Name::new("g")),
                ("a/B#f".to_string(), Name::new("h")),
            ],
        };
        assert_eq!(
            issue.to_string(),
            "origins have different new names\na/A#f -> g\na/B#f -> h"
        );
        assert_eq!(issue.code(), "R0002");
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic {
            file: FileId::new(0),
            path: PathBuf::from("a/Foo.java"),
            position: LineCol { line: 2, col: 4 },
            context: Some("a/Foo#run".to_string()),
            issue: Issue::unsupported("wildcard target"),
        };
        assert_eq!(diagnostic.to_string(), "a/Foo.java:3:5: [R0003] a/Foo#run: wildcard target");
        assert_eq!(diagnostic.severity(), Severity::Warning);
    }
}
