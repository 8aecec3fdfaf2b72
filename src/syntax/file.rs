//! Parsed Java source file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::base::{FileId, LineIndex, TextRange, TextSize};
use crate::parser::{CompilationUnit, SyntaxError, parse_java};

/// Whether a file is rewritten or only consulted for resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileRole {
    /// Part of the build unit being remapped.
    Source,
    /// Dependency source: indexed for hierarchy and resolution, never written.
    Library,
}

/// A parsed Java file together with the text it was parsed from.
#[derive(Debug, Clone)]
pub struct SyntaxFile {
    id: FileId,
    path: PathBuf,
    text: Arc<str>,
    unit: CompilationUnit,
    errors: Vec<SyntaxError>,
    line_index: LineIndex,
    role: FileRole,
}

impl PartialEq for SyntaxFile {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.path == other.path && self.text == other.text
    }
}

impl Eq for SyntaxFile {}

impl SyntaxFile {
    /// Parse `text` as the file at `path`.
    pub fn new(id: FileId, path: impl Into<PathBuf>, text: impl Into<Arc<str>>, role: FileRole) -> Self {
        let text = text.into();
        let parse = parse_java(&text);
        let line_index = LineIndex::new(&text);
        Self {
            id,
            path: path.into(),
            text,
            unit: parse.unit,
            errors: parse.errors,
            line_index,
            role,
        }
    }

    /// Create a rewritable source file
    pub fn source(id: FileId, path: impl Into<PathBuf>, text: impl Into<Arc<str>>) -> Self {
        Self::new(id, path, text, FileRole::Source)
    }

    /// Create a resolution-only library file
    pub fn library(id: FileId, path: impl Into<PathBuf>, text: impl Into<Arc<str>>) -> Self {
        Self::new(id, path, text, FileRole::Library)
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: FileId) {
        self.id = id;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the file; sibling files share it.
    pub fn directory(&self) -> Option<&Path> {
        self.path.parent()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn unit(&self) -> &CompilationUnit {
        &self.unit
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// Check if parsing had errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn role(&self) -> FileRole {
        self.role
    }

    pub fn is_source(&self) -> bool {
        self.role == FileRole::Source
    }

    /// Package in internal form (`a/b`), empty for the default package.
    pub fn package_internal(&self) -> String {
        self.unit
            .package
            .as_ref()
            .map(|p| p.name.to_dotted().replace('.', "/"))
            .unwrap_or_default()
    }

    /// Source text covered by `range`.
    pub fn slice(&self, range: TextRange) -> &str {
        &self.text[range]
    }

    /// Leading whitespace of the line containing `offset`.
    pub fn indentation_at(&self, offset: TextSize) -> &str {
        let start = self.line_index.line_start(offset);
        let line = &self.text[usize::from(start)..];
        let len = line
            .bytes()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        &line[..len]
    }
}
