//! Immutable per-run context and the per-file edit sink.
//!
//! Every rewriter stage receives a shared [`RemapContext`] and writes into
//! the [`FileSink`] of the file it analyses. Nothing in the context changes
//! during analysis, so files are analysed concurrently without locking.

use tracing::{error, warn};

use super::config::RemapConfig;
use super::diagnostics::{Diagnostic, Issue};
use super::error::RemapError;
use super::transaction::Edit;
use crate::base::{FileId, LineCol, Name, TextRange, TextSize};
use crate::descriptor::parse_method_descriptor;
use crate::hir::{DeclId, ProgramIndex, ReferenceIndex, ReferenceLocator, Resolver};
use crate::mapping::{ClassEntry, FieldSymbol, MappingChain, MethodSymbol, NamespaceMapping};
use crate::syntax::SyntaxFile;

// ============================================================================
// CONTEXT
// ============================================================================

/// Everything a rewriter may consult.
#[derive(Clone, Copy)]
pub struct RemapContext<'a> {
    pub program: &'a ProgramIndex,
    pub resolver: Resolver<'a>,
    pub chain: &'a MappingChain,
    pub config: &'a RemapConfig,
    /// Resolved references, per file.
    pub references: &'a ReferenceIndex,
    /// Usage search for renamed mixin members.
    pub locator: &'a dyn ReferenceLocator,
}

impl<'a> RemapContext<'a> {
    pub fn new(
        program: &'a ProgramIndex,
        chain: &'a MappingChain,
        config: &'a RemapConfig,
        references: &'a ReferenceIndex,
    ) -> Self {
        Self {
            program,
            resolver: Resolver::new(program),
            chain,
            config,
            references,
            locator: references,
        }
    }

    /// Replace the usage search.
    pub fn with_locator(mut self, locator: &'a dyn ReferenceLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn first_table(&self) -> Option<&'a NamespaceMapping> {
        self.chain.first_table()
    }

    /// `owner#member` or the internal class name, for logs and diagnostics.
    pub fn describe(&self, decl: DeclId) -> String {
        match decl {
            DeclId::Class(id) => self.program.class(id).internal_name.to_string(),
            DeclId::Field(id) => {
                let field = self.program.field(id);
                format!("{}#{}", self.program.class(field.owner).internal_name, field.name)
            }
            DeclId::Method(id) => {
                let method = self.program.method(id);
                format!("{}#{}", self.program.class(method.owner).internal_name, method.name)
            }
        }
    }

    // ========================================================================
    // MEMBER LOOKUP ON TARGET CLASSES
    // ========================================================================

    /// `owner` followed by the internal names of its known supertypes.
    pub fn lookup_owners(&self, owner: &str) -> Vec<Name> {
        let mut owners = vec![Name::new(owner)];
        if let Some(id) = self.program.class_by_internal_name(owner) {
            owners.extend(
                self.resolver
                    .ancestors(id)
                    .iter()
                    .map(|c| Name::new(self.program.class_ref_name(c))),
            );
        }
        owners
    }

    /// Final name of method `owner.name descriptor`. When `owner` has no
    /// entry for it, the nearest supertype with one answers.
    pub fn member_method(&self, owner: &str, name: &str, descriptor: &str) -> Option<Name> {
        let table = self.first_table()?;
        self.lookup_owners(owner).into_iter().find_map(|candidate| {
            table
                .get_class(&candidate)?
                .get_method(name, descriptor)?;
            self.chain
                .resolve_method(&MethodSymbol::new(candidate, name, descriptor))
                .map(|m| m.name)
        })
    }

    /// Final name of field `owner.name`, searched the same way as
    /// [`member_method`](Self::member_method).
    pub fn member_field(&self, owner: &str, name: &str, descriptor: Option<&str>) -> Option<Name> {
        let table = self.first_table()?;
        self.lookup_owners(owner).into_iter().find_map(|candidate| {
            let descriptor = field_key(table.get_class(&candidate)?, name, descriptor)?;
            self.chain
                .resolve_field(&FieldSymbol::new(candidate, name, descriptor.map(Name::new)))
                .map(|f| f.name)
        })
    }

    /// New name of field `owner.name` itself, `None` when it keeps its name.
    pub fn translate_field(&self, owner: &str, name: &str, descriptor: Option<&str>) -> Option<Name> {
        let class = self.first_table()?.get_class(owner)?;
        let descriptor = field_key(class, name, descriptor)?;
        self.chain.translate_field(owner, name, descriptor)
    }

    /// Every typed entry of field `owner.name` in the nearest class that
    /// maps one, with its final name. Used when the field's type is unknown.
    pub fn fields_by_name(&self, owner: &str, name: &str) -> Vec<(String, Option<Name>)> {
        let Some(table) = self.first_table() else {
            return Vec::new();
        };
        for candidate in self.lookup_owners(owner) {
            let Some(class) = table.get_class(&candidate) else {
                continue;
            };
            let entries: Vec<(String, Option<Name>)> = class
                .fields()
                .iter()
                .filter(|f| f.src == name)
                .map(|f| {
                    let symbol = FieldSymbol::new(candidate.clone(), name, f.descriptor.clone());
                    (
                        format!("{}#{}:{}", candidate, name, f.descriptor.as_deref().unwrap_or("?")),
                        self.chain.resolve_field(&symbol).map(|s| s.name),
                    )
                })
                .collect();
            if !entries.is_empty() {
                return entries;
            }
        }
        Vec::new()
    }

    /// Every overload of `owner.name` in the nearest class that maps one,
    /// optionally restricted to `argc` parameters, with its final name.
    pub fn methods_by_name(
        &self,
        owner: &str,
        name: &str,
        argc: Option<usize>,
    ) -> Vec<(String, Option<Name>)> {
        let Some(table) = self.first_table() else {
            return Vec::new();
        };
        for candidate in self.lookup_owners(owner) {
            let Some(class) = table.get_class(&candidate) else {
                continue;
            };
            let entries: Vec<(String, Option<Name>)> = class
                .methods_named(name)
                .filter(|m| {
                    argc.is_none_or(|argc| {
                        parse_method_descriptor(&m.descriptor).is_ok_and(|d| d.params.len() == argc)
                    })
                })
                .map(|m| {
                    let symbol = MethodSymbol::new(candidate.clone(), name, m.descriptor.clone());
                    (
                        format!("{}#{}{}", candidate, name, m.descriptor),
                        self.chain.resolve_method(&symbol).map(|s| s.name),
                    )
                })
                .collect();
            if !entries.is_empty() {
                return entries;
            }
        }
        Vec::new()
    }
}

/// Descriptor to look `name` up with in `class`. A descriptor no entry
/// carries is dropped when the name alone is unambiguous; otherwise the
/// field is unresolved.
fn field_key<'d>(class: &ClassEntry, name: &str, descriptor: Option<&'d str>) -> Option<Option<&'d str>> {
    if class.get_field(name, descriptor).is_some() {
        return Some(descriptor);
    }
    let mut named = class.fields().iter().filter(|f| f.src == name);
    match (named.next(), named.next()) {
        (Some(_), None) => Some(None),
        _ => None,
    }
}

// ============================================================================
// SINK
// ============================================================================

/// Edits and diagnostics produced while analysing one file.
#[derive(Debug)]
pub struct FileOutcome {
    pub file: FileId,
    pub edits: Vec<Edit>,
    /// Edits to other files, e.g. usages of a renamed package-private member.
    pub foreign: Vec<(FileId, Edit)>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Collects the output of every stage for one file.
pub struct FileSink<'a> {
    file: &'a SyntaxFile,
    program: &'a ProgramIndex,
    config: &'a RemapConfig,
    outcome: FileOutcome,
}

impl<'a> FileSink<'a> {
    pub fn new(ctx: &RemapContext<'a>, file: &'a SyntaxFile) -> Self {
        Self {
            file,
            program: ctx.program,
            config: ctx.config,
            outcome: FileOutcome {
                file: file.id(),
                edits: Vec::new(),
                foreign: Vec::new(),
                diagnostics: Vec::new(),
            },
        }
    }

    pub fn file(&self) -> &'a SyntaxFile {
        self.file
    }

    pub fn file_id(&self) -> FileId {
        self.file.id()
    }

    pub fn edits(&self) -> &[Edit] {
        &self.outcome.edits
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.outcome.diagnostics
    }

    /// Replace the text at `range` in this file. No-op when it already reads `text`.
    pub fn replace(&mut self, range: TextRange, text: &str) {
        let current = self.file.slice(range);
        if current != text {
            self.outcome.edits.push(Edit::replace(range, current, text));
        }
    }

    /// Replace text in any file of the program.
    pub fn replace_in(&mut self, file: FileId, range: TextRange, text: &str) -> Result<(), RemapError> {
        if file == self.file.id() {
            self.replace(range, text);
            return Ok(());
        }
        let other = self
            .program
            .files()
            .get(file.index())
            .ok_or(RemapError::MissingFile(file))?;
        let current = other.slice(range);
        if current != text {
            self.outcome
                .foreign
                .push((file, Edit::replace(range, current, text)));
        }
        Ok(())
    }

    pub fn insert(&mut self, offset: TextSize, text: impl Into<String>) {
        self.outcome.edits.push(Edit::insert(offset, text));
    }

    /// Report an issue at the declaration starting at `anchor`.
    pub fn flag(&mut self, anchor: TextSize, context: Option<String>, issue: Issue) {
        let position = self.file.line_index().line_col(anchor);
        let duplicate = self
            .outcome
            .diagnostics
            .iter()
            .any(|d| d.position == position && d.issue == issue);
        if duplicate {
            return;
        }

        warn!(
            "[REMAP] {}:{}: {}",
            self.file.path().display(),
            position.line + 1,
            issue
        );
        if self.config.emit_comments {
            let comment = self.config.todo_comment(&issue.to_string());
            self.outcome.edits.push(Edit::comment(self.file, anchor, &comment));
        }
        self.outcome.diagnostics.push(Diagnostic {
            file: self.file.id(),
            path: self.file.path().to_path_buf(),
            position,
            context,
            issue,
        });
    }

    /// A stage gave up on this file. Queued edits stay.
    pub fn fail_file(&mut self, err: &RemapError) {
        error!("[REMAP] Failed to remap {}: {}", self.file.path().display(), err);
        let issue = match err {
            RemapError::MissingFile(_) => Issue::WriteFailure {
                message: err.to_string(),
            },
        };
        if self.config.emit_comments {
            let comment = self
                .config
                .todo_comment(&format!("Failed to fully remap file: {err}"));
            self.outcome
                .edits
                .push(Edit::insert(TextSize::from(0), format!("{comment}\n")));
        }
        self.outcome.diagnostics.push(Diagnostic {
            file: self.file.id(),
            path: self.file.path().to_path_buf(),
            position: LineCol::default(),
            context: None,
            issue,
        });
    }

    pub fn finish(self) -> FileOutcome {
        self.outcome
    }
}
