//! Reference extraction and the Symbol Reference Locator.
//!
//! Every source file is walked once: imports, declarations, annotations,
//! type expressions and body chains. Each name token that resolves to a
//! class or member becomes a [`Reference`]. The per-file lists feed the
//! general rewriter; the reverse map from declarations answers
//! [`ReferenceLocator::search`].

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use super::ids::{ClassId, ClassRef, DeclId, FieldId, MethodId};
use super::index::ProgramIndex;
use super::resolve::{NameRes, Resolver, Scope};
use crate::base::{FileId, Name, TextRange, TextSize};
use crate::parser::{
    Annotation, Body, ChainHead, ChainSegment, ElementValue, ExprChain, Ident, ImportDecl, Member,
    TypeArg, TypeDecl, TypeExpr,
};

// ============================================================================
// REFERENCES
// ============================================================================

/// What a reference resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefTarget {
    Class(ClassRef),
    Field(FieldId),
    /// Overload candidates, most-derived first.
    Methods(Vec<MethodId>),
    ExternalField {
        owners: Vec<Name>,
        name: Name,
    },
    ExternalMethod {
        owners: Vec<Name>,
        name: Name,
        argc: Option<usize>,
    },
}

impl RefTarget {
    fn from_res(res: NameRes) -> Option<Self> {
        match res {
            NameRes::Class(class) => Some(RefTarget::Class(class)),
            NameRes::Field(field) => Some(RefTarget::Field(field)),
            NameRes::Methods(methods) if !methods.is_empty() => Some(RefTarget::Methods(methods)),
            NameRes::ExternalField { owners, name } => Some(RefTarget::ExternalField { owners, name }),
            NameRes::ExternalMethod { owners, name, argc } => {
                Some(RefTarget::ExternalMethod { owners, name, argc })
            }
            _ => None,
        }
    }

    fn decls(&self) -> Vec<DeclId> {
        match self {
            RefTarget::Class(ClassRef::Indexed(id)) => vec![DeclId::Class(*id)],
            RefTarget::Field(id) => vec![DeclId::Field(*id)],
            RefTarget::Methods(ids) => ids.iter().map(|m| DeclId::Method(*m)).collect(),
            _ => Vec::new(),
        }
    }
}

/// A resolved name token in a source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub file: FileId,
    /// The name token.
    pub range: TextRange,
    pub target: RefTarget,
    /// Package segments written before a class name, `a.b` in `a.b.Foo`.
    pub package_qualifier: Option<TextRange>,
    /// Start of the enclosing declaration or import. Comments go on its line.
    pub anchor: TextSize,
    /// Innermost enclosing indexed declaration.
    pub container: Option<DeclId>,
    /// The name token of the declaration itself.
    pub is_declaration: bool,
}

/// A location returned by [`ReferenceLocator::search`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReferenceSite {
    pub file: FileId,
    pub range: TextRange,
    pub anchor: TextSize,
}

/// Where a search looks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchScope {
    File(FileId),
    /// Files whose parent directory is this path.
    Directory(PathBuf),
    Project,
}

/// Find the usages of a declaration. Declarations themselves are not usages.
pub trait ReferenceLocator: Send + Sync {
    fn search(&self, decl: DeclId, scope: &SearchScope) -> Vec<ReferenceSite>;
}

// ============================================================================
// REFERENCE INDEX
// ============================================================================

#[derive(Debug, Default)]
pub struct ReferenceIndex {
    by_file: Vec<Vec<Reference>>,
    directories: Vec<Option<PathBuf>>,
    by_decl: FxHashMap<DeclId, Vec<(FileId, usize)>>,
}

impl ReferenceIndex {
    /// Walk every source file of `index` in parallel.
    pub fn build(index: &ProgramIndex) -> Self {
        let by_file: Vec<Vec<Reference>> = index
            .files()
            .par_iter()
            .map(|file| {
                if file.is_source() {
                    FileWalker::new(index, file.id()).walk()
                } else {
                    Vec::new()
                }
            })
            .collect();

        let mut by_decl: FxHashMap<DeclId, Vec<(FileId, usize)>> = FxHashMap::default();
        for (file, refs) in by_file.iter().enumerate() {
            for (position, reference) in refs.iter().enumerate() {
                for decl in reference.target.decls() {
                    by_decl
                        .entry(decl)
                        .or_default()
                        .push((FileId::new(file as u32), position));
                }
            }
        }

        info!(
            "[REFS] Collected {} references to {} declarations",
            by_file.iter().map(Vec::len).sum::<usize>(),
            by_decl.len()
        );

        Self {
            directories: index
                .files()
                .iter()
                .map(|f| f.directory().map(Path::to_path_buf))
                .collect(),
            by_file,
            by_decl,
        }
    }

    /// All references in a file, in walk order.
    pub fn file_references(&self, file: FileId) -> &[Reference] {
        self.by_file.get(file.index()).map_or(&[], Vec::as_slice)
    }

    fn in_scope(&self, file: FileId, scope: &SearchScope) -> bool {
        match scope {
            SearchScope::Project => true,
            SearchScope::File(target) => *target == file,
            SearchScope::Directory(dir) => self
                .directories
                .get(file.index())
                .and_then(Option::as_deref)
                .is_some_and(|d| d == dir),
        }
    }
}

impl ReferenceLocator for ReferenceIndex {
    fn search(&self, decl: DeclId, scope: &SearchScope) -> Vec<ReferenceSite> {
        let Some(sites) = self.by_decl.get(&decl) else {
            return Vec::new();
        };
        sites
            .iter()
            .filter(|(file, _)| self.in_scope(*file, scope))
            .filter_map(|(file, position)| self.by_file[file.index()].get(*position))
            .filter(|r| !r.is_declaration)
            .map(|r| ReferenceSite {
                file: r.file,
                range: r.range,
                anchor: r.anchor,
            })
            .collect()
    }
}

// ============================================================================
// WALKER
// ============================================================================

struct FileWalker<'a> {
    resolver: Resolver<'a>,
    file: FileId,
    anchor: TextSize,
    container: Option<DeclId>,
    refs: Vec<Reference>,
}

impl<'a> FileWalker<'a> {
    fn new(index: &'a ProgramIndex, file: FileId) -> Self {
        Self {
            resolver: Resolver::new(index),
            file,
            anchor: TextSize::from(0),
            container: None,
            refs: Vec::new(),
        }
    }

    fn walk(mut self) -> Vec<Reference> {
        let index = self.resolver.index();
        let syntax = index.file(self.file);
        let unit = syntax.unit();
        let file_scope = Scope::new(self.file, None);

        if let Some(package) = &unit.package {
            self.anchor = package.range.start();
            for annotation in &package.annotations {
                self.walk_annotation(&file_scope, annotation);
            }
        }
        for import in &unit.imports {
            self.walk_import(import);
        }
        for (decl, class) in unit.types.iter().zip(index.top_level_classes(self.file)) {
            self.walk_class(decl, *class);
        }

        debug!("[REFS] {}: {} references", syntax.path().display(), self.refs.len());
        self.refs
    }

    fn push(&mut self, range: TextRange, target: RefTarget, package_qualifier: Option<TextRange>, is_declaration: bool) {
        self.refs.push(Reference {
            file: self.file,
            range,
            target,
            package_qualifier,
            anchor: self.anchor,
            container: self.container,
            is_declaration,
        });
    }

    /// Emit references for resolved name segments. Package segments are
    /// folded into the qualifier of the class that follows them.
    fn push_segments<'i>(&mut self, segments: impl IntoIterator<Item = (&'i Ident, NameRes)>) {
        let mut package: Option<TextRange> = None;
        for (ident, res) in segments {
            if let NameRes::Package(_) = res {
                package = Some(package.map_or(ident.range, |p| p.cover(ident.range)));
                continue;
            }
            let qualifier = match &res {
                NameRes::Class(_) => package.take(),
                _ => None,
            };
            package = None;
            if let Some(target) = RefTarget::from_res(res) {
                self.push(ident.range, target, qualifier, false);
            }
        }
    }

    fn walk_import(&mut self, import: &ImportDecl) {
        self.anchor = import.range.start();
        self.container = None;
        let resolved = self.resolver.resolve_import(import);
        self.push_segments(import.path.segments.iter().zip(resolved));
    }

    // ========================================================================
    // DECLARATIONS
    // ========================================================================

    fn walk_class(&mut self, decl: &'a TypeDecl, class: ClassId) {
        let index = self.resolver.index();
        let info = index.class(class);
        let saved = (self.anchor, self.container);
        self.anchor = decl.range.start();
        self.container = Some(DeclId::Class(class));

        let outer_scope = Scope::new(self.file, info.outer).with_type_params(&decl.type_params);
        let scope = Scope::new(self.file, Some(class));

        for annotation in &decl.modifiers.annotations {
            self.walk_annotation(&outer_scope, annotation);
        }
        self.push(decl.name.range, RefTarget::Class(ClassRef::Indexed(class)), None, true);
        for param in &decl.type_params {
            for bound in &param.bounds {
                self.walk_type(&scope, bound);
            }
        }
        for ty in decl.extends.iter().chain(&decl.implements).chain(&decl.permits) {
            self.walk_type(&outer_scope, ty);
        }
        for component in &decl.record_components {
            for annotation in &component.modifiers.annotations {
                self.walk_annotation(&scope, annotation);
            }
            self.walk_type(&scope, &component.ty);
            if let Some(decl_id) = index.decl_at(self.file, component.name.range.start()) {
                self.push(component.name.range, decl_target(decl_id), None, true);
            }
        }

        let mut nested = info.nested.iter().copied();
        for member in &decl.members {
            match member {
                Member::Type(nested_decl) => {
                    if let Some(nested_id) = nested.next() {
                        self.walk_class(nested_decl, nested_id);
                    }
                }
                other => self.walk_member(&scope, other, true),
            }
        }

        (self.anchor, self.container) = saved;
    }

    /// Walk a member. Members of anonymous and local classes are not indexed,
    /// so their names are not declarations.
    fn walk_member(&mut self, scope: &Scope<'a>, member: &'a Member, indexed: bool) {
        let index = self.resolver.index();
        let saved = (self.anchor, self.container);
        self.anchor = member.range().start();

        match member {
            Member::Field(field) => {
                for annotation in &field.modifiers.annotations {
                    self.walk_annotation(scope, annotation);
                }
                self.walk_type(scope, &field.ty);
                for declarator in &field.declarators {
                    if indexed {
                        if let Some(decl_id) = index.decl_at(self.file, declarator.name.range.start()) {
                            self.container = Some(decl_id);
                            self.push(declarator.name.range, decl_target(decl_id), None, true);
                        }
                    }
                    if let Some(init) = &declarator.init {
                        self.walk_body(scope, init);
                    }
                }
            }
            Member::Method(method) => {
                let decl_id = indexed
                    .then(|| index.decl_at(self.file, method.name.range.start()))
                    .flatten();
                if decl_id.is_some() {
                    self.container = decl_id;
                }
                let mut method_scope = scope.clone().with_type_params(&method.type_params);
                for annotation in &method.modifiers.annotations {
                    self.walk_annotation(&method_scope, annotation);
                }
                for param in &method.type_params {
                    for bound in &param.bounds {
                        self.walk_type(&method_scope, bound);
                    }
                }
                if let Some(ret) = &method.return_type {
                    self.walk_type(&method_scope, ret);
                }
                match (decl_id, method.is_constructor(), scope.class) {
                    (Some(decl_id), false, _) => {
                        self.push(method.name.range, decl_target(decl_id), None, true)
                    }
                    // A constructor is named after its class
                    (Some(_), true, Some(owner)) => self.push(
                        method.name.range,
                        RefTarget::Class(ClassRef::Indexed(owner)),
                        None,
                        false,
                    ),
                    _ => {}
                }
                for param in &method.params {
                    for annotation in &param.modifiers.annotations {
                        self.walk_annotation(&method_scope, annotation);
                    }
                    self.walk_type(&method_scope, &param.ty);
                    method_scope.declare_param(param.name.as_str(), Some(&param.ty));
                }
                for ty in &method.throws {
                    self.walk_type(&method_scope, ty);
                }
                if let Some(default) = &method.default_value {
                    self.walk_element_value(&method_scope, default);
                }
                if let Some(body) = &method.body {
                    self.walk_body(&method_scope, body);
                }
            }
            Member::Initializer(init) => self.walk_body(scope, &init.body),
            Member::EnumConstant(constant) => {
                for annotation in &constant.annotations {
                    self.walk_annotation(scope, annotation);
                }
                if let Some(decl_id) = index.decl_at(self.file, constant.name.range.start()) {
                    self.container = Some(decl_id);
                    self.push(constant.name.range, decl_target(decl_id), None, true);
                }
                if let Some(args) = &constant.args {
                    self.walk_body(scope, args);
                }
                for member in constant.class_body.iter().flatten() {
                    self.walk_member(scope, member, false);
                }
            }
            Member::Type(decl) => self.walk_local_type(scope, decl),
        }

        (self.anchor, self.container) = saved;
    }

    /// A class that is not indexed: local, or nested in an anonymous class.
    fn walk_local_type(&mut self, scope: &Scope<'a>, decl: &'a TypeDecl) {
        let scope = scope.clone().with_type_params(&decl.type_params);
        for annotation in &decl.modifiers.annotations {
            self.walk_annotation(&scope, annotation);
        }
        for ty in decl.extends.iter().chain(&decl.implements) {
            self.walk_type(&scope, ty);
        }
        for component in &decl.record_components {
            self.walk_type(&scope, &component.ty);
        }
        for member in &decl.members {
            self.walk_member(&scope, member, false);
        }
    }

    // ========================================================================
    // TYPES, ANNOTATIONS, BODIES
    // ========================================================================

    fn walk_type(&mut self, scope: &Scope<'a>, ty: &'a TypeExpr) {
        let resolved = self.resolver.resolve_type_segments(scope, ty);
        let segments = ty.segments();
        self.push_segments(segments.iter().map(|s| &s.name).zip(resolved));
        for segment in segments {
            for arg in &segment.args {
                if let TypeArg::Type(arg) | TypeArg::Wildcard(Some(arg)) = arg {
                    self.walk_type(scope, arg);
                }
            }
        }
    }

    fn walk_annotation(&mut self, scope: &Scope<'a>, annotation: &'a Annotation) {
        let names: Vec<&str> = annotation.name.segments.iter().map(|s| s.as_str()).collect();
        let resolved = self.resolver.resolve_qualified_type(scope, &names);
        let annotation_type = match resolved.last() {
            Some(NameRes::Class(ClassRef::Indexed(id))) => Some(*id),
            _ => None,
        };
        self.push_segments(annotation.name.segments.iter().zip(resolved));

        for arg in annotation.args() {
            if let (Some(key), Some(annotation_type)) = (&arg.key, annotation_type) {
                let methods = self.resolver.find_methods(annotation_type, key.as_str());
                if !methods.is_empty() {
                    self.push(key.range, RefTarget::Methods(methods), None, false);
                }
            }
            self.walk_element_value(scope, &arg.value);
        }
    }

    fn walk_element_value(&mut self, scope: &Scope<'a>, value: &'a ElementValue) {
        match value {
            ElementValue::Literal(_) => {}
            ElementValue::Class { ty, .. } => self.walk_type(scope, ty),
            ElementValue::Array { elements, .. } => {
                for element in elements {
                    self.walk_element_value(scope, element);
                }
            }
            ElementValue::Annotation(annotation) => self.walk_annotation(scope, annotation),
            ElementValue::Expr(body) => self.walk_body(scope, body),
        }
    }

    fn walk_body(&mut self, scope: &Scope<'a>, body: &'a Body) {
        let mut scope = scope.clone();
        for local in &body.locals {
            scope.declare_local(local);
        }

        for annotation in &body.annotations {
            self.walk_annotation(&scope, annotation);
        }
        for ty in &body.type_uses {
            self.walk_type(&scope, ty);
        }
        for chain in &body.chains {
            self.walk_chain(&scope, chain);
        }
        for anonymous in &body.anonymous_classes {
            self.walk_type(&scope, &anonymous.base);
            for member in &anonymous.members {
                self.walk_member(&scope, member, false);
            }
        }
        for local_type in &body.local_types {
            self.walk_local_type(&scope, local_type);
        }
    }

    fn walk_chain(&mut self, scope: &Scope<'a>, chain: &'a ExprChain) {
        let mut resolved = self.resolver.resolve_chain(scope, chain).into_iter();
        let head = resolved.next();

        let head_ident = match &chain.head {
            ChainHead::Name(ident) | ChainHead::Call { name: ident, .. } => Some(ident),
            ChainHead::New(ty) => {
                self.walk_type(scope, ty);
                None
            }
            ChainHead::This(_) | ChainHead::Super(_) => None,
        };

        let segments = chain.segments.iter().zip(resolved).filter_map(|(segment, res)| {
            match segment {
                ChainSegment::Field(ident)
                | ChainSegment::Call { name: ident, .. }
                | ChainSegment::MethodRef(ident) => Some((ident, res)),
                ChainSegment::Index => None,
            }
        });
        let head = head_ident.zip(head);
        self.push_segments(head.into_iter().chain(segments));
    }
}

fn decl_target(decl: DeclId) -> RefTarget {
    match decl {
        DeclId::Class(id) => RefTarget::Class(ClassRef::Indexed(id)),
        DeclId::Field(id) => RefTarget::Field(id),
        DeclId::Method(id) => RefTarget::Methods(vec![id]),
    }
}
