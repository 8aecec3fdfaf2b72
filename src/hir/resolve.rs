//! Name resolution: type names, imports and expression chains.
//!
//! Resolution is query-time and purely syntactic:
//!
//! 1. **Simple type names** - method type parameters, then each enclosing
//!    class (type parameters, its own name, member types incl. inherited),
//!    single imports, same package, on-demand imports, and finally `java.lang`
//! 2. **Qualified names** - a leading type, else a package walk where each
//!    segment is a known class, a known package, or (in type positions only)
//!    a class derived from the first capitalized segment
//! 3. **Expression chains** - locals, fields (inherited, then outer), static
//!    imports, types, packages; members are then looked up on the static type
//!    of the receiver
//!
//! Members of classes without source resolve to `External*` results that the
//! rewriter translates by name through the mapping tables.

use text_size::{TextRange, TextSize};

use super::ids::{ClassId, ClassRef, FieldId, MethodId};
use super::index::ProgramIndex;
use crate::base::{FileId, Name};
use crate::descriptor::{OBJECT_INTERNAL_NAME, SourceType};
use crate::parser::{
    ChainHead, ChainSegment, ExprChain, ImportDecl, LocalVar, TypeExpr, TypeExprKind, TypeKind,
    TypeParam,
};

// Bounds like `T extends Comparable<T>` only recurse through the first bound.
const MAX_ERASURE_DEPTH: usize = 8;

// ============================================================================
// SCOPE
// ============================================================================

/// A named value visible in a body: a parameter or a local variable.
#[derive(Clone, Debug)]
pub struct LocalBinding<'a> {
    pub name: &'a str,
    /// `None` for lambda parameters and `var`.
    pub ty: Option<&'a TypeExpr>,
    /// `None` when visible in the whole body (parameters).
    pub visible: Option<TextRange>,
}

/// Where a name is written: file, innermost indexed class, and the method's
/// type parameters and locals.
#[derive(Clone, Debug)]
pub struct Scope<'a> {
    pub file: FileId,
    pub class: Option<ClassId>,
    type_params: Vec<&'a TypeParam>,
    locals: Vec<LocalBinding<'a>>,
}

impl<'a> Scope<'a> {
    pub fn new(file: FileId, class: Option<ClassId>) -> Self {
        Self {
            file,
            class,
            type_params: Vec::new(),
            locals: Vec::new(),
        }
    }

    pub fn with_type_params(mut self, params: &'a [TypeParam]) -> Self {
        self.type_params.extend(params);
        self
    }

    pub fn declare_param(&mut self, name: &'a str, ty: Option<&'a TypeExpr>) {
        self.locals.push(LocalBinding {
            name,
            ty,
            visible: None,
        });
    }

    pub fn declare_local(&mut self, local: &'a LocalVar) {
        self.locals.push(LocalBinding {
            name: local.name.as_str(),
            ty: local.ty.as_ref(),
            visible: Some(local.scope),
        });
    }

    /// Innermost local named `name` visible at `offset`.
    pub fn local(&self, name: &str, offset: TextSize) -> Option<&LocalBinding<'a>> {
        self.locals.iter().rev().find(|local| {
            local.name == name
                && local
                    .visible
                    .is_none_or(|range| range.contains_inclusive(offset))
        })
    }

    fn type_param(&self, name: &str) -> Option<&'a TypeParam> {
        self.type_params
            .iter()
            .rev()
            .find(|p| p.name.as_str() == name)
            .copied()
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// What a simple type name denotes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeBinding<'a> {
    Variable(&'a TypeParam),
    Class(ClassRef),
}

/// Resolution of one segment of a qualified name or expression chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameRes {
    /// Internal package name, `a/b`.
    Package(Name),
    Class(ClassRef),
    TypeParam,
    Local,
    Field(FieldId),
    /// Candidates with a matching name (and arity for calls), most-derived first.
    Methods(Vec<MethodId>),
    /// A field of a class without source.
    ExternalField { owners: Vec<Name>, name: Name },
    /// A method of a class without source. `argc` is `None` for method references.
    ExternalMethod {
        owners: Vec<Name>,
        name: Name,
        argc: Option<usize>,
    },
    Unknown,
}

/// Static type of the value produced so far while walking a chain.
#[derive(Clone, Debug)]
enum Receiver {
    Package(Name),
    Type(ClassRef),
    Value { class: ClassRef, dims: u8 },
    Unknown,
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

// ============================================================================
// RESOLVER
// ============================================================================

#[derive(Clone, Copy, Debug)]
pub struct Resolver<'a> {
    index: &'a ProgramIndex,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a ProgramIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'a ProgramIndex {
        self.index
    }

    /// The class and its lexically enclosing classes, innermost first.
    pub fn enclosing_classes(&self, class: Option<ClassId>) -> impl Iterator<Item = ClassId> + 'a {
        let index = self.index;
        std::iter::successors(class, move |c| index.class(*c).outer)
    }

    // ========================================================================
    // TYPE NAMES
    // ========================================================================

    pub fn resolve_simple_type(&self, scope: &Scope<'a>, name: &str) -> Option<TypeBinding<'a>> {
        if let Some(param) = scope.type_param(name) {
            return Some(TypeBinding::Variable(param));
        }

        for class in self.enclosing_classes(scope.class) {
            let info = self.index.class(class);
            if let Some(param) = info.type_params.iter().find(|p| p.name.as_str() == name) {
                return Some(TypeBinding::Variable(param));
            }
            if info.simple_name == name {
                return Some(TypeBinding::Class(ClassRef::Indexed(class)));
            }
            if let Some(member) = self.find_member_type(class, name) {
                return Some(TypeBinding::Class(ClassRef::Indexed(member)));
            }
        }

        self.file_level_class(scope.file, name).map(TypeBinding::Class)
    }

    /// A class visible by simple name at file level.
    fn file_level_class(&self, file: FileId, name: &str) -> Option<ClassRef> {
        let syntax = self.index.file(file);
        let imports = &syntax.unit().imports;

        for import in imports.iter().filter(|i| !i.is_static && !i.on_demand) {
            if import.path.last().is_some_and(|last| last.as_str() == name) {
                if let Some(NameRes::Class(class)) = self.resolve_import(import).pop() {
                    return Some(class);
                }
            }
        }

        let package = syntax.package_internal();
        let same_package = if package.is_empty() {
            name.to_string()
        } else {
            format!("{package}/{name}")
        };
        if let Some(class) = self.index.known_class(&same_package) {
            return Some(class);
        }

        for import in imports.iter().filter(|i| i.on_demand) {
            let container = self.resolve_import(import);
            let found = match container.last() {
                Some(NameRes::Package(package)) if !import.is_static => {
                    self.index.known_class(&format!("{package}/{name}"))
                }
                Some(NameRes::Class(class)) => self.member_type_of(class, name, false),
                _ => None,
            };
            if found.is_some() {
                return found;
            }
        }

        let java_lang = format!("java/lang/{name}");
        self.index
            .known_class(&java_lang)
            .or_else(|| starts_uppercase(name).then(|| ClassRef::External(Name::new(java_lang))))
    }

    /// Member type `name` of `class`. Classes without source only have
    /// member types the index knows by name, unless `derive` is set.
    fn member_type_of(&self, class: &ClassRef, name: &str, derive: bool) -> Option<ClassRef> {
        match class {
            ClassRef::Indexed(id) => self.find_member_type(*id, name).map(ClassRef::Indexed),
            ClassRef::External(outer) => {
                let nested = format!("{outer}${name}");
                self.index
                    .known_class(&nested)
                    .or_else(|| derive.then(|| ClassRef::External(Name::new(nested))))
            }
        }
    }

    /// Walk a qualified name from the root: packages, then classes, then member types.
    fn walk_from_root(&self, names: &[&str], derive: bool) -> Vec<NameRes> {
        let mut out = Vec::with_capacity(names.len());
        let mut package = String::new();
        let mut current: Option<ClassRef> = None;

        for (i, name) in names.iter().enumerate() {
            let next = match &current {
                Some(class) => self.member_type_of(class, name, derive).map(NameRes::Class),
                None => {
                    let candidate = if package.is_empty() {
                        name.to_string()
                    } else {
                        format!("{package}/{name}")
                    };
                    if let Some(class) = self.index.known_class(&candidate) {
                        Some(NameRes::Class(class))
                    } else if self.index.is_package(&candidate)
                        || (derive && !starts_uppercase(name) && i + 1 < names.len())
                    {
                        package = candidate;
                        Some(NameRes::Package(Name::new(&package)))
                    } else if derive && starts_uppercase(name) {
                        Some(NameRes::Class(ClassRef::External(Name::new(candidate))))
                    } else {
                        None
                    }
                }
            };

            match next {
                Some(NameRes::Class(class)) => {
                    current = Some(class.clone());
                    out.push(NameRes::Class(class));
                }
                Some(res) => out.push(res),
                None => break,
            }
        }

        out.resize(names.len(), NameRes::Unknown);
        out
    }

    /// Resolve each segment of a qualified type name written in `scope`.
    pub fn resolve_qualified_type(&self, scope: &Scope<'a>, names: &[&str]) -> Vec<NameRes> {
        let Some(first) = names.first() else {
            return Vec::new();
        };
        match self.resolve_simple_type(scope, first) {
            Some(TypeBinding::Variable(_)) => {
                let mut out = vec![NameRes::TypeParam];
                out.resize(names.len(), NameRes::Unknown);
                out
            }
            // A lowercase head that is only a `java.lang` guess is a package
            Some(TypeBinding::Class(class)) if names.len() == 1 || starts_uppercase(first) => {
                let mut out = vec![NameRes::Class(class.clone())];
                let mut current = class;
                for name in &names[1..] {
                    match self.member_type_of(&current, name, true) {
                        Some(next) => {
                            out.push(NameRes::Class(next.clone()));
                            current = next;
                        }
                        None => break,
                    }
                }
                out.resize(names.len(), NameRes::Unknown);
                out
            }
            _ => self.walk_from_root(names, true),
        }
    }

    /// Resolve the segments of a type expression.
    pub fn resolve_type_segments(&self, scope: &Scope<'a>, ty: &TypeExpr) -> Vec<NameRes> {
        let names: Vec<&str> = ty.segments().iter().map(|s| s.name.as_str()).collect();
        self.resolve_qualified_type(scope, &names)
    }

    /// The class a type expression names, ignoring array dimensions.
    pub fn resolve_type_class(&self, scope: &Scope<'a>, ty: &TypeExpr) -> Option<ClassRef> {
        match self.resolve_type_segments(scope, ty).pop() {
            Some(NameRes::Class(class)) => Some(class),
            _ => None,
        }
    }

    /// Resolve the segments of an import path. For a single static import the
    /// last segment is a member of the class before it.
    pub fn resolve_import(&self, import: &ImportDecl) -> Vec<NameRes> {
        let names: Vec<&str> = import.path.segments.iter().map(|s| s.as_str()).collect();
        if !import.is_static || import.on_demand || names.len() < 2 {
            return self.walk_from_root(&names, true);
        }

        let (member, owner_path) = match names.split_last() {
            Some(split) => split,
            None => return Vec::new(),
        };
        let mut out = self.walk_from_root(owner_path, true);
        let member_res = match out.last() {
            Some(NameRes::Class(ClassRef::Indexed(owner))) => {
                if let Some(field) = self.find_field(*owner, member) {
                    NameRes::Field(field)
                } else {
                    let methods = self.find_methods(*owner, member);
                    if !methods.is_empty() {
                        NameRes::Methods(methods)
                    } else if let Some(nested) = self.find_member_type(*owner, member) {
                        NameRes::Class(ClassRef::Indexed(nested))
                    } else {
                        NameRes::Unknown
                    }
                }
            }
            _ => NameRes::Unknown,
        };
        out.push(member_res);
        out
    }

    // ========================================================================
    // ERASURE
    // ========================================================================

    /// Resolved, unerased form of a type expression.
    pub fn source_type(&self, scope: &Scope<'a>, ty: &TypeExpr) -> Option<SourceType> {
        self.source_type_at_depth(scope, ty, 0)
    }

    fn source_type_at_depth(&self, scope: &Scope<'a>, ty: &TypeExpr, depth: usize) -> Option<SourceType> {
        let mut base = match &ty.kind {
            TypeExprKind::Primitive(p) => SourceType::Primitive(*p),
            TypeExprKind::Named(segments) => {
                let simple = segments.len() == 1;
                match (simple, segments.first()) {
                    (true, Some(segment)) => {
                        match self.resolve_simple_type(scope, segment.name.as_str())? {
                            TypeBinding::Variable(param) => {
                                self.variable_type(scope, param, depth)
                            }
                            TypeBinding::Class(class) => {
                                SourceType::Class(Name::new(self.index.class_ref_name(&class)))
                            }
                        }
                    }
                    _ => match self.resolve_type_segments(scope, ty).pop()? {
                        NameRes::Class(class) => {
                            SourceType::Class(Name::new(self.index.class_ref_name(&class)))
                        }
                        _ => return None,
                    },
                }
            }
        };
        for _ in 0..ty.dims {
            base = SourceType::Array(Box::new(base));
        }
        Some(base)
    }

    fn variable_type(&self, scope: &Scope<'a>, param: &TypeParam, depth: usize) -> SourceType {
        let bound = (depth < MAX_ERASURE_DEPTH)
            .then(|| param.bounds.first())
            .flatten()
            .and_then(|b| self.source_type_at_depth(scope, b, depth + 1));
        SourceType::Variable {
            bounds: bound.into_iter().collect(),
        }
    }

    // ========================================================================
    // SUPERTYPES
    // ========================================================================

    /// Direct supertypes of a class as written, superclass first, with the
    /// implicit superclass added when none is written.
    pub fn resolve_supertypes(&self, class: ClassId) -> Vec<ClassRef> {
        let info = self.index.class(class);
        // Supertype clauses see the class's type parameters but not its members
        let scope = Scope::new(info.file, info.outer).with_type_params(&info.type_params);

        let mut supers = Vec::new();
        if info.kind != TypeKind::Interface {
            match info.extends.first() {
                Some(ty) => supers.extend(self.resolve_type_class(&scope, ty)),
                None => supers.extend(self.index.implicit_superclass(class)),
            }
        }
        let interfaces = if info.kind == TypeKind::Interface {
            &info.extends
        } else {
            &info.implements
        };
        for ty in interfaces {
            if let Some(resolved) = self.resolve_type_class(&scope, ty) {
                if resolved != ClassRef::Indexed(class) && !supers.contains(&resolved) {
                    supers.push(resolved);
                }
            }
        }
        supers
    }

    // ========================================================================
    // EXPRESSION CHAINS
    // ========================================================================

    /// Resolve a chain written in `scope`: one result for the head, then one
    /// per segment.
    pub fn resolve_chain(&self, scope: &Scope<'a>, chain: &ExprChain) -> Vec<NameRes> {
        let mut out = Vec::with_capacity(chain.segments.len() + 1);
        let (head, mut receiver) = self.resolve_head(scope, &chain.head);
        out.push(head);

        for segment in &chain.segments {
            let (res, next) = self.resolve_segment(&receiver, segment);
            out.push(res);
            receiver = next;
        }
        out
    }

    fn resolve_head(&self, scope: &Scope<'a>, head: &ChainHead) -> (NameRes, Receiver) {
        match head {
            ChainHead::Name(ident) => self.resolve_head_name(scope, ident.as_str(), ident.range.start()),
            ChainHead::Call { name, argc } => self.resolve_head_call(scope, name.as_str(), *argc),
            ChainHead::This(_) => match scope.class {
                Some(class) => (
                    NameRes::Unknown,
                    Receiver::Value {
                        class: ClassRef::Indexed(class),
                        dims: 0,
                    },
                ),
                None => (NameRes::Unknown, Receiver::Unknown),
            },
            ChainHead::Super(_) => {
                let superclass = scope
                    .class
                    .and_then(|c| self.index.supertypes(c).first().cloned());
                match superclass {
                    Some(class) => (NameRes::Unknown, Receiver::Value { class, dims: 0 }),
                    None => (NameRes::Unknown, Receiver::Unknown),
                }
            }
            ChainHead::New(ty) => match self.resolve_type_class(scope, ty) {
                Some(class) => (
                    NameRes::Class(class.clone()),
                    Receiver::Value { class, dims: ty.dims },
                ),
                None => (NameRes::Unknown, Receiver::Unknown),
            },
        }
    }

    fn resolve_head_name(&self, scope: &Scope<'a>, name: &str, offset: TextSize) -> (NameRes, Receiver) {
        if let Some(local) = scope.local(name, offset) {
            let receiver = local
                .ty
                .map_or(Receiver::Unknown, |ty| self.value_of_type(scope, ty, 0));
            return (NameRes::Local, receiver);
        }

        for class in self.enclosing_classes(scope.class) {
            if let Some(field) = self.find_field(class, name) {
                return (NameRes::Field(field), self.value_of_field(field));
            }
        }

        if let Some(res) = self.static_import_field(scope.file, name) {
            let receiver = match &res {
                NameRes::Field(field) => self.value_of_field(*field),
                _ => Receiver::Unknown,
            };
            return (res, receiver);
        }

        if let Some(binding) = self.resolve_simple_type(scope, name) {
            return match binding {
                TypeBinding::Variable(_) => (NameRes::TypeParam, Receiver::Unknown),
                TypeBinding::Class(class) => (NameRes::Class(class.clone()), Receiver::Type(class)),
            };
        }

        if self.index.is_package(name) {
            let package = Name::new(name);
            return (NameRes::Package(package.clone()), Receiver::Package(package));
        }

        let owners = self.external_owners(scope.class);
        if owners.is_empty() {
            return (NameRes::Unknown, Receiver::Unknown);
        }
        (
            NameRes::ExternalField {
                owners,
                name: Name::new(name),
            },
            Receiver::Unknown,
        )
    }

    fn resolve_head_call(&self, scope: &Scope<'a>, name: &str, argc: usize) -> (NameRes, Receiver) {
        for class in self.enclosing_classes(scope.class) {
            let methods = self.find_methods(class, name);
            if methods.is_empty() {
                continue;
            }
            let methods: Vec<MethodId> = methods
                .into_iter()
                .filter(|m| self.index.method(*m).accepts_arity(argc))
                .collect();
            let receiver = self.value_of_methods(&methods);
            return (NameRes::Methods(methods), receiver);
        }

        if let Some(res) = self.static_import_methods(scope.file, name, argc) {
            let receiver = match &res {
                NameRes::Methods(methods) => self.value_of_methods(methods),
                _ => Receiver::Unknown,
            };
            return (res, receiver);
        }

        let owners = self.external_owners(scope.class);
        if owners.is_empty() {
            return (NameRes::Unknown, Receiver::Unknown);
        }
        (
            NameRes::ExternalMethod {
                owners,
                name: Name::new(name),
                argc: Some(argc),
            },
            Receiver::Unknown,
        )
    }

    /// External ancestors of the innermost class, where an unresolved
    /// unqualified member may be inherited from.
    fn external_owners(&self, class: Option<ClassId>) -> Vec<Name> {
        class.map_or_else(Vec::new, |c| self.external_ancestors(c))
    }

    fn resolve_segment(&self, receiver: &Receiver, segment: &ChainSegment) -> (NameRes, Receiver) {
        match (receiver, segment) {
            (_, ChainSegment::Index) => match receiver {
                Receiver::Value { class, dims } if *dims > 0 => (
                    NameRes::Unknown,
                    Receiver::Value {
                        class: class.clone(),
                        dims: dims - 1,
                    },
                ),
                _ => (NameRes::Unknown, Receiver::Unknown),
            },

            (Receiver::Package(package), ChainSegment::Field(ident)) => {
                let candidate = format!("{}/{}", package, ident.as_str());
                if let Some(class) = self.index.known_class(&candidate) {
                    (NameRes::Class(class.clone()), Receiver::Type(class))
                } else if self.index.is_package(&candidate) {
                    let package = Name::new(candidate);
                    (NameRes::Package(package.clone()), Receiver::Package(package))
                } else {
                    (NameRes::Unknown, Receiver::Unknown)
                }
            }

            (Receiver::Type(class), ChainSegment::Field(ident)) => {
                let name = ident.as_str();
                if let Some(res) = self.member_field(class, name) {
                    let receiver = match &res {
                        NameRes::Field(field) => self.value_of_field(*field),
                        _ => Receiver::Unknown,
                    };
                    return (res, receiver);
                }
                match self.member_type_of(class, name, false) {
                    Some(nested) => (NameRes::Class(nested.clone()), Receiver::Type(nested)),
                    None => (
                        self.external_field(class, name).unwrap_or(NameRes::Unknown),
                        Receiver::Unknown,
                    ),
                }
            }

            (Receiver::Value { class, dims: 0 }, ChainSegment::Field(ident)) => {
                let name = ident.as_str();
                match self.member_field(class, name) {
                    Some(NameRes::Field(field)) => (NameRes::Field(field), self.value_of_field(field)),
                    _ => (
                        self.external_field(class, name).unwrap_or(NameRes::Unknown),
                        Receiver::Unknown,
                    ),
                }
            }

            (
                Receiver::Type(class) | Receiver::Value { class, dims: 0 },
                ChainSegment::Call { name, argc },
            ) => self.member_call(class, name.as_str(), Some(*argc)),

            (
                Receiver::Type(class) | Receiver::Value { class, dims: 0 },
                ChainSegment::MethodRef(name),
            ) if name.as_str() != "new" => {
                let (res, _) = self.member_call(class, name.as_str(), None);
                (res, Receiver::Unknown)
            }

            _ => (NameRes::Unknown, Receiver::Unknown),
        }
    }

    fn member_field(&self, class: &ClassRef, name: &str) -> Option<NameRes> {
        match class {
            ClassRef::Indexed(id) => self.find_field(*id, name).map(NameRes::Field),
            ClassRef::External(_) => None,
        }
    }

    fn external_field(&self, class: &ClassRef, name: &str) -> Option<NameRes> {
        let owners = match class {
            ClassRef::Indexed(id) => self.external_ancestors(*id),
            ClassRef::External(owner) => vec![owner.clone()],
        };
        (!owners.is_empty()).then(|| NameRes::ExternalField {
            owners,
            name: Name::new(name),
        })
    }

    fn member_call(&self, class: &ClassRef, name: &str, argc: Option<usize>) -> (NameRes, Receiver) {
        let owners = match class {
            ClassRef::Indexed(id) => {
                let methods: Vec<MethodId> = self
                    .find_methods(*id, name)
                    .into_iter()
                    .filter(|m| argc.is_none_or(|argc| self.index.method(*m).accepts_arity(argc)))
                    .collect();
                if !methods.is_empty() {
                    let receiver = self.value_of_methods(&methods);
                    return (NameRes::Methods(methods), receiver);
                }
                self.external_ancestors(*id)
            }
            ClassRef::External(owner) => vec![owner.clone()],
        };
        if owners.is_empty() {
            return (NameRes::Unknown, Receiver::Unknown);
        }
        (
            NameRes::ExternalMethod {
                owners,
                name: Name::new(name),
                argc,
            },
            Receiver::Unknown,
        )
    }

    fn static_import_field(&self, file: FileId, name: &str) -> Option<NameRes> {
        for import in self.index.file(file).unit().imports.iter().filter(|i| i.is_static) {
            if import.on_demand {
                if let Some(NameRes::Class(ClassRef::Indexed(owner))) = self.resolve_import(import).pop() {
                    if let Some(field) = self.find_field(owner, name) {
                        return Some(NameRes::Field(field));
                    }
                }
            } else if import.path.last().is_some_and(|last| last.as_str() == name) {
                let mut resolved = self.resolve_import(import);
                let member = resolved.pop();
                match (member, resolved.pop()) {
                    (Some(NameRes::Field(field)), _) => return Some(NameRes::Field(field)),
                    (_, Some(NameRes::Class(ClassRef::External(owner)))) => {
                        return Some(NameRes::ExternalField {
                            owners: vec![owner],
                            name: Name::new(name),
                        });
                    }
                    _ => {}
                }
            }
        }
        None
    }

    fn static_import_methods(&self, file: FileId, name: &str, argc: usize) -> Option<NameRes> {
        for import in self.index.file(file).unit().imports.iter().filter(|i| i.is_static) {
            let owner = if import.on_demand {
                self.resolve_import(import).pop()
            } else if import.path.last().is_some_and(|last| last.as_str() == name) {
                let mut resolved = self.resolve_import(import);
                resolved.pop();
                resolved.pop()
            } else {
                continue;
            };
            match owner {
                Some(NameRes::Class(ClassRef::Indexed(owner))) => {
                    let methods: Vec<MethodId> = self
                        .find_methods(owner, name)
                        .into_iter()
                        .filter(|m| self.index.method(*m).accepts_arity(argc))
                        .collect();
                    if !methods.is_empty() {
                        return Some(NameRes::Methods(methods));
                    }
                }
                Some(NameRes::Class(ClassRef::External(owner))) if !import.on_demand => {
                    return Some(NameRes::ExternalMethod {
                        owners: vec![owner],
                        name: Name::new(name),
                        argc: Some(argc),
                    });
                }
                _ => {}
            }
        }
        None
    }

    // ========================================================================
    // VALUE TYPES
    // ========================================================================

    fn value_of_type(&self, scope: &Scope<'a>, ty: &TypeExpr, extra_dims: u8) -> Receiver {
        let dims = ty.dims + extra_dims;
        if let TypeExprKind::Named(segments) = &ty.kind {
            if let [segment] = segments.as_slice() {
                if let Some(TypeBinding::Variable(param)) =
                    self.resolve_simple_type(scope, segment.name.as_str())
                {
                    let class = param
                        .bounds
                        .first()
                        .and_then(|b| self.resolve_type_class(scope, b))
                        .unwrap_or_else(|| ClassRef::External(Name::new(OBJECT_INTERNAL_NAME)));
                    return Receiver::Value { class, dims };
                }
            }
        }
        match self.resolve_type_class(scope, ty) {
            Some(class) => Receiver::Value { class, dims },
            None => Receiver::Unknown,
        }
    }

    fn value_of_field(&self, field: FieldId) -> Receiver {
        let info = self.index.field(field);
        let scope = self.index.class_scope(info.owner);
        match &info.ty {
            Some(ty) => self.value_of_type(&scope, ty, info.extra_dims),
            None => Receiver::Value {
                class: ClassRef::Indexed(info.owner),
                dims: 0,
            },
        }
    }

    fn value_of_methods(&self, methods: &[MethodId]) -> Receiver {
        let Some(first) = methods.first() else {
            return Receiver::Unknown;
        };
        let method = self.index.method(*first);
        match &method.return_type {
            Some(ty) => {
                let scope = self.index.class_scope(method.owner).with_type_params(&method.type_params);
                self.value_of_type(&scope, ty, 0)
            }
            None => Receiver::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxFile;

    fn build(sources: &[(&str, &str)], known: &[&str]) -> ProgramIndex {
        let files = sources
            .iter()
            .enumerate()
            .map(|(i, (path, text))| SyntaxFile::source(FileId::new(i as u32), *path, *text))
            .collect();
        ProgramIndex::build(files, known.iter().copied())
    }

    #[test]
    fn test_simple_type_order() {
        let index = build(
            &[
                ("a/Foo.java", "package a; import b.Bar; class Foo<T> { class Inner {} }"),
                ("b/Bar.java", "package b; public class Bar {}"),
                ("a/Baz.java", "package a; class Baz {}"),
            ],
            &[],
        );
        let resolver = Resolver::new(&index);
        let foo = index.class_by_internal_name("a/Foo").unwrap();
        let scope = Scope::new(FileId::new(0), Some(foo));

        assert!(matches!(resolver.resolve_simple_type(&scope, "T"), Some(TypeBinding::Variable(_))));
        let bar = index.class_by_internal_name("b/Bar").unwrap();
        assert_eq!(resolver.resolve_simple_type(&scope, "Bar"), Some(TypeBinding::Class(ClassRef::Indexed(bar))));
        let baz = index.class_by_internal_name("a/Baz").unwrap();
        assert_eq!(resolver.resolve_simple_type(&scope, "Baz"), Some(TypeBinding::Class(ClassRef::Indexed(baz))));
        let inner = index.class_by_internal_name("a/Foo$Inner").unwrap();
        assert_eq!(resolver.resolve_simple_type(&scope, "Inner"), Some(TypeBinding::Class(ClassRef::Indexed(inner))));
        assert_eq!(
            resolver.resolve_simple_type(&scope, "String"),
            Some(TypeBinding::Class(ClassRef::External(Name::new("java/lang/String"))))
        );
    }

    #[test]
    fn test_qualified_type_derives_external_class() {
        let index = build(&[("a/Foo.java", "package a; class Foo {}")], &[]);
        let resolver = Resolver::new(&index);
        let scope = Scope::new(FileId::new(0), None);
        let res = resolver.resolve_qualified_type(&scope, &["java", "util", "Map", "Entry"]);
        assert_eq!(
            res,
            vec![
                NameRes::Package(Name::new("java")),
                NameRes::Package(Name::new("java/util")),
                NameRes::Class(ClassRef::External(Name::new("java/util/Map"))),
                NameRes::Class(ClassRef::External(Name::new("java/util/Map$Entry"))),
            ]
        );
    }

    #[test]
    fn test_on_demand_import_uses_known_classes() {
        let index = build(&[("a/Foo.java", "package a; import x.y.*; class Foo {}")], &["x/y/Qux"]);
        let resolver = Resolver::new(&index);
        let scope = Scope::new(FileId::new(0), index.class_by_internal_name("a/Foo"));
        assert_eq!(
            resolver.resolve_simple_type(&scope, "Qux"),
            Some(TypeBinding::Class(ClassRef::External(Name::new("x/y/Qux"))))
        );
    }

    #[test]
    fn test_supertypes() {
        let index = build(
            &[(
                "a/Foo.java",
                "package a; interface I {} class Base {} class Foo extends Base implements I {} enum E {}",
            )],
            &[],
        );
        let foo = index.class_by_internal_name("a/Foo").unwrap();
        let base = index.class_by_internal_name("a/Base").unwrap();
        let i = index.class_by_internal_name("a/I").unwrap();
        assert_eq!(index.supertypes(foo), &[ClassRef::Indexed(base), ClassRef::Indexed(i)]);
        assert!(index.supertypes(i).is_empty());
        let e = index.class_by_internal_name("a/E").unwrap();
        assert_eq!(index.supertypes(e), &[ClassRef::External(Name::new("java/lang/Enum"))]);
    }

    #[test]
    fn test_source_type_erases_type_variables() {
        let index = build(&[("a/Foo.java", "package a; class Foo<T extends Number, U> {}")], &[]);
        let resolver = Resolver::new(&index);
        let foo = index.class_by_internal_name("a/Foo").unwrap();
        let scope = index.class_scope(foo);
        let ty = |text: &str| TypeExpr {
            kind: TypeExprKind::Named(vec![crate::parser::TypeSegment {
                name: crate::parser::Ident {
                    text: Name::new(text),
                    range: TextRange::default(),
                },
                args: Vec::new(),
            }]),
            dims: 0,
            range: TextRange::default(),
        };
        assert_eq!(
            resolver.source_type(&scope, &ty("T")),
            Some(SourceType::Variable {
                bounds: vec![SourceType::Class(Name::new("java/lang/Number"))]
            })
        );
        assert_eq!(
            resolver.source_type(&scope, &ty("U")),
            Some(SourceType::Variable { bounds: vec![] })
        );
    }
}
