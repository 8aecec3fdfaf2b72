//! Program index: every class and member declared in the loaded files.
//!
//! Built once per run from parsed files. Source files are rewritten; library
//! files only contribute declarations for hierarchy and resolution. Classes
//! known only by name (typically every class of the first mapping table) are
//! kept as external names so imports and same-package references to them
//! still resolve.

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

use super::ids::{ClassId, ClassRef, DeclId, FieldId, MethodId};
use super::resolve::{Resolver, Scope};
use crate::base::{FileId, Name, TextRange, TextSize};
use crate::descriptor::OBJECT_INTERNAL_NAME;
use crate::parser::{
    FieldDecl, Member, MethodDecl, Modifiers, Param, TypeDecl, TypeExpr, TypeKind, TypeParam,
    Visibility,
};
use crate::syntax::SyntaxFile;

// ============================================================================
// DECLARATION INFO
// ============================================================================

#[derive(Clone, Debug)]
pub struct ClassInfo {
    /// `a/b/Outer$Inner`
    pub internal_name: Name,
    pub simple_name: Name,
    pub file: FileId,
    pub kind: TypeKind,
    pub outer: Option<ClassId>,
    pub is_static: bool,
    pub name_range: TextRange,
    pub range: TextRange,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<TypeExpr>,
    pub implements: Vec<TypeExpr>,
    pub fields: Vec<FieldId>,
    pub methods: Vec<MethodId>,
    pub nested: Vec<ClassId>,
}

impl ClassInfo {
    /// Dotted source name, `a.b.Outer.Inner`.
    pub fn qualified_name(&self) -> String {
        crate::mapping::replace_all_qualifiers(&self.internal_name)
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::Annotation)
    }
}

#[derive(Clone, Debug)]
pub struct FieldInfo {
    pub owner: ClassId,
    pub name: Name,
    pub name_range: TextRange,
    /// `None` for enum constants, whose type is the owner.
    pub ty: Option<TypeExpr>,
    /// Dimensions written after the name.
    pub extra_dims: u8,
    pub visibility: Visibility,
    pub is_static: bool,
    pub range: TextRange,
}

#[derive(Clone, Debug)]
pub struct ParamInfo {
    pub name: Name,
    pub ty: TypeExpr,
    pub varargs: bool,
}

#[derive(Clone, Debug)]
pub struct MethodInfo {
    pub owner: ClassId,
    pub name: Name,
    pub name_range: TextRange,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<ParamInfo>,
    /// `None` for constructors.
    pub return_type: Option<TypeExpr>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub range: TextRange,
}

impl MethodInfo {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    /// Whether a call with `argc` arguments can target this method.
    pub fn accepts_arity(&self, argc: usize) -> bool {
        match self.params.last() {
            Some(last) if last.varargs => argc + 1 >= self.params.len(),
            _ => argc == self.params.len(),
        }
    }
}

// ============================================================================
// PROGRAM INDEX
// ============================================================================

/// All declarations of a program, addressable by id, internal name and location.
#[derive(Debug, Default)]
pub struct ProgramIndex {
    files: Vec<SyntaxFile>,
    classes: Vec<ClassInfo>,
    fields: Vec<FieldInfo>,
    methods: Vec<MethodInfo>,
    by_internal_name: FxHashMap<Name, ClassId>,
    external: FxHashSet<Name>,
    packages: FxHashSet<String>,
    /// Declarations by file and name token start.
    decls: FxHashMap<(FileId, TextSize), DeclId>,
    top_level: Vec<Vec<ClassId>>,
    supertypes: Vec<Vec<ClassRef>>,
    pub(super) method_descriptors: RwLock<FxHashMap<MethodId, Option<Name>>>,
}

impl ProgramIndex {
    /// Index `files` with no externally known classes.
    pub fn new(files: Vec<SyntaxFile>) -> Self {
        Self::build(files, std::iter::empty::<Name>())
    }

    /// Index `files`. File ids are reassigned to match their position.
    pub fn build<N: Into<Name>>(
        files: Vec<SyntaxFile>,
        known_classes: impl IntoIterator<Item = N>,
    ) -> Self {
        let mut index = Self::default();
        for (position, mut file) in files.into_iter().enumerate() {
            file.set_id(FileId::new(position as u32));
            index.files.push(file);
        }

        for position in 0..index.files.len() {
            let file_id = FileId::new(position as u32);
            let package = index.files[position].package_internal();
            index.add_package(&package);
            let types = index.files[position].unit().types.clone();
            let mut top_level = Vec::with_capacity(types.len());
            for decl in &types {
                top_level.push(index.add_class(file_id, &package, decl, None));
            }
            index.top_level.push(top_level);
        }

        for name in known_classes {
            let name: Name = name.into();
            if !index.by_internal_name.contains_key(&name) {
                if let Some((package, _)) = name.rsplit_once('/') {
                    index.add_package(package);
                }
                index.external.insert(name);
            }
        }

        let supertypes = {
            let resolver = Resolver::new(&index);
            (0..index.classes.len())
                .map(|i| resolver.resolve_supertypes(ClassId::new(i)))
                .collect()
        };
        index.supertypes = supertypes;

        info!(
            "[INDEX] Indexed {} files: {} classes, {} fields, {} methods, {} external classes",
            index.files.len(),
            index.classes.len(),
            index.fields.len(),
            index.methods.len(),
            index.external.len()
        );
        index
    }

    fn add_package(&mut self, package: &str) {
        let mut prefix = package;
        while !prefix.is_empty() && self.packages.insert(prefix.to_string()) {
            match prefix.rsplit_once('/') {
                Some((parent, _)) => prefix = parent,
                None => break,
            }
        }
    }

    fn add_class(
        &mut self,
        file: FileId,
        package: &str,
        decl: &TypeDecl,
        outer: Option<ClassId>,
    ) -> ClassId {
        let internal_name = match outer {
            Some(outer) => Name::new(format!(
                "{}${}",
                self.classes[outer.index()].internal_name,
                decl.name.text
            )),
            None if package.is_empty() => decl.name.text.clone(),
            None => Name::new(format!("{}/{}", package, decl.name.text)),
        };
        let outer_is_interface = outer.is_some_and(|o| self.classes[o.index()].is_interface());

        let id = ClassId::new(self.classes.len());
        debug!("[INDEX] class {} ({:?})", internal_name, decl.kind);
        self.classes.push(ClassInfo {
            internal_name: internal_name.clone(),
            simple_name: decl.name.text.clone(),
            file,
            kind: decl.kind,
            outer,
            is_static: outer.is_none()
                || outer_is_interface
                || decl.modifiers.is_static()
                || decl.kind != TypeKind::Class,
            name_range: decl.name.range,
            range: decl.range,
            type_params: decl.type_params.clone(),
            extends: decl.extends.clone(),
            implements: decl.implements.clone(),
            fields: Vec::new(),
            methods: Vec::new(),
            nested: Vec::new(),
        });
        self.by_internal_name.insert(internal_name, id);
        self.decls.insert((file, decl.name.range.start()), DeclId::Class(id));

        let in_interface = matches!(decl.kind, TypeKind::Interface | TypeKind::Annotation);
        for component in &decl.record_components {
            self.add_record_component(id, file, component);
        }
        for member in &decl.members {
            match member {
                Member::Field(field) => self.add_field(id, file, field, in_interface),
                Member::Method(method) => self.add_method(id, file, method, in_interface),
                Member::Type(nested) => {
                    let nested_id = self.add_class(file, package, nested, Some(id));
                    self.classes[id.index()].nested.push(nested_id);
                }
                Member::EnumConstant(constant) => {
                    let field_id = FieldId::new(self.fields.len());
                    self.fields.push(FieldInfo {
                        owner: id,
                        name: constant.name.text.clone(),
                        name_range: constant.name.range,
                        ty: None,
                        extra_dims: 0,
                        visibility: Visibility::Public,
                        is_static: true,
                        range: constant.range,
                    });
                    self.classes[id.index()].fields.push(field_id);
                    self.decls
                        .insert((file, constant.name.range.start()), DeclId::Field(field_id));
                }
                Member::Initializer(_) => {}
            }
        }
        id
    }

    fn add_record_component(&mut self, owner: ClassId, file: FileId, component: &Param) {
        let field_id = FieldId::new(self.fields.len());
        self.fields.push(FieldInfo {
            owner,
            name: component.name.text.clone(),
            name_range: component.name.range,
            ty: Some(component.ty.clone()),
            extra_dims: 0,
            visibility: Visibility::Private,
            is_static: false,
            range: component.name.range,
        });
        self.classes[owner.index()].fields.push(field_id);
        self.decls
            .insert((file, component.name.range.start()), DeclId::Field(field_id));
    }

    fn add_field(&mut self, owner: ClassId, file: FileId, field: &FieldDecl, in_interface: bool) {
        for declarator in &field.declarators {
            let field_id = FieldId::new(self.fields.len());
            self.fields.push(FieldInfo {
                owner,
                name: declarator.name.text.clone(),
                name_range: declarator.name.range,
                ty: Some(field.ty.clone()),
                extra_dims: declarator.dims,
                visibility: member_visibility(&field.modifiers, in_interface),
                is_static: in_interface || field.modifiers.is_static(),
                range: field.range,
            });
            self.classes[owner.index()].fields.push(field_id);
            self.decls
                .insert((file, declarator.name.range.start()), DeclId::Field(field_id));
        }
    }

    fn add_method(&mut self, owner: ClassId, file: FileId, method: &MethodDecl, in_interface: bool) {
        let method_id = MethodId::new(self.methods.len());
        self.methods.push(MethodInfo {
            owner,
            name: method.name.text.clone(),
            name_range: method.name.range,
            type_params: method.type_params.clone(),
            params: method
                .params
                .iter()
                .map(|p| ParamInfo {
                    name: p.name.text.clone(),
                    ty: p.ty.clone(),
                    varargs: p.varargs,
                })
                .collect(),
            return_type: method.return_type.clone(),
            visibility: member_visibility(&method.modifiers, in_interface),
            is_static: method.modifiers.is_static(),
            range: method.range,
        });
        self.classes[owner.index()].methods.push(method_id);
        self.decls
            .insert((file, method.name.range.start()), DeclId::Method(method_id));
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn files(&self) -> &[SyntaxFile] {
        &self.files
    }

    pub fn file(&self, id: FileId) -> &SyntaxFile {
        &self.files[id.index()]
    }

    /// Files that are rewritten.
    pub fn source_files(&self) -> impl Iterator<Item = &SyntaxFile> {
        self.files.iter().filter(|f| f.is_source())
    }

    pub fn class(&self, id: ClassId) -> &ClassInfo {
        &self.classes[id.index()]
    }

    pub fn field(&self, id: FieldId) -> &FieldInfo {
        &self.fields[id.index()]
    }

    pub fn method(&self, id: MethodId) -> &MethodInfo {
        &self.methods[id.index()]
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn class_by_internal_name(&self, internal_name: &str) -> Option<ClassId> {
        self.by_internal_name.get(internal_name).copied()
    }

    /// Resolve an internal name to an indexed or externally known class.
    pub fn known_class(&self, internal_name: &str) -> Option<ClassRef> {
        if let Some(id) = self.class_by_internal_name(internal_name) {
            return Some(ClassRef::Indexed(id));
        }
        self.external
            .get(internal_name)
            .map(|name| ClassRef::External(name.clone()))
    }

    /// Whether `internal_name` (`a/b`) is a package containing known classes.
    pub fn is_package(&self, internal_name: &str) -> bool {
        self.packages.contains(internal_name)
    }

    /// Internal name of a resolved class.
    pub fn class_ref_name<'a>(&'a self, class: &'a ClassRef) -> &'a str {
        match class {
            ClassRef::Indexed(id) => &self.class(*id).internal_name,
            ClassRef::External(name) => name,
        }
    }

    /// Declaration whose name token starts at `offset` in `file`.
    pub fn decl_at(&self, file: FileId, offset: TextSize) -> Option<DeclId> {
        self.decls.get(&(file, offset)).copied()
    }

    pub fn top_level_classes(&self, file: FileId) -> &[ClassId] {
        self.top_level
            .get(file.index())
            .map_or(&[], |classes| classes.as_slice())
    }

    /// Resolved direct supertypes, superclass first.
    pub fn supertypes(&self, class: ClassId) -> &[ClassRef] {
        self.supertypes
            .get(class.index())
            .map_or(&[], |supers| supers.as_slice())
    }

    /// Default superclass for classes without an `extends` clause.
    pub(super) fn implicit_superclass(&self, class: ClassId) -> Option<ClassRef> {
        let info = self.class(class);
        let name = match info.kind {
            TypeKind::Class if info.internal_name != OBJECT_INTERNAL_NAME => OBJECT_INTERNAL_NAME,
            TypeKind::Enum => "java/lang/Enum",
            TypeKind::Record => "java/lang/Record",
            TypeKind::Annotation => "java/lang/annotation/Annotation",
            _ => return None,
        };
        Some(
            self.known_class(name)
                .unwrap_or_else(|| ClassRef::External(Name::new(name))),
        )
    }

    /// Scope for resolving names written directly inside `class`.
    pub fn class_scope(&self, class: ClassId) -> Scope<'_> {
        Scope::new(self.class(class).file, Some(class))
    }
}

fn member_visibility(modifiers: &Modifiers, in_interface: bool) -> Visibility {
    match modifiers.visibility() {
        Visibility::Package if in_interface => Visibility::Public,
        visibility => visibility,
    }
}
