//! Type hierarchy queries: member lookup through supertypes, erased
//! descriptors and override sets.

use rustc_hash::FxHashSet;

use super::ids::{ClassId, ClassRef, FieldId, MethodId};
use super::resolve::Resolver;
use crate::base::Name;
use crate::descriptor::{SourceType, encode_method_descriptor, encode_raw_type};
use crate::parser::Visibility;

/// A method that a declaration overrides and that overrides nothing itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OverriddenMethod {
    Indexed(MethodId),
    /// Declared on a class without source. Name and descriptor are the
    /// overriding method's own.
    External { owner: Name },
}

impl<'a> Resolver<'a> {
    /// Every supertype reachable from `class`, nearest first.
    pub fn ancestors(&self, class: ClassId) -> Vec<ClassRef> {
        let mut out: Vec<ClassRef> = Vec::new();
        let mut queue: Vec<ClassRef> = self.index().supertypes(class).to_vec();
        let mut cursor = 0;
        while cursor < queue.len() {
            let next = queue[cursor].clone();
            cursor += 1;
            if next == ClassRef::Indexed(class) || out.contains(&next) {
                continue;
            }
            if let ClassRef::Indexed(id) = &next {
                queue.extend(self.index().supertypes(*id).iter().cloned());
            }
            out.push(next);
        }
        out
    }

    /// Internal names of the ancestors of `class` that have no source.
    pub fn external_ancestors(&self, class: ClassId) -> Vec<Name> {
        self.ancestors(class)
            .into_iter()
            .filter_map(|c| match c {
                ClassRef::External(name) => Some(name),
                ClassRef::Indexed(_) => None,
            })
            .collect()
    }

    /// Field `name` declared in `class` or inherited by it.
    pub fn find_field(&self, class: ClassId, name: &str) -> Option<FieldId> {
        let declared = |c: ClassId| {
            self.index()
                .class(c)
                .fields
                .iter()
                .copied()
                .find(|f| self.index().field(*f).name == name)
        };
        declared(class).or_else(|| {
            self.ancestors(class)
                .iter()
                .filter_map(ClassRef::as_indexed)
                .find_map(declared)
        })
    }

    /// Methods named `name` visible on `class`, most-derived first. An
    /// inherited method hidden by a declaration with the same descriptor is
    /// left out.
    pub fn find_methods(&self, class: ClassId, name: &str) -> Vec<MethodId> {
        let mut out = Vec::new();
        let mut seen: FxHashSet<Name> = FxHashSet::default();
        let classes = std::iter::once(class).chain(
            self.ancestors(class)
                .into_iter()
                .filter_map(|c| c.as_indexed()),
        );
        for c in classes {
            for method in &self.index().class(c).methods {
                let info = self.index().method(*method);
                if info.name != name || (c != class && info.is_constructor()) {
                    continue;
                }
                match self.method_descriptor(*method) {
                    Some(descriptor) => {
                        if seen.insert(descriptor) {
                            out.push(*method);
                        }
                    }
                    None => out.push(*method),
                }
            }
        }
        out
    }

    /// Member type `name` declared in `class` or inherited by it.
    pub fn find_member_type(&self, class: ClassId, name: &str) -> Option<ClassId> {
        let declared = |c: ClassId| {
            self.index()
                .class(c)
                .nested
                .iter()
                .copied()
                .find(|n| self.index().class(*n).simple_name == name)
        };
        declared(class).or_else(|| {
            self.ancestors(class)
                .iter()
                .filter_map(ClassRef::as_indexed)
                .find_map(declared)
        })
    }

    // ========================================================================
    // DESCRIPTORS
    // ========================================================================

    /// Erased descriptor of a method, `None` if a parameter type does not resolve.
    pub fn method_descriptor(&self, method: MethodId) -> Option<Name> {
        if let Some(cached) = self.index().method_descriptors.read().get(&method) {
            return cached.clone();
        }
        let descriptor = self.compute_method_descriptor(method);
        self.index()
            .method_descriptors
            .write()
            .insert(method, descriptor.clone());
        descriptor
    }

    fn compute_method_descriptor(&self, method: MethodId) -> Option<Name> {
        let info = self.index().method(method);
        let scope = self
            .index()
            .class_scope(info.owner)
            .with_type_params(&info.type_params);

        let mut params = Vec::with_capacity(info.params.len());
        for param in &info.params {
            let ty = self.source_type(&scope, &param.ty)?;
            params.push(if param.varargs {
                SourceType::Array(Box::new(ty))
            } else {
                ty
            });
        }
        let ret = match &info.return_type {
            Some(ty) => Some(self.source_type(&scope, ty)?),
            None => None,
        };
        Some(Name::new(encode_method_descriptor(&params, ret.as_ref()).to_string()))
    }

    /// Erased descriptor of a field.
    pub fn field_descriptor(&self, field: FieldId) -> Option<Name> {
        let info = self.index().field(field);
        let mut ty = match &info.ty {
            Some(ty) => self.source_type(&self.index().class_scope(info.owner), ty)?,
            // Enum constant
            None => SourceType::Class(self.index().class(info.owner).internal_name.clone()),
        };
        for _ in 0..info.extra_dims {
            ty = SourceType::Array(Box::new(ty));
        }
        Some(Name::new(encode_raw_type(&ty).descriptor()))
    }

    // ========================================================================
    // OVERRIDES
    // ========================================================================

    /// The root declarations `method` overrides: overridden methods that do
    /// not themselves override anything. Empty when `method` overrides nothing.
    ///
    /// Members of supertypes without source are unknown to the index;
    /// `declares_external(owner, name, descriptor)` decides whether such a
    /// supertype declares the method.
    pub fn deepest_super_methods(
        &self,
        method: MethodId,
        declares_external: &dyn Fn(&str, &str, &str) -> bool,
    ) -> Vec<OverriddenMethod> {
        let info = self.index().method(method);
        if info.is_constructor() || info.is_static || info.visibility == Visibility::Private {
            return Vec::new();
        }
        let Some(descriptor) = self.method_descriptor(method) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        let mut visited = FxHashSet::default();
        visited.insert(ClassRef::Indexed(info.owner));
        for parent in self.index().supertypes(info.owner) {
            self.collect_overridden(
                parent,
                &info.name,
                &descriptor,
                declares_external,
                &mut visited,
                &mut out,
            );
        }
        out
    }

    fn collect_overridden(
        &self,
        class: &ClassRef,
        name: &str,
        descriptor: &str,
        declares_external: &dyn Fn(&str, &str, &str) -> bool,
        visited: &mut FxHashSet<ClassRef>,
        out: &mut Vec<OverriddenMethod>,
    ) {
        if !visited.insert(class.clone()) {
            return;
        }
        let id = match class {
            ClassRef::Indexed(id) => *id,
            ClassRef::External(owner) => {
                if !declares_external(owner, name, descriptor) {
                    return;
                }
                let found = OverriddenMethod::External {
                    owner: owner.clone(),
                };
                if !out.contains(&found) {
                    out.push(found);
                }
                return;
            }
        };

        let declared = self.index().class(id).methods.iter().copied().find(|m| {
            let info = self.index().method(*m);
            info.name == name
                && !info.is_static
                && !info.is_constructor()
                && info.visibility != Visibility::Private
                && self.method_descriptor(*m).as_deref() == Some(descriptor)
        });

        match declared {
            Some(overridden) => {
                let deeper = self.deepest_super_methods(overridden, declares_external);
                if deeper.is_empty() {
                    let found = OverriddenMethod::Indexed(overridden);
                    if !out.contains(&found) {
                        out.push(found);
                    }
                } else {
                    for found in deeper {
                        if !out.contains(&found) {
                            out.push(found);
                        }
                    }
                }
            }
            None => {
                for parent in self.index().supertypes(id) {
                    self.collect_overridden(parent, name, descriptor, declares_external, visited, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::hir::ProgramIndex;
    use crate::syntax::SyntaxFile;

    fn no_externals(_: &str, _: &str, _: &str) -> bool {
        false
    }

    fn build(text: &str) -> ProgramIndex {
        ProgramIndex::new(vec![SyntaxFile::source(FileId::new(0), "a/A.java", text)])
    }

    fn method(index: &ProgramIndex, class: &str, name: &str) -> MethodId {
        let class = index.class_by_internal_name(class).unwrap();
        index
            .class(class)
            .methods
            .iter()
            .copied()
            .find(|m| index.method(*m).name == name)
            .unwrap()
    }

    #[test]
    fn test_method_descriptor() {
        let index = build("package a; class A<T> { int[] run(String s, T t, long... ls) { return null; } }");
        let resolver = Resolver::new(&index);
        let run = method(&index, "a/A", "run");
        assert_eq!(
            resolver.method_descriptor(run).as_deref(),
            Some("(Ljava/lang/String;Ljava/lang/Object;[J)[I")
        );
    }

    #[test]
    fn test_deepest_super_methods_through_chain() {
        let index = build(
            "package a; interface I { void go(); } \
             class B implements I { public void go() {} } \
             class C extends B { public void go() {} }",
        );
        let resolver = Resolver::new(&index);
        let c_go = method(&index, "a/C", "go");
        let i_go = method(&index, "a/I", "go");
        assert_eq!(resolver.deepest_super_methods(c_go, &no_externals), vec![OverriddenMethod::Indexed(i_go)]);
        assert!(resolver.deepest_super_methods(i_go, &no_externals).is_empty());
    }

    #[test]
    fn test_diamond_has_two_roots() {
        let index = build(
            "package a; interface I { void go(); } interface J { void go(); } \
             class C implements I, J { public void go() {} }",
        );
        let resolver = Resolver::new(&index);
        let roots = resolver.deepest_super_methods(method(&index, "a/C", "go"), &no_externals);
        assert_eq!(roots.len(), 2);
    }

    #[test]
    fn test_private_and_static_override_nothing() {
        let index = build(
            "package a; class B { void a() {} static void b() {} } \
             class C extends B { private void a() {} static void b() {} }",
        );
        let resolver = Resolver::new(&index);
        assert!(resolver
            .deepest_super_methods(method(&index, "a/C", "a"), &no_externals)
            .is_empty());
        assert!(resolver
            .deepest_super_methods(method(&index, "a/C", "b"), &no_externals)
            .is_empty());
    }

    #[test]
    fn test_external_superclass() {
        let index = build("package a; class C extends x.Base { public void go() {} }");
        let resolver = Resolver::new(&index);
        assert_eq!(
            resolver.deepest_super_methods(method(&index, "a/C", "go"), &|owner, _, _| {
                owner == "x/Base"
            }),
            vec![OverriddenMethod::External {
                owner: Name::new("x/Base")
            }]
        );
    }

    #[test]
    fn test_find_field_inherited() {
        let index = build("package a; class B { int x; } class C extends B {}");
        let resolver = Resolver::new(&index);
        let c = index.class_by_internal_name("a/C").unwrap();
        let field = resolver.find_field(c, "x").unwrap();
        assert_eq!(index.class(index.field(field).owner).simple_name, "B");
    }
}
