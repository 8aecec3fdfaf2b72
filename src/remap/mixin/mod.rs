//! Mixin Semantic Resolver.
//!
//! Mixin annotations name members of other classes in string attributes.
//! The injection framework looks those names up itself, so they have to be
//! translated along with the code.
//!
//! Each class is processed in two passes: `@Mixin` first, which yields the
//! [`MixinTargets`], then the member annotations that resolve against them.
//!
//! ## Key Types
//!
//! - [`MixinAnnotation`] - Closed vocabulary, matched on the resolved annotation name
//! - [`MixinTargets`] - Target classes of one mixin
//! - [`MemberSelector`] - `Lowner;name(desc)` selector strings

mod injection;
mod kind;
mod members;
mod selector;
mod targets;

pub use kind::{InjectorKind, MixinAnnotation};
pub use selector::{MemberSelector, SelectorDescriptor};
pub use targets::MixinTargets;

use tracing::debug;

use super::context::{FileSink, RemapContext};
use super::diagnostics::Issue;
use super::error::RemapError;
use crate::base::TextSize;
use crate::hir::{ClassId, DeclId, FieldId, MethodId, NameRes, Scope};
use crate::mapping::replace_all_qualifiers;
use crate::parser::strings::escape;
use crate::parser::{Annotation, FieldDecl, Member, MethodDecl, TypeDecl};

/// Queue the mixin rewrites of the sink's file.
pub fn rewrite_mixins(ctx: &RemapContext<'_>, sink: &mut FileSink<'_>) -> Result<(), RemapError> {
    let file = sink.file();
    for (decl, class) in file
        .unit()
        .types
        .iter()
        .zip(ctx.program.top_level_classes(file.id()))
    {
        process_class(ctx, sink, decl, *class)?;
    }
    Ok(())
}

// ============================================================================
// SHARED STATE
// ============================================================================

/// Where diagnostics about a declaration go.
pub(super) struct MemberSite {
    pub anchor: TextSize,
    /// `owner#member` of the declaration.
    pub context: Option<String>,
}

impl MemberSite {
    fn new(ctx: &RemapContext<'_>, anchor: TextSize, decl: Option<DeclId>) -> Self {
        Self {
            anchor,
            context: decl.map(|d| ctx.describe(d)),
        }
    }

    pub fn flag(&self, sink: &mut FileSink<'_>, issue: Issue) {
        sink.flag(self.anchor, self.context.clone(), issue);
    }
}

/// A class after its `@Mixin` has been read.
pub(super) struct MixinClass<'m> {
    pub name: String,
    /// Resolves names written in member annotations.
    pub scope: Scope<'m>,
    pub targets: MixinTargets,
}

/// The declaration a member annotation is attached to.
pub(super) enum Annotated<'m> {
    /// One id per declarator.
    Field {
        decl: &'m FieldDecl,
        ids: Vec<Option<FieldId>>,
    },
    Method {
        decl: &'m MethodDecl,
        id: Option<MethodId>,
    },
}

/// A string literal for `value`.
pub(super) fn quote(value: &str) -> String {
    format!("\"{}\"", escape(value))
}

// ============================================================================
// ANNOTATION KINDS
// ============================================================================

/// Classify an annotation by the class its name resolves to. Simple names
/// the resolver cannot place are also tried against on-demand imports of
/// the mixin packages.
pub(super) fn annotation_kind(
    ctx: &RemapContext<'_>,
    sink: &FileSink<'_>,
    scope: &Scope<'_>,
    annotation: &Annotation,
) -> Option<MixinAnnotation> {
    let names: Vec<&str> = annotation
        .name
        .segments
        .iter()
        .map(|s| s.as_str())
        .collect();

    let resolved = match ctx.resolver.resolve_qualified_type(scope, &names).pop() {
        Some(NameRes::Class(class)) => Some(ctx.program.class_ref_name(&class).to_string()),
        _ => None,
    };
    if let Some(internal) = &resolved {
        if let Some(kind) = MixinAnnotation::classify(&replace_all_qualifiers(internal)) {
            return Some(kind);
        }
        if !internal.starts_with("java/lang/") {
            return None;
        }
    }

    let [simple] = names.as_slice() else {
        return MixinAnnotation::classify(&annotation.name.to_dotted());
    };
    sink.file()
        .unit()
        .imports
        .iter()
        .filter(|import| import.on_demand && !import.is_static)
        .map(|import| import.path.to_dotted())
        .filter(|package| kind::is_mixin_package(package))
        .find_map(|package| MixinAnnotation::classify(&format!("{package}.{simple}")))
}

// ============================================================================
// CLASSES AND MEMBERS
// ============================================================================

fn process_class(
    ctx: &RemapContext<'_>,
    sink: &mut FileSink<'_>,
    decl: &TypeDecl,
    class: ClassId,
) -> Result<(), RemapError> {
    let info = ctx.program.class(class);
    let outer_scope = Scope::new(info.file, info.outer);
    let site = MemberSite::new(ctx, decl.range.start(), Some(DeclId::Class(class)));

    let mut targets = MixinTargets::default();
    for annotation in &decl.modifiers.annotations {
        match annotation_kind(ctx, sink, &outer_scope, annotation) {
            Some(MixinAnnotation::Mixin) => {
                targets = targets::collect_targets(ctx, sink, &outer_scope, annotation, &site);
                debug!("[MIXIN] {} targets {:?}", info.internal_name, targets.classes());
            }
            Some(MixinAnnotation::Unknown) => site.flag(sink, not_implemented(annotation)),
            _ => {}
        }
    }

    let mixin = MixinClass {
        name: info.qualified_name(),
        scope: ctx.program.class_scope(class),
        targets,
    };

    let mut nested = info.nested.iter().copied();
    for member in &decl.members {
        match member {
            Member::Type(nested_decl) => {
                if let Some(nested_id) = nested.next() {
                    process_class(ctx, sink, nested_decl, nested_id)?;
                }
            }
            Member::Field(field) => {
                let ids: Vec<Option<FieldId>> = field
                    .declarators
                    .iter()
                    .map(|d| match ctx.program.decl_at(info.file, d.name.range.start()) {
                        Some(DeclId::Field(id)) => Some(id),
                        _ => None,
                    })
                    .collect();
                let decl_id = ids.iter().flatten().next().map(|id| DeclId::Field(*id));
                let site = MemberSite::new(ctx, field.range.start(), decl_id);
                let annotated = Annotated::Field { decl: field, ids };
                process_member(ctx, sink, &mixin, &site, &annotated, &field.modifiers.annotations)?;
            }
            Member::Method(method) => {
                let id = match ctx.program.decl_at(info.file, method.name.range.start()) {
                    Some(DeclId::Method(id)) => Some(id),
                    _ => None,
                };
                let site = MemberSite::new(ctx, method.range.start(), id.map(DeclId::Method));
                let annotated = Annotated::Method { decl: method, id };
                process_member(ctx, sink, &mixin, &site, &annotated, &method.modifiers.annotations)?;
            }
            Member::Initializer(_) | Member::EnumConstant(_) => {}
        }
    }
    Ok(())
}

fn process_member(
    ctx: &RemapContext<'_>,
    sink: &mut FileSink<'_>,
    mixin: &MixinClass<'_>,
    site: &MemberSite,
    member: &Annotated<'_>,
    annotations: &[Annotation],
) -> Result<(), RemapError> {
    for annotation in annotations {
        let Some(kind) = annotation_kind(ctx, sink, &mixin.scope, annotation) else {
            continue;
        };
        if kind == MixinAnnotation::Unknown {
            site.flag(sink, not_implemented(annotation));
            continue;
        }
        if !kind.needs_targets() {
            continue;
        }

        let remap = annotation
            .arg("remap")
            .and_then(|a| a.value.as_bool())
            .unwrap_or(mixin.targets.remap());
        if !remap {
            continue;
        }
        if mixin.targets.is_empty() {
            site.flag(
                sink,
                Issue::MissingTarget {
                    mixin: mixin.name.clone(),
                },
            );
            continue;
        }

        match kind {
            MixinAnnotation::Shadow => members::shadow(ctx, sink, mixin, site, member, annotation, true)?,
            MixinAnnotation::Overwrite => {
                members::shadow(ctx, sink, mixin, site, member, annotation, false)?
            }
            MixinAnnotation::Invoker => members::invoker(ctx, sink, mixin, site, member, annotation),
            MixinAnnotation::Accessor => members::accessor(ctx, sink, mixin, site, member, annotation),
            MixinAnnotation::Injector(_) => injection::injector(ctx, sink, mixin, site, annotation, remap),
            MixinAnnotation::Mixin
            | MixinAnnotation::At
            | MixinAnnotation::Passthrough
            | MixinAnnotation::Unknown => {}
        }
    }
    Ok(())
}

fn not_implemented(annotation: &Annotation) -> Issue {
    Issue::unsupported(format!(
        "{} mixin annotation is not implemented",
        annotation.simple_name()
    ))
}
