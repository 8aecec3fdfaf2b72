//! `@Invoker`, `@Accessor`, `@Shadow` and `@Overwrite`.

use tracing::debug;

use super::{Annotated, MemberSite, MixinClass, quote};
use crate::base::{Name, TextSize};
use crate::descriptor::{DescriptorError, Primitive, RawType, parse_method_descriptor};
use crate::hir::{DeclId, MethodId, SearchScope};
use crate::parser::{Annotation, AnnotationArg, Ident, Visibility};
use crate::remap::context::{FileSink, RemapContext};
use crate::remap::diagnostics::Issue;
use crate::remap::error::RemapError;
use crate::remap::overrides::resolve_renamed_method;
use crate::remap::resolution::{Resolution, reconcile};

const INVOKER_PREFIXES: &[&str] = &["call", "invoke"];
const ACCESSOR_PREFIXES: &[&str] = &["get", "set", "is"];

// ============================================================================
// INVOKER / ACCESSOR
// ============================================================================

pub(super) fn invoker(
    ctx: &RemapContext<'_>,
    sink: &mut FileSink<'_>,
    mixin: &MixinClass<'_>,
    site: &MemberSite,
    member: &Annotated<'_>,
    annotation: &Annotation,
) {
    let Annotated::Method { decl, id } = member else {
        return;
    };
    let value = annotation.arg("value");

    let (name, descriptor) = match value {
        Some(arg) => {
            let Some(text) = arg.value.as_str() else {
                site.flag(sink, Issue::unsupported("Invoker value is not a string literal"));
                return;
            };
            match text.find('(') {
                Some(i) => {
                    if let Err(err) = parse_method_descriptor(&text[i..]) {
                        site.flag(sink, malformed(&err));
                        return;
                    }
                    (text[..i].to_string(), Some(text[i..].to_string()))
                }
                None => (text.to_string(), None),
            }
        }
        None => match derive_target_name(&decl.name.text, INVOKER_PREFIXES) {
            Some(name) => (name, None),
            None => return,
        },
    };

    let resolution = if name == "<init>" || name == "<clinit>" {
        Resolution::Unchanged
    } else {
        let targets = mixin.targets.classes();
        let results = match &descriptor {
            Some(desc) => exact_methods(ctx, targets, &name, desc),
            None => {
                let own = id.and_then(|id| ctx.resolver.method_descriptor(id));
                let exact = own
                    .map(|desc| exact_methods(ctx, targets, &name, &desc))
                    .unwrap_or_default();
                if exact.iter().any(|(_, resolved)| resolved.is_some()) {
                    exact
                } else {
                    targets
                        .iter()
                        .flat_map(|t| ctx.methods_by_name(t, &name, None))
                        .collect()
                }
            }
        };
        reconcile(&name, results, false)
    };

    let new_name = match resolution {
        Resolution::Renamed(new_name) => new_name.to_string(),
        Resolution::Unchanged => name.clone(),
        Resolution::Flagged(issue) => {
            site.flag(sink, issue);
            return;
        }
    };
    let old_value = format!("{}{}", name, descriptor.as_deref().unwrap_or_default());
    let new_value = format!(
        "{}{}",
        new_name,
        descriptor
            .as_deref()
            .map(|d| ctx.chain.translate_descriptor(d))
            .unwrap_or_default()
    );
    if new_value != old_value {
        debug!("[MIXIN] Invoker {} -> {}", old_value, new_value);
        set_value(sink, annotation, value, &new_value);
    }
}

pub(super) fn accessor(
    ctx: &RemapContext<'_>,
    sink: &mut FileSink<'_>,
    mixin: &MixinClass<'_>,
    site: &MemberSite,
    member: &Annotated<'_>,
    annotation: &Annotation,
) {
    let Annotated::Method { decl, id } = member else {
        return;
    };
    let value = annotation.arg("value");
    let descriptor = id.and_then(|id| accessed_field_descriptor(ctx, id));
    let name = match value {
        Some(arg) => match arg.value.as_str() {
            Some(text) => text.to_string(),
            None => {
                site.flag(sink, Issue::unsupported("Accessor value is not a string literal"));
                return;
            }
        },
        None => match derive_target_name(&decl.name.text, ACCESSOR_PREFIXES) {
            Some(name) => name,
            None => return,
        },
    };

    let results = mixin
        .targets
        .classes()
        .iter()
        .flat_map(|t| match &descriptor {
            Some(desc) => vec![(format!("{t}#{name}:{desc}"), ctx.member_field(t, &name, Some(desc.as_str())))],
            None => ctx.fields_by_name(t, &name),
        })
        .collect();
    match reconcile(&name, results, false) {
        Resolution::Renamed(new_name) => {
            debug!("[MIXIN] Accessor {} -> {}", name, new_name);
            set_value(sink, annotation, value, &new_name);
        }
        Resolution::Unchanged => {}
        Resolution::Flagged(issue) => site.flag(sink, issue),
    }
}

/// Type of the field an accessor reads (getter return type) or writes
/// (setter parameter).
fn accessed_field_descriptor(ctx: &RemapContext<'_>, method: MethodId) -> Option<String> {
    let descriptor = parse_method_descriptor(&ctx.resolver.method_descriptor(method)?).ok()?;
    match (descriptor.params.as_slice(), &descriptor.ret) {
        ([], RawType::Primitive(Primitive::Void)) => None,
        ([], ret) => Some(ret.descriptor()),
        ([param], _) => Some(param.descriptor()),
        _ => None,
    }
}

pub(super) fn malformed(err: &DescriptorError) -> Issue {
    Issue::MalformedDescriptor {
        message: err.to_string(),
    }
}

fn exact_methods(
    ctx: &RemapContext<'_>,
    targets: &[Name],
    name: &str,
    descriptor: &str,
) -> Vec<(String, Option<Name>)> {
    targets
        .iter()
        .map(|t| {
            (
                format!("{t}#{name}{descriptor}"),
                ctx.member_method(t, name, descriptor),
            )
        })
        .collect()
}

/// `callFoo` -> `foo`, `getFOO` -> `FOO`.
fn derive_target_name(method: &str, prefixes: &[&str]) -> Option<String> {
    prefixes.iter().find_map(|prefix| {
        let rest = method.strip_prefix(prefix)?;
        let first = rest.chars().next()?;
        if !first.is_uppercase() {
            return None;
        }
        if rest.chars().all(|c| !c.is_lowercase()) {
            return Some(rest.to_string());
        }
        let mut out: String = first.to_lowercase().collect();
        out.push_str(&rest[first.len_utf8()..]);
        Some(out)
    })
}

/// Replace the `value` literal, or add a `value` attribute.
fn set_value(sink: &mut FileSink<'_>, annotation: &Annotation, value: Option<&AnnotationArg>, text: &str) {
    let literal = quote(text);
    if let Some(arg) = value {
        sink.replace(arg.value.range(), &literal);
        return;
    }
    let open = TextSize::from(1);
    match (&annotation.args, annotation.args_range) {
        (Some(args), Some(range)) if args.is_empty() => sink.insert(range.start() + open, literal),
        (Some(_), Some(range)) => sink.insert(range.start() + open, format!("value = {literal}, ")),
        _ => sink.insert(annotation.range.end(), format!("({literal})")),
    }
}

// ============================================================================
// SHADOW / OVERWRITE
// ============================================================================

enum ShadowLookup<'d> {
    Field(Option<&'d str>),
    Method(&'d str),
}

pub(super) fn shadow(
    ctx: &RemapContext<'_>,
    sink: &mut FileSink<'_>,
    mixin: &MixinClass<'_>,
    site: &MemberSite,
    member: &Annotated<'_>,
    annotation: &Annotation,
    is_shadow: bool,
) -> Result<(), RemapError> {
    if annotation.arg("aliases").is_some() {
        site.flag(sink, Issue::unsupported("Shadow aliases are not supported"));
        return Ok(());
    }
    let prefix = if is_shadow {
        annotation
            .arg("prefix")
            .and_then(|a| a.value.as_str())
            .unwrap_or(ctx.config.shadow_prefix.as_str())
    } else {
        ""
    };

    match member {
        Annotated::Method { decl, id: Some(id) } => {
            let Some(descriptor) = ctx.resolver.method_descriptor(*id) else {
                return Ok(());
            };
            let visibility = ctx.program.method(*id).visibility;
            rename_shadow(
                ctx,
                sink,
                mixin,
                site,
                &decl.name,
                DeclId::Method(*id),
                visibility,
                prefix,
                ShadowLookup::Method(descriptor.as_str()),
            )?;
        }
        Annotated::Field { decl, ids } => {
            for (declarator, id) in decl.declarators.iter().zip(ids) {
                let Some(id) = id else {
                    continue;
                };
                let visibility = ctx.program.field(*id).visibility;
                let descriptor = ctx.resolver.field_descriptor(*id);
                rename_shadow(
                    ctx,
                    sink,
                    mixin,
                    site,
                    &declarator.name,
                    DeclId::Field(*id),
                    visibility,
                    prefix,
                    ShadowLookup::Field(descriptor.as_deref()),
                )?;
            }
        }
        Annotated::Method { id: None, .. } => {}
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn rename_shadow(
    ctx: &RemapContext<'_>,
    sink: &mut FileSink<'_>,
    mixin: &MixinClass<'_>,
    site: &MemberSite,
    name: &Ident,
    decl: DeclId,
    visibility: Visibility,
    prefix: &str,
    lookup: ShadowLookup<'_>,
) -> Result<(), RemapError> {
    let declared = name.as_str();
    let (target, prefixed) = match declared.strip_prefix(prefix) {
        Some(stripped) if !prefix.is_empty() && !stripped.is_empty() => (stripped, true),
        _ => (declared, false),
    };

    let mut results = Vec::new();
    for owner in mixin.targets.classes() {
        let resolved = match &lookup {
            ShadowLookup::Field(descriptor) => ctx.member_field(owner, target, *descriptor),
            ShadowLookup::Method(descriptor) => {
                match target_method_resolution(ctx, owner, target, descriptor) {
                    Some(Resolution::Renamed(new_name)) => Some(new_name),
                    Some(Resolution::Flagged(issue)) => {
                        site.flag(sink, issue);
                        return Ok(());
                    }
                    Some(Resolution::Unchanged) | None => ctx.member_method(owner, target, descriptor),
                }
            }
        };
        results.push((format!("{owner}#{target}"), resolved));
    }

    let new_target = match reconcile(target, results, false) {
        Resolution::Renamed(new_target) => new_target,
        Resolution::Unchanged => return Ok(()),
        Resolution::Flagged(issue) => {
            site.flag(sink, issue);
            return Ok(());
        }
    };
    let new_name = if prefixed {
        format!("{prefix}{new_target}")
    } else {
        new_target.to_string()
    };

    let file = sink.file();
    let scope = match visibility {
        Visibility::Private => SearchScope::File(file.id()),
        Visibility::Package => match file.directory() {
            Some(dir) => SearchScope::Directory(dir.to_path_buf()),
            None => SearchScope::File(file.id()),
        },
        Visibility::Protected | Visibility::Public => {
            site.flag(
                sink,
                Issue::unsupported(format!(
                    "cannot rename {declared} to {new_name}: only private and package-private members are renamed"
                )),
            );
            return Ok(());
        }
    };

    debug!("[MIXIN] Shadow {} -> {}", declared, new_name);
    sink.replace(name.range, &new_name);
    for usage in ctx.locator.search(decl, &scope) {
        sink.replace_in(usage.file, usage.range, &new_name)?;
    }
    Ok(())
}

/// Override-aware resolution when the target class has source.
fn target_method_resolution(
    ctx: &RemapContext<'_>,
    owner: &str,
    name: &str,
    descriptor: &str,
) -> Option<Resolution> {
    let class = ctx.program.class_by_internal_name(owner)?;
    let method = ctx
        .program
        .class(class)
        .methods
        .iter()
        .copied()
        .find(|m| {
            ctx.program.method(*m).name == name
                && ctx.resolver.method_descriptor(*m).as_deref() == Some(descriptor)
        })?;
    Some(resolve_renamed_method(ctx, method))
}
