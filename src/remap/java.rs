//! General source rewriter.
//!
//! Renames every resolved class, field and method reference of a file,
//! declarations included, to its final spelling in the mapping chain.

use rustc_hash::FxHashMap;
use tracing::trace;

use super::context::{FileSink, RemapContext};
use super::diagnostics::Issue;
use super::overrides::resolve_renamed_method;
use super::resolution::{Resolution, reconcile};
use crate::base::Name;
use crate::hir::{ClassRef, MethodId, RefTarget, Reference};

/// Queue the renames of every reference in the sink's file.
pub fn rewrite_references(ctx: &RemapContext<'_>, sink: &mut FileSink<'_>) {
    let mut overrides: FxHashMap<MethodId, Resolution> = FxHashMap::default();

    for reference in ctx.references.file_references(sink.file_id()) {
        let resolution = match &reference.target {
            RefTarget::Class(class) => {
                rewrite_class(ctx, sink, reference, class);
                continue;
            }
            RefTarget::Field(field) => {
                let info = ctx.program.field(*field);
                let owner = &ctx.program.class(info.owner).internal_name;
                let descriptor = ctx.resolver.field_descriptor(*field);
                match ctx.translate_field(owner, &info.name, descriptor.as_deref()) {
                    Some(name) => Resolution::Renamed(name),
                    None => Resolution::Unchanged,
                }
            }
            RefTarget::Methods(methods) => {
                let Some(first) = methods.first() else {
                    continue;
                };
                let original = &ctx.program.method(*first).name;
                let resolutions: Vec<Resolution> = methods
                    .iter()
                    .map(|m| {
                        overrides
                            .entry(*m)
                            .or_insert_with(|| resolve_renamed_method(ctx, *m))
                            .clone()
                    })
                    .collect();
                merge_candidates(original, resolutions)
            }
            RefTarget::ExternalField { owners, name } => {
                let results = owners
                    .iter()
                    .flat_map(|owner| ctx.fields_by_name(owner, name))
                    .collect();
                reconcile(name, results, false)
            }
            RefTarget::ExternalMethod { owners, name, argc } => {
                let results = owners
                    .iter()
                    .flat_map(|owner| ctx.methods_by_name(owner, name, *argc))
                    .collect();
                reconcile(name, results, false)
            }
        };
        apply(ctx, sink, reference, resolution);
    }
}

fn apply(ctx: &RemapContext<'_>, sink: &mut FileSink<'_>, reference: &Reference, resolution: Resolution) {
    match resolution {
        Resolution::Renamed(name) => {
            trace!("[REMAP] {:?} -> {}", sink.file().slice(reference.range), name);
            sink.replace(reference.range, &name);
        }
        Resolution::Unchanged => {}
        Resolution::Flagged(issue) => {
            let context = reference.container.map(|d| ctx.describe(d));
            sink.flag(reference.anchor, context, issue);
        }
    }
}

/// Overload candidates of one call must all rename the same way.
fn merge_candidates(original: &str, resolutions: Vec<Resolution>) -> Resolution {
    let mut renamed: Option<Name> = None;
    let mut unchanged = false;
    for resolution in resolutions {
        match resolution {
            Resolution::Flagged(issue) => return Resolution::Flagged(issue),
            Resolution::Unchanged => unchanged = true,
            Resolution::Renamed(name) => match &renamed {
                Some(existing) if *existing != name => {
                    return Resolution::Flagged(Issue::AmbiguousOrigin {
                        symbol: original.to_string(),
                    });
                }
                _ => renamed = Some(name),
            },
        }
    }
    match renamed {
        Some(_) if unchanged => Resolution::Flagged(Issue::AmbiguousOrigin {
            symbol: original.to_string(),
        }),
        Some(name) => Resolution::Renamed(name),
        None => Resolution::Unchanged,
    }
}

/// Rename the simple-name token and, when written out, the package qualifier.
fn rewrite_class(ctx: &RemapContext<'_>, sink: &mut FileSink<'_>, reference: &Reference, class: &ClassRef) {
    let internal = ctx.program.class_ref_name(class);
    let Some(new_name) = ctx.chain.translate_class(internal) else {
        return;
    };
    trace!("[REMAP] class {} -> {}", internal, new_name.internal());

    sink.replace(reference.range, new_name.simple_name());

    if let Some(qualifier) = reference.package_qualifier {
        let package = new_name.package();
        let written: String = sink
            .file()
            .slice(qualifier)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if !package.is_empty() && written != package {
            sink.replace(qualifier, &package);
        }
    }
}
