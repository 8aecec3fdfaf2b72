//! Override Resolver.
//!
//! A method is renamed consistently with the declarations it overrides. The
//! mapping usually names a method only on the type that first declared it, so
//! the lookup starts from the deepest overridden declarations rather than the
//! method itself.

use tracing::trace;

use super::context::RemapContext;
use super::resolution::{Resolution, reconcile};
use crate::base::Name;
use crate::hir::{MethodId, OverriddenMethod};
use crate::mapping::MethodSymbol;

/// New name for `method` and every declaration in its override set.
///
/// Each deepest overridden declaration (or the method itself when it
/// overrides nothing) is looked up with its own declaring type as owner. All
/// of them must resolve, and all must agree.
pub fn resolve_renamed_method(ctx: &RemapContext<'_>, method: MethodId) -> Resolution {
    let info = ctx.program.method(method);
    if info.is_constructor() {
        return Resolution::Unchanged;
    }
    let Some(descriptor) = ctx.resolver.method_descriptor(method) else {
        trace!("[REMAP] No descriptor for {}", ctx.describe(method.into()));
        return Resolution::Unchanged;
    };

    let declares_external = |owner: &str, name: &str, desc: &str| {
        ctx.first_table()
            .and_then(|table| table.get_class(owner))
            .and_then(|class| class.get_method(name, desc))
            .is_some()
    };
    let roots = ctx.resolver.deepest_super_methods(method, &declares_external);

    let candidates: Vec<(Name, Option<Name>)> = if roots.is_empty() {
        vec![(
            ctx.program.class(info.owner).internal_name.clone(),
            Some(descriptor.clone()),
        )]
    } else {
        roots
            .into_iter()
            .map(|root| match root {
                OverriddenMethod::Indexed(id) => {
                    let root_info = ctx.program.method(id);
                    (
                        ctx.program.class(root_info.owner).internal_name.clone(),
                        ctx.resolver.method_descriptor(id),
                    )
                }
                OverriddenMethod::External { owner } => (owner, Some(descriptor.clone())),
            })
            .collect()
    };

    let results = candidates
        .into_iter()
        .map(|(owner, desc)| {
            let desc = desc.unwrap_or_default();
            let resolved = ctx
                .chain
                .resolve_method(&MethodSymbol::new(owner.clone(), info.name.clone(), desc.clone()))
                .map(|m| m.name);
            (format!("{}#{}{}", owner, info.name, desc), resolved)
        })
        .collect();

    reconcile(&info.name, results, true)
}
