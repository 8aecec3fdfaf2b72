//! `@Mixin` target collection.

use tracing::debug;

use super::{MemberSite, quote};
use crate::base::Name;
use crate::hir::Scope;
use crate::parser::{Annotation, ElementValue};
use crate::remap::context::{FileSink, RemapContext};
use crate::remap::diagnostics::Issue;

/// Classes a mixin applies to, as internal names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MixinTargets {
    classes: Vec<Name>,
    /// Default `remap` for member annotations.
    remap: bool,
}

impl Default for MixinTargets {
    fn default() -> Self {
        Self {
            classes: Vec::new(),
            remap: true,
        }
    }
}

impl MixinTargets {
    pub fn classes(&self) -> &[Name] {
        &self.classes
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn remap(&self) -> bool {
        self.remap
    }

    fn push(&mut self, class: Name) {
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
    }
}

/// Read `value` class literals and `targets` strings of a `@Mixin`.
/// With `remap`, `targets` strings are rewritten in their original style.
pub(super) fn collect_targets(
    ctx: &RemapContext<'_>,
    sink: &mut FileSink<'_>,
    scope: &Scope<'_>,
    mixin: &Annotation,
    site: &MemberSite,
) -> MixinTargets {
    let mut targets = MixinTargets {
        remap: mixin
            .arg("remap")
            .and_then(|a| a.value.as_bool())
            .unwrap_or(true),
        ..MixinTargets::default()
    };

    if let Some(value) = mixin.arg("value") {
        for element in value.value.flatten() {
            match element {
                ElementValue::Class { ty, .. } => match ctx.resolver.resolve_type_class(scope, ty) {
                    Some(class) => targets.push(Name::new(ctx.program.class_ref_name(&class))),
                    None => debug!("[MIXIN] Unresolved target {}", sink.file().slice(ty.range)),
                },
                _ => site.flag(sink, Issue::unsupported("mixin target is not a class literal")),
            }
        }
    }

    if let Some(strings) = mixin.arg("targets") {
        for element in strings.value.flatten() {
            let Some(text) = element.as_str() else {
                site.flag(sink, Issue::unsupported("mixin target is not a string literal"));
                continue;
            };
            let internal = text.replace('.', "/");
            if targets.remap {
                if let Some(new_name) = ctx.chain.translate_class(&internal) {
                    let spelled = if text.contains('/') || !text.contains('.') {
                        new_name.internal().to_string()
                    } else {
                        new_name.binary()
                    };
                    sink.replace(element.range(), &quote(&spelled));
                }
            }
            targets.push(Name::new(internal));
        }
    }

    targets
}
