//! Injector annotations and their `@At` injection points.

use tracing::debug;

use super::members::malformed;
use super::selector::{MemberSelector, SelectorDescriptor};
use super::{MemberSite, MixinAnnotation, MixinClass, annotation_kind, quote};
use crate::base::{Name, TextRange};
use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
use crate::parser::{Annotation, ElementValue};
use crate::remap::context::{FileSink, RemapContext};
use crate::remap::diagnostics::Issue;
use crate::remap::resolution::{Resolution, reconcile};

/// Injection points whose `target` names no member.
const INERT_POINTS: &[&str] = &[
    "HEAD",
    "RETURN",
    "TAIL",
    "JUMP",
    "CONSTANT",
    "STORE",
    "LOAD",
    "MIXINEXTRAS:EXPRESSION",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MemberRole {
    Field,
    Method,
}

/// Rewrite the `method` selectors of an injector and every `@At` nested in
/// its other attributes.
pub(super) fn injector(
    ctx: &RemapContext<'_>,
    sink: &mut FileSink<'_>,
    mixin: &MixinClass<'_>,
    site: &MemberSite,
    annotation: &Annotation,
    remap: bool,
) {
    for arg in annotation.args() {
        let is_method = arg.key.as_ref().is_some_and(|k| k.text == "method");
        if !is_method {
            visit_points(ctx, sink, mixin, site, &arg.value, remap);
            continue;
        }
        for element in arg.value.flatten() {
            match element.as_str() {
                Some(text) => {
                    rewrite_selector(ctx, sink, mixin, site, element.range(), text, MemberRole::Method)
                }
                None => site.flag(sink, Issue::unsupported("injector method is not a string literal")),
            }
        }
    }
}

fn visit_points(
    ctx: &RemapContext<'_>,
    sink: &mut FileSink<'_>,
    mixin: &MixinClass<'_>,
    site: &MemberSite,
    value: &ElementValue,
    remap: bool,
) {
    match value {
        ElementValue::Annotation(nested) => {
            let remap = nested
                .arg("remap")
                .and_then(|a| a.value.as_bool())
                .unwrap_or(remap);
            if annotation_kind(ctx, sink, &mixin.scope, nested) == Some(MixinAnnotation::At) {
                return at_point(ctx, sink, mixin, site, nested, remap);
            }
            for arg in nested.args() {
                visit_points(ctx, sink, mixin, site, &arg.value, remap);
            }
        }
        ElementValue::Array { elements, .. } => {
            for element in elements {
                visit_points(ctx, sink, mixin, site, element, remap);
            }
        }
        _ => {}
    }
}

fn at_point(
    ctx: &RemapContext<'_>,
    sink: &mut FileSink<'_>,
    mixin: &MixinClass<'_>,
    site: &MemberSite,
    at: &Annotation,
    remap: bool,
) {
    if !remap {
        return;
    }
    let Some(point) = at.arg("value") else {
        return;
    };
    let Some(point) = point.value.as_str() else {
        site.flag(sink, Issue::unsupported("injection point is not a string literal"));
        return;
    };

    if INERT_POINTS.contains(&point) {
        return;
    }
    let role = match point {
        "FIELD" => MemberRole::Field,
        "INVOKE" | "INVOKE_ASSIGN" | "INVOKE_STRING" | "NEW" => MemberRole::Method,
        other => {
            site.flag(sink, Issue::unsupported(format!("injection point {other} is not supported")));
            return;
        }
    };
    for key in ["desc", "args"] {
        if at.arg(key).is_some() {
            site.flag(sink, Issue::unsupported(format!("@At {key} attribute is not supported")));
            return;
        }
    }

    let Some(target) = at.arg("target") else {
        return;
    };
    let Some(text) = target.value.as_str() else {
        site.flag(sink, Issue::unsupported("@At target is not a string literal"));
        return;
    };
    if point == "NEW" {
        rewrite_new_target(ctx, sink, site, target.value.range(), text);
    } else {
        rewrite_selector(ctx, sink, mixin, site, target.value.range(), text, role)
    }
}

/// Translate owner, name and descriptor of a selector literal.
fn rewrite_selector(
    ctx: &RemapContext<'_>,
    sink: &mut FileSink<'_>,
    mixin: &MixinClass<'_>,
    site: &MemberSite,
    range: TextRange,
    text: &str,
    role: MemberRole,
) {
    if text.contains('*') || text.contains(' ') {
        site.flag(
            sink,
            Issue::unsupported(format!("wildcard target {text:?} cannot be remapped safely")),
        );
        return;
    }
    let selector = match MemberSelector::parse(text) {
        Ok(selector) => selector,
        Err(err) => {
            site.flag(sink, malformed(&err));
            return;
        }
    };
    let owners: Vec<Name> = match &selector.owner {
        Some(owner) => vec![owner.clone()],
        None => mixin.targets.classes().to_vec(),
    };

    let resolution = if selector.is_initializer() || selector.name.is_empty() {
        Resolution::Unchanged
    } else {
        let role = match selector.descriptor {
            Some(SelectorDescriptor::Field(_)) => MemberRole::Field,
            Some(SelectorDescriptor::Method(_)) => MemberRole::Method,
            None => role,
        };
        let name = &selector.name;
        let results: Vec<(String, Option<Name>)> = match (role, selector.method_descriptor()) {
            (MemberRole::Field, _) => owners
                .iter()
                .map(|o| {
                    let resolved = ctx.member_field(o, name, selector.field_descriptor());
                    (format!("{o}#{name}"), resolved)
                })
                .collect(),
            (MemberRole::Method, Some(desc)) => owners
                .iter()
                .map(|o| (format!("{o}#{name}{desc}"), ctx.member_method(o, name, desc)))
                .collect(),
            (MemberRole::Method, None) => owners
                .iter()
                .flat_map(|o| ctx.methods_by_name(o, name, None))
                .collect(),
        };
        reconcile(name, results, false)
    };

    let name = match resolution {
        Resolution::Renamed(name) => name,
        Resolution::Unchanged => selector.name.clone(),
        Resolution::Flagged(issue) => {
            site.flag(sink, issue);
            return;
        }
    };
    let rewritten = MemberSelector {
        owner: selector
            .owner
            .as_ref()
            .map(|o| ctx.chain.resolve_class(o).unwrap_or_else(|| o.clone())),
        name,
        descriptor: selector.descriptor.as_ref().map(|d| match d {
            SelectorDescriptor::Method(desc) => {
                SelectorDescriptor::Method(ctx.chain.translate_descriptor(desc))
            }
            SelectorDescriptor::Field(desc) => {
                SelectorDescriptor::Field(ctx.chain.translate_descriptor(desc))
            }
        }),
    }
    .to_string();

    if rewritten != text {
        debug!("[MIXIN] Selector {} -> {}", text, rewritten);
        sink.replace(range, &quote(&rewritten));
    }
}

/// `NEW` targets: a constructor descriptor, `Lclass;`, or a class name.
fn rewrite_new_target(
    ctx: &RemapContext<'_>,
    sink: &mut FileSink<'_>,
    site: &MemberSite,
    range: TextRange,
    text: &str,
) {
    let parsed = if text.starts_with('(') {
        parse_method_descriptor(text).map(|_| ())
    } else if text.starts_with('L') && text.ends_with(';') {
        parse_field_descriptor(text).map(|_| ())
    } else {
        let internal = text.replace('.', "/");
        let spelled = match ctx.chain.translate_class(&internal) {
            Some(new_name) if text.contains('/') || !text.contains('.') => new_name.internal().to_string(),
            Some(new_name) => new_name.binary(),
            None => return,
        };
        if spelled != text {
            sink.replace(range, &quote(&spelled));
        }
        return;
    };
    if let Err(err) = parsed {
        site.flag(sink, malformed(&err));
        return;
    }
    let rewritten = ctx.chain.translate_descriptor(text);
    if rewritten != text {
        sink.replace(range, &quote(&rewritten));
    }
}
