//! Mixin-style annotation values.

use ravel::parser::{ElementValue, Member, parse_java};

const MIXIN: &str = r#"package m;

@Mixin(value = {A.class, b.B.class}, remap = false)
public class AMixin {
    @Inject(method = {"tick()V", "<init>"}, at = @At(value = "INVOKE", target = "La;b()V"))
    private void onTick() {}

    @Shadow
    private int count, total;
}
"#;

#[test]
fn test_mixin_annotation_values() {
    let parse = parse_java(MIXIN);
    assert!(parse.ok(), "{:?}", parse.errors);
    let class = &parse.unit.types[0];
    let mixin = &class.modifiers.annotations[0];
    assert_eq!(mixin.simple_name(), "Mixin");

    let targets = mixin.arg("value").unwrap().value.flatten();
    assert_eq!(targets.len(), 2);
    assert!(targets.iter().all(|t| matches!(t, ElementValue::Class { .. })));
    assert_eq!(&MIXIN[targets[1].range()], "b.B.class");
    assert_eq!(mixin.arg("remap").unwrap().value.as_bool(), Some(false));
}

#[test]
fn test_nested_at_and_string_arrays() {
    let parse = parse_java(MIXIN);
    let Member::Method(method) = &parse.unit.types[0].members[0] else {
        panic!("expected a method");
    };
    let inject = &method.modifiers.annotations[0];

    let values = inject.arg("method").unwrap().value.flatten();
    let methods: Vec<&str> = values.iter().filter_map(|v| v.as_str()).collect();
    assert_eq!(methods, ["tick()V", "<init>"]);

    let ElementValue::Annotation(at) = &inject.arg("at").unwrap().value else {
        panic!("expected a nested annotation");
    };
    assert_eq!(at.simple_name(), "At");
    let target = at.arg("target").unwrap();
    assert_eq!(target.value.as_str(), Some("La;b()V"));
    assert_eq!(&MIXIN[target.value.range()], "\"La;b()V\"");
}

#[test]
fn test_marker_annotation_and_declarators() {
    let parse = parse_java(MIXIN);
    let Member::Field(field) = &parse.unit.types[0].members[1] else {
        panic!("expected a field");
    };
    let shadow = &field.modifiers.annotations[0];
    assert!(shadow.args.is_none());
    assert!(shadow.args_range.is_none());
    assert_eq!(&MIXIN[shadow.range], "@Shadow");

    let names: Vec<&str> = field.declarators.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["count", "total"]);
}

#[test]
fn test_broken_member_does_not_lose_the_class() {
    let text = "class A { int = ; void ok() {} }";
    let parse = parse_java(text);
    assert!(!parse.ok());
    let class = &parse.unit.types[0];
    assert!(class.members.iter().any(|m| matches!(m, Member::Method(m) if m.name.as_str() == "ok")));
}
