//! Descriptor encoding round-trips and embedded class reference rewriting.

use ravel::descriptor::{
    MethodDescriptor, Primitive, RawType, SourceType, encode_method_descriptor,
    encode_raw_type, parse_field_descriptor, parse_method_descriptor,
    rewrite_embedded_class_refs,
};

fn class(name: &str) -> SourceType {
    SourceType::Class(name.into())
}

fn array(component: SourceType) -> SourceType {
    SourceType::Array(Box::new(component))
}

#[test]
fn test_every_primitive_round_trips() {
    for primitive in Primitive::ALL {
        let raw = encode_raw_type(&SourceType::Primitive(primitive));
        if primitive != Primitive::Void {
            assert_eq!(parse_field_descriptor(&raw.descriptor()).unwrap(), raw);
        }
        let method = encode_method_descriptor(&[], Some(&SourceType::Primitive(primitive)));
        assert_eq!(parse_method_descriptor(&method.to_string()).unwrap(), method);
    }
}

#[test]
fn test_nested_arrays_and_objects_round_trip() {
    let params = [
        array(array(SourceType::Primitive(Primitive::Int))),
        class("java/lang/String"),
        array(class("a/Outer$Inner")),
        SourceType::Primitive(Primitive::Long),
    ];
    let ret = array(array(array(class("a/b/C"))));
    let method = encode_method_descriptor(&params, Some(&ret));

    let text = method.to_string();
    assert_eq!(text, "([[ILjava/lang/String;[La/Outer$Inner;J)[[[La/b/C;");
    assert_eq!(parse_method_descriptor(&text).unwrap(), method);
}

#[test]
fn test_type_variables_erase_before_encoding() {
    let bounded = SourceType::Variable {
        bounds: vec![class("java/lang/Comparable")],
    };
    let unbounded = SourceType::Variable { bounds: Vec::new() };
    let method = encode_method_descriptor(&[bounded, array(unbounded)], None);
    assert_eq!(
        method,
        MethodDescriptor::new(
            vec![
                RawType::object("java/lang/Comparable"),
                RawType::array_of(RawType::object("java/lang/Object")),
            ],
            RawType::Primitive(Primitive::Void),
        )
    );
}

#[test]
fn test_rewrite_without_class_refs_is_noop() {
    let mut calls = 0;
    let out = rewrite_embedded_class_refs("([IJZ)[D", |_| {
        calls += 1;
        Some("x/Y".to_string())
    });
    assert_eq!(out, "([IJZ)[D");
    assert_eq!(calls, 0);
}

#[test]
fn test_rewrite_touches_only_matched_spans() {
    let out = rewrite_embedded_class_refs("La/Foo;tick(La/Foo;ILa/Keep;)V", |name| match name {
        "a/Foo" => Some("x/Qux".to_string()),
        _ => None,
    });
    assert_eq!(out, "Lx/Qux;tick(Lx/Qux;ILa/Keep;)V");
}
