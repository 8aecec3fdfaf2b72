//! Chain composition over small synthetic tables.

use std::sync::Arc;

use ravel::mapping::{MappingChain, NamespaceMapping, parse_tiny_v2};
use rstest::rstest;

const OFFICIAL_TO_INTERMEDIARY: &str = "tiny\t2\t0\tofficial\tintermediary
c\ta\tpkg/class_1
\tf\tI\tb\tfield_1
\tm\t(La;)La;\tc\tmethod_1
\tm\t()V\tc\tmethod_2
c\td\tpkg/class_2
\tm\t([La;J)V\te\tmethod_3
c\tz\tpkg/class_3
";

const INTERMEDIARY_TO_NAMED: &str = "tiny\t2\t0\tintermediary\tnamed
c\tpkg/class_1\tpkg/Foo
\tf\tI\tfield_1\tcount
\tm\t(Lpkg/class_1;)Lpkg/class_1;\tmethod_1\tcombine
\tm\t()V\tmethod_2\treset
c\tpkg/class_2\tpkg/Bar
\tm\t([Lpkg/class_1;J)V\tmethod_3\tvisit
";

fn two_step() -> MappingChain {
    let first = parse_tiny_v2(OFFICIAL_TO_INTERMEDIARY).unwrap();
    let second = parse_tiny_v2(INTERMEDIARY_TO_NAMED).unwrap();
    MappingChain::from_tables([
        (Arc::new(first), "intermediary"),
        (Arc::new(second), "named"),
    ])
    .unwrap()
}

fn flattened() -> MappingChain {
    let flat = two_step().flatten().unwrap();
    MappingChain::from_tables([(Arc::new(flat), "named")]).unwrap()
}

#[rstest]
#[case("a", Some("pkg/Foo"))]
#[case("d", Some("pkg/Bar"))]
#[case("z", None)]
#[case("unknown", None)]
fn test_class_transitivity(#[case] class: &str, #[case] expected: Option<&str>) {
    let chain = two_step();
    let flat = flattened();
    assert_eq!(chain.resolve_class(class).as_deref(), expected);
    assert_eq!(flat.resolve_class(class), chain.resolve_class(class));
}

#[rstest]
#[case("a", "c", "(La;)La;", Some("combine"))]
#[case("a", "c", "()V", Some("reset"))]
#[case("d", "e", "([La;J)V", Some("visit"))]
#[case("a", "missing", "()V", None)]
fn test_method_transitivity(
    #[case] owner: &str,
    #[case] name: &str,
    #[case] descriptor: &str,
    #[case] expected: Option<&str>,
) {
    let chain = two_step();
    let flat = flattened();
    assert_eq!(chain.translate_method(owner, name, descriptor).as_deref(), expected);
    assert_eq!(
        flat.translate_method(owner, name, descriptor),
        chain.translate_method(owner, name, descriptor)
    );
}

#[test]
fn test_field_transitivity() {
    let chain = two_step();
    let flat = flattened();
    assert_eq!(chain.translate_field("a", "b", Some("I")).as_deref(), Some("count"));
    assert_eq!(flat.translate_field("a", "b", Some("I")).as_deref(), Some("count"));
    assert_eq!(flat.translate_field("a", "b", None).as_deref(), Some("count"));
}

#[test]
fn test_descriptor_through_chain() {
    let chain = two_step();
    assert_eq!(chain.translate_descriptor("(La;)La;"), "(Lpkg/Foo;)Lpkg/Foo;");
    assert_eq!(chain.translate_descriptor("([La;Lz;)V"), "([Lpkg/Foo;Lz;)V");
    assert_eq!(
        flattened().translate_descriptor("([La;Lz;)V"),
        chain.translate_descriptor("([La;Lz;)V")
    );
}

#[test]
fn test_unresolvable_link_drops_symbol_from_flattened_table() {
    let flat = two_step().flatten().unwrap();
    assert!(flat.get_class("a").is_some());
    assert!(flat.get_class("z").is_none());
    assert_eq!(flat.source_namespace().as_str(), "official");
    let destinations: Vec<&str> = flat.destination_namespaces().iter().map(|n| n.as_str()).collect();
    assert_eq!(destinations, ["named"]);
}

#[test]
fn test_empty_chain() {
    let chain = MappingChain::default();
    assert!(chain.is_empty());
    assert!(chain.flatten().is_none());
    assert_eq!(chain.resolve_class("a"), None);
    assert!(chain.first_table().is_none());
}

#[test]
fn test_unknown_destination_namespace() {
    let table = NamespaceMapping::new("official", &["named"]);
    let result = MappingChain::from_tables([(Arc::new(table), "intermediary")]);
    assert!(result.is_err());
}
