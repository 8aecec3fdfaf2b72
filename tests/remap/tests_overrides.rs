//! Override set tests over small hierarchies.

use ravel::mapping::NamespaceMapping;
use ravel::remap::Issue;

use crate::helpers::remap_helpers::*;

const A: &str = "package p;

public interface A {
    void f();
}
";

const B: &str = "package p;

public interface B {
    void f();
}
";

const C: &str = "package p;

public class C implements A, B {
    public void f() {
    }

    void use() {
        f();
    }
}
";

#[test]
fn test_diamond_with_disagreeing_roots_is_flagged() {
    let mut table = NamespaceMapping::new("official", &["named"]);
    table.class("p/A", &["p/A"]).method("f", "()V", &["g"]);
    table.class("p/B", &["p/B"]).method("f", "()V", &["h"]);
    let program = program(&[("src/p/A.java", A), ("src/p/B.java", B), ("src/p/C.java", C)]);
    let run = run_remap(&program, &single_chain(table), quiet_config());

    assert_eq!(run.text("src/p/C.java"), C);
    assert_eq!(run.text("src/p/A.java"), A.replace("void f()", "void g()"));
    assert_eq!(run.text("src/p/B.java"), B.replace("void f()", "void h()"));

    let in_c: Vec<&Issue> = run
        .report
        .diagnostics
        .iter()
        .filter(|d| d.path.ends_with("C.java"))
        .map(|d| &d.issue)
        .collect();
    assert!(!in_c.is_empty());
    assert!(in_c.iter().all(|i| matches!(i, Issue::DivergentRename { .. })));
}

#[test]
fn test_diamond_with_agreeing_roots_renames_everything() {
    let mut table = NamespaceMapping::new("official", &["named"]);
    table.class("p/A", &["p/A"]).method("f", "()V", &["g"]);
    table.class("p/B", &["p/B"]).method("f", "()V", &["g"]);
    let program = program(&[("src/p/A.java", A), ("src/p/B.java", B), ("src/p/C.java", C)]);
    let run = run_remap(&program, &single_chain(table), quiet_config());

    assert!(run.report.diagnostics.is_empty(), "{:?}", run.report.diagnostics);
    assert_eq!(
        run.text("src/p/C.java"),
        C.replace("void f()", "void g()").replace("f();", "g();")
    );
}

#[test]
fn test_partially_mapped_diamond_is_ambiguous() {
    let mut table = NamespaceMapping::new("official", &["named"]);
    table.class("p/A", &["p/A"]).method("f", "()V", &["g"]);
    table.class("p/B", &["p/B"]);
    let program = program(&[("src/p/A.java", A), ("src/p/B.java", B), ("src/p/C.java", C)]);
    let run = run_remap(&program, &single_chain(table), quiet_config());

    assert_eq!(run.text("src/p/C.java"), C);
    assert!(run.codes().contains(&"R0001"));
}

#[test]
fn test_override_of_external_supertype() {
    let source = "package app;

import lib.Base;

public class Impl extends Base {
    @Override
    protected int compute(int x) {
        return x;
    }
}
";
    let mut table = NamespaceMapping::new("official", &["named"]);
    table
        .class("lib/Base", &["lib/Base"])
        .method("compute", "(I)I", &["evaluate"]);
    let program = program(&[("src/app/Impl.java", source)]);
    let run = run_remap(&program, &single_chain(table), quiet_config());

    assert!(run.report.diagnostics.is_empty(), "{:?}", run.report.diagnostics);
    assert_eq!(
        run.text("src/app/Impl.java"),
        source.replace("int compute(", "int evaluate(")
    );
}
