//! General rewriter tests: classes, members, imports and qualifiers.

use std::sync::Arc;

use ravel::mapping::{MappingChain, NamespaceMapping};
use ravel::remap::RemapConfig;

use crate::helpers::remap_helpers::*;

const MAIN: &str = "package app;

import a.b.Foo;

public class Main {
    int run() {
        return Foo.bar();
    }
}
";

/// `a.b.Foo#bar()I` -> `a.b.Foo#baz()I` -> `x.y.Qux#qux()I`
fn two_step_chain() -> MappingChain {
    let mut first = NamespaceMapping::new("official", &["intermediary"]);
    first.class("a/b/Foo", &["a/b/Foo"]).method("bar", "()I", &["baz"]);
    let mut second = NamespaceMapping::new("intermediary", &["named"]);
    second.class("a/b/Foo", &["x/y/Qux"]).method("baz", "()I", &["qux"]);
    MappingChain::from_tables([
        (Arc::new(first), "intermediary"),
        (Arc::new(second), "named"),
    ])
    .unwrap()
}

#[test]
fn test_end_to_end_two_step_chain() {
    let program = program(&[("src/app/Main.java", MAIN)]);
    let run = run_remap(&program, &two_step_chain(), RemapConfig::default());

    assert!(run.report.diagnostics.is_empty(), "{:?}", run.report.diagnostics);
    assert!(run.report.failures.is_empty());
    assert_eq!(run.report.files_changed, 1);
    assert_eq!(
        run.text("src/app/Main.java"),
        "package app;

import x.y.Qux;

public class Main {
    int run() {
        return Qux.qux();
    }
}
"
    );
}

#[test]
fn test_remapping_output_again_changes_nothing() {
    let chain = two_step_chain();
    let first = run_remap(&program(&[("src/app/Main.java", MAIN)]), &chain, quiet_config());
    let output = first.text("src/app/Main.java");

    let second = run_remap(&program(&[("src/app/Main.java", &output)]), &chain, quiet_config());
    assert_eq!(second.report.edits_applied, 0);
    assert_eq!(second.report.files_changed, 0);
    assert_eq!(second.text("src/app/Main.java"), output);
}

#[test]
fn test_declarations_and_usages_in_source() {
    let lib = "package a;

public class Counter {
    private int c;

    public void d() {
        c++;
        this.c = 0;
    }
}
";
    let user = "package b;

import a.Counter;

class User {
    void use(Counter counter) {
        counter.d();
    }
}
";
    let mut table = NamespaceMapping::new("official", &["named"]);
    table
        .class("a/Counter", &["a/Tally"])
        .field("c", Some("I"), &["count"])
        .method("d", "()V", &["reset"]);
    let program = program(&[("src/a/Counter.java", lib), ("src/b/User.java", user)]);
    let run = run_remap(&program, &single_chain(table), quiet_config());

    assert!(run.report.diagnostics.is_empty(), "{:?}", run.report.diagnostics);
    assert_eq!(
        run.text("src/a/Counter.java"),
        "package a;

public class Tally {
    private int count;

    public void reset() {
        count++;
        this.count = 0;
    }
}
"
    );
    assert_eq!(
        run.text("src/b/User.java"),
        "package b;

import a.Tally;

class User {
    void use(Tally counter) {
        counter.reset();
    }
}
"
    );
}

#[test]
fn test_unmapped_names_are_untouched() {
    let source = "package app;

class Plain {
    int value;

    int get() {
        return value;
    }
}
";
    let mut table = NamespaceMapping::new("official", &["named"]);
    table.class("other/Thing", &["other/Renamed"]);
    let program = program(&[("src/app/Plain.java", source)]);
    let run = run_remap(&program, &single_chain(table), RemapConfig::default());

    assert_eq!(run.report.files_changed, 0);
    assert!(run.report.diagnostics.is_empty());
    assert_eq!(run.text("src/app/Plain.java"), source);
}

#[test]
fn test_report_counts() {
    let program = program(&[("src/app/Main.java", MAIN)]);
    let run = run_remap(&program, &two_step_chain(), quiet_config());
    assert_eq!(run.report.files_analysed, 1);
    // Foo and a.b in the import, Foo and bar in the body
    assert_eq!(run.report.edits_applied, 4);
    assert!(!run.report.cancelled);
}

/// Two fields named `b` that differ only in type.
const TYPED_FIELDS: &str = "tiny\t2\t0\tofficial\tnamed
c\tt/A\tt/A
\tf\tI\tb\tcount
\tf\tJ\tb\ttotal
";

#[test]
fn test_field_type_selects_the_mapping_entry() {
    let source = "package t;

public class A {
    long b;

    long read() {
        return this.b + b;
    }
}
";
    let program = program(&[("src/t/A.java", source)]);
    let run = run_remap(&program, &tiny_chain(TYPED_FIELDS), quiet_config());

    assert!(run.report.diagnostics.is_empty(), "{:?}", run.report.diagnostics);
    assert_eq!(
        run.text("src/t/A.java"),
        source
            .replace("long b;", "long total;")
            .replace("this.b + b", "this.total + total")
    );
}

#[test]
fn test_untyped_external_field_must_agree() {
    let source = "package m;

import t.A;

public class Reader {
    long read(A a) {
        return a.b;
    }
}
";
    let program = program(&[("src/m/Reader.java", source)]);
    let run = run_remap(&program, &tiny_chain(TYPED_FIELDS), quiet_config());

    assert_eq!(run.codes(), ["R0002"]);
    assert_eq!(run.text("src/m/Reader.java"), source);
}
