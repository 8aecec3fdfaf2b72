//! Mixin annotation tests: targets, shadows, accessors, invokers, injectors.

use once_cell::sync::Lazy;
use ravel::base::{FileId, TextRange, TextSize};
use ravel::hir::{DeclId, ReferenceIndex, ReferenceLocator, ReferenceSite, SearchScope};
use ravel::mapping::NamespaceMapping;
use ravel::remap::{FileSink, Issue, RemapConfig, RemapContext, rewrite_mixins};
use rstest::rstest;

use crate::helpers::remap_helpers::*;

fn two_targets(b_name: &str) -> NamespaceMapping {
    let mut table = NamespaceMapping::new("official", &["named"]);
    table.class("t/A", &["t/A"]).field("f", Some("I"), &["g"]);
    table.class("t/B", &["t/B"]).field("f", Some("I"), &[b_name]);
    table
}

const ACCESSOR: &str = "package m;

import org.spongepowered.asm.mixin.Mixin;
import org.spongepowered.asm.mixin.gen.Accessor;
import t.A;
import t.B;

@Mixin({A.class, B.class})
public interface SharedAccessor {
    @Accessor(\"f\")
    int getF();
}
";

#[test]
fn test_targets_that_agree_rewrite_the_accessor() {
    let program = program(&[("src/m/SharedAccessor.java", ACCESSOR)]);
    let run = run_remap(&program, &single_chain(two_targets("g")), quiet_config());

    assert!(run.report.diagnostics.is_empty(), "{:?}", run.report.diagnostics);
    assert_eq!(
        run.text("src/m/SharedAccessor.java"),
        ACCESSOR.replace("@Accessor(\"f\")", "@Accessor(\"g\")")
    );
}

#[test]
fn test_targets_that_disagree_leave_the_accessor() {
    let program = program(&[("src/m/SharedAccessor.java", ACCESSOR)]);
    let run = run_remap(&program, &single_chain(two_targets("h")), quiet_config());

    assert_eq!(run.text("src/m/SharedAccessor.java"), ACCESSOR);
    assert_eq!(run.report.diagnostics.len(), 1);
    match &run.report.diagnostics[0].issue {
        Issue::DivergentRename { candidates } => {
            let names: Vec<&str> = candidates.iter().map(|(_, n)| n.as_str()).collect();
            assert_eq!(names, ["g", "h"]);
        }
        other => panic!("unexpected issue {other:?}"),
    }
}

#[test]
fn test_accessor_name_is_derived_and_inserted() {
    let source = "package m;

import org.spongepowered.asm.mixin.Mixin;
import org.spongepowered.asm.mixin.gen.Accessor;
import t.A;

@Mixin(A.class)
public interface AAccessor {
    @Accessor
    int getCount();
}
";
    let mut table = NamespaceMapping::new("official", &["named"]);
    table.class("t/A", &["t/A"]).field("count", Some("I"), &["amount"]);
    let program = program(&[("src/m/AAccessor.java", source)]);
    let run = run_remap(&program, &single_chain(table), quiet_config());

    assert_eq!(
        run.text("src/m/AAccessor.java"),
        source.replace("@Accessor\n", "@Accessor(\"amount\")\n")
    );
}

#[test]
fn test_shadow_prefix_is_kept() {
    let source = "package m;

import org.spongepowered.asm.mixin.Mixin;
import org.spongepowered.asm.mixin.Shadow;
import t.Counter;

@Mixin(Counter.class)
public abstract class CounterMixin {
    @Shadow
    private int shadow$count;

    private void bump() {
        this.shadow$count++;
        shadow$count += 2;
    }
}
";
    let mut table = NamespaceMapping::new("official", &["named"]);
    table
        .class("t/Counter", &["t/Counter"])
        .field("count", Some("I"), &["amount"]);
    let program = program(&[("src/m/CounterMixin.java", source)]);
    let run = run_remap(&program, &single_chain(table), quiet_config());

    assert!(run.report.diagnostics.is_empty(), "{:?}", run.report.diagnostics);
    assert_eq!(
        run.text("src/m/CounterMixin.java"),
        source.replace("shadow$count", "shadow$amount")
    );
}

#[test]
fn test_public_shadow_is_not_renamed() {
    let source = "package m;

import org.spongepowered.asm.mixin.Mixin;
import org.spongepowered.asm.mixin.Shadow;
import t.Counter;

@Mixin(Counter.class)
public abstract class CounterMixin {
    @Shadow
    public int count;
}
";
    let mut table = NamespaceMapping::new("official", &["named"]);
    table
        .class("t/Counter", &["t/Counter"])
        .field("count", Some("I"), &["amount"]);
    let program = program(&[("src/m/CounterMixin.java", source)]);
    let run = run_remap(&program, &single_chain(table), quiet_config());

    assert_eq!(run.text("src/m/CounterMixin.java"), source);
    assert_eq!(run.codes(), ["R0003"]);
}

const INJECTOR: &str = "package m;

import org.spongepowered.asm.mixin.Mixin;
import org.spongepowered.asm.mixin.injection.At;
import org.spongepowered.asm.mixin.injection.Inject;
import org.spongepowered.asm.mixin.injection.callback.CallbackInfo;
import t.Target;

@Mixin(Target.class)
public class TargetMixin {
    @Inject(method = \"tick()V\", at = @At(value = \"INVOKE\", target = \"Lt/Target;helper(I)V\"))
    private void onTick(CallbackInfo ci) {
    }
}
";

/// Shared by the injector and invoker tests.
static TARGET_TABLE: Lazy<NamespaceMapping> = Lazy::new(|| {
    let mut table = NamespaceMapping::new("official", &["named"]);
    table
        .class("t/Target", &["t/Target"])
        .method("tick", "()V", &["update"])
        .method("helper", "(I)V", &["assist"]);
    table
});

fn target_table() -> NamespaceMapping {
    TARGET_TABLE.clone()
}

#[test]
fn test_injector_selectors_are_translated() {
    let program = program(&[("src/m/TargetMixin.java", INJECTOR)]);
    let run = run_remap(&program, &single_chain(target_table()), quiet_config());

    assert!(run.report.diagnostics.is_empty(), "{:?}", run.report.diagnostics);
    assert_eq!(
        run.text("src/m/TargetMixin.java"),
        INJECTOR
            .replace("\"tick()V\"", "\"update()V\"")
            .replace("\"Lt/Target;helper(I)V\"", "\"Lt/Target;assist(I)V\"")
    );
}

#[test]
fn test_remap_false_leaves_injector_alone() {
    let source = INJECTOR.replace("@Mixin(Target.class)", "@Mixin(value = Target.class, remap = false)");
    let program = program(&[("src/m/TargetMixin.java", &source)]);
    let run = run_remap(&program, &single_chain(target_table()), quiet_config());

    assert!(run.report.diagnostics.is_empty());
    assert_eq!(run.text("src/m/TargetMixin.java"), source);
}

#[test]
fn test_wildcard_target_gets_one_comment() {
    let source = INJECTOR.replace("\"tick()V\"", "\"tick*\"");
    let program = program(&[("src/m/TargetMixin.java", &source)]);
    let run = run_remap(&program, &single_chain(target_table()), RemapConfig::default());

    assert_eq!(run.report.diagnostics.len(), 1);
    assert_eq!(run.codes(), ["R0003"]);
    let output = run.text("src/m/TargetMixin.java");
    assert_eq!(output.matches("TODO(Ravel)").count(), 1);
    assert!(output.contains("method = \"tick*\""));
}

#[test]
fn test_invoker_without_value_gets_one() {
    let source = "package m;

import org.spongepowered.asm.mixin.Mixin;
import org.spongepowered.asm.mixin.gen.Invoker;
import t.Target;

@Mixin(Target.class)
public interface TargetInvoker {
    @Invoker
    void callHelper(int value);
}
";
    let program = program(&[("src/m/TargetInvoker.java", source)]);
    let run = run_remap(&program, &single_chain(target_table()), quiet_config());

    assert!(run.report.diagnostics.is_empty(), "{:?}", run.report.diagnostics);
    assert_eq!(
        run.text("src/m/TargetInvoker.java"),
        source.replace("@Invoker\n", "@Invoker(\"assist\")\n")
    );
}

#[test]
fn test_string_targets_keep_their_style() {
    let source = "package m;

import org.spongepowered.asm.mixin.Mixin;

@Mixin(targets = {\"t.Old\", \"t/Old$Inner\"})
public class OldMixin {
}
";
    let mut table = NamespaceMapping::new("official", &["named"]);
    table.class("t/Old", &["u/New"]);
    table.class("t/Old$Inner", &["u/New$Inner"]);
    let program = program(&[("src/m/OldMixin.java", source)]);
    let run = run_remap(&program, &single_chain(table), quiet_config());

    assert_eq!(
        run.text("src/m/OldMixin.java"),
        source
            .replace("\"t.Old\"", "\"u.New\"")
            .replace("\"t/Old$Inner\"", "\"u/New$Inner\"")
    );
}

#[test]
fn test_member_annotation_without_targets() {
    let source = "package m;

import org.spongepowered.asm.mixin.Mixin;
import org.spongepowered.asm.mixin.Shadow;

@Mixin({})
public abstract class Empty {
    @Shadow
    private int count;
}
";
    let program = program(&[("src/m/Empty.java", source)]);
    let run = run_remap(&program, &single_chain(target_table()), quiet_config());

    assert_eq!(run.codes(), ["R0004"]);
    assert_eq!(run.text("src/m/Empty.java"), source);
}

const CUSTOM_PREFIX: &str = "package m;

import org.spongepowered.asm.mixin.Mixin;
import org.spongepowered.asm.mixin.Shadow;
import t.Counter;

@Mixin(Counter.class)
public abstract class CounterMixin {
    @Shadow
    private int my_count;

    private int read() {
        return my_count;
    }
}
";

fn counter_table() -> NamespaceMapping {
    let mut table = NamespaceMapping::new("official", &["named"]);
    table
        .class("t/Counter", &["t/Counter"])
        .field("count", Some("I"), &["amount"]);
    table
}

#[test]
fn test_configured_shadow_prefix() {
    let program = program(&[("src/m/CounterMixin.java", CUSTOM_PREFIX)]);
    let config = quiet_config().with_shadow_prefix("my_");
    let run = run_remap(&program, &single_chain(counter_table()), config);

    assert_eq!(
        run.text("src/m/CounterMixin.java"),
        CUSTOM_PREFIX.replace("my_count", "my_amount")
    );
}

#[test]
fn test_mixin_stage_can_be_disabled() {
    let program = program(&[("src/m/SharedAccessor.java", ACCESSOR)]);
    let run = run_remap(
        &program,
        &single_chain(two_targets("g")),
        quiet_config().with_mixins(false),
    );

    assert_eq!(run.report.files_changed, 0);
    assert_eq!(run.text("src/m/SharedAccessor.java"), ACCESSOR);
}

/// A locator that knows no usages.
struct NoUsages;

impl ReferenceLocator for NoUsages {
    fn search(&self, _decl: DeclId, _scope: &SearchScope) -> Vec<ReferenceSite> {
        Vec::new()
    }
}

#[test]
fn test_shadow_usages_come_from_the_locator() {
    let program = program(&[("src/m/CounterMixin.java", CUSTOM_PREFIX)]);
    let chain = single_chain(counter_table());
    let config = quiet_config().with_shadow_prefix("my_");
    let references = ReferenceIndex::build(&program);
    let ctx = RemapContext::new(&program, &chain, &config, &references).with_locator(&NoUsages);

    let file = program.source_files().next().unwrap();
    let mut sink = FileSink::new(&ctx, file);
    rewrite_mixins(&ctx, &mut sink).unwrap();
    let outcome = sink.finish();

    assert!(outcome.foreign.is_empty());
    let replacements: Vec<&str> = outcome.edits.iter().map(|e| e.replacement.as_str()).collect();
    assert_eq!(replacements, ["my_amount"]);
}

// ============================================================================
// FIELD TYPES
// ============================================================================

/// `t/A` has two fields named `b`: `int` and `long`.
fn typed_fields() -> NamespaceMapping {
    let mut table = NamespaceMapping::new("official", &["named"]);
    table
        .class("t/A", &["t/A"])
        .field("b", Some("I"), &["count"])
        .field("b", Some("J"), &["total"]);
    table
}

#[test]
fn test_shadow_field_type_selects_the_entry() {
    let source = "package m;

import org.spongepowered.asm.mixin.Mixin;
import org.spongepowered.asm.mixin.Shadow;
import t.A;

@Mixin(A.class)
public abstract class AMixin {
    @Shadow
    private long b;

    private long read() {
        return b;
    }
}
";
    let program = program(&[("src/m/AMixin.java", source)]);
    let run = run_remap(&program, &single_chain(typed_fields()), quiet_config());

    assert!(run.report.diagnostics.is_empty(), "{:?}", run.report.diagnostics);
    assert_eq!(run.text("src/m/AMixin.java"), source.replace(" b;", " total;"));
}

#[test]
fn test_accessor_types_select_the_entry() {
    let source = "package m;

import org.spongepowered.asm.mixin.Mixin;
import org.spongepowered.asm.mixin.gen.Accessor;
import t.A;

@Mixin(A.class)
public interface AAccessor {
    @Accessor(\"b\")
    long getWide();

    @Accessor(\"b\")
    void setNarrow(int value);
}
";
    let program = program(&[("src/m/AAccessor.java", source)]);
    let run = run_remap(&program, &single_chain(typed_fields()), quiet_config());

    assert!(run.report.diagnostics.is_empty(), "{:?}", run.report.diagnostics);
    assert_eq!(
        run.text("src/m/AAccessor.java"),
        source
            .replace("@Accessor(\"b\")\n    long", "@Accessor(\"total\")\n    long")
            .replace("@Accessor(\"b\")\n    void", "@Accessor(\"count\")\n    void")
    );
}

// ============================================================================
// MALFORMED DESCRIPTORS AND FILE FAILURES
// ============================================================================

#[test]
fn test_malformed_selector_only_skips_its_member() {
    let source = "package m;

import org.spongepowered.asm.mixin.Mixin;
import org.spongepowered.asm.mixin.injection.At;
import org.spongepowered.asm.mixin.injection.Inject;
import org.spongepowered.asm.mixin.injection.callback.CallbackInfo;
import t.Target;

@Mixin(Target.class)
public class TargetMixin {
    @Inject(method = \"tick(Q)V\", at = @At(\"HEAD\"))
    private void onTick(CallbackInfo ci) {
    }

    @Inject(method = \"helper(I)V\", at = @At(\"TAIL\"))
    private void onHelper(CallbackInfo ci) {
    }
}
";
    let program = program(&[("src/m/TargetMixin.java", source)]);
    let run = run_remap(&program, &single_chain(target_table()), quiet_config());

    assert_eq!(run.codes(), ["R0005"]);
    assert_eq!(
        run.text("src/m/TargetMixin.java"),
        source.replace("\"helper(I)V\"", "\"assist(I)V\"")
    );

    let commented = run_remap(&program, &single_chain(target_table()), RemapConfig::default());
    let output = commented.text("src/m/TargetMixin.java");
    assert_eq!(output.matches("TODO(Ravel)").count(), 1);
    assert!(!output.contains("Failed to fully remap file"));
}

/// A locator whose every usage lies in a file the program does not hold.
struct StrayUsage;

impl ReferenceLocator for StrayUsage {
    fn search(&self, _decl: DeclId, _scope: &SearchScope) -> Vec<ReferenceSite> {
        vec![ReferenceSite {
            file: FileId::new(99),
            range: TextRange::new(TextSize::from(0), TextSize::from(1)),
            anchor: TextSize::from(0),
        }]
    }
}

#[test]
fn test_file_failure_leaves_a_comment_and_keeps_queued_edits() {
    let source = "package m;

import org.spongepowered.asm.mixin.Mixin;
import org.spongepowered.asm.mixin.Shadow;
import t.Counter;

@Mixin(Counter.class)
public abstract class CounterMixin {
    @Shadow
    private int shadow$count;
}
";
    let program = program(&[("src/m/CounterMixin.java", source)]);
    let run = run_remap_with_locator(
        &program,
        &single_chain(counter_table()),
        &StrayUsage,
        RemapConfig::default(),
    );

    assert_eq!(run.codes(), ["R0006"]);
    let output = run.text("src/m/CounterMixin.java");
    assert!(
        output.starts_with("// TODO(Ravel): Failed to fully remap file: usage in file#99"),
        "{output}"
    );
    assert!(output.contains("private int shadow$amount;"));
}

// ============================================================================
// INJECTION POINTS
// ============================================================================

fn points_table() -> NamespaceMapping {
    let mut table = NamespaceMapping::new("official", &["named"]);
    table
        .class("t/Target", &["t/Target"])
        .method("tick", "()V", &["update"])
        .method("helper", "(I)V", &["assist"])
        .field("value", Some("I"), &["amount"]);
    table.class("t/Old", &["u/New"]);
    table
}

fn injector_with(at: &str) -> String {
    format!(
        "package m;

import org.spongepowered.asm.mixin.Mixin;
import org.spongepowered.asm.mixin.injection.At;
import org.spongepowered.asm.mixin.injection.Inject;
import org.spongepowered.asm.mixin.injection.callback.CallbackInfo;
import t.Target;

@Mixin(Target.class)
public class TargetMixin {{
    @Inject(method = \"tick()V\", at = {at})
    private void onTick(CallbackInfo ci) {{
    }}
}}
"
    )
}

#[test]
fn test_field_point_target_is_translated() {
    let source = injector_with("@At(value = \"FIELD\", target = \"Lt/Target;value:I\")");
    let program = program(&[("src/m/TargetMixin.java", &source)]);
    let run = run_remap(&program, &single_chain(points_table()), quiet_config());

    assert!(run.report.diagnostics.is_empty(), "{:?}", run.report.diagnostics);
    assert_eq!(
        run.text("src/m/TargetMixin.java"),
        source
            .replace("\"tick()V\"", "\"update()V\"")
            .replace("\"Lt/Target;value:I\"", "\"Lt/Target;amount:I\"")
    );
}

#[rstest]
#[case("t.Old", "u.New")]
#[case("t/Old", "u/New")]
#[case("(Lt/Old;I)V", "(Lu/New;I)V")]
fn test_new_point_target_is_translated(#[case] target: &str, #[case] expected: &str) {
    let source = injector_with(&format!("@At(value = \"NEW\", target = \"{target}\")"));
    let program = program(&[("src/m/TargetMixin.java", &source)]);
    let run = run_remap(&program, &single_chain(points_table()), quiet_config());

    assert!(run.report.diagnostics.is_empty(), "{:?}", run.report.diagnostics);
    assert_eq!(
        run.text("src/m/TargetMixin.java"),
        source
            .replace("\"tick()V\"", "\"update()V\"")
            .replace(&format!("\"{target}\""), &format!("\"{expected}\""))
    );
}

#[rstest]
#[case("@At(value = \"INVOKE\", target = \"Lt/Target;helper(I)V\", desc = \"x\")")]
#[case("@At(value = \"INVOKE\", target = \"Lt/Target;helper(I)V\", args = \"log=true\")")]
#[case("@At(value = \"SOMEWHERE\", target = \"Lt/Target;helper(I)V\")")]
fn test_unsupported_point_is_flagged(#[case] at: &str) {
    let source = injector_with(at);
    let program = program(&[("src/m/TargetMixin.java", &source)]);
    let run = run_remap(&program, &single_chain(points_table()), quiet_config());

    assert_eq!(run.codes(), ["R0003"]);
    let output = run.text("src/m/TargetMixin.java");
    assert!(output.contains("\"Lt/Target;helper(I)V\""));
    assert!(output.contains("\"update()V\""));
}

// ============================================================================
// OTHER ANNOTATIONS
// ============================================================================

#[test]
fn test_unhandled_mixin_annotation_gets_a_comment() {
    let source = "package m;

import org.spongepowered.asm.mixin.Implements;
import org.spongepowered.asm.mixin.Mixin;
import t.Target;

@Mixin(Target.class)
@Implements({})
public class TargetMixin {
}
";
    let program = program(&[("src/m/TargetMixin.java", source)]);
    let run = run_remap(&program, &single_chain(target_table()), RemapConfig::default());

    assert_eq!(run.codes(), ["R0003"]);
    let output = run.text("src/m/TargetMixin.java");
    assert!(output.contains("TODO(Ravel): Implements mixin annotation is not implemented"));
    assert!(output.contains("@Implements({})"));
}

#[test]
fn test_overwrite_renames_method_and_calls() {
    let source = "package m;

import org.spongepowered.asm.mixin.Mixin;
import org.spongepowered.asm.mixin.Overwrite;
import t.Target;

@Mixin(Target.class)
public abstract class TargetMixin {
    @Overwrite
    private void tick() {
    }

    private void twice() {
        tick();
        this.tick();
    }
}
";
    let program = program(&[("src/m/TargetMixin.java", source)]);
    let run = run_remap(&program, &single_chain(target_table()), quiet_config());

    assert!(run.report.diagnostics.is_empty(), "{:?}", run.report.diagnostics);
    assert_eq!(run.text("src/m/TargetMixin.java"), source.replace("tick()", "update()"));
}

#[test]
fn test_package_private_shadow_renames_sibling_usages() {
    let mixin = "package m;

import org.spongepowered.asm.mixin.Mixin;
import org.spongepowered.asm.mixin.Shadow;
import t.Counter;

@Mixin(Counter.class)
public abstract class CounterMixin {
    @Shadow
    int count;
}
";
    let helper = "package m;

class Helper {
    int peek(CounterMixin mixin) {
        return mixin.count;
    }
}
";
    let program = program(&[("src/m/CounterMixin.java", mixin), ("src/m/Helper.java", helper)]);
    let run = run_remap(&program, &single_chain(counter_table()), quiet_config());

    assert!(run.report.diagnostics.is_empty(), "{:?}", run.report.diagnostics);
    assert_eq!(run.text("src/m/CounterMixin.java"), mixin.replace("int count;", "int amount;"));
    assert_eq!(run.text("src/m/Helper.java"), helper.replace("mixin.count", "mixin.amount"));
    assert_eq!(run.report.files_changed, 2);
}
