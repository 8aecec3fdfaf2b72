//! The closed vocabulary of mixin annotations.

const MIXIN_PACKAGE: &str = "org.spongepowered.asm.mixin.";
const MIXINEXTRAS_PACKAGE: &str = "com.llamalad7.mixinextras.";

/// Injector annotations: `method` selectors plus nested `@At` points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InjectorKind {
    Inject,
    Redirect,
    ModifyArg,
    ModifyArgs,
    ModifyConstant,
    ModifyVariable,
    ModifyExpressionValue,
    ModifyReturnValue,
    ModifyReceiver,
    WrapWithCondition,
    WrapOperation,
}

/// A recognised mixin annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MixinAnnotation {
    Mixin,
    Shadow,
    Overwrite,
    Invoker,
    Accessor,
    Injector(InjectorKind),
    At,
    /// Carries no symbol references.
    Passthrough,
    /// In a mixin package but not handled.
    Unknown,
}

impl MixinAnnotation {
    /// Classify a fully qualified annotation name. `None` for annotations
    /// outside the mixin packages.
    pub fn classify(qualified: &str) -> Option<Self> {
        use InjectorKind::*;
        use MixinAnnotation::*;

        if let Some(name) = qualified.strip_prefix(MIXIN_PACKAGE) {
            return Some(match name {
                "Mixin" => Mixin,
                "Shadow" => Shadow,
                "Overwrite" => Overwrite,
                "gen.Invoker" => Invoker,
                "gen.Accessor" => Accessor,
                "injection.Inject" => Injector(Inject),
                "injection.Redirect" => Injector(Redirect),
                "injection.ModifyArg" => Injector(ModifyArg),
                "injection.ModifyArgs" => Injector(ModifyArgs),
                "injection.ModifyConstant" => Injector(ModifyConstant),
                "injection.ModifyVariable" => Injector(ModifyVariable),
                "injection.At" => At,
                "Unique" | "Final" | "Debug" | "Intrinsic" | "Mutable" | "Dynamic"
                | "injection.Coerce" | "injection.Slice" | "injection.Constant" => Passthrough,
                _ => Unknown,
            });
        }

        let name = qualified.strip_prefix(MIXINEXTRAS_PACKAGE)?;
        Some(match name {
            "injector.ModifyExpressionValue" => Injector(ModifyExpressionValue),
            "injector.ModifyReturnValue" => Injector(ModifyReturnValue),
            "injector.ModifyReceiver" => Injector(ModifyReceiver),
            "injector.WrapWithCondition" | "injector.v2.WrapWithCondition" => {
                Injector(WrapWithCondition)
            }
            "injector.wrapoperation.WrapOperation" => Injector(WrapOperation),
            sugar if sugar.starts_with("sugar.") => Passthrough,
            _ => Unknown,
        })
    }

    /// Whether member annotations of this kind need the class's targets.
    pub fn needs_targets(self) -> bool {
        matches!(
            self,
            MixinAnnotation::Shadow
                | MixinAnnotation::Overwrite
                | MixinAnnotation::Invoker
                | MixinAnnotation::Accessor
                | MixinAnnotation::Injector(_)
        )
    }
}

/// Whether an on-demand import may bring mixin annotations into scope.
pub fn is_mixin_package(dotted: &str) -> bool {
    let with_dot = format!("{dotted}.");
    with_dot.starts_with(MIXIN_PACKAGE) || with_dot.starts_with(MIXINEXTRAS_PACKAGE)
}
