//! `[ObjectFactory<T>]` and `[ValidationError<E>]` rules.
//!
//! Factories for the pattern's own key type are emitted by the generator
//! together with their `Validate` and `ToValue` members and are not
//! checked for them.

use super::descriptors as d;
use super::{display_type, RuleContext};
use crate::diagnostics::{Diagnostic, Severity};
use crate::patterns::{markers, ObjectFactory};
use crate::semantic::{ResolvedType, TypeId};
use crate::shape::{member_accessibility, Accessibility};
use crate::syntax::ast::{MethodDecl, ModifierKind, RefKind, TypeRef, TypeRefKind};
use std::collections::BTreeSet;

pub const VALIDATE: &str = "Validate";
pub const TO_VALUE: &str = "ToValue";
const DEFAULT_VALIDATION_ERROR: &str = "ValidationError";

pub fn multiple_factories_for_serialization(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let factories = &ctx.classification.factories;
    let mut frameworks = BTreeSet::new();
    for (i, a) in factories.iter().enumerate() {
        for b in &factories[i + 1..] {
            if let Some(name) = a
                .use_for_serialization
                .overlap(b.use_for_serialization)
                .first_framework_name()
            {
                frameworks.insert(name);
            }
        }
    }
    frameworks
        .into_iter()
        .map(|framework| {
            ctx.report(
                d::MULTIPLE_FACTORIES_FOR_SERIALIZATION_FRAMEWORK,
                ctx.decl.name.span,
                vec![ctx.name().to_string(), framework.to_string()],
            )
        })
        .collect()
}

fn report_if_many(ctx: &RuleContext<'_>, id: &'static str, flag: impl Fn(&ObjectFactory) -> bool) -> Vec<Diagnostic> {
    if ctx.classification.factories.iter().filter(|f| flag(f)).count() < 2 {
        return Vec::new();
    }
    vec![ctx.report(id, ctx.decl.name.span, vec![ctx.name().to_string()])]
}

pub fn multiple_factories_for_entity_framework(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    report_if_many(ctx, d::MULTIPLE_FACTORIES_FOR_ENTITY_FRAMEWORK, |f| f.use_with_entity_framework)
}

pub fn multiple_factories_for_model_binding(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    report_if_many(ctx, d::MULTIPLE_FACTORIES_FOR_MODEL_BINDING, |f| f.use_for_model_binding)
}

/// Factories whose members the generator does not emit.
fn hand_written_factories<'a>(ctx: &RuleContext<'a>) -> impl Iterator<Item = &'a ObjectFactory> + 'a {
    let key = ctx.kind().and_then(|k| k.key_type());
    ctx.classification
        .factories
        .iter()
        .filter(move |f| key != Some(&f.value_type) && !f.value_type.is_unknown())
}

/// All methods named `name` across the partial parts, with their part.
fn methods_named<'a>(ctx: &RuleContext<'a>, name: &str) -> Vec<(TypeId, &'a MethodDecl)> {
    let symbols = ctx.compilation.symbols();
    ctx.parts()
        .into_iter()
        .flat_map(|part| {
            symbols
                .decl(part)
                .methods()
                .filter(|m| m.name.text == name)
                .map(move |m| (part, m))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn is_reference_type(ctx: &RuleContext<'_>, ty: &ResolvedType) -> bool {
    ty.is_value_type(ctx.compilation.symbols()) != Some(true)
}

/// `T?` for reference types, `T` otherwise.
fn nullable_display(ctx: &RuleContext<'_>, ty: &ResolvedType) -> String {
    let shown = display_type(ctx, ty);
    if is_reference_type(ctx, ty) {
        format!("{shown}?")
    } else {
        shown
    }
}

fn validation_error_display(ctx: &RuleContext<'_>) -> String {
    ctx.classification
        .validation_error
        .as_ref()
        .map(|(ty, _, _)| display_type(ctx, ty))
        .unwrap_or_else(|| DEFAULT_VALIDATION_ERROR.to_string())
}

pub fn expected_validate_signature(ctx: &RuleContext<'_>, factory: &ObjectFactory) -> String {
    format!(
        "public static {}? {VALIDATE}({} value, IFormatProvider? provider, out {} item)",
        validation_error_display(ctx),
        nullable_display(ctx, &factory.value_type),
        nullable_display(ctx, &ResolvedType::declared(ctx.id)),
    )
}

pub fn expected_to_value_signature(ctx: &RuleContext<'_>, factory: &ObjectFactory) -> String {
    format!("public {} {TO_VALUE}()", display_type(ctx, &factory.value_type))
}

fn resolves_to_self(ctx: &RuleContext<'_>, ty: &ResolvedType) -> bool {
    ty.strip_nullable()
        .declared_id()
        .is_some_and(|id| ctx.parts().contains(&id))
}

/// A `Validate` overload meant for `factory`: three parameters, the first
/// of the factory's value type.
fn is_validate_candidate(ctx: &RuleContext<'_>, part: TypeId, method: &MethodDecl, factory: &ObjectFactory) -> bool {
    let scope = ctx.compilation.scope_of(part);
    method.explicit_interface.is_none()
        && method.params.params.len() == 3
        && ctx
            .compilation
            .resolve(&method.params.params[0].ty, &scope)
            .strip_nullable()
            == factory.value_type.strip_nullable()
}

fn is_valid_validate(ctx: &RuleContext<'_>, part: TypeId, method: &MethodDecl, factory: &ObjectFactory) -> bool {
    let scope = ctx.compilation.scope_of(part);
    let resolve = |ty: &TypeRef| ctx.compilation.resolve(ty, &scope);
    let [value, provider, item] = method.params.params.as_slice() else {
        return false;
    };
    let returns_error = is_validation_error_type(ctx, &resolve(&method.return_type));
    let provider_ok = provider.ref_kind == RefKind::None
        && matches!(&provider.ty.without_nullable().kind, TypeRefKind::Named { segments, .. }
            if segments.last().is_some_and(|s| s.name.text == "IFormatProvider"));
    method.has_modifier(ModifierKind::Static)
        && member_accessibility(&method.modifiers) == Accessibility::Public
        && method.type_params.is_empty()
        && returns_error
        && value.ref_kind == RefKind::None
        && resolve(&value.ty).strip_nullable() == factory.value_type.strip_nullable()
        && provider_ok
        && item.ref_kind == RefKind::Out
        && resolves_to_self(ctx, &resolve(&item.ty))
}

/// The configured error type when there is one; otherwise the library's
/// `ValidationError` or any type implementing `IValidationError<T>` for
/// itself.
fn is_validation_error_type(ctx: &RuleContext<'_>, ty: &ResolvedType) -> bool {
    let ty = ty.strip_nullable();
    if let Some((configured, _, _)) = &ctx.classification.validation_error {
        return configured.strip_nullable() == ty;
    }
    ty.simple_name(ctx.compilation.symbols()) == Some(DEFAULT_VALIDATION_ERROR)
        || display_type(ctx, ty) == DEFAULT_VALIDATION_ERROR
        || ty
            .declared_id()
            .is_some_and(|id| implements_validation_error_contract(ctx, id))
}

/// Whether a base list of `error_id` names `IValidationError<E>` with `E`
/// being `error_id` itself.
fn implements_validation_error_contract(ctx: &RuleContext<'_>, error_id: TypeId) -> bool {
    let ns = ctx.library_namespace();
    ctx.compilation.parts(error_id).into_iter().any(|part| {
        ctx.compilation.base_list(part).iter().any(|(resolved, written)| {
            let TypeRefKind::Named { segments, .. } = &written.kind else {
                return false;
            };
            let named = segments
                .last()
                .is_some_and(|s| s.name.text == markers::VALIDATION_ERROR_CONTRACT);
            let qualified_ok = segments.len() == 1
                || segments[..segments.len() - 1]
                    .iter()
                    .map(|s| s.name.text.as_str())
                    .collect::<Vec<_>>()
                    .join(".")
                    == ns;
            named
                && qualified_ok
                && resolved
                    .type_args()
                    .first()
                    .and_then(ResolvedType::declared_id)
                    .is_some_and(|arg| ctx.compilation.parts(error_id).contains(&arg))
        })
    })
}

/// Reported on the offending method, in whichever part declares it. The
/// stub fix appends to the pattern declaration.
fn invalid_signature(
    ctx: &RuleContext<'_>,
    part: TypeId,
    id: &'static str,
    method: &MethodDecl,
    args: &[String],
) -> Diagnostic {
    let file = ctx.compilation.symbols().source_of(part);
    ctx.report_in(file, id, Severity::Error, method.name.span, args.to_vec())
        .with_node_span(ctx.decl.span)
}

fn validate_findings(ctx: &RuleContext<'_>, missing: bool) -> Vec<Diagnostic> {
    let methods = methods_named(ctx, VALIDATE);
    let mut out = Vec::new();
    for factory in hand_written_factories(ctx) {
        let candidates: Vec<&(TypeId, &MethodDecl)> = methods
            .iter()
            .filter(|(part, m)| is_validate_candidate(ctx, *part, m, factory))
            .collect();
        let valid = candidates
            .iter()
            .any(|(part, m)| is_valid_validate(ctx, *part, m, factory));
        let args = vec![ctx.name().to_string(), expected_validate_signature(ctx, factory)];
        match (candidates.is_empty(), valid) {
            (true, _) if missing => out.push(
                ctx.report(d::VALIDATE_METHOD_MISSING, factory.span, args)
                    .with_node_span(ctx.decl.span),
            ),
            (false, false) if !missing => out.extend(
                candidates
                    .into_iter()
                    .map(|(part, method)| invalid_signature(ctx, *part, d::VALIDATE_METHOD_SIGNATURE_INVALID, method, &args)),
            ),
            _ => {}
        }
    }
    out
}

pub fn validate_method_missing(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    validate_findings(ctx, true)
}

pub fn validate_method_signature_invalid(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    validate_findings(ctx, false)
}

fn is_to_value_candidate(ctx: &RuleContext<'_>, part: TypeId, method: &MethodDecl, factory: &ObjectFactory) -> bool {
    let scope = ctx.compilation.scope_of(part);
    ctx.compilation.resolve(&method.return_type, &scope).strip_nullable() == factory.value_type.strip_nullable()
}

fn is_valid_to_value(ctx: &RuleContext<'_>, part: TypeId, method: &MethodDecl, factory: &ObjectFactory) -> bool {
    let scope = ctx.compilation.scope_of(part);
    let returns_value = ctx.compilation.resolve(&method.return_type, &scope) == factory.value_type;
    let callable = method.explicit_interface.is_some()
        || (member_accessibility(&method.modifiers) == Accessibility::Public
            && !method.has_modifier(ModifierKind::Static));
    returns_value && callable && method.params.params.is_empty() && method.type_params.is_empty()
}

fn to_value_findings(ctx: &RuleContext<'_>, missing: bool) -> Vec<Diagnostic> {
    let methods = methods_named(ctx, TO_VALUE);
    let mut out = Vec::new();
    for factory in hand_written_factories(ctx).filter(|f| f.needs_to_value()) {
        let candidates: Vec<&(TypeId, &MethodDecl)> = methods
            .iter()
            .filter(|(part, m)| is_to_value_candidate(ctx, *part, m, factory))
            .collect();
        let valid = candidates
            .iter()
            .any(|(part, m)| is_valid_to_value(ctx, *part, m, factory));
        let args = vec![ctx.name().to_string(), expected_to_value_signature(ctx, factory)];
        match (candidates.is_empty(), valid) {
            (true, _) if missing => out.push(
                ctx.report(d::TO_VALUE_METHOD_MISSING, factory.span, args)
                    .with_node_span(ctx.decl.span),
            ),
            (false, false) if !missing => out.extend(
                candidates
                    .into_iter()
                    .map(|(part, method)| invalid_signature(ctx, *part, d::TO_VALUE_METHOD_SIGNATURE_INVALID, method, &args)),
            ),
            _ => {}
        }
    }
    out
}

pub fn to_value_method_missing(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    to_value_findings(ctx, true)
}

pub fn to_value_method_signature_invalid(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    to_value_findings(ctx, false)
}

pub fn corresponding_constructor_missing(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let symbols = ctx.compilation.symbols();
    let parts = ctx.parts();
    ctx.classification
        .factories
        .iter()
        .filter(|f| f.has_corresponding_constructor && !f.value_type.is_unknown())
        .filter(|f| {
            !parts.iter().any(|part| {
                let scope = ctx.compilation.scope_of(*part);
                symbols
                    .decl(*part)
                    .constructors()
                    .filter(|c| !c.has_modifier(ModifierKind::Static))
                    .any(|c| match c.params.params.as_slice() {
                        [param] => ctx.compilation.resolve(&param.ty, &scope) == f.value_type,
                        _ => false,
                    })
            })
        })
        .map(|f| {
            ctx.report(
                d::CORRESPONDING_CONSTRUCTOR_MISSING,
                f.span,
                vec![ctx.name().to_string(), display_type(ctx, &f.value_type)],
            )
        })
        .collect()
}

/// `E` must implement `IValidationError<E>`. Types without a declaration
/// in any known assembly are not checked.
pub fn validation_error_type_must_implement_contract(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some((error_type, error_ref, _)) = &ctx.classification.validation_error else {
        return Vec::new();
    };
    let Some(error_id) = error_type.declared_id() else {
        return Vec::new();
    };
    let implements = implements_validation_error_contract(ctx, error_id);
    if implements {
        return Vec::new();
    }
    vec![ctx.report(
        d::VALIDATION_ERROR_TYPE_MUST_IMPLEMENT_CONTRACT,
        error_ref.span,
        vec![display_type(ctx, error_type)],
    )]
}

#[cfg(test)]
mod tests {
    use super::super::testing::{args, run};
    use super::*;
    use indoc::indoc;

    #[test]
    fn two_factories_claiming_one_framework_conflict_once() {
        let forward = indoc! {"
            [ValueObject<int>]
            [ObjectFactory<string>(UseForSerialization = SerializationFrameworks.SystemTextJson)]
            [ObjectFactory<long>(UseForSerialization = SerializationFrameworks.SystemTextJson)]
            public sealed partial class Amount { }
        "};
        let backward = indoc! {"
            [ValueObject<int>]
            [ObjectFactory<long>(UseForSerialization = SerializationFrameworks.SystemTextJson)]
            [ObjectFactory<string>(UseForSerialization = SerializationFrameworks.SystemTextJson)]
            public sealed partial class Amount { }
        "};
        for src in [forward, backward] {
            let found = run(src, d::MULTIPLE_FACTORIES_FOR_SERIALIZATION_FRAMEWORK);
            assert_eq!(
                args(&found),
                vec![vec!["Amount".to_string(), "SystemTextJson".to_string()]]
            );
        }
    }

    #[test]
    fn entity_framework_and_model_binding_flags() {
        let src = indoc! {"
            [ComplexValueObject]
            [ObjectFactory<string>(UseWithEntityFramework = true, UseForModelBinding = true)]
            [ObjectFactory<int>(UseWithEntityFramework = true)]
            public sealed partial class Range { }
        "};
        assert_eq!(run(src, d::MULTIPLE_FACTORIES_FOR_ENTITY_FRAMEWORK).len(), 1);
        assert!(run(src, d::MULTIPLE_FACTORIES_FOR_MODEL_BINDING).is_empty());
    }

    #[test]
    fn validate_missing_and_invalid() {
        let missing = indoc! {"
            [ComplexValueObject]
            [ObjectFactory<string>]
            public sealed partial class Range { }
        "};
        assert_eq!(
            args(&run(missing, d::VALIDATE_METHOD_MISSING)),
            vec![vec![
                "Range".to_string(),
                "public static ValidationError? Validate(string? value, IFormatProvider? provider, out Range? item)"
                    .to_string()
            ]]
        );

        let invalid = indoc! {"
            [ComplexValueObject]
            [ObjectFactory<string>]
            public sealed partial class Range
            {
                public ValidationError? Validate(string? value, IFormatProvider? provider, out Range? item) => null;
            }
        "};
        assert!(run(invalid, d::VALIDATE_METHOD_MISSING).is_empty());
        assert_eq!(run(invalid, d::VALIDATE_METHOD_SIGNATURE_INVALID).len(), 1);

        let valid = indoc! {"
            [ComplexValueObject]
            [ObjectFactory<string>]
            public sealed partial class Range
            {
                public static ValidationError? Validate(string? value, IFormatProvider? provider, out Range? item)
                {
                    item = null;
                    return null;
                }
            }
        "};
        assert!(run(valid, d::VALIDATE_METHOD_MISSING).is_empty());
        assert!(run(valid, d::VALIDATE_METHOD_SIGNATURE_INVALID).is_empty());
    }

    #[test]
    fn validate_may_return_any_validation_error_type() {
        let src = indoc! {"
            public sealed class MyError : IValidationError<MyError>
            {
                public static MyError Create(string message) => new MyError();
            }

            [ComplexValueObject]
            [ObjectFactory<string>]
            public sealed partial class Range
            {
                public static MyError? Validate(string? value, IFormatProvider? provider, out Range? item)
                {
                    item = null;
                    return null;
                }
            }

            [ComplexValueObject]
            [ObjectFactory<string>]
            public sealed partial class Other
            {
                public static string? Validate(string? value, IFormatProvider? provider, out Other? item)
                {
                    item = null;
                    return null;
                }
            }
        "};
        let found = run(src, d::VALIDATE_METHOD_SIGNATURE_INVALID);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].args[0], "Other");
    }

    #[test]
    fn key_type_factories_are_generated() {
        let src = indoc! {"
            [ValueObject<string>]
            [ObjectFactory<string>(UseForSerialization = SerializationFrameworks.All)]
            public sealed partial class Name { }
        "};
        assert!(run(src, d::VALIDATE_METHOD_MISSING).is_empty());
        assert!(run(src, d::TO_VALUE_METHOD_MISSING).is_empty());
    }

    #[test]
    fn to_value_is_needed_for_serialization() {
        let src = indoc! {"
            [ComplexValueObject]
            [ObjectFactory<string>(UseForSerialization = SerializationFrameworks.SystemTextJson)]
            public sealed partial class Range
            {
                public static string ToValue() => \"\";
            }

            [ComplexValueObject]
            [ObjectFactory<string>(UseForModelBinding = true)]
            public sealed partial class Span { }

            [ComplexValueObject]
            [ObjectFactory<string>]
            public sealed partial class Quiet { }
        "};
        assert_eq!(
            args(&run(src, d::TO_VALUE_METHOD_SIGNATURE_INVALID)),
            vec![vec!["Range".to_string(), "public string ToValue()".to_string()]]
        );
        assert_eq!(
            args(&run(src, d::TO_VALUE_METHOD_MISSING)),
            vec![vec!["Span".to_string(), "public string ToValue()".to_string()]]
        );
    }

    #[test]
    fn corresponding_constructor() {
        let src = indoc! {"
            [ComplexValueObject]
            [ObjectFactory<string>(HasCorrespondingConstructor = true)]
            public sealed partial class Range
            {
                private Range(int value) { }
            }

            [ComplexValueObject]
            [ObjectFactory<string>(HasCorrespondingConstructor = true)]
            public sealed partial class Other
            {
                private Other(string value) { }
            }
        "};
        assert_eq!(
            args(&run(src, d::CORRESPONDING_CONSTRUCTOR_MISSING)),
            vec![vec!["Range".to_string(), "string".to_string()]]
        );
    }

    #[test]
    fn validation_error_contract() {
        let src = indoc! {"
            public sealed class GoodError : IValidationError<GoodError> { }
            public sealed class BadError { }

            [ValueObject<int>]
            [ValidationError<GoodError>]
            public sealed partial class A { }

            [ValueObject<int>]
            [ValidationError<BadError>]
            public sealed partial class B { }
        "};
        assert_eq!(
            args(&run(src, d::VALIDATION_ERROR_TYPE_MUST_IMPLEMENT_CONTRACT)),
            vec![vec!["BadError".to_string()]]
        );
    }
}
