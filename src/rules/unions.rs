//! Union rules: declaration form, case hierarchy and member types.

use super::descriptors as d;
use super::{display_type, RuleContext};
use crate::diagnostics::{Diagnostic, Severity};
use crate::patterns::{PatternKind, UnionKind};
use crate::semantic::{ResolvedType, TypeId};
use crate::shape::DerivedTypeTree;
use crate::syntax::ast::TypeDeclKind;

fn is_regular_union(ctx: &RuleContext<'_>) -> bool {
    matches!(ctx.kind(), Some(PatternKind::Union(info)) if info.is_discriminated_by_type())
}

pub fn regular_union_must_be_class_or_record(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    if !is_regular_union(ctx) || ctx.decl.kind.is_class_like() {
        return Vec::new();
    }
    vec![ctx.report(
        d::REGULAR_UNION_MUST_BE_CLASS_OR_RECORD,
        ctx.decl.name.span,
        vec![ctx.name().to_string()],
    )]
}

/// Every case below the root must be sealed or only constructible from
/// inside the union.
pub fn union_case_must_be_sealed_or_private(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    if !is_regular_union(ctx) {
        return Vec::new();
    }
    let tree = DerivedTypeTree::build(ctx.compilation, ctx.id);
    let symbols = ctx.compilation.symbols();
    tree.descendants()
        .filter(|(_, node)| !node.is_sealed && node.non_private_constructors().next().is_some())
        .map(|(_, node)| {
            let decl = symbols.decl(node.id);
            ctx.report_in(
                symbols.source_of(node.id),
                d::UNION_CASE_MUST_BE_SEALED_OR_PRIVATE,
                Severity::Error,
                decl.name.span,
                vec![decl.name.text.clone(), ctx.name().to_string()],
            )
            .with_node_span(decl.span)
        })
        .collect()
}

pub fn inner_type_does_not_derive_from_union(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    if !is_regular_union(ctx) {
        return Vec::new();
    }
    let roots = ctx.parts();
    let mut out = Vec::new();
    check_inner_types(ctx, ctx.id, &roots, &mut out);
    out
}

fn check_inner_types(ctx: &RuleContext<'_>, container: TypeId, roots: &[TypeId], out: &mut Vec<Diagnostic>) {
    let compilation = ctx.compilation;
    let symbols = compilation.symbols();
    for nested in symbols.nested_types(container) {
        let decl = symbols.decl(*nested);
        if matches!(
            decl.kind,
            TypeDeclKind::Enum | TypeDeclKind::Delegate | TypeDeclKind::Interface
        ) {
            continue;
        }
        if compilation.is_type_container(*nested) {
            check_inner_types(ctx, *nested, roots, out);
            continue;
        }
        if roots.iter().any(|root| compilation.derives_from(*nested, *root)) {
            continue;
        }
        out.push(ctx.report_in(
            symbols.source_of(*nested),
            d::INNER_TYPE_DOES_NOT_DERIVE_FROM_UNION,
            Severity::Error,
            decl.name.span,
            vec![decl.name.text.clone(), ctx.name().to_string()],
        ));
    }
}

/// Reference types compare without their nullable annotation.
fn member_identity<'a>(ty: &'a ResolvedType, ctx: &RuleContext<'_>) -> &'a ResolvedType {
    let inner = ty.strip_nullable();
    if inner.is_value_type(ctx.compilation.symbols()) == Some(true) {
        ty
    } else {
        inner
    }
}

pub fn ad_hoc_union_types_must_be_distinct(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(PatternKind::Union(info)) = ctx.kind() else {
        return Vec::new();
    };
    let UnionKind::AdHoc { member_types } = &info.kind else {
        return Vec::new();
    };
    let mut seen: Vec<&ResolvedType> = Vec::new();
    let mut out = Vec::new();
    for (ty, span) in member_types {
        let identity = member_identity(ty, ctx);
        if identity.is_unknown() {
            continue;
        }
        if seen.contains(&identity) {
            out.push(ctx.report(
                d::AD_HOC_UNION_TYPES_MUST_BE_DISTINCT,
                *span,
                vec![ctx.name().to_string(), display_type(ctx, identity)],
            ));
        } else {
            seen.push(identity);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::super::testing::{args, run};
    use super::*;
    use indoc::indoc;

    const RESULT: &str = indoc! {"
        [Union]
        public abstract partial record Result
        {
            private Result() { }

            public sealed record Success(int Value) : Result;

            public record Failure : Result
            {
                public Failure(string error) { }
            }

            public abstract record Pending : Result
            {
                private Pending() { }
            }

            public record Stray;

            public struct Marker { }

            public enum Kind { A, B }

            public static class Helpers
            {
                public class Nested { }
            }
        }
    "};

    #[test]
    fn regular_unions_are_classes_or_records() {
        let found = run(
            "[Union] public partial struct Bad { }",
            d::REGULAR_UNION_MUST_BE_CLASS_OR_RECORD,
        );
        assert_eq!(args(&found), vec![vec!["Bad".to_string()]]);
        assert!(run(RESULT, d::REGULAR_UNION_MUST_BE_CLASS_OR_RECORD).is_empty());
    }

    #[test]
    fn open_cases_with_public_constructors() {
        let found = run(RESULT, d::UNION_CASE_MUST_BE_SEALED_OR_PRIVATE);
        assert_eq!(
            args(&found),
            vec![vec!["Failure".to_string(), "Result".to_string()]]
        );
    }

    #[test]
    fn inner_types_must_be_cases() {
        let found = run(RESULT, d::INNER_TYPE_DOES_NOT_DERIVE_FROM_UNION);
        let names: Vec<&str> = found.iter().map(|d| d.args[0].as_str()).collect();
        assert_eq!(names, vec!["Stray", "Marker", "Nested"]);
    }

    #[test]
    fn duplicate_ad_hoc_member_types() {
        let found = run(
            "[Union<string, int, string?, int?>] public sealed partial class TextOrNumber { }",
            d::AD_HOC_UNION_TYPES_MUST_BE_DISTINCT,
        );
        assert_eq!(
            args(&found),
            vec![vec!["TextOrNumber".to_string(), "string".to_string()]]
        );
    }
}
