//! Sealing and constructor privacy of pattern types and their derived
//! types.

use super::descriptors as d;
use super::RuleContext;
use crate::diagnostics::{Diagnostic, Severity};
use crate::patterns::PatternKind;
use crate::shape::{self, Accessibility, DerivedTypeTree, TreeViolationKind};
use crate::syntax::ast::ModifierKind;

fn is_hierarchy_root(ctx: &RuleContext<'_>) -> bool {
    match ctx.kind() {
        Some(PatternKind::SmartEnum(_)) => true,
        Some(PatternKind::Union(info)) => info.is_discriminated_by_type(),
        _ => false,
    }
}

pub fn constructors_must_be_private(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    if !is_hierarchy_root(ctx) {
        return Vec::new();
    }
    let mut out = Vec::new();
    for part in ctx.part_decls() {
        for c in shape::constructors(part.decl, false) {
            if c.accessibility != Accessibility::Private {
                out.push(ctx.report_on(&part, d::CONSTRUCTORS_MUST_BE_PRIVATE, c.span, vec![ctx.name().to_string()]));
            }
        }
    }
    out
}

pub fn type_must_be_sealed(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let applies = matches!(
        ctx.kind(),
        Some(PatternKind::SmartEnum(_) | PatternKind::KeyedValueObject(_) | PatternKind::ComplexValueObject(_))
    );
    let decl = ctx.decl;
    // modifiers of any part count
    if !applies
        || !decl.kind.is_class_like()
        || ctx.has_modifier(ModifierKind::Sealed)
        || ctx.has_modifier(ModifierKind::Abstract)
        || ctx.has_modifier(ModifierKind::Static)
    {
        return Vec::new();
    }
    // every partial part shares the derived types
    if ctx
        .parts()
        .into_iter()
        .any(|part| !ctx.compilation.derived_types(part).is_empty())
    {
        return Vec::new();
    }
    vec![ctx
        .report(d::TYPE_MUST_BE_SEALED, decl.name.span, vec![ctx.name().to_string()])
        .with_node_span(decl.span)]
}

fn enum_tree_violations(ctx: &RuleContext<'_>, want_sealing: bool) -> Vec<Diagnostic> {
    if !matches!(ctx.kind(), Some(PatternKind::SmartEnum(_))) {
        return Vec::new();
    }
    let tree = DerivedTypeTree::build(ctx.compilation, ctx.id);
    if !tree.has_derived_types() {
        return Vec::new();
    }
    let symbols = ctx.compilation.symbols();
    let mut out = Vec::new();
    for violation in tree.violations() {
        let node = tree.node(violation.node);
        let decl = symbols.decl(node.id);
        let file = symbols.source_of(node.id);
        let args = vec![decl.name.text.clone(), ctx.name().to_string()];
        match violation.kind {
            TreeViolationKind::NotSealed if want_sealing => out.push(
                ctx.report_in(file, d::DERIVED_TYPE_MUST_BE_SEALED, Severity::Error, decl.name.span, args)
                    .with_node_span(decl.span),
            ),
            TreeViolationKind::NonPrivateConstructor(c) if !want_sealing => out.push(ctx.report_in(
                file,
                d::DERIVED_TYPE_CONSTRUCTORS_MUST_BE_PRIVATE,
                Severity::Error,
                c.span,
                args,
            )),
            _ => {}
        }
    }
    out
}

pub fn derived_type_must_be_sealed(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    enum_tree_violations(ctx, true)
}

pub fn derived_type_constructors_must_be_private(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    enum_tree_violations(ctx, false)
}
