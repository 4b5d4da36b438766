//! Rules about the declaration itself: its kind, modifiers, type
//! parameters and nesting.

use super::descriptors as d;
use super::{Part, RuleContext};
use crate::diagnostics::Diagnostic;
use crate::patterns::{markers, PatternKind, UnionKind};
use crate::shape;
use crate::syntax::ast::{MethodDecl, ModifierKind};

pub fn type_must_be_class_or_struct(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let applies = matches!(
        ctx.kind(),
        Some(PatternKind::SmartEnum(_) | PatternKind::KeyedValueObject(_) | PatternKind::ComplexValueObject(_))
    );
    if !applies || shape::is_plain_class_or_struct(ctx.decl.kind) {
        return Vec::new();
    }
    vec![ctx.report(
        d::TYPE_MUST_BE_CLASS_OR_STRUCT,
        ctx.decl.name.span,
        vec![ctx.name().to_string()],
    )]
}

pub fn type_must_be_partial(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    if ctx.kind().is_none() || shape::is_partial(ctx.decl) {
        return Vec::new();
    }
    vec![ctx
        .report(d::TYPE_MUST_BE_PARTIAL, ctx.decl.name.span, vec![ctx.name().to_string()])
        .with_node_span(ctx.decl.span)]
}

pub fn struct_must_be_read_only(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let applies = match ctx.kind() {
        Some(PatternKind::Union(info)) => matches!(info.kind, UnionKind::AdHoc { .. }),
        Some(_) => true,
        None => false,
    };
    if !applies || !ctx.decl.kind.is_struct_like() || ctx.has_modifier(ModifierKind::Readonly) {
        return Vec::new();
    }
    vec![ctx
        .report(d::STRUCT_MUST_BE_READ_ONLY, ctx.decl.name.span, vec![ctx.name().to_string()])
        .with_node_span(ctx.decl.span)]
}

pub fn type_must_not_be_generic(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    // complex value objects may be generic
    let applies = matches!(
        ctx.kind(),
        Some(PatternKind::SmartEnum(_) | PatternKind::KeyedValueObject(_) | PatternKind::Union(_))
    );
    if !applies || ctx.decl.type_params.is_empty() {
        return Vec::new();
    }
    vec![ctx.report(
        d::TYPE_MUST_NOT_BE_GENERIC,
        ctx.decl.name.span,
        vec![ctx.name().to_string(), ctx.decl.type_params.len().to_string()],
    )]
}

pub fn type_must_not_be_inside_generic_type(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    if ctx.kind().is_none() {
        return Vec::new();
    }
    let symbols = ctx.compilation.symbols();
    let Some(container) = shape::enclosing_generic_type(symbols, ctx.id) else {
        return Vec::new();
    };
    vec![ctx.report(
        d::TYPE_MUST_NOT_BE_INSIDE_GENERIC_TYPE,
        ctx.decl.name.span,
        vec![ctx.name().to_string(), symbols.decl(container).name.text.clone()],
    )]
}

pub fn primary_constructor_not_allowed(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    if ctx.kind().is_none() {
        return Vec::new();
    }
    ctx.part_decls()
        .iter()
        .filter_map(|part| {
            let primary = part.decl.primary_ctor.as_ref()?;
            Some(ctx.report_on(
                part,
                d::PRIMARY_CONSTRUCTOR_NOT_ALLOWED,
                primary.span,
                vec![ctx.name().to_string()],
            ))
        })
        .collect()
}

/// Methods of a smart enum marked `[UseDelegateFromConstructor]`, with the
/// part declaring them.
fn delegate_methods<'a>(ctx: &RuleContext<'a>) -> Vec<(Part<'a>, &'a MethodDecl)> {
    if !matches!(ctx.kind(), Some(PatternKind::SmartEnum(_))) {
        return Vec::new();
    }
    let ns = ctx.library_namespace();
    let mut out = Vec::new();
    for part in ctx.part_decls() {
        let decl = part.decl;
        out.extend(
            decl.methods()
                .filter(|m| markers::has_marker(&m.attributes, markers::USE_DELEGATE_FROM_CONSTRUCTOR, ns))
                .map(|m| (part, m)),
        );
    }
    out
}

pub fn use_delegate_method_must_be_partial(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    delegate_methods(ctx)
        .into_iter()
        .filter(|(_, m)| !m.has_modifier(ModifierKind::Partial))
        .map(|(part, m)| {
            ctx.report_on(
                &part,
                d::USE_DELEGATE_FROM_CONSTRUCTOR_METHOD_MUST_BE_PARTIAL,
                m.name.span,
                vec![m.name.text.clone()],
            )
            .with_node_span(m.span)
        })
        .collect()
}

pub fn use_delegate_method_must_not_be_generic(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    delegate_methods(ctx)
        .into_iter()
        .filter(|(_, m)| !m.type_params.is_empty())
        .map(|(part, m)| {
            ctx.report_on(
                &part,
                d::USE_DELEGATE_FROM_CONSTRUCTOR_METHOD_MUST_NOT_BE_GENERIC,
                m.name.span,
                vec![m.name.text.clone()],
            )
        })
        .collect()
}
