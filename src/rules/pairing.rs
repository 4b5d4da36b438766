//! Comparer pairing and operator generation consistency.

use super::descriptors as d;
use super::{display_type, RuleContext};
use crate::diagnostics::Diagnostic;
use crate::patterns::ComparerSettings;

fn comparers<'a>(ctx: &RuleContext<'a>) -> Option<&'a ComparerSettings> {
    ctx.kind().and_then(|k| k.comparers())
}

pub fn comparer_without_equality_comparer(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    match comparers(ctx) {
        Some(ComparerSettings {
            comparer: Some(comparer),
            equality_comparer: None,
        }) => vec![ctx
            .report(
                d::EXPLICIT_COMPARER_WITHOUT_EQUALITY_COMPARER,
                comparer.span,
                vec![ctx.name().to_string()],
            )
            .with_node_span(comparer.list_span)],
        _ => Vec::new(),
    }
}

pub fn equality_comparer_without_comparer(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    match comparers(ctx) {
        Some(ComparerSettings {
            comparer: None,
            equality_comparer: Some(equality),
        }) => vec![ctx
            .report(
                d::EXPLICIT_EQUALITY_COMPARER_WITHOUT_COMPARER,
                equality.span,
                vec![ctx.name().to_string()],
            )
            .with_node_span(equality.list_span)],
        _ => Vec::new(),
    }
}

pub fn comparer_key_type_mismatch(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(kind) = ctx.kind() else {
        return Vec::new();
    };
    let (Some(settings), Some(key)) = (kind.comparers(), kind.key_type()) else {
        return Vec::new();
    };
    [&settings.comparer, &settings.equality_comparer]
        .into_iter()
        .flatten()
        .filter(|marker| !marker.key_type.is_unknown() && marker.key_type != *key)
        .map(|marker| {
            ctx.report(
                d::COMPARER_KEY_TYPE_MISMATCH,
                marker.key_type_ref.span,
                vec![
                    ctx.name().to_string(),
                    display_type(ctx, &marker.key_type),
                    display_type(ctx, key),
                ],
            )
        })
        .collect()
}

/// Equality operators may not be generated at a lower level than
/// comparison operators.
///
/// Only the ordering is checked. The generator also drops both operator
/// sets when either one is `None`; that coupling is not modelled here, so
/// `Comparison = None` with any equality level passes and
/// `Equality = None` below a comparison level is reported like any other
/// lower level.
pub fn operators_generation_mismatch(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(operators) = ctx.kind().and_then(|k| k.operators()) else {
        return Vec::new();
    };
    let (comparison, equality) = (operators.comparison.level, operators.equality.level);
    if equality >= comparison {
        return Vec::new();
    }
    let span = operators
        .equality
        .arg_span
        .or(operators.comparison.arg_span)
        .unwrap_or(operators.attribute_span);
    vec![ctx
        .report(
            d::OPERATORS_GENERATION_MISMATCH,
            span,
            vec![
                ctx.name().to_string(),
                comparison.to_string(),
                equality.to_string(),
            ],
        )
        .with_node_span(operators.attribute_span)]
}
