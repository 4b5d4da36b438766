//! Key member rules of keyed value objects and smart enums.

use super::descriptors as d;
use super::{display_type, RuleContext};
use crate::diagnostics::Diagnostic;
use crate::patterns::{markers, PatternKind};
use crate::shape;
use crate::syntax::ast::{Member, TypeRef, TypeRefKind};

/// Key type arguments as written: the marker's type argument and, for
/// smart enums, every enum contract in the base list.
fn key_type_refs<'a>(ctx: &RuleContext<'a>) -> Vec<&'a TypeRef> {
    let ns = ctx.library_namespace();
    let mut refs = Vec::new();
    match ctx.kind() {
        Some(PatternKind::SmartEnum(_)) => {
            refs.extend(
                ctx.decl
                    .attributes()
                    .filter(|a| markers::is_marker(a, markers::SMART_ENUM, ns))
                    .flat_map(|a| a.type_args.iter()),
            );
            for base in &ctx.decl.base_list {
                let TypeRefKind::Named { segments, .. } = &base.kind else {
                    continue;
                };
                if let Some(last) = segments.last() {
                    let name = last.name.text.as_str();
                    if (name == markers::ENUM_INTERFACE || name == markers::VALIDATABLE_ENUM_INTERFACE)
                        && last.type_args.len() == 1
                    {
                        refs.push(&last.type_args[0]);
                    }
                }
            }
        }
        Some(PatternKind::KeyedValueObject(info)) => {
            // the classification owns a copy; report on the written argument
            refs.extend(
                ctx.decl
                    .attributes()
                    .filter(|a| markers::is_marker(a, markers::VALUE_OBJECT, ns) && a.type_args.len() == 1)
                    .filter(|a| a.type_args[0].span == info.key_type_ref.span)
                    .map(|a| &a.type_args[0]),
            );
        }
        _ => {}
    }
    refs
}

pub fn key_member_must_not_be_nullable(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let symbols = ctx.compilation.symbols();
    let scope = ctx.scope();
    key_type_refs(ctx)
        .into_iter()
        .filter_map(|ty| {
            let resolved = ctx.compilation.resolve(ty, &scope);
            let nullable_context = ctx.nullable_enabled_at(ty.span.start);
            shape::is_nullable_annotated(ty, &resolved, symbols, nullable_context).then(|| {
                ctx.report(
                    d::KEY_MEMBER_MUST_NOT_BE_NULLABLE,
                    ty.span,
                    vec![ctx.name().to_string(), display_type(ctx, &resolved)],
                )
            })
        })
        .collect()
}

/// The hand-written key member: an instance field or property named
/// `name` in any part of the declaration.
fn find_key_member<'a>(ctx: &RuleContext<'a>, name: &str) -> Option<(crate::semantic::TypeId, &'a crate::syntax::ast::Ident, &'a TypeRef)> {
    let symbols = ctx.compilation.symbols();
    for part in ctx.parts() {
        for member in &symbols.decl(part).members {
            match member {
                Member::Field(f) if !shape::is_static(&f.modifiers) => {
                    if let Some(declarator) = f.declarators.iter().find(|v| v.name.text == name) {
                        return Some((part, &declarator.name, &f.ty));
                    }
                }
                Member::Property(p)
                    if !shape::is_static(&p.modifiers) && p.explicit_interface.is_none() && p.name.text == name =>
                {
                    return Some((part, &p.name, &p.ty));
                }
                _ => {}
            }
        }
    }
    None
}

pub fn custom_key_member_type_mismatch(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(PatternKind::KeyedValueObject(info)) = ctx.kind() else {
        return Vec::new();
    };
    if !info.skip_key_member {
        return Vec::new();
    }
    let Some((part, name, ty)) = find_key_member(ctx, &info.key_member_name) else {
        return Vec::new();
    };
    let actual = ctx.compilation.resolve(ty, &ctx.compilation.scope_of(part));
    if actual == info.key_type {
        return Vec::new();
    }
    let file = ctx.compilation.symbols().source_of(part);
    vec![ctx.report_in(
        file,
        d::CUSTOM_KEY_MEMBER_TYPE_MISMATCH,
        crate::diagnostics::Severity::Error,
        name.span,
        vec![
            name.text.clone(),
            display_type(ctx, &actual),
            display_type(ctx, &info.key_type),
        ],
    )]
}

pub fn custom_key_member_not_found(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(PatternKind::KeyedValueObject(info)) = ctx.kind() else {
        return Vec::new();
    };
    if !info.skip_key_member || find_key_member(ctx, &info.key_member_name).is_some() {
        return Vec::new();
    }
    vec![ctx.report(
        d::CUSTOM_KEY_MEMBER_NOT_FOUND,
        ctx.decl.name.span,
        vec![ctx.name().to_string(), info.key_member_name.clone()],
    )]
}
