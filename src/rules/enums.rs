//! Smart enum specific rules.

use super::descriptors as d;
use super::{display_type, Part, RuleContext};
use crate::diagnostics::Diagnostic;
use crate::patterns::{ClassificationIssue, PatternKind, SmartEnumInfo};
use crate::semantic::ResolvedType;
use crate::shape::{self, member_accessibility, Accessibility};
use crate::syntax::ast::{Member, MethodDecl, ModifierKind, RefKind};

pub const CREATE_INVALID_ITEM: &str = "CreateInvalidItem";

fn smart_enum<'a>(ctx: &RuleContext<'a>) -> Option<&'a SmartEnumInfo> {
    ctx.kind().and_then(PatternKind::as_smart_enum)
}

pub fn multiple_incompatible_enum_interfaces(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    ctx.classification
        .issues
        .iter()
        .map(|issue| match issue {
            ClassificationIssue::IncompatibleEnumInterfaces { span } => ctx.report(
                d::MULTIPLE_INCOMPATIBLE_ENUM_INTERFACES,
                *span,
                vec![ctx.name().to_string()],
            ),
        })
        .collect()
}

/// `private static Self CreateInvalidItem(K key)`.
fn is_valid_create_invalid_item(ctx: &RuleContext<'_>, part: &Part<'_>, method: &MethodDecl, key: &ResolvedType) -> bool {
    let scope = ctx.compilation.scope_of(part.id);
    let returns_self = !method.return_type.is_nullable()
        && ctx
            .compilation
            .resolve(&method.return_type, &scope)
            .declared_id()
            .is_some_and(|id| ctx.parts().contains(&id));
    let takes_key = match method.params.params.as_slice() {
        [param] => param.ref_kind == RefKind::None && ctx.compilation.resolve(&param.ty, &scope) == *key,
        _ => false,
    };
    method.has_modifier(ModifierKind::Static)
        && member_accessibility(&method.modifiers) == Accessibility::Private
        && method.type_params.is_empty()
        && returns_self
        && takes_key
}

pub fn invalid_create_invalid_item_signature(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(info) = smart_enum(ctx).filter(|i| i.is_validatable) else {
        return Vec::new();
    };
    let Some(key) = &info.key_type else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for part in ctx.part_decls() {
        let invalid = part
            .decl
            .methods()
            .filter(|m| m.name.text == CREATE_INVALID_ITEM && m.explicit_interface.is_none())
            .filter(|m| !is_valid_create_invalid_item(ctx, &part, m, key));
        for m in invalid {
            out.push(ctx.report_on(
                &part,
                d::INVALID_CREATE_INVALID_ITEM_SIGNATURE,
                m.name.span,
                vec![ctx.name().to_string(), display_type(ctx, key)],
            ));
        }
    }
    out
}

pub fn abstract_enum_must_implement_create_invalid_item(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(info) = smart_enum(ctx).filter(|i| i.is_validatable) else {
        return Vec::new();
    };
    let Some(key) = &info.key_type else {
        return Vec::new();
    };
    if !ctx.has_modifier(ModifierKind::Abstract) {
        return Vec::new();
    }
    let symbols = ctx.compilation.symbols();
    let declared = ctx.parts().into_iter().any(|part| {
        symbols
            .decl(part)
            .methods()
            .any(|m| m.name.text == CREATE_INVALID_ITEM)
    });
    if declared {
        return Vec::new();
    }
    vec![ctx
        .report(
            d::ABSTRACT_ENUM_MUST_IMPLEMENT_CREATE_INVALID_ITEM,
            ctx.decl.name.span,
            vec![ctx.name().to_string(), display_type(ctx, key)],
        )
        .with_node_span(ctx.decl.span)]
}

pub fn non_validatable_enum_must_be_class(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    match smart_enum(ctx) {
        Some(info) if !info.is_validatable && ctx.decl.kind.is_struct_like() => vec![ctx.report(
            d::NON_VALIDATABLE_ENUM_MUST_BE_CLASS,
            ctx.decl.name.span,
            vec![ctx.name().to_string()],
        )],
        _ => Vec::new(),
    }
}

pub fn enum_has_no_items(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    if smart_enum(ctx).is_none() {
        return Vec::new();
    }
    let parts = ctx.parts();
    let symbols = ctx.compilation.symbols();
    let has_items = parts.iter().any(|part| {
        symbols
            .decl(*part)
            .fields()
            .any(|f| shape::is_static_enum_item(ctx.compilation, *part, f))
    });
    if has_items {
        return Vec::new();
    }
    vec![ctx.report(d::ENUM_HAS_NO_ITEMS, ctx.decl.name.span, vec![ctx.name().to_string()])]
}

pub fn extensible_enum_cannot_be_struct(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    match smart_enum(ctx) {
        Some(info) if info.is_extensible && ctx.decl.kind.is_struct_like() => vec![ctx.report(
            d::EXTENSIBLE_ENUM_CANNOT_BE_STRUCT,
            ctx.decl.name.span,
            vec![ctx.name().to_string()],
        )],
        _ => Vec::new(),
    }
}

pub fn extensible_enum_must_not_have_virtual_members(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    if !smart_enum(ctx).is_some_and(|i| i.is_extensible) {
        return Vec::new();
    }
    let mut out = Vec::new();
    for part in ctx.part_decls() {
        let virtuals = part.decl.members.iter().filter_map(|member| match member {
            Member::Method(m) if m.has_modifier(ModifierKind::Virtual) => Some(&m.name),
            Member::Property(p) if p.has_modifier(ModifierKind::Virtual) => Some(&p.name),
            _ => None,
        });
        for name in virtuals {
            out.push(ctx.report_on(
                &part,
                d::EXTENSIBLE_ENUM_MUST_NOT_HAVE_VIRTUAL_MEMBERS,
                name.span,
                vec![name.text.clone(), ctx.name().to_string()],
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::super::testing::{args, run};
    use super::*;
    use crate::diagnostics::Severity;
    use indoc::indoc;

    #[test]
    fn incompatible_contracts_are_reported_once() {
        let found = run(
            "public sealed partial class E : IEnum<string>, IValidatableEnum<int> { }",
            d::MULTIPLE_INCOMPATIBLE_ENUM_INTERFACES,
        );
        assert_eq!(args(&found), vec![vec!["E".to_string()]]);
    }

    #[test]
    fn create_invalid_item_shape() {
        let src = indoc! {"
            public sealed partial class Color : IValidatableEnum<string>
            {
                public static readonly Color Red = default;

                public static Color CreateInvalidItem(string key) => default;
                private static Color CreateInvalidItem(int key) => default;
                private static Color CreateInvalidItem(string key, int x) => default;
            }

            public sealed partial class Size : IValidatableEnum<string>
            {
                public static readonly Size Small = default;

                private static Size CreateInvalidItem(string key) => default;
            }
        "};
        let found = run(src, d::INVALID_CREATE_INVALID_ITEM_SIGNATURE);
        assert_eq!(found.len(), 3);
        assert!(found
            .iter()
            .all(|d| d.args == vec!["Color".to_string(), "string".to_string()]));
    }

    #[test]
    fn abstract_validatable_enum_needs_factory() {
        let src = indoc! {"
            public abstract partial class Shape : IValidatableEnum<int>
            {
                public static readonly Shape Circle = default;
            }

            public abstract partial class Other : IEnum<int>
            {
                public static readonly Other One = default;
            }
        "};
        let found = run(src, d::ABSTRACT_ENUM_MUST_IMPLEMENT_CREATE_INVALID_ITEM);
        assert_eq!(args(&found), vec![vec!["Shape".to_string(), "int".to_string()]]);
    }

    #[test]
    fn struct_enums() {
        let src = indoc! {"
            [SmartEnum<int>]
            public readonly partial struct Plain
            {
                public static readonly Plain One = default;
            }

            [SmartEnum<int>(IsValidatable = true, IsExtensible = true)]
            public readonly partial struct Ext
            {
                public static readonly Ext One = default;
            }
        "};
        let class_needed = run(src, d::NON_VALIDATABLE_ENUM_MUST_BE_CLASS);
        assert_eq!(args(&class_needed), vec![vec!["Plain".to_string()]]);
        let extensible = run(src, d::EXTENSIBLE_ENUM_CANNOT_BE_STRUCT);
        assert_eq!(args(&extensible), vec![vec!["Ext".to_string()]]);
    }

    #[test]
    fn marker_on_a_later_part_still_requires_items() {
        let c = crate::semantic::Compilation::from_sources(
            "App",
            &[
                ("A.cs", "public sealed partial class Empty { public static Empty Fake => default; }"),
                ("B.cs", "[SmartEnum<int>]\npublic sealed partial class Empty { }"),
            ],
        );
        let found = super::super::testing::run_on(&c, d::ENUM_HAS_NO_ITEMS);
        assert_eq!(args(&found), vec![vec!["Empty".to_string()]]);
        assert!(found[0].path().ends_with("B.cs"));
        let props = super::super::testing::run_on(&c, d::STATIC_PROPERTIES_ARE_NOT_ITEMS);
        assert_eq!(props.len(), 1);
        assert!(props[0].path().ends_with("A.cs"));
    }

    #[test]
    fn items_are_counted_across_parts() {
        let src = indoc! {"
            [SmartEnum<int>]
            public sealed partial class Level { }

            public sealed partial class Level
            {
                public static readonly Level Low = default;
            }

            [SmartEnum<int>]
            public sealed partial class Empty
            {
                public static Empty Fake => default;
            }
        "};
        let found = run(src, d::ENUM_HAS_NO_ITEMS);
        assert_eq!(args(&found), vec![vec!["Empty".to_string()]]);
        assert_eq!(found[0].severity, Severity::Warning);
    }

    #[test]
    fn virtual_members_of_extensible_enums() {
        let src = indoc! {"
            [SmartEnum<int>(IsExtensible = true)]
            public partial class Unit
            {
                public static readonly Unit Meter = default;
                public virtual string Symbol => \"m\";
                public virtual int Scale() => 1;
                public int Plain() => 1;
            }
        "};
        let found = run(src, d::EXTENSIBLE_ENUM_MUST_NOT_HAVE_VIRTUAL_MEMBERS);
        assert_eq!(
            args(&found),
            vec![
                vec!["Symbol".to_string(), "Unit".to_string()],
                vec!["Scale".to_string(), "Unit".to_string()],
            ]
        );
    }
}
