//! Member-level rules: read-only state, item visibility and required
//! members.

use super::descriptors as d;
use super::{display_type, RuleContext};
use crate::diagnostics::{Diagnostic, Location, Severity};
use crate::patterns::PatternKind;
use crate::semantic::TypeId;
use crate::shape::{
    self, is_field_read_only, member_accessibility, mutable_accessor, type_accessibility,
    Accessibility, DerivedTypeTree, MemberRef,
};
use crate::syntax::ast::{AccessorKind, Member, Modifier, ModifierKind, TypeDecl};

/// Enumerations and value objects hold immutable state.
fn requires_read_only_state(ctx: &RuleContext<'_>) -> bool {
    matches!(
        ctx.kind(),
        Some(PatternKind::SmartEnum(_) | PatternKind::KeyedValueObject(_) | PatternKind::ComplexValueObject(_))
    )
}

/// Whether a base-class member is visible from the pattern type. Private
/// members never are; members from other assemblies only when public or
/// protected.
fn inherited_visible(ctx: &RuleContext<'_>, owner: TypeId, modifiers: &[Modifier]) -> bool {
    member_accessibility(modifiers) != Accessibility::Private
        && ctx.compilation.member_visible(owner, modifiers)
}

pub fn field_must_be_read_only(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    if !requires_read_only_state(ctx) {
        return Vec::new();
    }
    let mut out = Vec::new();
    for part in ctx.part_decls() {
        for field in part.decl.fields().filter(|f| !is_field_read_only(f)) {
            for declarator in &field.declarators {
                out.push(
                    ctx.report_on(
                        &part,
                        d::FIELD_MUST_BE_READ_ONLY,
                        declarator.name.span,
                        vec![declarator.name.text.clone(), ctx.name().to_string()],
                    )
                    .with_node_span(field.span),
                );
            }
        }
    }

    // a derived type cannot change an inherited field; advisory only
    let symbols = ctx.compilation.symbols();
    for base in ctx.compilation.base_chain(ctx.id) {
        let base_decl = symbols.decl(base);
        for field in base_decl.fields() {
            if is_field_read_only(field) || !inherited_visible(ctx, base, &field.modifiers) {
                continue;
            }
            for declarator in &field.declarators {
                out.push(ctx.report_with_severity(
                    d::FIELD_MUST_BE_READ_ONLY,
                    Severity::Warning,
                    ctx.decl.name.span,
                    vec![declarator.name.text.clone(), base_decl.name.text.clone()],
                ));
            }
        }
    }
    out
}

pub fn property_must_be_read_only(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    if !requires_read_only_state(ctx) {
        return Vec::new();
    }
    let mut out = Vec::new();
    for part in ctx.part_decls() {
        for property in part.decl.properties() {
            if mutable_accessor(property).is_none() {
                continue;
            }
            // explicit interface implementations cannot be narrowed; warn only
            let severity = if property.explicit_interface.is_some() {
                Severity::Warning
            } else {
                Severity::Error
            };
            out.push(
                ctx.report_in(
                    part.file,
                    d::PROPERTY_MUST_BE_READ_ONLY,
                    severity,
                    property.name.span,
                    vec![property.name.text.clone(), ctx.name().to_string()],
                )
                .with_node_span(property.span),
            );
        }
    }

    let symbols = ctx.compilation.symbols();
    for base in ctx.compilation.base_chain(ctx.id) {
        let base_decl = symbols.decl(base);
        for property in base_decl.properties() {
            let Some(accessor) = mutable_accessor(property) else {
                continue;
            };
            let visible = property.explicit_interface.is_some()
                || inherited_visible(ctx, base, &property.modifiers);
            // a setter narrower than the property itself is not reachable
            let setter_visible = accessor.modifiers.is_empty()
                || inherited_visible(ctx, base, &accessor.modifiers);
            if !visible || !setter_visible {
                continue;
            }
            out.push(ctx.report_with_severity(
                d::PROPERTY_MUST_BE_READ_ONLY,
                Severity::Warning,
                ctx.decl.name.span,
                vec![property.name.text.clone(), base_decl.name.text.clone()],
            ));
        }
    }
    out
}

pub fn enum_item_must_be_public(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    if !matches!(ctx.kind(), Some(PatternKind::SmartEnum(_))) {
        return Vec::new();
    }
    let mut out = Vec::new();
    for part in ctx.part_decls() {
        for field in part.decl.fields() {
            if !shape::is_static_enum_item(ctx.compilation, part.id, field)
                || member_accessibility(&field.modifiers) == Accessibility::Public
            {
                continue;
            }
            for declarator in &field.declarators {
                out.push(
                    ctx.report_on(
                        &part,
                        d::ENUM_ITEM_MUST_BE_PUBLIC,
                        declarator.name.span,
                        vec![declarator.name.text.clone(), ctx.name().to_string()],
                    )
                    .with_node_span(field.span),
                );
            }
        }
    }
    out
}

pub fn static_properties_are_not_items(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    if !matches!(ctx.kind(), Some(PatternKind::SmartEnum(_))) {
        return Vec::new();
    }
    let parts = ctx.part_decls();
    let ids: Vec<TypeId> = parts.iter().map(|p| p.id).collect();
    let mut out = Vec::new();
    for part in &parts {
        let scope = ctx.compilation.scope_of(part.id);
        for p in part.decl.properties().filter(|p| p.has_modifier(ModifierKind::Static)) {
            let own_type = ctx
                .compilation
                .resolve(&p.ty, &scope)
                .declared_id()
                .is_some_and(|id| ids.contains(&id));
            if own_type {
                out.push(ctx.report_on(
                    part,
                    d::STATIC_PROPERTIES_ARE_NOT_ITEMS,
                    p.name.span,
                    vec![p.name.text.clone(), ctx.name().to_string()],
                ));
            }
        }
    }
    out
}

/// An instance field or property together with what the required-member
/// rules need to know about it.
struct InstanceMember<'a> {
    member: MemberRef<'a>,
    name: &'a crate::syntax::ast::Ident,
    has_initializer: bool,
    span: crate::common::Span,
}

fn instance_members(decl: &TypeDecl) -> Vec<InstanceMember<'_>> {
    let mut out = Vec::new();
    for member in &decl.members {
        match member {
            Member::Field(f) if !shape::is_static(&f.modifiers) => {
                for declarator in &f.declarators {
                    out.push(InstanceMember {
                        member: MemberRef::Field(f),
                        name: &declarator.name,
                        has_initializer: declarator.initializer.is_some(),
                        span: f.span,
                    });
                }
            }
            Member::Property(p) if !shape::is_static(&p.modifiers) && p.explicit_interface.is_none() => {
                out.push(InstanceMember {
                    member: MemberRef::Property(p),
                    name: &p.name,
                    has_initializer: p.initializer.is_some(),
                    span: p.span,
                });
            }
            _ => {}
        }
    }
    out
}

/// Whether `required` can be put on the member: writable fields and
/// properties whose `set`/`init` is as visible as the property.
fn can_be_required(member: MemberRef<'_>) -> bool {
    match member {
        MemberRef::Field(f) => !is_field_read_only(f),
        MemberRef::Property(p) => {
            let own = member_accessibility(&p.modifiers);
            p.accessor_list.as_ref().is_some_and(|list| {
                list.accessors.iter().any(|a| {
                    matches!(a.kind, AccessorKind::Set | AccessorKind::Init)
                        && !shape::accessor_accessibility(p, a).is_less_visible_than(own)
                })
            })
        }
    }
}

pub fn non_default_struct_member_must_be_required(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let targets: Vec<TypeId> = match ctx.kind() {
        Some(PatternKind::ComplexValueObject(info)) if !info.allow_default_structs => ctx.parts(),
        Some(PatternKind::Union(info)) if info.is_discriminated_by_type() => {
            let tree = DerivedTypeTree::build(ctx.compilation, ctx.id);
            ctx.parts()
                .into_iter()
                .chain(tree.descendants().map(|(_, n)| n.id))
                .collect()
        }
        Some(PatternKind::Union(_)) => ctx.parts(),
        _ => return Vec::new(),
    };

    let symbols = ctx.compilation.symbols();
    let mut out = Vec::new();
    for owner in targets {
        let decl = symbols.decl(owner);
        let file = symbols.source_of(owner);
        let scope = ctx.compilation.scope_of(owner);
        let owner_accessibility = type_accessibility(symbols, owner);
        for m in instance_members(decl) {
            let modifiers = m.member.modifiers();
            if m.has_initializer
                || crate::syntax::ast::has_modifier(modifiers, ModifierKind::Required)
                || member_accessibility(modifiers).is_less_visible_than(owner_accessibility)
                || m.member.ty().is_nullable()
                || !can_be_required(m.member)
            {
                continue;
            }
            let resolved = ctx.compilation.resolve(m.member.ty(), &scope);
            if !shape::disallows_default(ctx.compilation, &resolved) {
                continue;
            }
            out.push(
                ctx.report_in(
                    file,
                    d::NON_DEFAULT_STRUCT_MEMBER_MUST_BE_REQUIRED,
                    Severity::Error,
                    m.name.span,
                    vec![
                        m.member.kind_name().to_string(),
                        m.name.text.clone(),
                        decl.name.text.clone(),
                        display_type(ctx, &resolved),
                    ],
                )
                .with_node_span(m.span),
            );
        }
    }
    out
}

pub fn allow_default_structs_with_non_default_members(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(kind) = ctx.kind() else {
        return Vec::new();
    };
    if !kind.is_value_object() || !kind.allows_default_structs() || !ctx.decl.kind.is_struct_like() {
        return Vec::new();
    }
    let marker = match kind {
        PatternKind::KeyedValueObject(info) => info.marker_span,
        PatternKind::ComplexValueObject(info) => info.marker_span,
        _ => ctx.decl.name.span,
    };
    let parts = ctx.part_decls();
    let ids: Vec<TypeId> = parts.iter().map(|p| p.id).collect();
    let mut out = Vec::new();
    for part in &parts {
        let scope = ctx.compilation.scope_of(part.id);
        for m in instance_members(part.decl) {
            if m.member.ty().is_nullable() {
                continue;
            }
            let resolved = ctx.compilation.resolve(m.member.ty(), &scope);
            let recursive = resolved.declared_id().is_some_and(|id| ids.contains(&id));
            if recursive || !shape::disallows_default(ctx.compilation, &resolved) {
                continue;
            }
            out.push(
                ctx.report_on(
                    part,
                    d::ALLOW_DEFAULT_STRUCTS_WITH_NON_DEFAULT_MEMBERS,
                    m.name.span,
                    vec![ctx.name().to_string(), m.name.text.clone(), display_type(ctx, &resolved)],
                )
                .with_additional_location(Location::new(ctx.file, marker)),
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::super::testing::{args, run};
    use super::*;
    use crate::semantic::{Assembly, Compilation, CompilationOptions};
    use crate::syntax::SourceFile;
    use indoc::indoc;
    use std::sync::Arc;

    #[test]
    fn mutable_enum_field_is_reported_with_names() {
        let found = run(
            indoc! {"
                public partial class TestEnum : IValidatableEnum<string>
                {
                    public static TestEnum Item1 = default;
                    public static readonly TestEnum Item2 = default;
                    public const int Count = 2;
                }
            "},
            d::FIELD_MUST_BE_READ_ONLY,
        );
        assert_eq!(args(&found), vec![vec!["Item1".to_string(), "TestEnum".to_string()]]);
        assert_eq!(found[0].severity, Severity::Error);
    }

    #[test]
    fn properties_with_visible_setters() {
        let found = run(
            indoc! {"
                [ValueObject<int>]
                public sealed partial class Amount : IHasValue
                {
                    public int A { get; set; }
                    public int B { get; private set; }
                    public int C { get; init; }
                    int IHasValue.D { get; set; }
                    public int E => 1;
                }
            "},
            d::PROPERTY_MUST_BE_READ_ONLY,
        );
        let names: Vec<(&str, Severity)> = found
            .iter()
            .map(|d| (d.args[0].as_str(), d.severity))
            .collect();
        assert_eq!(
            names,
            vec![
                ("A", Severity::Error),
                ("C", Severity::Error),
                ("D", Severity::Warning),
            ]
        );
    }

    #[test]
    fn inherited_members_from_other_assemblies_are_warnings() {
        let base = Arc::new(SourceFile::parse(
            "Base.cs",
            indoc! {"
                namespace Lib;
                public class EnumBase
                {
                    public int Counter;
                    private int hidden;
                    public string Name { get; set; }
                }
            "},
        ));
        let current = Arc::new(SourceFile::parse(
            "Test.cs",
            indoc! {"
                using Lib;
                public partial class TestEnum : EnumBase, IEnum<string>
                {
                    public static readonly TestEnum Item1 = default;
                }
            "},
        ));
        let c = Compilation::new(
            Assembly::new("App", vec![current]),
            vec![Assembly::new("Lib", vec![base])],
            CompilationOptions::default(),
        );
        let fields = super::super::testing::run_on(&c, d::FIELD_MUST_BE_READ_ONLY);
        assert_eq!(args(&fields), vec![vec!["Counter".to_string(), "EnumBase".to_string()]]);
        assert!(fields.iter().all(|d| d.severity == Severity::Warning));
        let props = super::super::testing::run_on(&c, d::PROPERTY_MUST_BE_READ_ONLY);
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].severity, Severity::Warning);
    }

    #[test]
    fn members_of_every_partial_part_are_checked_once() {
        let c = Compilation::from_sources(
            "App",
            &[
                ("A.cs", "[SmartEnum<int>]\npublic sealed partial class TestEnum { }\n"),
                (
                    "B.cs",
                    indoc! {"
                        public sealed partial class TestEnum
                        {
                            public static TestEnum Item1 = default;
                            internal static readonly TestEnum Item2 = default;
                            public int Mutable { get; set; }
                        }
                    "},
                ),
            ],
        );
        let fields = super::super::testing::run_on(&c, d::FIELD_MUST_BE_READ_ONLY);
        assert_eq!(args(&fields), vec![vec!["Item1".to_string(), "TestEnum".to_string()]]);
        let props = super::super::testing::run_on(&c, d::PROPERTY_MUST_BE_READ_ONLY);
        assert_eq!(args(&props), vec![vec!["Mutable".to_string(), "TestEnum".to_string()]]);
        let items = super::super::testing::run_on(&c, d::ENUM_ITEM_MUST_BE_PUBLIC);
        assert_eq!(args(&items), vec![vec!["Item2".to_string(), "TestEnum".to_string()]]);
        for found in [&fields, &props, &items] {
            assert!(found[0].path().ends_with("B.cs"));
        }
    }

    #[test]
    fn inherited_member_warnings_are_reported_once_per_type() {
        let src = indoc! {"
            public class EnumBase
            {
                public int Counter;
                public string Name { get; set; }
            }

            [SmartEnum<int>]
            public partial class TestEnum : EnumBase
            {
                public static readonly TestEnum A = default;
            }

            public partial class TestEnum
            {
                public static readonly TestEnum B = default;
            }
        "};
        let fields = run(src, d::FIELD_MUST_BE_READ_ONLY);
        assert_eq!(args(&fields), vec![vec!["Counter".to_string(), "EnumBase".to_string()]]);
        let props = run(src, d::PROPERTY_MUST_BE_READ_ONLY);
        assert_eq!(args(&props), vec![vec!["Name".to_string(), "EnumBase".to_string()]]);
    }

    #[test]
    fn non_public_items_and_static_properties() {
        let src = indoc! {"
            [SmartEnum<int>]
            public sealed partial class Level
            {
                internal static readonly Level Low = new(1);
                public static readonly Level High = new(2);
                public static Level Default => Low;
            }
        "};
        let items = run(src, d::ENUM_ITEM_MUST_BE_PUBLIC);
        assert_eq!(args(&items), vec![vec!["Low".to_string(), "Level".to_string()]]);
        let props = run(src, d::STATIC_PROPERTIES_ARE_NOT_ITEMS);
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].severity, Severity::Warning);
    }

    #[test]
    fn required_members_of_complex_value_objects() {
        let src = indoc! {"
            [ValueObject<int>]
            public readonly partial struct Amount { }

            [ComplexValueObject]
            public sealed partial class Order
            {
                public Amount Total { get; init; }
                public required Amount Paid { get; init; }
                public Amount? Discount { get; init; }
                public Amount Fee { get; init; } = Amount.Create(1);
                internal Amount Hidden { get; init; }
                public static Amount Zero { get; }
            }
        "};
        let found = run(src, d::NON_DEFAULT_STRUCT_MEMBER_MUST_BE_REQUIRED);
        assert_eq!(
            args(&found),
            vec![vec![
                "property".to_string(),
                "Total".to_string(),
                "Order".to_string(),
                "Amount".to_string()
            ]]
        );
    }

    #[test]
    fn allow_default_structs_conflicts_with_member_types() {
        let src = indoc! {"
            [ValueObject<int>]
            public readonly partial struct Amount { }

            [ComplexValueObject(AllowDefaultStructs = true)]
            public readonly partial struct Money
            {
                public readonly Amount Value;
                public readonly int Cents;
            }
        "};
        let found = run(src, d::ALLOW_DEFAULT_STRUCTS_WITH_NON_DEFAULT_MEMBERS);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].args[1], "Value");
        assert_eq!(found[0].additional_locations.len(), 1);
    }
}
