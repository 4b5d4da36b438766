//! Declaration shape queries.
//!
//! Everything here is a pure function over the syntax tree and the
//! semantic model. Members of types declared in referenced assemblies are
//! inspected the same way as local ones; callers decide what the
//! difference means.

pub mod derived;

pub use derived::{DerivedTypeNode, DerivedTypeTree, TreeViolation, TreeViolationKind};

use crate::common::Span;
use crate::patterns::{classify, PatternKind};
use crate::semantic::{Compilation, ResolvedType, Scope, SymbolTable, TypeId};
use crate::syntax::ast::{
    has_modifier, Accessor, AccessorKind, Expr, ExprKind, FieldDecl, Modifier, ModifierKind,
    PropertyDecl, TypeDecl, TypeDeclKind, TypeRef, TypeRefKind,
};

/// Declared accessibility, ordered from least to most visible.
///
/// `Protected` and `Internal` are not comparable in C#; they share a rank
/// here which is what the "less visible than its owner" checks need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Accessibility {
    Private,
    PrivateProtected,
    Protected,
    Internal,
    ProtectedInternal,
    Public,
}

impl Accessibility {
    fn rank(self) -> u8 {
        match self {
            Accessibility::Private => 0,
            Accessibility::PrivateProtected => 1,
            Accessibility::Protected | Accessibility::Internal => 2,
            Accessibility::ProtectedInternal => 3,
            Accessibility::Public => 4,
        }
    }

    pub fn is_less_visible_than(self, other: Accessibility) -> bool {
        self.rank() < other.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Accessibility::Private => "private",
            Accessibility::PrivateProtected => "private protected",
            Accessibility::Protected => "protected",
            Accessibility::Internal => "internal",
            Accessibility::ProtectedInternal => "protected internal",
            Accessibility::Public => "public",
        }
    }
}

/// Accessibility written in `modifiers`, or `default` when none is.
pub fn accessibility(modifiers: &[Modifier], default: Accessibility) -> Accessibility {
    let has = |kind| has_modifier(modifiers, kind);
    match (
        has(ModifierKind::Public),
        has(ModifierKind::Private),
        has(ModifierKind::Protected),
        has(ModifierKind::Internal),
    ) {
        (true, ..) => Accessibility::Public,
        (_, true, true, _) => Accessibility::PrivateProtected,
        (_, true, ..) => Accessibility::Private,
        (_, _, true, true) => Accessibility::ProtectedInternal,
        (_, _, true, _) => Accessibility::Protected,
        (_, _, _, true) => Accessibility::Internal,
        _ if has(ModifierKind::File) => Accessibility::Private,
        _ => default,
    }
}

/// Accessibility of a type declaration: nested types default to private,
/// top-level ones to internal.
pub fn type_accessibility(symbols: &SymbolTable, id: TypeId) -> Accessibility {
    let default = if symbols.get(id).containing.is_some() {
        Accessibility::Private
    } else {
        Accessibility::Internal
    };
    accessibility(&symbols.decl(id).modifiers, default)
}

/// Members of classes and structs default to private.
pub fn member_accessibility(modifiers: &[Modifier]) -> Accessibility {
    accessibility(modifiers, Accessibility::Private)
}

/// A constructor's accessibility and where to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstructorFact {
    pub accessibility: Accessibility,
    /// Constructor declaration, or the type name for an implicit one.
    pub span: Span,
    pub implicit: bool,
}

/// Constructors of a class or record as written. With `include_implicit`,
/// a declaration without constructors reports its implicit one: public,
/// or protected when abstract. Primary constructors are public unless the
/// type itself is less visible.
pub fn constructors(decl: &TypeDecl, include_implicit: bool) -> Vec<ConstructorFact> {
    let mut facts: Vec<ConstructorFact> = decl
        .constructors()
        .filter(|c| !c.has_modifier(ModifierKind::Static))
        .map(|c| ConstructorFact {
            accessibility: member_accessibility(&c.modifiers),
            span: c.span,
            implicit: false,
        })
        .collect();
    if let Some(primary) = &decl.primary_ctor {
        facts.push(ConstructorFact {
            accessibility: Accessibility::Public,
            span: primary.span,
            implicit: false,
        });
    }
    if facts.is_empty() && include_implicit && decl.kind.is_class_like() {
        let accessibility = if decl.has_modifier(ModifierKind::Abstract) {
            Accessibility::Protected
        } else {
            Accessibility::Public
        };
        facts.push(ConstructorFact {
            accessibility,
            span: decl.name.span,
            implicit: true,
        });
    }
    facts
}

pub fn has_only_private_constructors(decl: &TypeDecl, include_implicit: bool) -> bool {
    constructors(decl, include_implicit)
        .iter()
        .all(|c| c.accessibility == Accessibility::Private)
}

pub fn is_static(modifiers: &[Modifier]) -> bool {
    has_modifier(modifiers, ModifierKind::Static) || has_modifier(modifiers, ModifierKind::Const)
}

/// Fields are read-only when `readonly` or `const`.
pub fn is_field_read_only(field: &FieldDecl) -> bool {
    field.has_modifier(ModifierKind::Readonly) || field.has_modifier(ModifierKind::Const)
}

/// Explicit interface implementations are reachable through the interface.
pub fn property_accessibility(property: &PropertyDecl) -> Accessibility {
    if property.explicit_interface.is_some() {
        return Accessibility::Public;
    }
    member_accessibility(&property.modifiers)
}

/// An accessor without its own accessibility modifier has the property's.
pub fn accessor_accessibility(property: &PropertyDecl, accessor: &Accessor) -> Accessibility {
    if accessor.modifiers.iter().any(|m| m.kind.is_accessibility()) {
        return member_accessibility(&accessor.modifiers);
    }
    property_accessibility(property)
}

/// The first accessor that makes a property writable from outside the
/// type: a `set` or `init` that is not effectively `private`.
pub fn mutable_accessor(property: &PropertyDecl) -> Option<&Accessor> {
    property.accessor_list.as_ref()?.accessors.iter().find(|a| {
        matches!(a.kind, AccessorKind::Set | AccessorKind::Init)
            && accessor_accessibility(property, a) != Accessibility::Private
    })
}

/// Getter-only, expression-bodied, or with a private `set`/`init`. Getter
/// bodies do not matter.
pub fn is_property_read_only(property: &PropertyDecl) -> bool {
    mutable_accessor(property).is_none()
}

/// A field or property view used by the member-level rules.
#[derive(Debug, Clone, Copy)]
pub enum MemberRef<'a> {
    Field(&'a FieldDecl),
    Property(&'a PropertyDecl),
}

impl<'a> MemberRef<'a> {
    pub fn modifiers(&self) -> &'a [Modifier] {
        match self {
            MemberRef::Field(f) => &f.modifiers,
            MemberRef::Property(p) => &p.modifiers,
        }
    }

    pub fn ty(&self) -> &'a TypeRef {
        match self {
            MemberRef::Field(f) => &f.ty,
            MemberRef::Property(p) => &p.ty,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            MemberRef::Field(_) => "field",
            MemberRef::Property(_) => "property",
        }
    }

    pub fn is_static(&self) -> bool {
        is_static(self.modifiers())
    }
}

/// `IsEffectivelyReadOnly`.
pub fn is_effectively_read_only(member: MemberRef<'_>) -> bool {
    match member {
        MemberRef::Field(f) => is_field_read_only(f),
        MemberRef::Property(p) => is_property_read_only(p),
    }
}

/// A static field declared on `owner` whose type is `owner` itself, in
/// any of its partial parts.
pub fn is_static_enum_item(compilation: &Compilation, owner: TypeId, field: &FieldDecl) -> bool {
    if !field.has_modifier(ModifierKind::Static) || field.has_modifier(ModifierKind::Const) {
        return false;
    }
    let scope = compilation.scope_of(owner);
    compilation
        .resolve(&field.ty, &scope)
        .declared_id()
        .is_some_and(|id| compilation.parts(owner).contains(&id))
}

/// Structs whose zero value is not a valid instance: struct-shaped
/// patterns that do not opt in to default values.
pub fn disallows_default(compilation: &Compilation, ty: &ResolvedType) -> bool {
    let ResolvedType::Declared { id, .. } = ty else {
        return false;
    };
    let decl = compilation.symbols().decl(*id);
    if !decl.kind.is_struct_like() {
        return false;
    }
    // markers may sit on any partial part
    let primary = compilation
        .parts(*id)
        .into_iter()
        .find_map(|part| classify(compilation, part).primary);
    match primary {
        Some(kind @ (PatternKind::KeyedValueObject(_) | PatternKind::ComplexValueObject(_))) => {
            !kind.allows_default_structs()
        }
        Some(PatternKind::Union(_)) | Some(PatternKind::SmartEnum(_)) => true,
        None => false,
    }
}

/// Whether `expr` produces the zero value of `target`: `default`,
/// `default(T)`, or a parameterless `new()` / `new T()` without an
/// initializer on a struct.
pub fn is_default_construction(expr: &Expr, target: &ResolvedType, compilation: &Compilation, scope: &Scope) -> bool {
    match &expr.unparenthesized().kind {
        ExprKind::Default(_) => true,
        ExprKind::ObjectCreation {
            ty,
            args,
            initializer,
        } => {
            let parameterless = args.as_ref().map_or(true, Vec::is_empty) && initializer.is_none();
            if !parameterless {
                return false;
            }
            let created = match ty {
                Some(ty) => compilation.resolve(ty, scope),
                None => target.clone(),
            };
            created
                .declared_id()
                .is_some_and(|id| compilation.symbols().decl(id).kind.is_struct_like())
        }
        _ => false,
    }
}

/// `HasNonDefaultInitializer`.
pub fn has_non_default_initializer(
    expr: &Expr,
    target: &ResolvedType,
    compilation: &Compilation,
    scope: &Scope,
) -> bool {
    !(is_default_construction(expr, target, compilation, scope) && disallows_default(compilation, target))
}

/// `IsNullableAnnotated`: `T?` on a value type always counts, on a
/// reference type only inside an enabled nullable context.
/// `Nullable<T>` written out resolves to a nullable value type as well.
pub fn is_nullable_annotated(
    ty: &TypeRef,
    resolved: &ResolvedType,
    symbols: &SymbolTable,
    nullable_context: bool,
) -> bool {
    let ResolvedType::Nullable(inner) = resolved else {
        return false;
    };
    match (&ty.kind, inner.is_value_type(symbols)) {
        (_, Some(true)) => true,
        (TypeRefKind::Nullable(_), Some(false) | None) => nullable_context,
        _ => false,
    }
}

/// `EnclosingGenericType`: the innermost containing type that declares
/// type parameters.
pub fn enclosing_generic_type(symbols: &SymbolTable, id: TypeId) -> Option<TypeId> {
    symbols
        .containing_chain(id)
        .find(|t| !symbols.decl(*t).type_params.is_empty())
}

/// Whether the declaration is a class or struct in the sense the pattern
/// generators accept: no records, interfaces, enums or delegates.
pub fn is_plain_class_or_struct(kind: TypeDeclKind) -> bool {
    matches!(kind, TypeDeclKind::Class | TypeDeclKind::Struct)
}

pub fn is_partial(decl: &TypeDecl) -> bool {
    decl.has_modifier(ModifierKind::Partial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SourceFile;
    use indoc::indoc;

    fn first_type(src: &str) -> SourceFile {
        SourceFile::parse("a.cs", src)
    }

    #[test]
    fn accessibility_combinations() {
        let file = first_type(indoc! {"
            class C {
                private protected int A;
                protected internal int B;
                int C1;
                public int D;
            }
        "});
        let fields: Vec<Accessibility> = file.unit.types[0]
            .fields()
            .map(|f| member_accessibility(&f.modifiers))
            .collect();
        assert_eq!(
            fields,
            vec![
                Accessibility::PrivateProtected,
                Accessibility::ProtectedInternal,
                Accessibility::Private,
                Accessibility::Public,
            ]
        );
        assert!(Accessibility::Private.is_less_visible_than(Accessibility::Internal));
        assert!(!Accessibility::Protected.is_less_visible_than(Accessibility::Internal));
    }

    #[test]
    fn property_read_only_facts() {
        let file = first_type(indoc! {"
            class C {
                public int A { get; }
                public int B { get; private set; }
                public int C1 { get; set; }
                public int D { get; init; }
                public int E => 42;
                public int F { get { return _f; } private init { _f = value; } }
                int G { get; set; }
                protected int H { get; internal set; }
                int I.J { get; set; }
            }
        "});
        let read_only: Vec<bool> = file.unit.types[0]
            .properties()
            .map(is_property_read_only)
            .collect();
        assert_eq!(
            read_only,
            vec![true, true, false, false, true, true, true, false, false]
        );
    }

    #[test]
    fn accessors_inherit_the_property_accessibility() {
        let file = first_type("class C { internal int A { get; set; } public int B { get; protected init; } }");
        let props: Vec<&PropertyDecl> = file.unit.types[0].properties().collect();
        let setter = |p: &PropertyDecl| mutable_accessor(p).map(|a| accessor_accessibility(p, a));
        assert_eq!(setter(props[0]), Some(Accessibility::Internal));
        assert_eq!(setter(props[1]), Some(Accessibility::Protected));
    }

    #[test]
    fn implicit_constructors() {
        let file = first_type("abstract class A { } class B { private B() { } static B() { } }");
        let a = constructors(&file.unit.types[0], true);
        assert_eq!(a.len(), 1);
        assert!(a[0].implicit);
        assert_eq!(a[0].accessibility, Accessibility::Protected);
        assert!(has_only_private_constructors(&file.unit.types[1], true));
        assert!(constructors(&file.unit.types[0], false).is_empty());
    }

    #[test]
    fn nullable_annotations_depend_on_context_for_reference_types() {
        let c = Compilation::from_sources(
            "App",
            &[("a.cs", "class C { string? A; int? B; Nullable<int> D; }")],
        );
        let id = c.current_types().next().expect("type");
        let decl = c.symbols().decl(id);
        let scope = c.scope_of(id);
        let facts: Vec<(bool, bool)> = decl
            .fields()
            .map(|f| {
                let resolved = c.resolve(&f.ty, &scope);
                (
                    is_nullable_annotated(&f.ty, &resolved, c.symbols(), true),
                    is_nullable_annotated(&f.ty, &resolved, c.symbols(), false),
                )
            })
            .collect();
        assert_eq!(facts, vec![(true, false), (true, true), (true, true)]);
    }

    #[test]
    fn generic_containers_are_found_transitively() {
        let c = Compilation::from_sources(
            "App",
            &[("a.cs", "class Outer<T> { class Middle { partial class Inner { } } }")],
        );
        let inner = c
            .symbols()
            .ids()
            .find(|id| c.symbols().get(*id).name == "Inner")
            .expect("inner");
        let outer = enclosing_generic_type(c.symbols(), inner).expect("generic container");
        assert_eq!(c.symbols().get(outer).name, "Outer");
    }

    #[test]
    fn default_constructions_of_default_disallowing_structs() {
        let c = Compilation::from_sources(
            "App",
            &[(
                "a.cs",
                indoc! {"
                    [ValueObject<int>] public readonly partial struct Amount { }
                    [ValueObject<int>(AllowDefaultStructs = true)] public readonly partial struct Loose { }
                    class User { }
                "},
            )],
        );
        let find = |n: &str| {
            c.symbols()
                .ids()
                .find(|id| c.symbols().get(*id).name == n)
                .map(ResolvedType::declared)
                .expect("type")
        };
        let scope = Scope::default();
        let default = Expr {
            kind: ExprKind::Default(None),
            span: Span::default(),
        };
        assert!(!has_non_default_initializer(&default, &find("Amount"), &c, &scope));
        assert!(has_non_default_initializer(&default, &find("Loose"), &c, &scope));
        assert!(has_non_default_initializer(&default, &find("User"), &c, &scope));
    }
}
