use super::markers::{self, bool_arg, enum_arg, find_markers, is_marker, string_arg};
use super::*;
use crate::semantic::{Compilation, Scope, TypeId};
use crate::syntax::ast::{Attribute, TypeDecl, TypeRefKind};

struct EnumContract {
    part: TypeId,
    key: ResolvedType,
    key_ref: TypeRef,
    validatable: bool,
    span: Span,
}

/// One partial part of the declaration being classified.
struct Part<'a> {
    id: TypeId,
    decl: &'a TypeDecl,
    source: &'a str,
    scope: Scope,
}

fn find_marker<'p, 'a>(parts: &'p [Part<'a>], pred: impl Fn(&Attribute) -> bool) -> Option<(&'p Part<'a>, &'a Attribute)> {
    parts
        .iter()
        .find_map(|part| part.decl.attributes().find(|a| pred(a)).map(|a| (part, a)))
}

/// Classifies a declared type from its markers and base lists.
///
/// Markers and enum contracts may sit on any partial part; all parts
/// classify the same. Options, factories and comparers are read from the
/// part carrying the pattern marker. Declarations without any recognised
/// marker yield an empty classification; the rule catalogue then reports
/// nothing for them.
pub fn classify(compilation: &Compilation, id: TypeId) -> Classification {
    let symbols = compilation.symbols();
    let ns = compilation.library().namespace.as_str();
    let mut ids = compilation.parts(id);
    if ids.is_empty() {
        ids.push(id);
    }
    let parts: Vec<Part<'_>> = ids
        .into_iter()
        .map(|part| {
            let mut scope = compilation.scope_of(part);
            scope.containing = symbols.get(part).containing;
            Part {
                id: part,
                decl: symbols.decl(part),
                source: symbols.source_of(part).text.as_str(),
                scope,
            }
        })
        .collect();

    let mut classification = Classification::default();
    let contracts: Vec<EnumContract> = parts
        .iter()
        .flat_map(|part| enum_contracts(compilation, part, ns))
        .collect();

    let union_attr = find_marker(&parts, |a| is_marker(a, markers::UNION, ns));
    let enum_attr = find_marker(&parts, |a| is_marker(a, markers::SMART_ENUM, ns));
    let keyed_attr = find_marker(&parts, |a| is_marker(a, markers::VALUE_OBJECT, ns) && a.type_args.len() == 1);
    let complex_attr = find_marker(&parts, |a| {
        is_marker(a, markers::COMPLEX_VALUE_OBJECT, ns)
            || (is_marker(a, markers::VALUE_OBJECT, ns) && a.type_args.is_empty())
    });

    let enum_home = enum_attr
        .map(|(part, _)| part)
        .or_else(|| contracts.first().and_then(|c| parts.iter().find(|p| p.id == c.part)));
    let home = union_attr
        .map(|(part, _)| part)
        .or(enum_home)
        .or(keyed_attr.map(|(part, _)| part))
        .or(complex_attr.map(|(part, _)| part))
        .or_else(|| {
            parts.iter().find(|p| {
                markers::has_marker(&p.decl.attributes, markers::OBJECT_FACTORY, ns)
                    || markers::has_marker(&p.decl.attributes, markers::VALIDATION_ERROR, ns)
            })
        });
    let Some(home) = home else {
        return classification;
    };

    classification.primary = if let Some((part, attr)) = union_attr {
        Some(PatternKind::Union(union_info(compilation, attr, &part.scope)))
    } else if let Some(part) = enum_home {
        let generation_attr = part
            .decl
            .attributes()
            .find(|a| is_marker(a, markers::ENUM_GENERATION, ns));
        let (info, issue) = smart_enum_info(
            compilation,
            part,
            enum_attr.map(|(_, a)| a),
            generation_attr,
            &contracts,
            ns,
        );
        classification.issues.extend(issue);
        Some(PatternKind::SmartEnum(info))
    } else if let Some((part, attr)) = keyed_attr {
        Some(PatternKind::KeyedValueObject(keyed_info(compilation, part, attr, ns)))
    } else {
        complex_attr.map(|(_, attr)| {
            let default_string_comparison = enum_arg(attr, "DefaultStringComparison", StringComparison::parse)
                .map(|a| a.value)
                .unwrap_or(StringComparison::Ordinal);
            PatternKind::ComplexValueObject(ComplexValueObjectInfo {
                allow_default_structs: bool_arg(attr, "AllowDefaultStructs").unwrap_or(false),
                default_string_comparison,
                operators: Some(operator_settings(attr)),
                marker_span: attr.span,
            })
        })
    };

    classification.factories = find_markers(&home.decl.attributes, markers::OBJECT_FACTORY, ns)
        .filter(|a| a.type_args.len() == 1)
        .map(|attr| object_factory(compilation, attr, &home.scope))
        .collect();

    classification.validation_error = find_markers(&home.decl.attributes, markers::VALIDATION_ERROR, ns)
        .find(|a| a.type_args.len() == 1)
        .map(|a| {
            let ty = a.type_args[0].clone();
            (compilation.resolve(&ty, &home.scope), ty, a.span)
        });
    classification.home = Some(home.id);

    if !classification.is_empty() {
        tracing::trace!(
            declaration = %symbols.qualified_name(id),
            kind = classification.primary.as_ref().map(PatternKind::name).unwrap_or("none"),
            parts = parts.len(),
            factories = classification.factories.len(),
            "classified declaration"
        );
    }
    classification
}

/// `IEnum<K>` / `IValidatableEnum<K>` entries of a part's base list.
fn enum_contracts(compilation: &Compilation, part: &Part<'_>, ns: &str) -> Vec<EnumContract> {
    let mut contracts = Vec::new();
    for base in &part.decl.base_list {
        let TypeRefKind::Named { segments, .. } = &base.kind else {
            continue;
        };
        let Some(last) = segments.last() else {
            continue;
        };
        let qualified_ok = segments.len() == 1
            || segments[..segments.len() - 1]
                .iter()
                .map(|s| s.name.text.as_str())
                .collect::<Vec<_>>()
                .join(".")
                == ns;
        if !qualified_ok || last.type_args.len() != 1 {
            continue;
        }
        let validatable = match last.name.text.as_str() {
            markers::ENUM_INTERFACE => false,
            markers::VALIDATABLE_ENUM_INTERFACE => true,
            _ => continue,
        };
        let key_ref = last.type_args[0].clone();
        contracts.push(EnumContract {
            part: part.id,
            key: compilation.resolve(&key_ref, &part.scope),
            key_ref,
            validatable,
            span: base.span,
        });
    }
    contracts
}

fn smart_enum_info(
    compilation: &Compilation,
    home: &Part<'_>,
    enum_attr: Option<&Attribute>,
    generation_attr: Option<&Attribute>,
    contracts: &[EnumContract],
    ns: &str,
) -> (SmartEnumInfo, Option<ClassificationIssue>) {
    let (decl, scope, source) = (home.decl, &home.scope, home.source);
    let attr_key = enum_attr
        .and_then(|a| a.type_args.first())
        .map(|t| (compilation.resolve(t, scope), t.clone()));

    let mut keys: Vec<&ResolvedType> = contracts.iter().map(|c| &c.key).collect();
    if let Some((key, _)) = &attr_key {
        keys.push(key);
    }
    let distinct = keys
        .iter()
        .enumerate()
        .filter(|(i, k)| !keys[..*i].contains(k))
        .count();
    // a conflicting contract on another part is reported at the name
    let issue = (distinct > 1).then(|| ClassificationIssue::IncompatibleEnumInterfaces {
        span: contracts
            .get(1)
            .filter(|c| c.part == home.id)
            .map_or(decl.name.span, |c| c.span),
    });

    let (key_type, key_type_ref) = match (&attr_key, contracts.first()) {
        (Some((key, r)), _) => (Some(key.clone()), Some(r.clone())),
        (None, Some(c)) => (Some(c.key.clone()), Some(c.key_ref.clone())),
        (None, None) => (None, None),
    };

    let is_validatable = contracts.iter().any(|c| c.validatable)
        || enum_attr.and_then(|a| bool_arg(a, "IsValidatable")).unwrap_or(false);

    // options may be written on either marker
    let option_attrs: Vec<&Attribute> = enum_attr.into_iter().chain(generation_attr).collect();
    let is_extensible = option_attrs
        .iter()
        .find_map(|a| bool_arg(a, "IsExtensible"))
        .unwrap_or(false);
    let key_property_name = option_attrs
        .iter()
        .find_map(|a| string_arg(a, "KeyPropertyName", source))
        .unwrap_or_else(|| "Key".to_string());
    let operators = option_attrs
        .iter()
        .find(|a| {
            a.named_arg("ComparisonOperators").is_some()
                || a.named_arg("EqualityComparisonOperators").is_some()
        })
        .or_else(|| option_attrs.first())
        .map(|a| operator_settings(a));

    let marker_span = enum_attr
        .map(|a| a.span)
        .or_else(|| contracts.iter().find(|c| c.part == home.id).map(|c| c.span))
        .unwrap_or(decl.name.span);

    (
        SmartEnumInfo {
            key_type,
            key_type_ref,
            is_validatable,
            is_extensible,
            key_property_name,
            operators,
            comparers: comparer_settings(compilation, decl, scope, ns),
            marker_span,
        },
        issue,
    )
}

fn keyed_info(compilation: &Compilation, home: &Part<'_>, attr: &Attribute, ns: &str) -> KeyedValueObjectInfo {
    let (decl, scope, source) = (home.decl, &home.scope, home.source);
    let key_type_ref = attr.type_args[0].clone();
    KeyedValueObjectInfo {
        key_type: compilation.resolve(&key_type_ref, scope),
        key_type_ref,
        skip_key_member: bool_arg(attr, "SkipKeyMember").unwrap_or(false),
        key_member_name: string_arg(attr, "KeyMemberName", source)
            .unwrap_or_else(|| "Value".to_string()),
        allow_default_structs: bool_arg(attr, "AllowDefaultStructs").unwrap_or(false),
        operators: Some(operator_settings(attr)),
        comparers: comparer_settings(compilation, decl, scope, ns),
        marker_span: attr.span,
    }
}

fn union_info(compilation: &Compilation, attr: &Attribute, scope: &Scope) -> UnionInfo {
    let kind = if attr.type_args.is_empty() {
        UnionKind::Regular
    } else {
        UnionKind::AdHoc {
            member_types: attr
                .type_args
                .iter()
                .map(|t| (compilation.resolve(t, scope), t.span))
                .collect(),
        }
    };
    UnionInfo {
        kind,
        marker_span: attr.span,
    }
}

fn operator_settings(attr: &Attribute) -> OperatorSettings {
    let setting = |name: &str| {
        enum_arg(attr, name, OperatorsGeneration::parse)
            .map(|a| OperatorSetting {
                level: a.value,
                arg_span: Some(a.arg_span),
                value_span: Some(a.value_span),
            })
            .unwrap_or_else(OperatorSetting::defaulted)
    };
    OperatorSettings {
        comparison: setting("ComparisonOperators"),
        equality: setting("EqualityComparisonOperators"),
        attribute_span: attr.span,
        args_span: attr.args_span,
    }
}

fn comparer_settings(compilation: &Compilation, decl: &TypeDecl, scope: &Scope, ns: &str) -> ComparerSettings {
    let mut settings = ComparerSettings::default();
    for list in &decl.attributes {
        for attr in &list.attributes {
            let slot = if is_marker(attr, markers::KEY_MEMBER_COMPARER, ns) {
                &mut settings.comparer
            } else if is_marker(attr, markers::KEY_MEMBER_EQUALITY_COMPARER, ns) {
                &mut settings.equality_comparer
            } else {
                continue;
            };
            if attr.type_args.len() != 2 || slot.is_some() {
                continue;
            }
            let key_type_ref = attr.type_args[1].clone();
            *slot = Some(ComparerMarker {
                accessor: attr.type_args[0].clone(),
                key_type: compilation.resolve(&key_type_ref, scope),
                key_type_ref,
                span: attr.span,
                list_span: list.span,
            });
        }
    }
    settings
}

fn object_factory(compilation: &Compilation, attr: &Attribute, scope: &Scope) -> ObjectFactory {
    let value_type_ref = attr.type_args[0].clone();
    let use_for_serialization = attr
        .named_arg("UseForSerialization")
        .map(|a| SerializationFrameworks::from_names(&markers::enum_member_names(&a.value)))
        .unwrap_or(SerializationFrameworks::NONE);
    ObjectFactory {
        value_type: compilation.resolve(&value_type_ref, scope),
        value_type_ref,
        use_for_serialization,
        use_with_entity_framework: bool_arg(attr, "UseWithEntityFramework").unwrap_or(false),
        use_for_model_binding: bool_arg(attr, "UseForModelBinding").unwrap_or(false),
        has_corresponding_constructor: bool_arg(attr, "HasCorrespondingConstructor")
            .unwrap_or(false),
        span: attr.span,
    }
}
